//! Command-line surface over [`crate::services::MetaCoordinator`].
//!
//! Grounded on the teacher's `cli` module: a `clap`-derived command enum
//! (`commands`) and dedicated output formatters (`output`) kept separate
//! from the command definitions. This layer is a thin shell — it has no
//! orchestration logic of its own, only argument parsing and rendering.

pub mod commands;
pub mod output;

pub use commands::{Cli, Commands};
