//! Domain layer for the task orchestrator.
//!
//! This module contains core business logic, domain models, and the ports
//! that separate the decision-and-coordination engine from its external
//! collaborators (language model, session transport, subprocess launcher,
//! remote registries).

pub mod error;
pub mod models;
pub mod ports;

pub use error::{
    AnalysisError, CoordinatorError, DiscoveryError, InstallError, RoleLeaseError,
    StrategyMismatch,
};
