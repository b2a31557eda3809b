//! taskforge-orchestrator: an autonomous task orchestrator.
//!
//! Given free-form task text, the orchestrator classifies it, discovers and
//! (optionally) installs the capability providers it needs, selects an
//! execution pattern, assembles worker roles, and dispatches the request to
//! an injected [`domain::ports::pattern_executor::PatternExecutor`]. The
//! actual pattern implementations (parallel fan-out, router, orchestrator,
//! swarm, evaluator-optimizer) are out of scope for this crate; it only
//! defines and drives the contract they satisfy.

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::error::CoordinatorError;
pub use infrastructure::config::{OrchestratorConfig, QualityFloor};
pub use services::meta_coordinator::{CapabilitiesSummary, ExecutionPreferences, MetaCoordinator};
