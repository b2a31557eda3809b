//! Dispatch contract: the boundary between the coordinator and the actual
//! pattern implementations (parallel fan-out/fan-in, router, orchestrator
//! planner, swarm handoffs, evaluator-optimizer). Spec.md section 1 treats
//! these implementations as out of scope; this trait is the contract each
//! one must satisfy.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::models::pattern::Pattern;
use crate::domain::models::worker_role::WorkerRole;

use super::lm_factory::LmFactory;

/// Failure surfaced by a pattern executor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("{0}")]
    Failed(String),
    #[error("pattern {0:?} is not supported by this executor")]
    PatternUnsupported(Pattern),
    #[error("cancelled")]
    Cancelled,
}

/// The contract every pattern implementation satisfies.
///
/// The core guarantees that each role in `roles` has exclusive access to
/// its bound providers for the duration of the call, and that `cancel` is
/// observed at the executor's suspension points (spec.md sections 4.6/5).
#[async_trait]
pub trait PatternExecutor: Send + Sync {
    /// Run `pattern` over `roles` against `request_text`, using `lm` to
    /// invoke the language-model layer for each role, until either a result
    /// string is produced or `cancel` fires.
    async fn dispatch(
        &self,
        pattern: Pattern,
        roles: &[WorkerRole],
        request_text: &str,
        lm: &dyn LmFactory,
        cancel: CancellationToken,
    ) -> Result<String, ExecutorError>;
}
