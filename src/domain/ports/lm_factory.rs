//! Language-model invocation boundary (out of scope per spec.md section 1 —
//! the core only asks it to "run this role on this input").

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::worker_role::WorkerRole;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LmError {
    #[error("language model invocation failed: {0}")]
    Failed(String),
}

/// Turns a role + prompt into a string output. The core never inspects the
/// prompt/response contents; it only passes roles opaquely (spec section 6).
#[async_trait]
pub trait LmFactory: Send + Sync {
    async fn run(&self, role: &WorkerRole, prompt: &str) -> Result<String, LmError>;
}
