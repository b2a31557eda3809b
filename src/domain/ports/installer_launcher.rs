//! Subprocess launcher boundary for C6 (dynamic installation).
//!
//! The core never shells out itself; it asks this port to run an install
//! command with a timeout and hand back what happened. Implementations are
//! free to use process groups/signals to enforce the timeout (spec.md
//! section 4.4: a hung installer must not block the coordinator forever).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("failed to spawn install command: {0}")]
    SpawnFailed(String),
}

/// The raw outcome of running one install command to completion or timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl LaunchOutput {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Runs an install command to completion, enforcing `timeout`.
#[async_trait]
pub trait InstallLauncher: Send + Sync {
    async fn launch(
        &self,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<LaunchOutput, LaunchError>;
}
