//! Built-in, minimal implementations of the two ports spec.md section 1
//! marks out of scope ([`LmFactory`] and [`PatternExecutor`]).
//!
//! The core never ships a real language-model client or pattern
//! implementation — those are the caller's job. But the `taskforge` binary
//! still has to construct a [`MetaCoordinator`](crate::services::MetaCoordinator)
//! to be useful standalone, so it wires these defaults unless a caller
//! embedding this crate supplies its own. Grounded on the teacher's
//! `application::agent_executor::AgentExecutor`: a timeout-wrapped call into
//! an injected client, one role at a time.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::models::pattern::Pattern;
use crate::domain::models::worker_role::WorkerRole;
use crate::domain::ports::lm_factory::{LmError, LmFactory};
use crate::domain::ports::pattern_executor::{ExecutorError, PatternExecutor};

/// Per-role call timeout for [`SequentialPatternExecutor`]. Independent of
/// the coordinator's overall request deadline, which bounds the whole
/// dispatch.
const ROLE_TIMEOUT: Duration = Duration::from_secs(120);

/// An [`LmFactory`] that echoes the role's instructions and the prompt back
/// without calling any model. Useful for exercising the orchestrator end to
/// end (and for this crate's own tests) without a language-model dependency.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoLmFactory;

#[async_trait]
impl LmFactory for EchoLmFactory {
    async fn run(&self, role: &WorkerRole, prompt: &str) -> Result<String, LmError> {
        Ok(format!("[{}] {}", role.name, prompt))
    }
}

/// Drives every pattern by invoking `lm.run` once per role, in role order,
/// and joining the outputs. This does not implement fan-out, routing,
/// hand-off, or evaluate/optimize loop semantics that distinguish the
/// patterns from one another — it exists only to give the binary a working
/// default executor; a real executor should replace it to get pattern-
/// specific behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialPatternExecutor;

#[async_trait]
impl PatternExecutor for SequentialPatternExecutor {
    async fn dispatch(
        &self,
        pattern: Pattern,
        roles: &[WorkerRole],
        request_text: &str,
        lm: &dyn LmFactory,
        cancel: CancellationToken,
    ) -> Result<String, ExecutorError> {
        if roles.is_empty() {
            return Err(ExecutorError::Failed(format!(
                "no roles assembled for pattern {pattern:?}"
            )));
        }

        let mut outputs = Vec::with_capacity(roles.len());
        for role in roles {
            if cancel.is_cancelled() {
                return Err(ExecutorError::Cancelled);
            }
            let call = tokio::time::timeout(ROLE_TIMEOUT, lm.run(role, request_text));
            let outcome = tokio::select! {
                res = call => res,
                () = cancel.cancelled() => return Err(ExecutorError::Cancelled),
            };
            match outcome {
                Ok(Ok(output)) => outputs.push(output),
                Ok(Err(LmError::Failed(message))) => return Err(ExecutorError::Failed(message)),
                Err(_) => return Err(ExecutorError::Failed(format!(
                    "role {} timed out after {}s",
                    role.name,
                    ROLE_TIMEOUT.as_secs()
                ))),
            }
        }

        Ok(outputs.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::worker_role::WorkerRole;

    #[tokio::test]
    async fn echo_factory_includes_role_name_and_prompt() {
        let role = WorkerRole::new("researcher", "find things");
        let out = EchoLmFactory.run(&role, "find rust crates").await.unwrap();
        assert!(out.contains("researcher"));
        assert!(out.contains("find rust crates"));
    }

    #[tokio::test]
    async fn sequential_executor_joins_every_role_output() {
        let roles = vec![
            WorkerRole::new("a", "do a"),
            WorkerRole::new("b", "do b"),
        ];
        let out = SequentialPatternExecutor
            .dispatch(Pattern::Parallel, &roles, "task", &EchoLmFactory, CancellationToken::new())
            .await
            .unwrap();
        assert!(out.contains("[a]"));
        assert!(out.contains("[b]"));
    }

    #[tokio::test]
    async fn sequential_executor_rejects_empty_roles() {
        let result = SequentialPatternExecutor
            .dispatch(Pattern::Direct, &[], "task", &EchoLmFactory, CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ExecutorError::Failed(_))));
    }

    #[tokio::test]
    async fn sequential_executor_honors_pre_cancelled_token() {
        let roles = vec![WorkerRole::new("a", "do a")];
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = SequentialPatternExecutor
            .dispatch(Pattern::Direct, &roles, "task", &EchoLmFactory, cancel)
            .await;
        assert!(matches!(result, Err(ExecutorError::Cancelled)));
    }
}
