//! Domain error types for the task orchestrator.
//!
//! This module defines all error types using thiserror for structured error
//! handling. Each error enum corresponds to one component's failure surface
//! (spec.md section 7); the `is_transient`/`is_permanent` helpers drive each
//! component's local-recovery policy.

use thiserror::Error;

use crate::domain::models::pattern::Pattern;

/// Errors from the Task Analyzer (C4). Spec section 7: "cannot occur on
/// valid input; empty-input fallback." The variant exists for completeness
/// of the error surface, not because analysis is expected to fail often.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("task description is empty")]
    EmptyInput,
}

impl AnalysisError {
    pub const fn is_transient(&self) -> bool {
        false
    }

    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Errors from the Discovery Engine (C3). Per-provider failures are counted
/// and logged; they never abort a discovery round.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("provider {0} failed during discovery: {1}")]
    ProviderFailed(String, String),

    #[error("discovery round timed out after {0}ms")]
    RoundTimeout(u64),
}

impl DiscoveryError {
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ProviderFailed(..) | Self::RoundTimeout(_))
    }

    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Errors from the Dynamic Installer (C6). Each is recorded on the
/// `InstallationResult` for its candidate method; the fallback loop tries
/// the next method in `InstallMethod::ORDER` until exhaustion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("no install method available for provider {0}")]
    Unavailable(String),

    #[error("install of {provider} timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    #[error("install of {provider} failed (exit code {exit_code:?}): {message}")]
    Failed {
        provider: String,
        exit_code: Option<i32>,
        message: String,
    },
}

impl InstallError {
    /// All install failures are transient in the sense that the next
    /// candidate method may still succeed; permanence is a property of the
    /// exhausted *method list*, tracked by the installer service, not of a
    /// single error variant.
    pub const fn is_transient(&self) -> bool {
        true
    }

    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Errors from the Strategy Selector (C5). Per spec section 7, the selector
/// "cannot fail" — worst case it returns `direct` with low confidence — so
/// this type exists only to describe that degraded outcome, not a raised
/// error path callers need to handle separately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyMismatch {
    #[error("no pattern scored above zero confidence; falling back to direct")]
    NoViableCandidate,
}

/// Errors from the Agent Factory / Resource Pool (C7). A lease failure
/// falls back to constructing a fresh role rather than surfacing to the
/// caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleLeaseError {
    #[error("resource pool exhausted (max_pool_size={0})")]
    PoolExhausted(usize),

    #[error("no pooled role matches the requested template")]
    NoMatchingRole,
}

impl RoleLeaseError {
    pub const fn is_transient(&self) -> bool {
        true
    }
}

/// Errors from the Meta-Coordinator (C8), the only errors the caller
/// directly observes (spec section 7, propagation = S).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("no capability provider satisfies the required capabilities: {0:?}")]
    NoCapableProviders(Vec<String>),

    #[error("request was cancelled")]
    Cancelled,

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("pattern {pattern:?} dispatch failed: {message}")]
    ExecutorError { pattern: Pattern, message: String },

    /// Raised instead of silently downgrading a recommended `Swarm` to
    /// `Orchestrator` when the bound `PatternExecutor` cannot satisfy it
    /// for the current provider set (SPEC_FULL.md section B.5).
    #[error("pattern {0:?} is not supported by the bound executor for this request")]
    PatternUnsupported(Pattern),
}

impl CoordinatorError {
    /// True for failures where retrying the same request immediately could
    /// plausibly succeed (a stricter notion than `is_permanent` would be
    /// for `NoCapableProviders`, which only changes after discovery/install
    /// makes progress).
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_error_always_transient() {
        let err = InstallError::Unavailable("acme".into());
        assert!(err.is_transient());
        assert!(!err.is_permanent());
    }

    #[test]
    fn coordinator_timeout_is_transient_but_cancelled_is_not() {
        assert!(CoordinatorError::Timeout(500).is_transient());
        assert!(!CoordinatorError::Cancelled.is_transient());
        assert!(CoordinatorError::Cancelled.is_permanent());
    }

    #[test]
    fn analysis_error_is_permanent() {
        assert!(AnalysisError::EmptyInput.is_permanent());
    }
}
