//! Execution pattern catalog (C5 data model).

use serde::{Deserialize, Serialize};

/// A fixed catalog of execution patterns the Strategy Selector chooses
/// between. `AdaptiveHybrid` is kept as "orchestrator plus runtime
/// switching" per spec.md section 3 and is not produced by the default
/// selector — it exists for `PatternExecutor` implementations that want to
/// opt into it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pattern {
    Direct,
    Parallel,
    Router,
    Swarm,
    Orchestrator,
    EvaluatorOptimizer,
    AdaptiveHybrid,
}

impl Pattern {
    /// Canonical enum order, used as the tiebreaker in selector scoring
    /// (spec section 4.3: "ties broken by ... canonical enum order, direct
    /// first").
    pub const CANONICAL_ORDER: [Pattern; 7] = [
        Self::Direct,
        Self::Parallel,
        Self::Router,
        Self::Swarm,
        Self::Orchestrator,
        Self::EvaluatorOptimizer,
        Self::AdaptiveHybrid,
    ];

    /// The patterns scored by the default selector (`AdaptiveHybrid` is
    /// reachable only through an explicit executor capability, not scored).
    pub const SCORED: [Pattern; 6] = [
        Self::Direct,
        Self::Parallel,
        Self::Router,
        Self::Swarm,
        Self::Orchestrator,
        Self::EvaluatorOptimizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Parallel => "parallel",
            Self::Router => "router",
            Self::Swarm => "swarm",
            Self::Orchestrator => "orchestrator",
            Self::EvaluatorOptimizer => "evaluator-optimizer",
            Self::AdaptiveHybrid => "adaptive-hybrid",
        }
    }

    /// Canonical-order rank, lower is earlier. Used for tiebreaking.
    pub fn canonical_rank(&self) -> usize {
        Self::CANONICAL_ORDER
            .iter()
            .position(|p| p == self)
            .unwrap_or(usize::MAX)
    }

    /// Base execution time in seconds used by the time-estimate formula in
    /// spec section 4.3 (`base_time_for(pattern) * complexity_level * ...`).
    pub fn base_time_seconds(&self) -> u32 {
        match self {
            Self::Direct => 10,
            Self::Router => 15,
            Self::Parallel => 20,
            Self::EvaluatorOptimizer => 30,
            Self::Orchestrator => 45,
            Self::Swarm => 60,
            Self::AdaptiveHybrid => 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_is_first_in_canonical_order() {
        assert_eq!(Pattern::CANONICAL_ORDER[0], Pattern::Direct);
        assert_eq!(Pattern::Direct.canonical_rank(), 0);
    }

    #[test]
    fn canonical_rank_is_monotonic_with_order() {
        let mut last = None;
        for p in Pattern::CANONICAL_ORDER {
            let rank = p.canonical_rank();
            if let Some(l) = last {
                assert!(rank > l);
            }
            last = Some(rank);
        }
    }
}
