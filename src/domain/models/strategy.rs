//! Strategy recommendation (C5 data model).

use serde::{Deserialize, Serialize};

use super::pattern::Pattern;

/// Immutable output of the Strategy Selector for one task analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecommendation {
    pub pattern: Pattern,
    /// Deterministic, human-readable explanation composed of matched
    /// criteria (spec section 4.3).
    pub reasoning: String,
    /// Ordered, deduplicated provider names required to execute the
    /// recommendation.
    pub required_providers: Vec<String>,
    pub estimated_execution_time_s: u32,
    pub confidence: f64,
    /// Up to two patterns, scored below the winner, ordered by score,
    /// never containing the winning pattern.
    pub fallback_patterns: Vec<Pattern>,
}

impl StrategyRecommendation {
    pub fn new(pattern: Pattern, reasoning: impl Into<String>) -> Self {
        Self {
            pattern,
            reasoning: reasoning.into(),
            required_providers: Vec::new(),
            estimated_execution_time_s: 1,
            confidence: 0.0,
            fallback_patterns: Vec::new(),
        }
    }

    /// Selector totality property (spec section 8, #4): confidence is
    /// always in [0, 1] and fallbacks never include the winner.
    pub fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
            && self.fallback_patterns.len() <= 2
            && !self.fallback_patterns.contains(&self.pattern)
    }
}
