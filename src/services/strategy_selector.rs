//! C5 — Strategy Selector: scores every execution pattern against a
//! [`TaskAnalysis`] and the current registry, returning a
//! [`StrategyRecommendation`] with confidence and ranked fallbacks.
//! Grounded on `strategy_selector.py`'s `complexity_thresholds` and
//! `quality_strategy_preferences` tables (SPEC_FULL.md section B.3).

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::models::{
    CapabilityCategory, Complexity, Pattern, ProviderProfile, StrategyRecommendation, TaskAnalysis,
};
use crate::infrastructure::config::QualityFloor;
use crate::services::cache::LruCache;
use crate::services::taxonomy;

/// `(min, max)` complexity-level range within which a pattern scores its
/// range bonus. Levels are `Complexity::level()` (0-4). Ported from
/// `strategy_selector.py`'s `complexity_thresholds`, rescaled from the
/// original's 1-10 keyword-hit score onto this crate's five-level enum.
fn complexity_thresholds(pattern: Pattern) -> (u32, u32) {
    match pattern {
        Pattern::Direct => (0, 1),
        Pattern::Parallel => (1, 3),
        Pattern::Router => (1, 2),
        Pattern::Orchestrator => (2, 4),
        Pattern::Swarm => (3, 4),
        Pattern::EvaluatorOptimizer => (1, 3),
        Pattern::AdaptiveHybrid => (3, 4),
    }
}

fn quality_preferred_patterns(floor: QualityFloor) -> &'static [Pattern] {
    match floor {
        QualityFloor::Acceptable => &[Pattern::Direct, Pattern::Parallel],
        QualityFloor::Good => &[Pattern::Orchestrator, Pattern::EvaluatorOptimizer],
        QualityFloor::Excellent => &[Pattern::EvaluatorOptimizer, Pattern::AdaptiveHybrid],
    }
}

#[derive(Clone, Eq, PartialEq, Hash)]
struct CacheKey {
    normalized_text: String,
    provider_signature: String,
}

pub struct StrategySelector {
    cache: Mutex<LruCache<CacheKey, StrategyRecommendation>>,
}

impl StrategySelector {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(cache_capacity)),
        }
    }

    /// Score every pattern and pick a winner. Never fails (spec section 8,
    /// property #4): ties fall back to `direct` if every score is ≤ 0.
    pub async fn select(
        &self,
        analysis: &TaskAnalysis,
        providers: &[ProviderProfile],
        quality_floor: QualityFloor,
        pattern_success_rates: &HashMap<Pattern, f64>,
    ) -> StrategyRecommendation {
        let key = CacheKey {
            normalized_text: taxonomy::normalize(&analysis.description),
            provider_signature: provider_signature(providers),
        };

        {
            let mut cache = self.cache.lock().await;
            if let Some(hit) = cache.get(&key, 0.0) {
                return hit;
            }
        }

        let recommendation = Self::compute(analysis, providers, quality_floor, pattern_success_rates);

        let mut cache = self.cache.lock().await;
        cache.put(key, recommendation.clone());
        recommendation
    }

    pub async fn cache_stats(&self) -> crate::domain::models::CacheStats {
        self.cache.lock().await.stats()
    }

    /// Drops all cached recommendations. Used by the coordinator's periodic
    /// cleanup tick (spec section 4.6).
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    fn compute(
        analysis: &TaskAnalysis,
        providers: &[ProviderProfile],
        quality_floor: QualityFloor,
        pattern_success_rates: &HashMap<Pattern, f64>,
    ) -> StrategyRecommendation {
        let category_count = analysis.required_capabilities.len();
        let mut scored: Vec<(Pattern, f64, Vec<&'static str>)> = Pattern::SCORED
            .iter()
            .map(|&pattern| {
                let (score, reasons) =
                    score_pattern(pattern, analysis, category_count, quality_floor, pattern_success_rates);
                (pattern, score, reasons)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap()
                .then_with(|| {
                    let a_rate = pattern_success_rates.get(&a.0).copied().unwrap_or(0.0);
                    let b_rate = pattern_success_rates.get(&b.0).copied().unwrap_or(0.0);
                    b_rate.partial_cmp(&a_rate).unwrap()
                })
                .then_with(|| a.0.canonical_rank().cmp(&b.0.canonical_rank()))
        });

        let (winner, winner_score, winner_reasons) = if scored[0].1 > 0.0 {
            scored[0].clone()
        } else {
            (
                Pattern::Direct,
                0.0,
                vec!["no pattern scored above zero; defaulting to direct"],
            )
        };

        let fallback_patterns: Vec<Pattern> = scored
            .iter()
            .filter(|(p, score, _)| *p != winner && *score >= 0.3)
            .take(2)
            .map(|(p, _, _)| *p)
            .collect();

        let required_providers = required_provider_names(analysis, providers);
        let confidence = winner_score.clamp(0.0, 1.0);
        let estimated_execution_time_s = winner.base_time_seconds()
            * analysis.complexity.level().max(1)
            * (analysis.estimated_steps / 3).max(1);

        StrategyRecommendation {
            pattern: winner,
            reasoning: winner_reasons.join("; "),
            required_providers,
            estimated_execution_time_s,
            confidence,
            fallback_patterns,
        }
    }
}

fn provider_signature(providers: &[ProviderProfile]) -> String {
    let mut names: Vec<String> = providers
        .iter()
        .map(|p| {
            let mut caps: Vec<&str> = p.capabilities.iter().map(|c| c.as_str()).collect();
            caps.sort_unstable();
            format!("{}:{}", p.name, caps.join(","))
        })
        .collect();
    names.sort();
    names.join("|")
}

fn required_provider_names(analysis: &TaskAnalysis, providers: &[ProviderProfile]) -> Vec<String> {
    let mut result = Vec::new();
    for cap in &analysis.required_capabilities {
        if let Some(p) = providers
            .iter()
            .find(|p| p.provides(*cap) && !result.contains(&p.name))
        {
            result.push(p.name.clone());
        }
    }
    result
}

fn score_pattern(
    pattern: Pattern,
    analysis: &TaskAnalysis,
    category_count: usize,
    quality_floor: QualityFloor,
    pattern_success_rates: &HashMap<Pattern, f64>,
) -> (f64, Vec<&'static str>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();
    let level = analysis.complexity.level();

    let (min_level, max_level) = complexity_thresholds(pattern);
    if level >= min_level && level <= max_level {
        score += 0.3;
        reasons.push("complexity within preferred range");
    } else if level < min_level {
        score -= 0.1;
    } else {
        score -= 0.3;
    }

    if quality_preferred_patterns(quality_floor).contains(&pattern) {
        score += 0.2;
        reasons.push("matches quality floor preference");
    }

    match pattern {
        Pattern::Direct => {
            if category_count <= 1 {
                score += 0.3;
                reasons.push("single capability");
            } else {
                score += 0.1;
            }
            if !analysis.parallelizable {
                score += 0.2;
            }
            if analysis.estimated_steps <= 3 {
                score += 0.2;
                reasons.push("few steps");
            }
        }
        Pattern::Parallel => {
            if analysis.parallelizable {
                score += 0.3;
                reasons.push("parallelizable");
            }
            if category_count >= 2 {
                score += 0.2;
                reasons.push("multiple capabilities");
            }
        }
        Pattern::Router => {
            if category_count >= 2 {
                score += 0.2;
                reasons.push("multiple capability categories present");
            } else {
                score += 0.1;
            }
        }
        Pattern::Orchestrator => {
            if analysis.estimated_steps >= 5 {
                score += 0.3;
                reasons.push("complex task with many steps");
            } else {
                score += 0.1;
            }
            if level >= Complexity::Complex.level() {
                score += 0.2;
            }
        }
        Pattern::Swarm => {
            if category_count > 2 {
                score += 0.3;
                reasons.push("more than two capability categories");
            } else {
                score += 0.1;
            }
            if level >= Complexity::Advanced.level() {
                score += 0.2;
            }
        }
        Pattern::EvaluatorOptimizer => {
            if analysis.requires_iteration {
                score += 0.4;
                reasons.push("iteration required");
            }
        }
        Pattern::AdaptiveHybrid => {}
    }

    score += 0.1 * pattern_success_rates.get(&pattern).copied().unwrap_or(0.0);

    (score, reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskType;
    use std::collections::BTreeSet;

    fn analysis(
        complexity: Complexity,
        steps: u32,
        parallelizable: bool,
        requires_iteration: bool,
        caps: &[CapabilityCategory],
    ) -> TaskAnalysis {
        TaskAnalysis {
            description: "test".to_string(),
            task_type: TaskType::Reasoning,
            complexity,
            required_capabilities: caps.iter().copied().collect::<BTreeSet<_>>(),
            estimated_steps: steps,
            parallelizable,
            requires_iteration,
            requires_human_input: false,
            confidence: 0.9,
            cache_hit: false,
            analysis_time_ms: 0.0,
        }
    }

    #[tokio::test]
    async fn simple_single_capability_task_selects_direct() {
        let selector = StrategySelector::new(16);
        let a = analysis(Complexity::Simple, 1, false, false, &[CapabilityCategory::File]);
        let rec = selector
            .select(&a, &[], QualityFloor::Good, &HashMap::new())
            .await;
        assert_eq!(rec.pattern, Pattern::Direct);
        assert!(rec.is_well_formed());
    }

    #[tokio::test]
    async fn iterative_task_selects_evaluator_optimizer() {
        let selector = StrategySelector::new(16);
        let a = analysis(
            Complexity::Moderate,
            4,
            false,
            true,
            &[CapabilityCategory::Development],
        );
        let rec = selector
            .select(&a, &[], QualityFloor::Good, &HashMap::new())
            .await;
        assert_eq!(rec.pattern, Pattern::EvaluatorOptimizer);
        assert!(rec.fallback_patterns.contains(&Pattern::Direct) || !rec.fallback_patterns.is_empty());
    }

    #[tokio::test]
    async fn parallelizable_multi_capability_task_selects_parallel() {
        let selector = StrategySelector::new(16);
        let a = analysis(
            Complexity::Moderate,
            4,
            true,
            false,
            &[CapabilityCategory::Search, CapabilityCategory::Database],
        );
        let rec = selector
            .select(&a, &[], QualityFloor::Good, &HashMap::new())
            .await;
        assert_eq!(rec.pattern, Pattern::Parallel);
    }

    #[tokio::test]
    async fn recommendation_is_always_well_formed() {
        let selector = StrategySelector::new(16);
        let a = analysis(Complexity::Expert, 20, false, false, &[]);
        let rec = selector
            .select(&a, &[], QualityFloor::Good, &HashMap::new())
            .await;
        assert!(rec.is_well_formed());
    }

    #[tokio::test]
    async fn equivalent_phrasing_shares_a_cache_entry() {
        let selector = StrategySelector::new(16);
        let mut a = analysis(Complexity::Simple, 1, false, false, &[CapabilityCategory::File]);
        a.description = "Please read the file.".to_string();
        let first = selector
            .select(&a, &[], QualityFloor::Good, &HashMap::new())
            .await;

        let mut b = a.clone();
        b.description = "read file".to_string();
        let second = selector
            .select(&b, &[], QualityFloor::Good, &HashMap::new())
            .await;

        assert_eq!(first, second);
        let stats = selector.cache_stats().await;
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn repeated_selection_is_cached_and_equal() {
        let selector = StrategySelector::new(16);
        let a = analysis(Complexity::Simple, 1, false, false, &[CapabilityCategory::File]);
        let first = selector
            .select(&a, &[], QualityFloor::Good, &HashMap::new())
            .await;
        let second = selector
            .select(&a, &[], QualityFloor::Good, &HashMap::new())
            .await;
        assert_eq!(first, second);
    }
}
