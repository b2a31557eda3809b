//! Shared metrics service: the mutable counterpart to the
//! [`MetricsSnapshot`] value type, updated from the request lifecycle.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::models::{CacheStats, MetricsSnapshot, Pattern};

#[derive(Default)]
struct Counters {
    total_requests: u64,
    successful_requests: u64,
    per_pattern: HashMap<Pattern, crate::domain::models::PatternStats>,
    per_provider_usage: HashMap<String, u64>,
    per_capability_usage: HashMap<String, u64>,
}

pub struct MetricsRegistry {
    counters: Mutex<Counters>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
        }
    }

    pub async fn record_request(&self, succeeded: bool, pattern: Pattern, duration_s: f64) {
        let mut counters = self.counters.lock().await;
        counters.total_requests += 1;
        if succeeded {
            counters.successful_requests += 1;
        }
        counters
            .per_pattern
            .entry(pattern)
            .or_default()
            .record(succeeded, duration_s);
    }

    /// Counts a request that failed before a pattern was ever chosen (e.g.
    /// no capable providers). Still moves `total_requests` so the monotonic
    /// counter invariant (spec section 8, property #8) holds for every
    /// request, not only ones that reach dispatch.
    pub async fn record_request_without_pattern(&self, succeeded: bool) {
        let mut counters = self.counters.lock().await;
        counters.total_requests += 1;
        if succeeded {
            counters.successful_requests += 1;
        }
    }

    pub async fn record_provider_usage(&self, provider: &str) {
        let mut counters = self.counters.lock().await;
        *counters.per_provider_usage.entry(provider.to_string()).or_insert(0) += 1;
    }

    pub async fn record_capability_usage(&self, capability: &str) {
        let mut counters = self.counters.lock().await;
        *counters
            .per_capability_usage
            .entry(capability.to_string())
            .or_insert(0) += 1;
    }

    /// Success rates per pattern, as fed into the strategy selector's
    /// `pattern_success_rates` argument.
    pub async fn pattern_success_rates(&self) -> HashMap<Pattern, f64> {
        self.counters
            .lock()
            .await
            .per_pattern
            .iter()
            .map(|(p, stats)| (*p, stats.success_rate))
            .collect()
    }

    pub async fn snapshot(&self, analysis_cache: CacheStats, strategy_cache: CacheStats) -> MetricsSnapshot {
        let counters = self.counters.lock().await;
        MetricsSnapshot {
            total_requests: counters.total_requests,
            successful_requests: counters.successful_requests,
            per_pattern: counters.per_pattern.clone(),
            per_provider_usage: counters.per_provider_usage.clone(),
            per_capability_usage: counters.per_capability_usage.clone(),
            analysis_cache,
            strategy_cache,
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_request_updates_totals_and_pattern_stats() {
        let registry = MetricsRegistry::new();
        registry.record_request(true, Pattern::Direct, 1.0).await;
        registry.record_request(false, Pattern::Direct, 2.0).await;

        let snapshot = registry.snapshot(CacheStats::default(), CacheStats::default()).await;
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.per_pattern[&Pattern::Direct].total, 2);
    }

    #[tokio::test]
    async fn usage_counters_accumulate_per_key() {
        let registry = MetricsRegistry::new();
        registry.record_provider_usage("fs-tools").await;
        registry.record_provider_usage("fs-tools").await;
        registry.record_capability_usage("file").await;

        let snapshot = registry.snapshot(CacheStats::default(), CacheStats::default()).await;
        assert_eq!(snapshot.per_provider_usage["fs-tools"], 2);
        assert_eq!(snapshot.per_capability_usage["file"], 1);
    }

    #[tokio::test]
    async fn pattern_success_rates_reflects_recorded_history() {
        let registry = MetricsRegistry::new();
        registry.record_request(true, Pattern::Parallel, 1.0).await;
        registry.record_request(true, Pattern::Parallel, 1.0).await;
        registry.record_request(false, Pattern::Parallel, 1.0).await;

        let rates = registry.pattern_success_rates().await;
        assert!((rates[&Pattern::Parallel] - (2.0 / 3.0)).abs() < 1e-9);
    }
}
