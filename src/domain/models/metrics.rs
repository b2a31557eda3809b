//! Shared metrics value types (C8 + shared caches).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::pattern::Pattern;

/// Rolling counters for one execution pattern.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PatternStats {
    pub total: u64,
    pub successes: u64,
    /// EMA of execution time in seconds (alpha = 0.1, spec section 4.6).
    pub avg_execution_time_s: f64,
    pub success_rate: f64,
}

impl PatternStats {
    pub fn record(&mut self, succeeded: bool, duration_s: f64) {
        self.total += 1;
        if succeeded {
            self.successes += 1;
        }
        const ALPHA: f64 = 0.1;
        self.avg_execution_time_s = if self.total == 1 {
            duration_s
        } else {
            ALPHA * duration_s + (1.0 - ALPHA) * self.avg_execution_time_s
        };
        self.success_rate = self.successes as f64 / self.total as f64;
    }
}

/// Stats for one LRU cache (analysis or strategy).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub avg_hit_latency_ms: f64,
    pub avg_miss_latency_ms: f64,
}

impl CacheStats {
    pub fn record_hit(&mut self, latency_ms: f64) {
        self.hits += 1;
        self.avg_hit_latency_ms = running_average(self.avg_hit_latency_ms, self.hits, latency_ms);
    }

    pub fn record_miss(&mut self, latency_ms: f64) {
        self.misses += 1;
        self.avg_miss_latency_ms =
            running_average(self.avg_miss_latency_ms, self.misses, latency_ms);
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

fn running_average(current_avg: f64, new_count: u64, new_value: f64) -> f64 {
    if new_count <= 1 {
        new_value
    } else {
        current_avg + (new_value - current_avg) / new_count as f64
    }
}

/// A point-in-time snapshot of coordinator-wide metrics, returned by
/// `metrics()` (spec section 6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub per_pattern: HashMap<Pattern, PatternStats>,
    pub per_provider_usage: HashMap<String, u64>,
    pub per_capability_usage: HashMap<String, u64>,
    pub analysis_cache: CacheStats,
    pub strategy_cache: CacheStats,
}
