//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Configuration validation
//! - Type-safe config structs

mod loader;

use serde::{Deserialize, Serialize};

pub use loader::{ConfigError, ConfigLoader};

/// Caller-provided ordinal quality threshold for evaluator-optimizer
/// iteration (spec.md section 9 "Open questions": the source's opaque
/// "GOOD"/"EXCELLENT" vocabulary is treated as an ordinal scale, not a
/// fixed set of magic strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFloor {
    Acceptable,
    Good,
    Excellent,
}

impl Default for QualityFloor {
    fn default() -> Self {
        Self::Good
    }
}

/// The configuration options table from spec.md section 6. Loaded by
/// [`ConfigLoader`] with defaults below, overridable by YAML file then by
/// `ORCHESTRATOR_`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Size of the global request semaphore (C8).
    pub request_concurrency: usize,
    /// Size of the discovery round semaphore (C3).
    pub discovery_concurrency: usize,
    /// Size of the install semaphore (C6).
    pub install_concurrency: usize,
    /// Resource pool capacity (C7). Defaults to `2 * request_concurrency`.
    pub pool_size: usize,
    /// Per-request deadline in seconds, enforced by C8.
    pub request_deadline_s: u64,
    /// Soft memory threshold that triggers an eager cleanup tick.
    pub memory_cleanup_threshold_mib: u64,
    /// Interval between scheduled cleanup ticks.
    pub cleanup_interval_s: u64,
    /// LRU capacity for the task-analysis cache (C4).
    pub analysis_cache_size: usize,
    /// LRU capacity for the strategy-recommendation cache (C5).
    pub strategy_cache_size: usize,
    /// Whether C6 may be invoked at all when a capability gap is found.
    pub enable_installer: bool,
    /// Minimum acceptable evaluator-optimizer quality.
    pub quality_floor: QualityFloor,
    /// Base URL of an optional remote provider registry (C3/C6's networked
    /// collaborator). When unset, discovery and installation rely solely on
    /// the connected-session leg, the well-known list, and the static
    /// install catalog.
    pub remote_registry_url: Option<String>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            log_dir: None,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let request_concurrency = 5;
        Self {
            request_concurrency,
            discovery_concurrency: 10,
            install_concurrency: 3,
            pool_size: 2 * request_concurrency,
            request_deadline_s: 300,
            memory_cleanup_threshold_mib: 1024,
            cleanup_interval_s: 60,
            analysis_cache_size: 128,
            strategy_cache_size: 64,
            enable_installer: true,
            quality_floor: QualityFloor::default(),
            remote_registry_url: None,
            logging: LoggingConfig::default(),
        }
    }
}
