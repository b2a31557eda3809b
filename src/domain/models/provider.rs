//! Provider profile (C2 data model).
//!
//! A [`ProviderProfile`] is the registry's unit of record for a capability
//! provider: its advertised tools/resources, the capability categories it
//! maps to, connection status, and rolling performance stats.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capability::CapabilityCategory;

/// Lifecycle status of a provider in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Seen (e.g. in a static registry) but not yet probed.
    Pending,
    /// A discovery round is currently probing this provider.
    Discovering,
    /// Listed as available (e.g. registry-known) but not connected.
    Available,
    /// Installed by the Dynamic Installer, not yet verified connected.
    Installed,
    /// Connected and responding to session calls.
    Connected,
    /// Last discovery/verification attempt failed.
    Error,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Discovering => "discovering",
            Self::Available => "available",
            Self::Installed => "installed",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

/// Rolling performance stats for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderPerformance {
    /// Exponential moving average of call success (1.0 = always succeeds).
    pub success_rate: f64,
    /// Exponential moving average of call latency, in milliseconds.
    pub ema_latency_ms: f64,
    /// Total calls observed.
    pub call_count: u64,
}

impl Default for ProviderPerformance {
    fn default() -> Self {
        Self {
            success_rate: 1.0,
            ema_latency_ms: 0.0,
            call_count: 0,
        }
    }
}

/// EMA smoothing factor used by performance updates and pattern/provider
/// success-rate tracking throughout the coordinator (spec section 4.6).
pub const PERFORMANCE_EMA_ALPHA: f64 = 0.1;

impl ProviderPerformance {
    /// Fold in the outcome of a single call.
    pub fn record(&mut self, succeeded: bool, latency_ms: f64) {
        let outcome = if succeeded { 1.0 } else { 0.0 };
        self.success_rate = if self.call_count == 0 {
            outcome
        } else {
            PERFORMANCE_EMA_ALPHA * outcome + (1.0 - PERFORMANCE_EMA_ALPHA) * self.success_rate
        };
        self.ema_latency_ms = if self.call_count == 0 {
            latency_ms
        } else {
            PERFORMANCE_EMA_ALPHA * latency_ms
                + (1.0 - PERFORMANCE_EMA_ALPHA) * self.ema_latency_ms
        };
        self.call_count += 1;
    }
}

/// A capability provider known to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Unique identifier; primary key in the registry.
    pub name: String,
    pub description: String,
    pub capabilities: HashSet<CapabilityCategory>,
    /// Ordered list of tool names advertised by the provider.
    pub tools: Vec<String>,
    /// Ordered list of resource names advertised by the provider.
    pub resources: Vec<String>,
    pub status: ProviderStatus,
    /// Opaque to the core; interpreted only by the installer's launcher.
    pub install_command: Option<String>,
    /// connected > registry-listed > unknown.
    pub priority_score: f64,
    pub performance: ProviderPerformance,
    pub last_discovery_latency_ms: Option<f64>,
}

impl ProviderProfile {
    /// Create a new, never-seen profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            capabilities: HashSet::new(),
            tools: Vec::new(),
            resources: Vec::new(),
            status: ProviderStatus::Pending,
            install_command: None,
            priority_score: 0.0,
            performance: ProviderPerformance::default(),
            last_discovery_latency_ms: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = CapabilityCategory>) -> Self {
        self.capabilities.extend(caps);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = String>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn with_resources(mut self, resources: impl IntoIterator<Item = String>) -> Self {
        self.resources.extend(resources);
        self
    }

    pub fn with_status(mut self, status: ProviderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority_score = priority.clamp(0.0, 1.0);
        self
    }

    pub fn with_install_command(mut self, cmd: impl Into<String>) -> Self {
        self.install_command = Some(cmd.into());
        self
    }

    pub fn with_discovery_latency(mut self, latency_ms: f64) -> Self {
        self.last_discovery_latency_ms = Some(latency_ms);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.status == ProviderStatus::Connected
    }

    pub fn provides(&self, capability: CapabilityCategory) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Opaque snapshot timestamp attached to discovery/registry events for
/// logging; kept separate from the profile itself so profile equality in
/// tests does not depend on wall-clock time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiscoveredAt(pub DateTime<Utc>);

impl DiscoveredAt {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let profile = ProviderProfile::new("github-mcp")
            .with_description("GitHub operations")
            .with_capabilities([CapabilityCategory::Development, CapabilityCategory::Web])
            .with_tools(["list_repos".to_string(), "create_issue".to_string()])
            .with_status(ProviderStatus::Connected)
            .with_priority(1.0);

        assert_eq!(profile.name, "github-mcp");
        assert!(profile.is_connected());
        assert!(profile.provides(CapabilityCategory::Development));
        assert!(!profile.provides(CapabilityCategory::Database));
        assert_eq!(profile.tools.len(), 2);
    }

    #[test]
    fn priority_is_clamped() {
        let profile = ProviderProfile::new("x").with_priority(5.0);
        assert_eq!(profile.priority_score, 1.0);
    }

    #[test]
    fn performance_ema_converges_toward_recent_outcomes() {
        let mut perf = ProviderPerformance::default();
        for _ in 0..50 {
            perf.record(false, 100.0);
        }
        assert!(perf.success_rate < 0.05);
        assert!(perf.call_count == 50);
    }

    #[test]
    fn performance_first_call_sets_baseline() {
        let mut perf = ProviderPerformance::default();
        perf.record(true, 42.0);
        assert_eq!(perf.success_rate, 1.0);
        assert_eq!(perf.ema_latency_ms, 42.0);
    }
}
