//! Stateful services: each owns the mutable half of one or more components
//! from spec.md section 3 (C1-C8). Domain types stay immutable; everything
//! that accumulates state (caches, registries, pools, counters) lives here.

pub mod agent_factory;
pub mod cache;
pub mod discovery;
pub mod installer;
pub mod meta_coordinator;
pub mod metrics;
pub mod provider_registry;
pub mod resource_pool;
pub mod strategy_selector;
pub mod task_analyzer;
pub mod taxonomy;

pub use agent_factory::AgentFactory;
pub use discovery::{DiscoveryEngine, WellKnownProvider};
pub use installer::{CandidateCatalog, DynamicInstaller};
pub use meta_coordinator::{CapabilitiesSummary, ExecutionPreferences, MetaCoordinator};
pub use metrics::MetricsRegistry;
pub use provider_registry::ProviderRegistry;
pub use resource_pool::ResourcePool;
pub use strategy_selector::StrategySelector;
pub use task_analyzer::TaskAnalyzer;
