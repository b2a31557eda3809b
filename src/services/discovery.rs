//! C3 — Discovery Engine: populates the registry in parallel from connected
//! providers (session interface), a static well-known list, and optional
//! remote registries, bounded by `discovery_concurrency` (spec section 8,
//! property #7).

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::warn;

use crate::domain::error::DiscoveryError;
use crate::domain::models::{CapabilityCategory, ProviderProfile, ProviderStatus};
use crate::domain::ports::session::{SessionClient, SessionError, SessionTool};
use crate::services::provider_registry::ProviderRegistry;
use crate::services::taxonomy;

/// A provider known ahead of time but not (yet) connected, e.g. loaded from
/// a config file bundled with the CLI.
#[derive(Debug, Clone)]
pub struct WellKnownProvider {
    pub name: String,
    pub description: String,
    pub capabilities: Vec<CapabilityCategory>,
    pub install_command: Option<String>,
}

pub struct DiscoveryEngine {
    session: Arc<dyn SessionClient>,
    well_known: Vec<WellKnownProvider>,
    concurrency: Arc<Semaphore>,
    /// Per-provider capability-analysis cache keyed by `(provider_name,
    /// hash(sorted(tool_names ⊕ resource_names)))` (spec section 4.2):
    /// avoids rescoring a provider's capabilities when its tools/resources
    /// haven't changed since the last round.
    capability_cache: Mutex<HashMap<String, (u64, BTreeSet<CapabilityCategory>)>>,
}

impl DiscoveryEngine {
    pub fn new(
        session: Arc<dyn SessionClient>,
        well_known: Vec<WellKnownProvider>,
        concurrency: usize,
    ) -> Self {
        Self {
            session,
            well_known,
            concurrency: Arc::new(Semaphore::new(concurrency.max(1))),
            capability_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Run one discovery round, writing results into `registry`. Per-provider
    /// failures are logged and skipped; the round always completes (spec
    /// section 7: `DiscoveryError` is local-recovery only). The connected and
    /// well-known sub-discoveries run concurrently (spec section 4.2 step 1);
    /// the well-known leg never clobbers a fresher connected entry because it
    /// upserts through the registry's own priority-aware path rather than a
    /// stale `get`-then-`upsert` check.
    pub async fn run_round(&self, registry: &ProviderRegistry) -> Result<(), DiscoveryError> {
        tokio::join!(
            self.discover_connected(registry),
            self.discover_well_known(registry),
        );
        Ok(())
    }

    async fn discover_connected(&self, registry: &ProviderRegistry) {
        let connected = match self.session.list_connected().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "failed to list connected providers");
                return;
            }
        };

        let tasks = connected.into_iter().map(|name| {
            let sem = Arc::clone(&self.concurrency);
            async move {
                let _permit = sem.acquire_owned().await.expect("semaphore closed");
                self.probe_connected(&name).await
            }
        });

        for result in join_all(tasks).await {
            match result {
                Ok(profile) => registry.upsert(profile).await,
                Err((name, e)) => warn!(provider = %name, error = %e, "discovery probe failed"),
            }
        }
    }

    async fn probe_connected(&self, name: &str) -> Result<ProviderProfile, (String, SessionError)> {
        let start = std::time::Instant::now();
        let tools = self
            .session
            .list_tools(name)
            .await
            .map_err(|e| (name.to_string(), e))?;
        let resources = self
            .session
            .list_resources(name)
            .await
            .map_err(|e| (name.to_string(), e))?;

        let hash = content_hash(&tools, &resources);
        let capabilities = {
            let mut cache = self.capability_cache.lock().await;
            match cache.get(name) {
                Some((cached_hash, cached_caps)) if *cached_hash == hash => cached_caps.clone(),
                _ => {
                    let caps = infer_from_tools(&tools);
                    cache.insert(name.to_string(), (hash, caps.clone()));
                    caps
                }
            }
        };

        Ok(ProviderProfile::new(name)
            .with_capabilities(capabilities)
            .with_tools(tools.into_iter().map(|t| t.name))
            .with_resources(resources.into_iter().map(|r| r.name))
            .with_status(ProviderStatus::Connected)
            .with_priority(1.0)
            .with_discovery_latency(start.elapsed().as_secs_f64() * 1000.0))
    }

    async fn discover_well_known(&self, registry: &ProviderRegistry) {
        for wk in &self.well_known {
            let mut profile = ProviderProfile::new(&wk.name)
                .with_description(wk.description.clone())
                .with_capabilities(wk.capabilities.iter().copied())
                .with_status(ProviderStatus::Available)
                .with_priority(0.4);
            if let Some(cmd) = &wk.install_command {
                profile = profile.with_install_command(cmd.clone());
            }
            // A higher-priority (e.g. connected) entry discovered
            // concurrently is never overwritten by this lower-priority
            // well-known one, regardless of which leg finishes first.
            registry.upsert_if_higher_priority(profile).await;
        }
    }

    /// Probe each name for live connectivity: `connect` then `list_tools`,
    /// both run in parallel and bounded by the same concurrency semaphore as
    /// discovery (spec section 4.2 "Connectivity validation").
    pub async fn validate_connectivity(&self, names: &[String]) -> HashMap<String, bool> {
        let tasks = names.iter().cloned().map(|name| {
            let session = Arc::clone(&self.session);
            let sem = Arc::clone(&self.concurrency);
            async move {
                let _permit = sem.acquire_owned().await.expect("semaphore closed");
                let (connect_ok, tools_ok) =
                    tokio::join!(session.connect(&name), session.list_tools(&name));
                (name, connect_ok.is_ok() && tools_ok.is_ok())
            }
        });

        join_all(tasks).await.into_iter().collect()
    }
}

/// Combine and hash the sorted tool and resource names so an unchanged
/// provider reuses its cached capability analysis.
fn content_hash(tools: &[SessionTool], resources: &[crate::domain::ports::session::SessionResource]) -> u64 {
    let mut names: Vec<&str> = tools
        .iter()
        .map(|t| t.name.as_str())
        .chain(resources.iter().map(|r| r.name.as_str()))
        .collect();
    names.sort_unstable();

    let mut hasher = DefaultHasher::new();
    names.hash(&mut hasher);
    hasher.finish()
}

fn infer_from_tools(tools: &[SessionTool]) -> BTreeSet<CapabilityCategory> {
    let normalized_tool_text = taxonomy::normalize(
        &tools
            .iter()
            .map(|t| format!("{} {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join(" "),
    );
    taxonomy::infer_capabilities(&normalized_tool_text)
}
