//! C2 — Provider Registry: an in-memory index from provider name to
//! [`ProviderProfile`], plus a reverse capability -> providers index.
//!
//! Per spec.md section 9 ("cyclic references"), the registry is a value
//! type owned by the Meta-Coordinator; Discovery and the Installer receive a
//! reference and mutate only through this narrow interface — no back
//! pointers from a profile to its owner.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use crate::domain::models::{CapabilityCategory, ProviderProfile, ProviderStatus};
use crate::services::taxonomy;

#[derive(Default)]
pub struct ProviderRegistry {
    inner: RwLock<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    providers: HashMap<String, ProviderProfile>,
    reverse_index: HashMap<CapabilityCategory, HashSet<String>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a provider's profile, keeping the reverse index
    /// consistent (spec section 8, property #3).
    pub async fn upsert(&self, profile: ProviderProfile) {
        let mut state = self.inner.write().await;
        Self::apply_upsert(&mut state, profile);
    }

    /// Insert `profile` unless an existing entry already has a strictly
    /// higher priority score. Used by discovery's well-known leg so that
    /// running concurrently with the connected-provider leg (spec section
    /// 4.2 step 1) never lets a lower-priority well-known entry race ahead
    /// of and clobber a fresher, higher-priority connected one — the check
    /// and the write happen atomically under one lock, rather than relying
    /// on call order.
    pub async fn upsert_if_higher_priority(&self, profile: ProviderProfile) {
        let mut state = self.inner.write().await;
        let already_better = state
            .providers
            .get(&profile.name)
            .is_some_and(|existing| existing.priority_score > profile.priority_score);
        if already_better {
            return;
        }
        Self::apply_upsert(&mut state, profile);
    }

    fn apply_upsert(state: &mut RegistryState, profile: ProviderProfile) {
        let name = profile.name.clone();

        if let Some(old) = state.providers.get(&name) {
            for cap in old.capabilities.clone() {
                state.reverse_index.entry(cap).or_default().remove(&name);
            }
        }

        for cap in profile.capabilities.iter().copied() {
            state.reverse_index.entry(cap).or_default().insert(name.clone());
        }

        state.providers.insert(name, profile);
    }

    pub async fn get(&self, name: &str) -> Option<ProviderProfile> {
        self.inner.read().await.providers.get(name).cloned()
    }

    pub async fn all(&self) -> Vec<ProviderProfile> {
        self.inner.read().await.providers.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.providers.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Providers known to offer `capability`, via the reverse index.
    pub async fn providers_for(&self, capability: CapabilityCategory) -> Vec<ProviderProfile> {
        let state = self.inner.read().await;
        state
            .reverse_index
            .get(&capability)
            .into_iter()
            .flatten()
            .filter_map(|name| state.providers.get(name).cloned())
            .collect()
    }

    /// Providers connected and able to serve every capability in `caps`.
    pub async fn connected_providers_for_all(
        &self,
        caps: &[CapabilityCategory],
    ) -> Vec<ProviderProfile> {
        let state = self.inner.read().await;
        state
            .providers
            .values()
            .filter(|p| p.is_connected() && caps.iter().all(|c| p.provides(*c)))
            .cloned()
            .collect()
    }

    /// Capabilities with no connected, available, or installed provider.
    pub async fn gap(&self, required: &[CapabilityCategory]) -> Vec<CapabilityCategory> {
        let state = self.inner.read().await;
        required
            .iter()
            .copied()
            .filter(|cap| {
                !state.providers.values().any(|p| {
                    p.provides(*cap)
                        && matches!(
                            p.status,
                            ProviderStatus::Connected
                                | ProviderStatus::Available
                                | ProviderStatus::Installed
                        )
                })
            })
            .collect()
    }

    pub async fn set_status(&self, name: &str, status: ProviderStatus) {
        let mut state = self.inner.write().await;
        if let Some(profile) = state.providers.get_mut(name) {
            profile.status = status;
        }
    }

    pub async fn record_performance(&self, name: &str, succeeded: bool, latency_ms: f64) {
        let mut state = self.inner.write().await;
        if let Some(profile) = state.providers.get_mut(name) {
            profile.performance.record(succeeded, latency_ms);
        }
    }

    /// Score every provider against free text and return the top `k` with a
    /// nonzero score (spec section 4.2 "Selection queries" — `best_for_task`):
    /// (a) keyword overlap between text tokens and the provider's
    /// description, (b) keyword overlap with tool names at half weight,
    /// (c) `priority_score`, (d) a small bonus if connected, (e) a small
    /// bonus inversely proportional to `last_discovery_latency_ms`.
    pub async fn best_for_task(&self, text: &str, k: usize) -> Vec<ProviderProfile> {
        let text_tokens: HashSet<String> = taxonomy::normalize(text)
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let state = self.inner.read().await;
        let mut scored: Vec<(f64, ProviderProfile)> = state
            .providers
            .values()
            .map(|p| (Self::task_match_score(p, &text_tokens), p.clone()))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        drop(state);

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(k).map(|(_, p)| p).collect()
    }

    fn task_match_score(profile: &ProviderProfile, text_tokens: &HashSet<String>) -> f64 {
        let description_tokens: HashSet<String> = profile
            .description
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let description_overlap = text_tokens.intersection(&description_tokens).count() as f64;

        let tool_tokens: HashSet<String> = profile
            .tools
            .iter()
            .flat_map(|tool| {
                tool.to_lowercase()
                    .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        let tool_overlap = text_tokens.intersection(&tool_tokens).count() as f64;

        let connected_bonus = if profile.is_connected() { 0.1 } else { 0.0 };
        let latency_bonus = profile
            .last_discovery_latency_ms
            .map(|ms| 0.05 / (1.0 + ms.max(0.0) / 1000.0))
            .unwrap_or(0.0);

        description_overlap + 0.5 * tool_overlap + profile.priority_score + connected_bonus + latency_bonus
    }
}
