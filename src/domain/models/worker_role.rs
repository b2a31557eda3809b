//! Worker role (C7 data model).
//!
//! Grounded on the teacher's `AgentTemplate`/`AgentInstance` split
//! (`domain/models/agent.rs`): a template defines behavior, an instance is a
//! leased, bound-to-provider working copy.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::capability::CapabilityCategory;

/// A named, instructed identity bound to a subset of providers, leased from
/// the resource pool for the duration of one dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRole {
    pub id: Uuid,
    pub name: String,
    pub instructions: String,
    /// Subset of provider names (from the registry) this role may call.
    pub provider_names: Vec<String>,
    /// Capability categories this role was assembled to cover.
    pub capabilities: Vec<CapabilityCategory>,
    /// Names of roles this role may hand off to (swarm pattern only).
    pub handoff_targets: Vec<String>,
    pub active: bool,
}

impl WorkerRole {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            instructions: instructions.into(),
            provider_names: Vec::new(),
            capabilities: Vec::new(),
            handoff_targets: Vec::new(),
            active: false,
        }
    }

    pub fn with_providers(mut self, providers: impl IntoIterator<Item = String>) -> Self {
        self.provider_names = providers.into_iter().collect();
        self
    }

    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = CapabilityCategory>) -> Self {
        self.capabilities = caps.into_iter().collect();
        self
    }

    pub fn with_handoff_target(mut self, target: impl Into<String>) -> Self {
        self.handoff_targets.push(target.into());
        self
    }

    /// Identity used by the pool's `checkout` reuse check: name +
    /// instructions + provider list, order-sensitive (spec section 4.5).
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        self.instructions.hash(&mut hasher);
        self.provider_names.hash(&mut hasher);
        hasher.finish()
    }

    pub fn can_handoff_to(&self, target: &str) -> bool {
        self.handoff_targets.iter().any(|t| t == target)
    }
}

/// A static role template in the Agent Factory's catalog.
#[derive(Debug, Clone)]
pub struct RoleTemplate {
    pub name: &'static str,
    pub instruction: &'static str,
    pub preferred_capabilities: Vec<CapabilityCategory>,
    pub preferred_providers: Vec<&'static str>,
    /// Short phrases describing how this role should carry itself, appended
    /// to its composed instruction in declared order (spec section 4.5(d)).
    pub personality_traits: Vec<&'static str>,
}

impl RoleTemplate {
    pub fn new(name: &'static str, instruction: &'static str) -> Self {
        Self {
            name,
            instruction,
            preferred_capabilities: Vec::new(),
            preferred_providers: Vec::new(),
            personality_traits: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = CapabilityCategory>) -> Self {
        self.preferred_capabilities = caps.into_iter().collect();
        self
    }

    pub fn with_providers(mut self, providers: impl IntoIterator<Item = &'static str>) -> Self {
        self.preferred_providers = providers.into_iter().collect();
        self
    }

    pub fn with_personality_traits(mut self, traits: impl IntoIterator<Item = &'static str>) -> Self {
        self.personality_traits = traits.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_hash_is_stable_for_equal_fields() {
        let a = WorkerRole::new("researcher", "go find things")
            .with_providers(["web-search".to_string()]);
        let b = WorkerRole::new("researcher", "go find things")
            .with_providers(["web-search".to_string()]);
        assert_eq!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn identity_hash_differs_on_provider_list() {
        let a = WorkerRole::new("researcher", "go find things")
            .with_providers(["web-search".to_string()]);
        let b = WorkerRole::new("researcher", "go find things")
            .with_providers(["database".to_string()]);
        assert_ne!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn handoff_target_check() {
        let role = WorkerRole::new("coordinator", "lead").with_handoff_target("researcher");
        assert!(role.can_handoff_to("researcher"));
        assert!(!role.can_handoff_to("writer"));
    }
}
