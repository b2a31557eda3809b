//! Optional remote-registry query boundary used by C3's registry leg and by
//! C6 when it needs to resolve a capability to a concrete install command.
//! Spec.md section 3 treats "the networked source of provider listings" as
//! a collaborator, not a core concern.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::capability::CapabilityCategory;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    RequestFailed(String),
    #[error("registry request timed out")]
    Timeout,
}

/// A single candidate entry as advertised by a remote registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub provider_name: String,
    pub description: String,
    pub capabilities: Vec<CapabilityCategory>,
    pub install_command: String,
}

/// Queries an external provider registry for candidates matching a
/// capability, by free-text, or by exact name.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn search_by_capability(
        &self,
        capability: CapabilityCategory,
    ) -> Result<Vec<RegistryEntry>, RegistryError>;

    async fn search_by_text(&self, query: &str) -> Result<Vec<RegistryEntry>, RegistryError>;

    async fn lookup(&self, provider_name: &str) -> Result<Option<RegistryEntry>, RegistryError>;
}
