//! HTTP-backed `RegistryClient` (C3/C6's optional remote-registry leg).
//!
//! Grounded on the teacher's subprocess launcher in spirit — a thin,
//! fallible adapter around one external collaborator, with errors mapped
//! onto the port's own error enum rather than leaking `reqwest` types.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::models::capability::CapabilityCategory;
use crate::domain::ports::registry_client::{RegistryClient, RegistryEntry, RegistryError};

/// Wire shape returned by the remote registry's JSON API.
#[derive(Debug, Deserialize)]
struct WireEntry {
    provider_name: String,
    description: String,
    capabilities: Vec<String>,
    install_command: String,
}

impl WireEntry {
    fn into_entry(self) -> RegistryEntry {
        RegistryEntry {
            provider_name: self.provider_name,
            description: self.description,
            capabilities: self
                .capabilities
                .iter()
                .filter_map(|c| CapabilityCategory::parse_str(c))
                .collect(),
            install_command: self.install_command,
        }
    }
}

/// Queries a remote provider registry reachable at `base_url` over JSON.
pub struct HttpRegistryClient {
    client: Client,
    base_url: String,
}

impl HttpRegistryClient {
    /// `base_url` should have no trailing slash, e.g. `https://registry.example.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_entries(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<RegistryEntry>, RegistryError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| RegistryError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::RequestFailed(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let entries: Vec<WireEntry> = response
            .json()
            .await
            .map_err(|e| RegistryError::RequestFailed(e.to_string()))?;
        Ok(entries.into_iter().map(WireEntry::into_entry).collect())
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn search_by_capability(
        &self,
        capability: CapabilityCategory,
    ) -> Result<Vec<RegistryEntry>, RegistryError> {
        self.get_entries("/providers", &[("capability", capability.as_str())]).await
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<RegistryEntry>, RegistryError> {
        self.get_entries("/providers", &[("q", query)]).await
    }

    async fn lookup(&self, provider_name: &str) -> Result<Option<RegistryEntry>, RegistryError> {
        let url = format!("{}/providers/{provider_name}", self.base_url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::RequestFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::RequestFailed(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let entry: WireEntry = response
            .json()
            .await
            .map_err(|e| RegistryError::RequestFailed(e.to_string()))?;
        Ok(Some(entry.into_entry()))
    }
}
