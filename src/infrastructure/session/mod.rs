//! Minimal `SessionClient` adapter over a statically configured provider
//! list. The real session/transport protocol is out of scope (spec.md
//! section 1); this adapter exists so the CLI has something concrete to
//! wire by default, and so discovery's "connected providers" leg has a
//! real (if simple) implementation to drive.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::session::{SessionClient, SessionError, SessionResource, SessionTool};

#[derive(Debug, Clone)]
pub struct StaticProviderEntry {
    pub tools: Vec<SessionTool>,
    pub resources: Vec<SessionResource>,
}

/// A `SessionClient` backed by an in-memory map of provider name to its
/// advertised tools/resources, with connection state tracked separately so
/// `connect` has observable effect.
pub struct StaticSessionClient {
    entries: HashMap<String, StaticProviderEntry>,
    connected: RwLock<Vec<String>>,
}

impl StaticSessionClient {
    pub fn new(entries: HashMap<String, StaticProviderEntry>) -> Self {
        Self {
            entries,
            connected: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SessionClient for StaticSessionClient {
    async fn list_connected(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.connected.read().expect("lock poisoned").clone())
    }

    async fn list_tools(&self, provider: &str) -> Result<Vec<SessionTool>, SessionError> {
        self.entries
            .get(provider)
            .map(|e| e.tools.clone())
            .ok_or_else(|| SessionError::NotFound(provider.to_string()))
    }

    async fn list_resources(&self, provider: &str) -> Result<Vec<SessionResource>, SessionError> {
        self.entries
            .get(provider)
            .map(|e| e.resources.clone())
            .ok_or_else(|| SessionError::NotFound(provider.to_string()))
    }

    async fn connect(&self, provider: &str) -> Result<(), SessionError> {
        if !self.entries.contains_key(provider) {
            return Err(SessionError::NotFound(provider.to_string()));
        }
        let mut connected = self.connected.write().expect("lock poisoned");
        if !connected.iter().any(|p| p == provider) {
            connected.push(provider.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HashMap<String, StaticProviderEntry> {
        let mut map = HashMap::new();
        map.insert(
            "fs-tools".to_string(),
            StaticProviderEntry {
                tools: vec![SessionTool {
                    name: "read_file".to_string(),
                    description: "reads a file".to_string(),
                }],
                resources: vec![],
            },
        );
        map
    }

    #[tokio::test]
    async fn connect_then_list_connected_reflects_it() {
        let client = StaticSessionClient::new(sample());
        assert!(client.list_connected().await.unwrap().is_empty());
        client.connect("fs-tools").await.unwrap();
        assert_eq!(client.list_connected().await.unwrap(), vec!["fs-tools"]);
    }

    #[tokio::test]
    async fn unknown_provider_is_not_found() {
        let client = StaticSessionClient::new(sample());
        assert!(matches!(
            client.connect("ghost").await,
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            client.list_tools("ghost").await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_tools_returns_configured_entries() {
        let client = StaticSessionClient::new(sample());
        let tools = client.list_tools("fs-tools").await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "read_file");
    }
}
