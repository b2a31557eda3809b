//! C6 — Dynamic Installer: given a set of required capabilities not covered
//! by the registry, finds candidate providers and installs them via an
//! injected [`InstallLauncher`], bounded by `install_concurrency`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::{info, warn};

use crate::domain::models::install::{DEFAULT_INSTALL_TIMEOUT, DEFAULT_VERIFY_TIMEOUT};
use crate::domain::models::{
    CapabilityCategory, InstallCandidate, InstallMethod, InstallOutcome, InstallationResult,
    ProviderProfile, ProviderStatus,
};
use crate::domain::ports::installer_launcher::InstallLauncher;
use crate::domain::ports::registry_client::RegistryClient;
use crate::services::provider_registry::ProviderRegistry;

/// A static capability -> candidate-provider map, e.g. loaded from the same
/// config as the discovery engine's well-known list.
pub struct CandidateCatalog {
    by_capability: HashMap<CapabilityCategory, Vec<InstallCandidate>>,
}

impl CandidateCatalog {
    pub fn new(candidates: Vec<InstallCandidate>) -> Self {
        let mut by_capability: HashMap<CapabilityCategory, Vec<InstallCandidate>> = HashMap::new();
        for candidate in candidates {
            for cap in &candidate.capabilities {
                by_capability.entry(*cap).or_default().push(candidate.clone());
            }
        }
        Self { by_capability }
    }

    fn candidates_for(&self, caps: &[CapabilityCategory]) -> Vec<InstallCandidate> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for cap in caps {
            if let Some(list) = self.by_capability.get(cap) {
                for candidate in list {
                    if seen.insert(candidate.provider_name.clone()) {
                        result.push(candidate.clone());
                    }
                }
            }
        }
        // Rank by count of required capabilities satisfied, descending.
        result.sort_by(|a, b| {
            let a_count = a.capabilities.iter().filter(|c| caps.contains(c)).count();
            let b_count = b.capabilities.iter().filter(|c| caps.contains(c)).count();
            b_count.cmp(&a_count)
        });
        result
    }
}

pub struct DynamicInstaller {
    catalog: CandidateCatalog,
    launcher: Arc<dyn InstallLauncher>,
    concurrency: Arc<Semaphore>,
    permanent_failed: Mutex<HashSet<String>>,
    /// Optional networked collaborator (spec section 4.4 "optionally query
    /// remote registries"): consulted only for capabilities the static
    /// catalog has no candidate for.
    remote: Option<Arc<dyn RegistryClient>>,
}

impl DynamicInstaller {
    pub fn new(catalog: CandidateCatalog, launcher: Arc<dyn InstallLauncher>, concurrency: usize) -> Self {
        Self {
            catalog,
            launcher,
            concurrency: Arc::new(Semaphore::new(concurrency.max(1))),
            permanent_failed: Mutex::new(HashSet::new()),
            remote: None,
        }
    }

    pub fn with_remote_registry(mut self, remote: Arc<dyn RegistryClient>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Attempt to cover `required` capabilities. Returns the installation
    /// results for every candidate attempted, and updates `registry` for
    /// each provider that ends up `installed`.
    pub async fn install_for_gap(
        &self,
        required: &[CapabilityCategory],
        registry: &ProviderRegistry,
    ) -> Vec<InstallationResult> {
        let mut candidates = self.catalog.candidates_for(required);

        let uncovered: Vec<CapabilityCategory> = required
            .iter()
            .copied()
            .filter(|cap| !candidates.iter().any(|c| c.capabilities.contains(cap)))
            .collect();
        if !uncovered.is_empty() {
            candidates.extend(self.remote_candidates_for(&uncovered, &candidates).await);
        }

        if candidates.is_empty() {
            return Vec::new();
        }

        let tasks = candidates.into_iter().map(|candidate| {
            let sem = Arc::clone(&self.concurrency);
            async move {
                let _permit = sem.acquire_owned().await.expect("semaphore closed");
                self.install_one(candidate, registry).await
            }
        });

        join_all(tasks).await
    }

    /// Query the remote registry (if configured) for candidates covering
    /// `uncovered` capabilities not already named in `known`, deduplicating
    /// by provider name.
    async fn remote_candidates_for(
        &self,
        uncovered: &[CapabilityCategory],
        known: &[InstallCandidate],
    ) -> Vec<InstallCandidate> {
        let Some(remote) = &self.remote else {
            return Vec::new();
        };

        let mut seen: HashSet<String> = known.iter().map(|c| c.provider_name.clone()).collect();
        let mut result = Vec::new();
        for cap in uncovered {
            match remote.search_by_capability(*cap).await {
                Ok(entries) => {
                    for entry in entries {
                        if seen.insert(entry.provider_name.clone()) {
                            result.push(InstallCandidate {
                                provider_name: entry.provider_name,
                                capabilities: entry.capabilities,
                                install_command: entry.install_command,
                                method: InstallMethod::GenericUvx,
                            });
                        }
                    }
                }
                Err(e) => warn!(capability = %cap, error = %e, "remote registry lookup failed"),
            }
        }
        result
    }

    /// Idempotent per spec section 8, property #5: a provider already
    /// `installed`/`connected` is skipped without re-running any command.
    pub async fn install_one(
        &self,
        candidate: InstallCandidate,
        registry: &ProviderRegistry,
    ) -> InstallationResult {
        if let Some(existing) = registry.get(&candidate.provider_name).await {
            if matches!(existing.status, ProviderStatus::Installed | ProviderStatus::Connected) {
                return InstallationResult {
                    provider_name: candidate.provider_name,
                    method: candidate.method,
                    outcome: InstallOutcome::Success,
                    duration: Duration::ZERO,
                    stdout: String::new(),
                    stderr: String::new(),
                };
            }
        }

        if self.permanent_failed.lock().await.contains(&candidate.provider_name) {
            return InstallationResult {
                provider_name: candidate.provider_name,
                method: candidate.method,
                outcome: InstallOutcome::Unavailable,
                duration: Duration::ZERO,
                stdout: String::new(),
                stderr: String::new(),
            };
        }

        for method in InstallMethod::ORDER {
            let result = self
                .try_method(method, &candidate, DEFAULT_INSTALL_TIMEOUT)
                .await;
            if result.outcome.is_success() {
                registry
                    .upsert(
                        ProviderProfile::new(&candidate.provider_name)
                            .with_capabilities(candidate.capabilities.iter().copied())
                            .with_install_command(candidate.install_command.clone())
                            .with_status(ProviderStatus::Installed),
                    )
                    .await;
                info!(provider = %candidate.provider_name, method = method.as_str(), "install succeeded");
                return result;
            }
            warn!(
                provider = %candidate.provider_name,
                method = method.as_str(),
                outcome = ?result.outcome,
                "install attempt failed, trying next method"
            );
        }

        self.permanent_failed
            .lock()
            .await
            .insert(candidate.provider_name.clone());
        InstallationResult {
            provider_name: candidate.provider_name,
            method: InstallMethod::ORDER[InstallMethod::ORDER.len() - 1],
            outcome: InstallOutcome::Unavailable,
            duration: Duration::ZERO,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    async fn try_method(
        &self,
        method: InstallMethod,
        candidate: &InstallCandidate,
        timeout: Duration,
    ) -> InstallationResult {
        // The catalog's `install_command` names the package (its last
        // whitespace-separated token); each method wraps that package in
        // its own tool invocation rather than replaying the same command.
        let Some(package) = candidate.install_command.split_whitespace().last() else {
            return InstallationResult {
                provider_name: candidate.provider_name.clone(),
                method,
                outcome: InstallOutcome::Unavailable,
                duration: Duration::ZERO,
                stdout: String::new(),
                stderr: String::new(),
            };
        };
        let (command, args) = method.command_for(package);

        let start = std::time::Instant::now();
        match self.launcher.launch(command, &args, timeout).await {
            Ok(output) if output.timed_out => InstallationResult {
                provider_name: candidate.provider_name.clone(),
                method,
                outcome: InstallOutcome::TimedOut,
                duration: start.elapsed(),
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Ok(output) if output.succeeded() => InstallationResult {
                provider_name: candidate.provider_name.clone(),
                method,
                outcome: InstallOutcome::Success,
                duration: start.elapsed(),
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Ok(output) => InstallationResult {
                provider_name: candidate.provider_name.clone(),
                method,
                outcome: InstallOutcome::Failed {
                    exit_code: output.exit_code,
                },
                duration: start.elapsed(),
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(_) => InstallationResult {
                provider_name: candidate.provider_name.clone(),
                method,
                outcome: InstallOutcome::Unavailable,
                duration: start.elapsed(),
                stdout: String::new(),
                stderr: String::new(),
            },
        }
    }

    /// Probe-and-mark-connected within `DEFAULT_VERIFY_TIMEOUT`; on failure
    /// the provider stays in the registry, marked `error` (spec 4.4).
    pub async fn verify(
        &self,
        name: &str,
        session: &dyn crate::domain::ports::session::SessionClient,
        registry: &ProviderRegistry,
    ) {
        let result = tokio::time::timeout(DEFAULT_VERIFY_TIMEOUT, session.connect(name)).await;
        match result {
            Ok(Ok(())) => registry.set_status(name, ProviderStatus::Connected).await,
            _ => registry.set_status(name, ProviderStatus::Error).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::installer_launcher::{LaunchError, LaunchOutput};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubLauncher {
        succeed_on: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InstallLauncher for StubLauncher {
        async fn launch(
            &self,
            command: &str,
            _args: &[String],
            _timeout: Duration,
        ) -> Result<LaunchOutput, LaunchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let success = self.succeed_on.as_deref() == Some(command);
            Ok(LaunchOutput {
                exit_code: Some(if success { 0 } else { 1 }),
                stdout: String::new(),
                stderr: String::new(),
                timed_out: false,
            })
        }
    }

    fn candidate(name: &str, command: &str) -> InstallCandidate {
        InstallCandidate {
            provider_name: name.to_string(),
            capabilities: vec![CapabilityCategory::Search],
            install_command: command.to_string(),
            method: InstallMethod::GenericUvx,
        }
    }

    #[tokio::test]
    async fn successful_install_marks_provider_installed() {
        let launcher = Arc::new(StubLauncher {
            succeed_on: Some("uvx".to_string()),
            calls: AtomicUsize::new(0),
        });
        let catalog = CandidateCatalog::new(vec![candidate("search-mcp", "uvx search-mcp")]);
        let installer = DynamicInstaller::new(catalog, launcher, 3);
        let registry = ProviderRegistry::new();

        let results = installer
            .install_for_gap(&[CapabilityCategory::Search], &registry)
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].outcome.is_success());

        let profile = registry.get("search-mcp").await.unwrap();
        assert_eq!(profile.status, ProviderStatus::Installed);
    }

    #[tokio::test]
    async fn exhausting_all_methods_marks_permanently_failed() {
        let launcher = Arc::new(StubLauncher {
            succeed_on: None,
            calls: AtomicUsize::new(0),
        });
        let catalog = CandidateCatalog::new(vec![candidate("search-mcp", "uvx search-mcp")]);
        let installer = DynamicInstaller::new(catalog, launcher, 3);
        let registry = ProviderRegistry::new();

        let result = installer
            .install_one(candidate("search-mcp", "uvx search-mcp"), &registry)
            .await;
        assert!(!result.outcome.is_success());
        assert!(installer
            .permanent_failed
            .lock()
            .await
            .contains("search-mcp"));
    }

    #[tokio::test]
    async fn second_install_of_already_installed_provider_is_idempotent() {
        let launcher = Arc::new(StubLauncher {
            succeed_on: Some("uvx".to_string()),
            calls: AtomicUsize::new(0),
        });
        let catalog = CandidateCatalog::new(vec![candidate("search-mcp", "uvx search-mcp")]);
        let installer = DynamicInstaller::new(catalog, launcher, 3);
        let registry = ProviderRegistry::new();

        installer
            .install_one(candidate("search-mcp", "uvx search-mcp"), &registry)
            .await;
        let calls_after_first = installer.launcher.clone();
        let _ = calls_after_first;

        let second = installer
            .install_one(candidate("search-mcp", "uvx search-mcp"), &registry)
            .await;
        assert!(second.outcome.is_success());
        assert_eq!(second.duration, Duration::ZERO);
    }

    #[tokio::test]
    async fn fallback_tries_each_method_with_a_distinct_command() {
        struct RecordingLauncher {
            seen: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl InstallLauncher for RecordingLauncher {
            async fn launch(
                &self,
                command: &str,
                _args: &[String],
                _timeout: Duration,
            ) -> Result<LaunchOutput, LaunchError> {
                self.seen.lock().await.push(command.to_string());
                Ok(LaunchOutput {
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: false,
                })
            }
        }

        let launcher = Arc::new(RecordingLauncher { seen: Mutex::new(Vec::new()) });
        let catalog = CandidateCatalog::new(vec![candidate("search-mcp", "uvx search-mcp")]);
        let installer = DynamicInstaller::new(catalog, launcher.clone(), 1);
        let registry = ProviderRegistry::new();

        installer
            .install_one(candidate("search-mcp", "uvx search-mcp"), &registry)
            .await;

        let seen = launcher.seen.lock().await.clone();
        assert_eq!(seen, vec!["uvx", "npx", "pip", "git"]);
    }

    #[tokio::test]
    async fn remote_registry_fills_a_capability_the_catalog_has_no_candidate_for() {
        use crate::domain::ports::registry_client::{RegistryEntry, RegistryError};

        struct StubRegistry;

        #[async_trait]
        impl RegistryClient for StubRegistry {
            async fn search_by_capability(
                &self,
                capability: CapabilityCategory,
            ) -> Result<Vec<RegistryEntry>, RegistryError> {
                assert_eq!(capability, CapabilityCategory::Graphics);
                Ok(vec![RegistryEntry {
                    provider_name: "image-mcp".to_string(),
                    description: "image generation".to_string(),
                    capabilities: vec![CapabilityCategory::Graphics],
                    install_command: "uvx image-mcp".to_string(),
                }])
            }

            async fn search_by_text(&self, _query: &str) -> Result<Vec<RegistryEntry>, RegistryError> {
                Ok(vec![])
            }

            async fn lookup(&self, _provider_name: &str) -> Result<Option<RegistryEntry>, RegistryError> {
                Ok(None)
            }
        }

        let launcher = Arc::new(StubLauncher {
            succeed_on: Some("uvx".to_string()),
            calls: AtomicUsize::new(0),
        });
        let catalog = CandidateCatalog::new(vec![]);
        let installer = DynamicInstaller::new(catalog, launcher, 3).with_remote_registry(Arc::new(StubRegistry));
        let registry = ProviderRegistry::new();

        let results = installer
            .install_for_gap(&[CapabilityCategory::Graphics], &registry)
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].outcome.is_success());
        assert_eq!(results[0].provider_name, "image-mcp");
    }

    #[tokio::test]
    async fn no_candidates_for_uncovered_capability_returns_empty() {
        let launcher = Arc::new(StubLauncher {
            succeed_on: None,
            calls: AtomicUsize::new(0),
        });
        let catalog = CandidateCatalog::new(vec![]);
        let installer = DynamicInstaller::new(catalog, launcher, 3);
        let registry = ProviderRegistry::new();

        let results = installer
            .install_for_gap(&[CapabilityCategory::Graphics], &registry)
            .await;
        assert!(results.is_empty());
    }
}
