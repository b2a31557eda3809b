//! C8 — Meta-Coordinator: the end-to-end request driver that ties C1-C7
//! together. Owns the request state machine, the global request semaphore,
//! per-request deadline/cancellation, metrics, history, and the periodic
//! cleanup tick (spec section 4.6).
//!
//! The coordinator never talks to a pattern implementation directly — it
//! only assembles [`WorkerRole`]s and calls the injected [`PatternExecutor`]
//! once per request. Everything downstream of `dispatch` is out of scope
//! (spec.md section 1).

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::error::{AnalysisError, CoordinatorError};
use crate::domain::models::{
    CapabilityCategory, Complexity, ExecutionHistory, ExecutionOutcome, ExecutionRecord,
    MetricsSnapshot, Pattern, ProviderProfile, RequestStatus, StrategyRecommendation, TaskAnalysis,
    TaskType, WorkerRole,
};
use crate::domain::ports::installer_launcher::InstallLauncher;
use crate::domain::ports::lm_factory::LmFactory;
use crate::domain::ports::pattern_executor::{ExecutorError, PatternExecutor};
use crate::domain::ports::session::SessionClient;
use crate::infrastructure::config::OrchestratorConfig;
use crate::infrastructure::registry_client::HttpRegistryClient;
use crate::services::agent_factory::AgentFactory;
use crate::services::discovery::{DiscoveryEngine, WellKnownProvider};
use crate::services::installer::{CandidateCatalog, DynamicInstaller};
use crate::services::metrics::MetricsRegistry;
use crate::services::provider_registry::ProviderRegistry;
use crate::services::resource_pool::ResourcePool;
use crate::services::strategy_selector::StrategySelector;
use crate::services::task_analyzer::TaskAnalyzer;

/// Per-request overrides of the coordinator's defaults (spec section 6).
#[derive(Debug, Clone, Default)]
pub struct ExecutionPreferences {
    pub quality_floor: Option<crate::infrastructure::config::QualityFloor>,
    pub deadline_s: Option<u64>,
}

/// Answer to the `capabilities` command (spec section 6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CapabilitiesSummary {
    pub provider_count: usize,
    pub provider_names: Vec<String>,
    pub specializations: Vec<&'static str>,
}

/// Everything the Meta-Coordinator needs to run a request, in one place.
/// Grounded on the teacher's `SwarmCoordinator` (`application/coordinator.rs`):
/// a single struct gluing the registry, pools, and caches together behind a
/// request-scoped semaphore.
pub struct MetaCoordinator {
    config: OrchestratorConfig,
    registry: ProviderRegistry,
    discovery: DiscoveryEngine,
    installer: Option<DynamicInstaller>,
    task_analyzer: TaskAnalyzer,
    strategy_selector: StrategySelector,
    agent_factory: AgentFactory,
    pool: ResourcePool,
    metrics: MetricsRegistry,
    history: Mutex<ExecutionHistory>,
    request_semaphore: Semaphore,
    pattern_executor: Arc<dyn PatternExecutor>,
    lm_factory: Arc<dyn LmFactory>,
    shutdown_token: CancellationToken,
    last_cleanup: Mutex<Instant>,
}

const HISTORY_CAPACITY: usize = 1000;

impl MetaCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: OrchestratorConfig,
        session: Arc<dyn SessionClient>,
        well_known: Vec<WellKnownProvider>,
        install_resources: Option<(CandidateCatalog, Arc<dyn InstallLauncher>)>,
        pattern_executor: Arc<dyn PatternExecutor>,
        lm_factory: Arc<dyn LmFactory>,
    ) -> Self {
        let discovery = DiscoveryEngine::new(session, well_known, config.discovery_concurrency);
        let installer = if config.enable_installer {
            install_resources.map(|(catalog, launcher)| {
                let mut installer = DynamicInstaller::new(catalog, launcher, config.install_concurrency);
                if let Some(url) = &config.remote_registry_url {
                    installer = installer.with_remote_registry(Arc::new(HttpRegistryClient::new(url.clone())));
                }
                installer
            })
        } else {
            None
        };

        Self {
            request_semaphore: Semaphore::new(config.request_concurrency),
            task_analyzer: TaskAnalyzer::new(config.analysis_cache_size),
            strategy_selector: StrategySelector::new(config.strategy_cache_size),
            agent_factory: AgentFactory::new(AgentFactory::default_catalog()),
            pool: ResourcePool::new(config.pool_size),
            metrics: MetricsRegistry::new(),
            history: Mutex::new(ExecutionHistory::new(HISTORY_CAPACITY)),
            registry: ProviderRegistry::new(),
            discovery,
            installer,
            pattern_executor,
            lm_factory,
            shutdown_token: CancellationToken::new(),
            last_cleanup: Mutex::new(Instant::now()),
            config,
        }
    }

    /// Populate the registry once at startup, before serving any requests.
    pub async fn bootstrap(&self) {
        if let Err(e) = self.discovery.run_round(&self.registry).await {
            warn!(error = %e, "initial discovery round reported an error");
        }
    }

    /// Spawn a background task that re-runs discovery on `interval` until
    /// [`shutdown`](Self::shutdown) is called.
    pub fn spawn_discovery_refresh(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it, bootstrap() already ran
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = this.discovery.run_round(&this.registry).await {
                            warn!(error = %e, "scheduled discovery round reported an error");
                        }
                    }
                    () = this.shutdown_token.cancelled() => break,
                }
            }
        })
    }

    /// Run one request end to end: analyze, plan (discover/install as
    /// needed), assemble roles, dispatch, record. This is the only entry
    /// point that produces an [`ExecutionRecord`] (spec section 6, `execute`).
    pub async fn execute(
        &self,
        text: &str,
        prefs: ExecutionPreferences,
    ) -> Result<ExecutionRecord, CoordinatorError> {
        let _permit = self
            .request_semaphore
            .acquire()
            .await
            .map_err(|_| CoordinatorError::Cancelled)?;

        let start = Instant::now();
        if let Some(mem) = current_memory_mib() {
            debug!(start_memory_mib = mem, "request started");
        }

        let mut record = ExecutionRecord::new(text);
        record.status = RequestStatus::Analyzing;

        let analysis = match self.task_analyzer.analyze(text).await {
            Ok(a) => a,
            Err(AnalysisError::EmptyInput) => minimal_analysis(text),
        };
        record.analysis = Some(analysis.clone());
        record.status = RequestStatus::Planning;

        let required: Vec<CapabilityCategory> = analysis.required_capabilities.iter().copied().collect();
        let mut gap = self.registry.gap(&required).await;
        if !gap.is_empty() {
            if let Some(installer) = &self.installer {
                let results = installer.install_for_gap(&gap, &self.registry).await;
                if results.iter().any(|r| r.outcome.is_success()) {
                    if let Err(e) = self.discovery.run_round(&self.registry).await {
                        warn!(error = %e, "post-install discovery round reported an error");
                    }
                }
                gap = self.registry.gap(&required).await;
            }
        }

        if !gap.is_empty() {
            let names: Vec<String> = gap.iter().map(|c| c.as_str().to_string()).collect();
            record.finish(ExecutionOutcome::Failure(format!(
                "no capable providers for: {}",
                names.join(", ")
            )));
            self.metrics.record_request_without_pattern(false).await;
            self.history.lock().await.push(record);
            self.maybe_cleanup().await;
            return Err(CoordinatorError::NoCapableProviders(names));
        }

        let providers = self.registry.all().await;
        let quality_floor = prefs.quality_floor.unwrap_or(self.config.quality_floor);
        let pattern_success_rates = self.metrics.pattern_success_rates().await;
        let recommendation = self
            .strategy_selector
            .select(&analysis, &providers, quality_floor, &pattern_success_rates)
            .await;
        record.recommendation = Some(recommendation.clone());

        record.status = RequestStatus::Executing;
        let roles = self.roles_for_pattern(recommendation.pattern, &analysis, &providers);
        let mut checked_out = Vec::with_capacity(roles.len());
        for role in roles {
            checked_out.push(self.pool.checkout(role).await);
        }
        record.roles_used = checked_out.iter().map(|r| r.name.clone()).collect();
        record.providers_used = checked_out
            .iter()
            .flat_map(|r| r.provider_names.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        record.status = RequestStatus::Coordinating;
        let deadline = Duration::from_secs(prefs.deadline_s.unwrap_or(self.config.request_deadline_s));
        let cancel = CancellationToken::new();
        let timed_out = AtomicBool::new(false);

        let dispatch_outcome = tokio::select! {
            res = self.pattern_executor.dispatch(
                recommendation.pattern,
                &checked_out,
                text,
                self.lm_factory.as_ref(),
                cancel.clone(),
            ) => res,
            () = self.shutdown_token.cancelled() => {
                cancel.cancel();
                Err(ExecutorError::Cancelled)
            }
            () = tokio::time::sleep(deadline) => {
                cancel.cancel();
                timed_out.store(true, Ordering::SeqCst);
                Err(ExecutorError::Cancelled)
            }
        };

        for role in checked_out {
            self.pool.checkin(role).await;
        }

        let result: Result<String, CoordinatorError> = match dispatch_outcome {
            Ok(output) => Ok(output),
            Err(ExecutorError::Cancelled) if timed_out.load(Ordering::SeqCst) => {
                Err(CoordinatorError::Timeout(deadline.as_millis() as u64))
            }
            Err(ExecutorError::Cancelled) => Err(CoordinatorError::Cancelled),
            Err(ExecutorError::PatternUnsupported(p)) => Err(CoordinatorError::PatternUnsupported(p)),
            Err(ExecutorError::Failed(message)) => Err(CoordinatorError::ExecutorError {
                pattern: recommendation.pattern,
                message,
            }),
        };

        let succeeded = result.is_ok();
        match &result {
            Ok(output) => record.finish(ExecutionOutcome::Success(output.clone())),
            Err(e) => record.finish(ExecutionOutcome::Failure(e.to_string())),
        }

        self.metrics
            .record_request(succeeded, recommendation.pattern, start.elapsed().as_secs_f64())
            .await;
        for name in &record.providers_used {
            self.metrics.record_provider_usage(name).await;
            self.registry
                .record_performance(name, succeeded, start.elapsed().as_secs_f64() * 1000.0)
                .await;
        }
        for cap in &required {
            self.metrics.record_capability_usage(cap.as_str()).await;
        }

        let finished = record.clone();
        self.history.lock().await.push(record);
        self.maybe_cleanup().await;

        match result {
            Ok(_) => Ok(finished),
            Err(e) => Err(e),
        }
    }

    /// Run analysis and strategy selection only, with no side effects on the
    /// registry, pool, or history (spec section 6, `analyze`).
    pub async fn analyze_only(&self, text: &str) -> (TaskAnalysis, StrategyRecommendation) {
        let analysis = match self.task_analyzer.analyze(text).await {
            Ok(a) => a,
            Err(AnalysisError::EmptyInput) => minimal_analysis(text),
        };
        let providers = self.registry.all().await;
        let rates = self.metrics.pattern_success_rates().await;
        let recommendation = self
            .strategy_selector
            .select(&analysis, &providers, self.config.quality_floor, &rates)
            .await;
        (analysis, recommendation)
    }

    /// Provider counts and the Agent Factory's template catalog (spec
    /// section 6, `capabilities`).
    pub async fn capabilities(&self) -> CapabilitiesSummary {
        let providers = self.registry.all().await;
        CapabilitiesSummary {
            provider_count: providers.len(),
            provider_names: providers.into_iter().map(|p| p.name).collect(),
            specializations: self.agent_factory.template_names(),
        }
    }

    /// A point-in-time metrics snapshot (spec section 6, `metrics`).
    pub async fn metrics(&self) -> MetricsSnapshot {
        let analysis_cache = self.task_analyzer.cache_stats().await;
        let strategy_cache = self.strategy_selector.cache_stats().await;
        self.metrics.snapshot(analysis_cache, strategy_cache).await
    }

    /// The most recent requests, oldest first (used by the CLI's `execute`
    /// table output and diagnostics).
    pub async fn history(&self) -> Vec<ExecutionRecord> {
        self.history.lock().await.iter().cloned().collect()
    }

    pub async fn providers(&self) -> Vec<ProviderProfile> {
        self.registry.all().await
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Stop discovery refresh, wait up to 30s for in-flight requests to
    /// finish, then force-cancel the rest (spec section 6, `shutdown`).
    pub async fn shutdown(&self) {
        self.shutdown_token.cancel();
        let total = self.config.request_concurrency as u32;
        let wait = tokio::time::timeout(Duration::from_secs(30), self.request_semaphore.acquire_many(total));
        match wait.await {
            Ok(Ok(_permits)) => info!("shutdown: all in-flight requests drained"),
            Ok(Err(_)) => {}
            Err(_) => warn!("shutdown: in-flight requests did not finish within 30s, forcing cancellation"),
        }
        self.request_semaphore.close();
        self.pool.cleanup().await;
    }

    fn roles_for_pattern(
        &self,
        pattern: Pattern,
        analysis: &TaskAnalysis,
        providers: &[ProviderProfile],
    ) -> Vec<WorkerRole> {
        let caps = &analysis.required_capabilities;
        match pattern {
            Pattern::Direct | Pattern::Router => {
                vec![self.agent_factory.build_role(caps, providers)]
            }
            Pattern::Parallel => {
                let group_count = caps.len().max(2);
                let mut team = self.agent_factory.team_for(caps, group_count, providers);
                team.push(
                    WorkerRole::new(
                        "aggregator",
                        "Synthesize the results produced by the other roles into one coherent answer.",
                    )
                    .with_capabilities(caps.iter().copied()),
                );
                team
            }
            Pattern::Orchestrator => {
                let mut team = vec![WorkerRole::new(
                    "coordinator",
                    "Plan the steps required and delegate to the roles below, tracking dependencies between them.",
                )
                .with_capabilities(caps.iter().copied())];
                team.extend(self.agent_factory.team_for(caps, caps.len().max(3), providers));
                team
            }
            Pattern::Swarm => {
                let mut team = self.agent_factory.team_for(caps, caps.len().max(2), providers);
                if let Some(lead) = team.first().cloned() {
                    let targets: Vec<String> = team.iter().skip(1).map(|r| r.name.clone()).collect();
                    let mut lead = lead;
                    for target in targets {
                        lead = lead.with_handoff_target(target);
                    }
                    team[0] = lead;
                }
                team
            }
            Pattern::EvaluatorOptimizer => {
                let optimizer = self.agent_factory.build_role(caps, providers);
                let evaluator = WorkerRole::new(
                    "evaluator",
                    "Critically evaluate the optimizer's output against the requested quality floor \
                     and either approve it or return specific, actionable revisions.",
                )
                .with_providers(optimizer.provider_names.clone())
                .with_capabilities(caps.iter().copied());
                vec![optimizer, evaluator]
            }
            Pattern::AdaptiveHybrid => {
                let mut team = vec![WorkerRole::new(
                    "coordinator",
                    "Coordinate the roles below and switch strategy at runtime as the task unfolds.",
                )
                .with_capabilities(caps.iter().copied())];
                team.extend(self.agent_factory.team_for(caps, caps.len().max(2), providers));
                team
            }
        }
    }

    /// Trim caches and pool slack if the interval has elapsed or memory is
    /// over threshold (spec section 4.6). Active pool leases and in-flight
    /// requests are never touched.
    async fn maybe_cleanup(&self) {
        let due = {
            let last = self.last_cleanup.lock().await;
            last.elapsed() >= Duration::from_secs(self.config.cleanup_interval_s)
        };
        let over_memory = current_memory_mib()
            .map(|mem| mem >= self.config.memory_cleanup_threshold_mib)
            .unwrap_or(false);

        if !due && !over_memory {
            return;
        }

        self.pool.trim_to(self.config.pool_size / 2).await;
        self.task_analyzer.clear_cache().await;
        self.strategy_selector.clear_cache().await;
        *self.last_cleanup.lock().await = Instant::now();
        debug!(due, over_memory, "cleanup tick ran");
    }
}

/// Spec section 4.1: analysis never fails on valid input, and empty input
/// yields a minimal analysis rather than an error. The analyzer itself
/// surfaces `AnalysisError::EmptyInput` for callers that want to
/// distinguish the case; the coordinator recovers it locally here.
fn minimal_analysis(text: &str) -> TaskAnalysis {
    TaskAnalysis {
        description: text.to_string(),
        task_type: TaskType::InformationRetrieval,
        complexity: Complexity::Simple,
        required_capabilities: BTreeSet::new(),
        estimated_steps: 1,
        parallelizable: false,
        requires_iteration: false,
        requires_human_input: false,
        confidence: 0.0,
        cache_hit: false,
        analysis_time_ms: 0.0,
    }
}

/// Resident memory of the current process in MiB, used by the cleanup
/// tick's memory-threshold check. Reads `/proc/self/status` directly rather
/// than adding a system-info crate dependency for one gauge (see DESIGN.md).
#[cfg(target_os = "linux")]
fn current_memory_mib() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
        Some(kb / 1024)
    })
}

#[cfg(not(target_os = "linux"))]
fn current_memory_mib() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CapabilityCategory as C, ProviderStatus};
    use crate::domain::ports::installer_launcher::{LaunchError, LaunchOutput};
    use crate::domain::ports::session::{SessionError, SessionResource, SessionTool};
    use crate::infrastructure::config::QualityFloor;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSession {
        connected: Vec<String>,
        tools: HashMap<String, Vec<SessionTool>>,
    }

    #[async_trait]
    impl SessionClient for StubSession {
        async fn list_connected(&self) -> Result<Vec<String>, SessionError> {
            Ok(self.connected.clone())
        }
        async fn list_tools(&self, provider: &str) -> Result<Vec<SessionTool>, SessionError> {
            Ok(self.tools.get(provider).cloned().unwrap_or_default())
        }
        async fn list_resources(&self, _provider: &str) -> Result<Vec<SessionResource>, SessionError> {
            Ok(vec![])
        }
        async fn connect(&self, _provider: &str) -> Result<(), SessionError> {
            Ok(())
        }
    }

    struct StubExecutor {
        calls: AtomicUsize,
        unsupported: Option<Pattern>,
    }

    #[async_trait]
    impl PatternExecutor for StubExecutor {
        async fn dispatch(
            &self,
            pattern: Pattern,
            roles: &[WorkerRole],
            _request_text: &str,
            _lm: &dyn LmFactory,
            _cancel: CancellationToken,
        ) -> Result<String, ExecutorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unsupported == Some(pattern) {
                return Err(ExecutorError::PatternUnsupported(pattern));
            }
            Ok(format!("handled by {} roles", roles.len()))
        }
    }

    struct StubLm;

    #[async_trait]
    impl LmFactory for StubLm {
        async fn run(&self, _role: &WorkerRole, _prompt: &str) -> Result<String, crate::domain::ports::lm_factory::LmError> {
            Ok("ok".to_string())
        }
    }

    struct StubLauncher;

    #[async_trait]
    impl InstallLauncher for StubLauncher {
        async fn launch(
            &self,
            _command: &str,
            _args: &[String],
            _timeout: Duration,
        ) -> Result<LaunchOutput, LaunchError> {
            Ok(LaunchOutput {
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
                timed_out: false,
            })
        }
    }

    fn coordinator(session: StubSession, well_known: Vec<WellKnownProvider>) -> MetaCoordinator {
        MetaCoordinator::new(
            OrchestratorConfig::default(),
            Arc::new(session),
            well_known,
            None,
            Arc::new(StubExecutor {
                calls: AtomicUsize::new(0),
                unsupported: None,
            }),
            Arc::new(StubLm),
        )
    }

    #[tokio::test]
    async fn simple_request_with_connected_provider_completes() {
        let mut tools = HashMap::new();
        tools.insert(
            "fs-tools".to_string(),
            vec![SessionTool {
                name: "read_file".to_string(),
                description: "reads a file from disk".to_string(),
            }],
        );
        let session = StubSession {
            connected: vec!["fs-tools".to_string()],
            tools,
        };
        let coordinator = coordinator(session, vec![]);
        coordinator.bootstrap().await;

        let record = coordinator
            .execute("read the file notes.txt", ExecutionPreferences::default())
            .await
            .unwrap();
        assert!(record.is_success());
        assert_eq!(record.status, RequestStatus::Completed);
        assert!(!record.roles_used.is_empty());
    }

    #[tokio::test]
    async fn no_capable_providers_fails_fast_without_calling_executor() {
        let coordinator = coordinator(
            StubSession {
                connected: vec![],
                tools: HashMap::new(),
            },
            vec![],
        );
        coordinator.bootstrap().await;

        let err = coordinator
            .execute("read the file notes.txt", ExecutionPreferences::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::NoCapableProviders(_)));
        let history = coordinator.history().await;
        assert_eq!(history.len(), 1);
        assert!(!history[0].is_success());
    }

    #[tokio::test]
    async fn dynamic_install_closes_a_capability_gap() {
        let catalog = CandidateCatalog::new(vec![crate::domain::models::InstallCandidate {
            provider_name: "search-mcp".to_string(),
            capabilities: vec![C::Search, C::Web],
            install_command: "uvx search-mcp".to_string(),
            method: crate::domain::models::InstallMethod::GenericUvx,
        }]);
        let coordinator = MetaCoordinator::new(
            OrchestratorConfig::default(),
            Arc::new(StubSession {
                connected: vec![],
                tools: HashMap::new(),
            }),
            vec![],
            Some((catalog, Arc::new(StubLauncher))),
            Arc::new(StubExecutor {
                calls: AtomicUsize::new(0),
                unsupported: None,
            }),
            Arc::new(StubLm),
        );
        coordinator.bootstrap().await;

        let record = coordinator
            .execute("search the web for quarterly sales figures", ExecutionPreferences::default())
            .await
            .unwrap();
        assert!(record.is_success());
        let providers = coordinator.providers().await;
        assert!(providers.iter().any(|p| p.name == "search-mcp" && p.status == ProviderStatus::Installed));
    }

    #[tokio::test]
    async fn pattern_unsupported_is_surfaced_not_silently_downgraded() {
        let mut tools = HashMap::new();
        tools.insert("fs-tools".to_string(), vec![]);
        let coordinator = MetaCoordinator::new(
            OrchestratorConfig::default(),
            Arc::new(StubSession {
                connected: vec!["fs-tools".to_string()],
                tools,
            }),
            vec![],
            None,
            Arc::new(StubExecutor {
                calls: AtomicUsize::new(0),
                unsupported: Some(Pattern::Direct),
            }),
            Arc::new(StubLm),
        );
        coordinator.bootstrap().await;

        let err = coordinator
            .execute("read the file notes.txt", ExecutionPreferences::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::PatternUnsupported(_)));
    }

    #[tokio::test]
    async fn deadline_elapses_and_reports_timeout() {
        struct SlowExecutor;
        #[async_trait]
        impl PatternExecutor for SlowExecutor {
            async fn dispatch(
                &self,
                _pattern: Pattern,
                _roles: &[WorkerRole],
                _request_text: &str,
                _lm: &dyn LmFactory,
                _cancel: CancellationToken,
            ) -> Result<String, ExecutorError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too slow".to_string())
            }
        }

        let mut tools = HashMap::new();
        tools.insert("fs-tools".to_string(), vec![]);
        let coordinator = MetaCoordinator::new(
            OrchestratorConfig::default(),
            Arc::new(StubSession {
                connected: vec!["fs-tools".to_string()],
                tools,
            }),
            vec![],
            None,
            Arc::new(SlowExecutor),
            Arc::new(StubLm),
        );
        coordinator.bootstrap().await;

        let err = coordinator
            .execute(
                "read the file notes.txt",
                ExecutionPreferences {
                    quality_floor: None,
                    deadline_s: Some(0),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::Timeout(_)));
    }

    #[tokio::test]
    async fn analyze_only_does_not_touch_history() {
        let coordinator = coordinator(
            StubSession {
                connected: vec![],
                tools: HashMap::new(),
            },
            vec![],
        );
        let (analysis, recommendation) = coordinator.analyze_only("read the file notes.txt").await;
        assert_eq!(analysis.task_type, TaskType::FileOps);
        assert!(recommendation.is_well_formed());
        assert!(coordinator.history().await.is_empty());
    }

    #[tokio::test]
    async fn capabilities_reports_connected_providers_and_templates() {
        let mut tools = HashMap::new();
        tools.insert("fs-tools".to_string(), vec![]);
        let coordinator = coordinator(
            StubSession {
                connected: vec!["fs-tools".to_string()],
                tools,
            },
            vec![],
        );
        coordinator.bootstrap().await;

        let caps = coordinator.capabilities().await;
        assert_eq!(caps.provider_count, 1);
        assert!(caps.specializations.contains(&"developer"));
    }

    #[tokio::test]
    async fn shutdown_drains_and_closes_pool() {
        let coordinator = coordinator(
            StubSession {
                connected: vec![],
                tools: HashMap::new(),
            },
            vec![],
        );
        coordinator.shutdown().await;
        assert!(coordinator
            .execute("anything", ExecutionPreferences::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn execute_honors_per_request_quality_floor_override() {
        let mut tools = HashMap::new();
        tools.insert("fs-tools".to_string(), vec![]);
        let coordinator = coordinator(
            StubSession {
                connected: vec!["fs-tools".to_string()],
                tools,
            },
            vec![],
        );
        coordinator.bootstrap().await;

        let record = coordinator
            .execute(
                "read the file notes.txt",
                ExecutionPreferences {
                    quality_floor: Some(QualityFloor::Excellent),
                    deadline_s: None,
                },
            )
            .await
            .unwrap();
        assert!(record.recommendation.unwrap().is_well_formed());
    }
}
