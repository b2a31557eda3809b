//! taskforge CLI entry point.
//!
//! Loads configuration, stands up a [`MetaCoordinator`] wired with the
//! built-in defaults for the ports spec.md section 1 treats as external
//! collaborators (session client, pattern executor, language-model
//! factory, install launcher), runs the requested subcommand, then tears
//! the coordinator down cleanly.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use taskforge_orchestrator::cli::{commands, Cli};
use taskforge_orchestrator::domain::ports::installer_launcher::InstallLauncher;
use taskforge_orchestrator::infrastructure::config::ConfigLoader;
use taskforge_orchestrator::infrastructure::executor::{EchoLmFactory, SequentialPatternExecutor};
use taskforge_orchestrator::infrastructure::logging::{LogConfig, LoggerImpl};
use taskforge_orchestrator::infrastructure::process::SubprocessInstallLauncher;
use taskforge_orchestrator::infrastructure::session::StaticSessionClient;
use taskforge_orchestrator::services::discovery::WellKnownProvider;
use taskforge_orchestrator::services::installer::CandidateCatalog;
use taskforge_orchestrator::MetaCoordinator;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load().context("failed to load configuration")?;

    let log_config = LogConfig::from(&config.logging);
    let _logger = LoggerImpl::init(&log_config).context("failed to initialize logging")?;

    // No real session/transport protocol is wired up by default (spec.md
    // section 1 treats it as an external collaborator); an empty static
    // client still exercises discovery's well-known leg and the installer.
    let session = Arc::new(StaticSessionClient::new(HashMap::new()));
    let well_known: Vec<WellKnownProvider> = Vec::new();
    let install_resources = config.enable_installer.then(|| {
        (
            CandidateCatalog::new(Vec::new()),
            Arc::new(SubprocessInstallLauncher::new()) as Arc<dyn InstallLauncher>,
        )
    });

    let coordinator = Arc::new(MetaCoordinator::new(
        config,
        session,
        well_known,
        install_resources,
        Arc::new(SequentialPatternExecutor),
        Arc::new(EchoLmFactory),
    ));
    coordinator.bootstrap().await;

    commands::run(coordinator, cli.command).await
}
