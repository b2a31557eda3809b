//! Command definitions and dispatch.
//!
//! Grounded on the teacher's `cli/commands/task.rs` subcommand shape
//! (clap derive enum, one variant per verb from spec.md section 6's public
//! interface: `execute`, `analyze`, `capabilities`, `metrics`).

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::infrastructure::config::QualityFloor;
use crate::services::{ExecutionPreferences, MetaCoordinator};

use super::output;

#[derive(Parser, Debug)]
#[command(name = "taskforge", version, about = "Autonomous task orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Clap-friendly mirror of [`QualityFloor`]; converted at the call site so
/// the domain/config type itself stays free of CLI concerns.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum QualityFloorArg {
    Acceptable,
    Good,
    Excellent,
}

impl From<QualityFloorArg> for QualityFloor {
    fn from(value: QualityFloorArg) -> Self {
        match value {
            QualityFloorArg::Acceptable => QualityFloor::Acceptable,
            QualityFloorArg::Good => QualityFloor::Good,
            QualityFloorArg::Excellent => QualityFloor::Excellent,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a task end to end: analyze, plan, dispatch, record.
    Execute {
        /// Free-form task description.
        text: String,
        /// Override the configured quality floor for this request only.
        #[arg(long, value_enum)]
        quality: Option<QualityFloorArg>,
        /// Override the configured request deadline, in seconds.
        #[arg(long)]
        deadline_s: Option<u64>,
    },
    /// Classify a task and select a strategy without dispatching it.
    Analyze {
        /// Free-form task description.
        text: String,
    },
    /// Show the currently known capability providers and role templates.
    Capabilities,
    /// Show a point-in-time metrics snapshot.
    Metrics,
    /// Run discovery once, then serve requests from stdin (one per line)
    /// until interrupted, refreshing discovery on an interval.
    Serve {
        /// Seconds between scheduled discovery refreshes.
        #[arg(long, default_value_t = 300)]
        discovery_interval_s: u64,
    },
}

/// Run the parsed command against an already-constructed coordinator. The
/// coordinator is bootstrapped by the caller (`main`) before this is
/// reached; this function only translates CLI intent into coordinator
/// calls and renders the result.
pub async fn run(coordinator: Arc<MetaCoordinator>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Execute {
            text,
            quality,
            deadline_s,
        } => {
            let prefs = ExecutionPreferences {
                quality_floor: quality.map(Into::into),
                deadline_s,
            };
            let spinner = output::progress::create_spinner_with_message("running request");
            let result = coordinator.execute(&text, prefs).await;
            match result {
                Ok(record) => {
                    spinner.finish_and_clear();
                    println!("{}", output::table::execution_record(&record));
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    eprintln!("request failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Analyze { text } => {
            let (analysis, recommendation) = coordinator.analyze_only(&text).await;
            println!("{}", output::table::analysis(&analysis, &recommendation));
        }
        Commands::Capabilities => {
            let summary = coordinator.capabilities().await;
            println!("{}", output::table::capabilities(&summary));
        }
        Commands::Metrics => {
            let snapshot = coordinator.metrics().await;
            println!("{}", output::table::metrics(&snapshot));
        }
        Commands::Serve { discovery_interval_s } => {
            let refresh = coordinator.spawn_discovery_refresh(Duration::from_secs(discovery_interval_s));
            info!("serving requests from stdin, one task per line (Ctrl-C to stop)");
            serve_stdin(Arc::clone(&coordinator)).await;
            coordinator.shutdown().await;
            refresh.abort();
        }
    }
    Ok(())
}

async fn serve_stdin(coordinator: Arc<MetaCoordinator>) {
    use tokio::io::{AsyncBufReadExt, BufReader};
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(text)) if !text.trim().is_empty() => {
                        let coordinator = Arc::clone(&coordinator);
                        let text = text.trim().to_string();
                        tokio::spawn(async move {
                            match coordinator.execute(&text, ExecutionPreferences::default()).await {
                                Ok(record) => println!("{}", output::table::execution_record(&record)),
                                Err(e) => warn!(error = %e, "request failed"),
                            }
                        });
                    }
                    Ok(Some(_)) => continue,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin read error");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        }
    }
}
