//! Subprocess-backed `InstallLauncher` (C6's package-manager collaborator).
//!
//! Grounded on the teacher's `application::mcp_process_manager` child-process
//! handling: spawn with piped stdio, enforce a timeout, and clean up a
//! runaway process rather than leaking it.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::warn;

use crate::domain::ports::installer_launcher::{InstallLauncher, LaunchError, LaunchOutput};

/// Launches install commands as child processes, each in its own process
/// group so a timeout can kill the whole tree (e.g. `npx` spawning `node`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SubprocessInstallLauncher;

impl SubprocessInstallLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InstallLauncher for SubprocessInstallLauncher {
    async fn launch(
        &self,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<LaunchOutput, LaunchError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // SAFETY-free on this platform: process_group(0) makes the child its
        // own group leader so `killpg` below does not also signal us.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            #[allow(unsafe_code)]
            unsafe {
                cmd.pre_exec(|| {
                    nix::unistd::setsid().map(|_| ()).map_err(std::io::Error::from)
                });
            }
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed(e.to_string()))?;
        let pid = child.id();

        let run = async {
            let mut stdout = String::new();
            let mut stderr = String::new();
            if let Some(mut out) = child.stdout.take() {
                let _ = out.read_to_string(&mut stdout).await;
            }
            if let Some(mut err) = child.stderr.take() {
                let _ = err.read_to_string(&mut stderr).await;
            }
            let status = child.wait().await;
            (status, stdout, stderr)
        };

        match tokio::time::timeout(timeout, run).await {
            Ok((status, stdout, stderr)) => {
                let exit_code = status.ok().and_then(|s| s.code());
                Ok(LaunchOutput {
                    exit_code,
                    stdout,
                    stderr,
                    timed_out: false,
                })
            }
            Err(_) => {
                if let Some(pid) = pid {
                    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                        warn!(error = ?e, pid, "failed to kill timed-out install process group");
                    }
                }
                Ok(LaunchOutput {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                })
            }
        }
    }
}
