//! Dynamic installer data model (C6).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::capability::CapabilityCategory;

/// Opaque external installer method families, tried in this order per
/// candidate. Grounded on `mcp_installer.py`'s method list from the
/// pre-distillation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallMethod {
    GenericUvx,
    GenericNpx,
    GenericPip,
    GitCloneInstall,
}

impl InstallMethod {
    pub const ORDER: [InstallMethod; 4] = [
        Self::GenericUvx,
        Self::GenericNpx,
        Self::GenericPip,
        Self::GitCloneInstall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenericUvx => "generic-uvx",
            Self::GenericNpx => "generic-npx",
            Self::GenericPip => "generic-pip",
            Self::GitCloneInstall => "git-clone-install",
        }
    }

    /// Build the subprocess command and args this method uses to fetch
    /// `package`, so the uvx -> npx -> pip -> git-clone fallback (spec
    /// section 4.4) actually tries a distinct tool at each step instead of
    /// repeating the same command.
    pub fn command_for(&self, package: &str) -> (&'static str, Vec<String>) {
        match self {
            Self::GenericUvx => ("uvx", vec![package.to_string()]),
            Self::GenericNpx => ("npx", vec!["-y".to_string(), package.to_string()]),
            Self::GenericPip => ("pip", vec!["install".to_string(), package.to_string()]),
            Self::GitCloneInstall => ("git", vec!["clone".to_string(), package.to_string()]),
        }
    }
}

/// A candidate provider the installer could bring online.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallCandidate {
    pub provider_name: String,
    pub capabilities: Vec<CapabilityCategory>,
    pub install_command: String,
    pub method: InstallMethod,
}

/// Default per-install timeout (spec section 4.4).
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Default verification deadline after a successful install (spec 4.4).
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one installation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationResult {
    pub provider_name: String,
    pub method: InstallMethod,
    pub outcome: InstallOutcome,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

/// The specific way an installation attempt can conclude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstallOutcome {
    Success,
    /// The method's tooling isn't available on this host.
    Unavailable,
    /// The subprocess ran past the configured timeout.
    TimedOut,
    /// The subprocess exited non-zero.
    Failed { exit_code: Option<i32> },
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_method_order_starts_with_uvx() {
        assert_eq!(InstallMethod::ORDER[0], InstallMethod::GenericUvx);
    }

    #[test]
    fn each_method_derives_a_distinct_command() {
        let commands: Vec<&str> = InstallMethod::ORDER
            .iter()
            .map(|m| m.command_for("search-mcp").0)
            .collect();
        assert_eq!(commands, vec!["uvx", "npx", "pip", "git"]);
    }

    #[test]
    fn npx_passes_the_dash_y_flag_before_the_package() {
        let (_, args) = InstallMethod::GenericNpx.command_for("search-mcp");
        assert_eq!(args, vec!["-y".to_string(), "search-mcp".to_string()]);
    }

    #[test]
    fn outcome_success_check() {
        assert!(InstallOutcome::Success.is_success());
        assert!(!InstallOutcome::TimedOut.is_success());
        assert!(!InstallOutcome::Failed { exit_code: Some(1) }.is_success());
    }
}
