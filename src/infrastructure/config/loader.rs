use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use super::OrchestratorConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid request_concurrency: {0}, must be at least 1")]
    InvalidRequestConcurrency(usize),

    #[error("invalid discovery_concurrency: {0}, must be at least 1")]
    InvalidDiscoveryConcurrency(usize),

    #[error("invalid install_concurrency: {0}, must be at least 1")]
    InvalidInstallConcurrency(usize),

    #[error("invalid pool_size: {0}, must be at least 1")]
    InvalidPoolSize(usize),

    #[error("invalid log level: {0}, must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid log format: {0}, must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `.taskforge/config.yaml` (project config)
    /// 3. `.taskforge/local.yaml` (project local overrides, optional)
    /// 4. Environment variables (`ORCHESTRATOR_` prefix, highest priority)
    pub fn load() -> Result<OrchestratorConfig> {
        let config: OrchestratorConfig = Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file(".taskforge/config.yaml"))
            .merge(Yaml::file(".taskforge/local.yaml"))
            .merge(Env::prefixed("ORCHESTRATOR_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, skipping environment
    /// overrides. Used by tests and the CLI's `--config` flag.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<OrchestratorConfig> {
        let config: OrchestratorConfig = Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &OrchestratorConfig) -> Result<(), ConfigError> {
        if config.request_concurrency == 0 {
            return Err(ConfigError::InvalidRequestConcurrency(
                config.request_concurrency,
            ));
        }
        if config.discovery_concurrency == 0 {
            return Err(ConfigError::InvalidDiscoveryConcurrency(
                config.discovery_concurrency,
            ));
        }
        if config.install_concurrency == 0 {
            return Err(ConfigError::InvalidInstallConcurrency(
                config.install_concurrency,
            ));
        }
        if config.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize(config.pool_size));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.request_concurrency, 5);
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.analysis_cache_size, 128);
        ConfigLoader::validate(&config).expect("default config should be valid");
    }

    #[test]
    fn yaml_parsing_overrides_defaults() {
        let yaml = r"
request_concurrency: 20
discovery_concurrency: 15
pool_size: 40
logging:
  level: debug
  format: json
";
        let config: OrchestratorConfig = serde_yaml::from_str(yaml).expect("yaml should parse");
        assert_eq!(config.request_concurrency, 20);
        assert_eq!(config.pool_size, 40);
        assert_eq!(config.logging.level, "debug");
        ConfigLoader::validate(&config).expect("parsed config should be valid");
    }

    #[test]
    fn validate_rejects_zero_request_concurrency() {
        let config = OrchestratorConfig {
            request_concurrency: 0,
            ..Default::default()
        };
        let result = ConfigLoader::validate(&config);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidRequestConcurrency(0)
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = OrchestratorConfig::default();
        config.logging.level = "invalid".to_string();
        let result = ConfigLoader::validate(&config);
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidLogLevel(l) if l == "invalid"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = OrchestratorConfig::default();
        config.logging.format = "xml".to_string();
        let result = ConfigLoader::validate(&config);
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidLogFormat(f) if f == "xml"));
    }

    #[test]
    fn hierarchical_merging_prefers_later_layers() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "request_concurrency: 5\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(
            override_file,
            "request_concurrency: 15\nlogging:\n  level: debug"
        )
        .unwrap();
        override_file.flush().unwrap();

        let config: OrchestratorConfig = Figment::new()
            .merge(Serialized::defaults(OrchestratorConfig::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.request_concurrency, 15, "override should win");
        assert_eq!(config.logging.level, "debug", "override should win for nested fields");
        assert_eq!(
            config.logging.format, "json",
            "base value should persist when not overridden"
        );
    }
}
