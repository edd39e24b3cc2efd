//! ---
//! mc_section: "07-runner-configuration"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Runner configuration and tracing bootstrap shared by binaries."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::logging::LogFormat;

fn default_log_filter() -> String {
    "info".to_owned()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_specification_exit_code() -> i32 {
    2
}

fn default_runtime_exit_code() -> i32 {
    1
}

/// Settings for the `modcon` runner, read from an optional TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exit_codes: ExitCodes,
}

/// Metadata describing where a [`RunnerConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedRunnerConfig {
    pub config: RunnerConfig,
    /// `None` when no file was found and defaults apply.
    pub source: Option<PathBuf>,
}

impl RunnerConfig {
    pub const ENV_CONFIG_PATH: &'static str = "MODCON_CONFIG";

    /// Load configuration, preferring `MODCON_CONFIG`, then the first existing
    /// candidate, then built-in defaults.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedRunnerConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedRunnerConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedRunnerConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!("no runner configuration file found; using defaults");
        Ok(LoadedRunnerConfig {
            config: RunnerConfig::default(),
            source: None,
        })
    }

    /// Load configuration from a specific file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading runner configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<RunnerConfig>()
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.exit_codes.validate()
    }
}

impl std::str::FromStr for RunnerConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: RunnerConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log file; file logging is off when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Default filter directive when neither `MODCON_LOG` nor `RUST_LOG` is set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            format: default_log_format(),
            filter: default_log_filter(),
            file_prefix: None,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        EnvFilter::try_new(&self.filter)
            .map(|_| ())
            .map_err(|err| anyhow!("invalid logging filter '{}': {}", self.filter, err))
    }
}

/// Process exit statuses reported for failed runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExitCodes {
    /// Malformed specification, unknown implementation, unknown command.
    #[serde(default = "default_specification_exit_code")]
    pub specification: i32,
    /// Failures raised by modules or commands while running.
    #[serde(default = "default_runtime_exit_code")]
    pub runtime: i32,
}

impl Default for ExitCodes {
    fn default() -> Self {
        Self {
            specification: default_specification_exit_code(),
            runtime: default_runtime_exit_code(),
        }
    }
}

impl ExitCodes {
    pub fn validate(&self) -> Result<()> {
        if self.specification == 0 || self.runtime == 0 {
            return Err(anyhow!("exit codes for failed runs must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: RunnerConfig = "".parse().unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.exit_codes.specification, 2);
        assert_eq!(config.exit_codes.runtime, 1);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parses_logging_and_exit_codes() {
        let config: RunnerConfig = r#"
            [logging]
            directory = "target/modcon-logs"
            format = "structured-json"
            filter = "debug,modcon_core=trace"

            [exit_codes]
            runtime = 70
        "#
        .parse()
        .unwrap();
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
        assert_eq!(
            config.logging.directory.as_deref(),
            Some(Path::new("target/modcon-logs"))
        );
        assert_eq!(config.exit_codes.runtime, 70);
        assert_eq!(config.exit_codes.specification, 2);
    }

    #[test]
    fn rejects_zero_exit_codes() {
        let err = "[exit_codes]\nruntime = 0".parse::<RunnerConfig>().unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }
}
