//! Application configuration: an optional TOML file, then command-line
//! overrides on top.
//!
//! ```toml
//! schema = "schema/body_shop.toml"
//!
//! [transport]
//! backend = "outbox"
//! target = "./outbox"
//!
//! [submit]
//! timeout_secs = 30
//! max_attempts = 3
//! backoff_ms = 500
//!
//! [logging]
//! level = "info"
//! file = "estimate-form.log"
//! stdout = true
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use estimate_core::{SubmitPolicy, transport::TransportConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmitSettings {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        let policy = SubmitPolicy::default();
        Self {
            timeout_secs: policy.timeout.as_secs(),
            max_attempts: policy.max_attempts,
            backoff_ms: policy.backoff.as_millis() as u64,
        }
    }
}

impl SubmitSettings {
    pub fn policy(&self) -> SubmitPolicy {
        SubmitPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    /// Also append log records to this file.
    pub file: Option<PathBuf>,
    pub stdout: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            stdout: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub submit: SubmitSettings,
    pub logging: LoggingSettings,
    /// Form layout; the built-in auto-body schema when absent.
    pub schema: Option<PathBuf>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub schema: Option<PathBuf>,
    pub backend: Option<String>,
    pub target: Option<String>,
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Reads `path`. Relative `schema` and `logging.file` paths are taken
    /// relative to the directory holding the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            config.schema = config.schema.map(|p| resolve(base, p));
            config.logging.file = config.logging.file.map(|p| resolve(base, p));
        }
        Ok(config)
    }

    /// The file at `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn apply(
        &mut self,
        overrides: Overrides,
    ) {
        if let Some(schema) = overrides.schema {
            self.schema = Some(schema);
        }
        if let Some(backend) = overrides.backend {
            self.transport.backend = backend;
        }
        if let Some(target) = overrides.target {
            self.transport.target = target;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }
}

fn resolve(
    base: &Path,
    path: PathBuf,
) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.transport.backend, "simulated");
        assert_eq!(config.submit.policy(), SubmitPolicy::default());
        assert!(config.logging.stdout);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [submit]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.submit.max_attempts, 3);
        assert_eq!(config.submit.timeout_secs, 30);
        assert_eq!(config.submit.policy().backoff, Duration::from_millis(500));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
            [submit]
            retries = 3
            "#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = AppConfig::from_toml_str(
            r#"
            [transport]
            backend = "outbox"
            target = "./outbox"
            "#,
        )
        .unwrap();

        config.apply(Overrides {
            target: Some("/tmp/estimates".to_string()),
            log_level: Some("debug".to_string()),
            ..Overrides::default()
        });

        assert_eq!(config.transport.backend, "outbox");
        assert_eq!(config.transport.target, "/tmp/estimates");
        assert_eq!(config.logging.level, "debug");
    }
}
