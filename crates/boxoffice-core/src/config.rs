//! Configuration loading and typed config structures for the box office.
//!
//! The canonical configuration lives in `boxoffice.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and
//! provides a loader that reads the file and applies environment overrides.

use std::path::{Path, PathBuf};

use boxoffice_types::AccountId;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {message}")]
    InvalidOverride {
        /// The environment variable name.
        var: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// No registry owner was configured.
    #[error("registry.owner is required (or set BOXOFFICE_OWNER)")]
    MissingOwner,
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `boxoffice.yaml`. Every section has defaults
/// except the registry owner, which must come from the file or the
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Registry settings (the privileged owner).
    #[serde(default)]
    pub registry: RegistryConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Snapshot persistence.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `BOXOFFICE_OWNER` overrides `registry.owner`
    /// - `BOXOFFICE_HOST` overrides `http.host`
    /// - `BOXOFFICE_PORT` overrides `http.port`
    /// - `BOXOFFICE_SNAPSHOT_PATH` overrides `persistence.snapshot_path`
    /// - `BOXOFFICE_LOG_FORMAT` overrides `logging.format`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if a set variable does not
    /// parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if a present value does not
    /// parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("BOXOFFICE_OWNER") {
            let owner = val.parse().map_err(|e: uuid::Error| ConfigError::InvalidOverride {
                var: "BOXOFFICE_OWNER",
                message: e.to_string(),
            })?;
            self.registry.owner = Some(owner);
        }
        if let Some(val) = lookup("BOXOFFICE_HOST") {
            self.http.host = val;
        }
        if let Some(val) = lookup("BOXOFFICE_PORT") {
            self.http.port = val.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidOverride {
                    var: "BOXOFFICE_PORT",
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(val) = lookup("BOXOFFICE_SNAPSHOT_PATH") {
            self.persistence.snapshot_path = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
        if let Some(val) = lookup("BOXOFFICE_LOG_FORMAT") {
            self.logging.format = match val.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                other => {
                    return Err(ConfigError::InvalidOverride {
                        var: "BOXOFFICE_LOG_FORMAT",
                        message: format!("expected `pretty` or `json`, got `{other}`"),
                    });
                }
            };
        }
        Ok(())
    }

    /// Return the configured registry owner.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingOwner`] if none was configured.
    pub fn owner(&self) -> Result<AccountId, ConfigError> {
        self.registry.owner.ok_or(ConfigError::MissingOwner)
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    /// The single privileged identity allowed to create events and
    /// withdraw funds. Fixed for the lifetime of the process.
    #[serde(default)]
    pub owner: Option<AccountId>,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for terminals.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error). `RUST_LOG`
    /// takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Where the registry snapshot is read at startup and written at
    /// shutdown. `None` keeps the registry in memory only.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn parse_without_env(yaml: &str) -> ServiceConfig {
        let mut config: ServiceConfig = serde_yml::from_str(yaml).unwrap();
        config.apply_overrides(no_env).unwrap();
        config
    }

    #[test]
    fn default_config_has_no_owner() {
        let config = ServiceConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.persistence.snapshot_path.is_none());
        assert!(matches!(config.owner(), Err(ConfigError::MissingOwner)));
    }

    #[test]
    fn parse_full_yaml() {
        let owner = AccountId::new();
        let yaml = format!(
            r#"
registry:
  owner: "{owner}"

http:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
  format: json

persistence:
  snapshot_path: "/var/lib/boxoffice/state.json"
"#
        );

        let config = parse_without_env(&yaml);

        assert_eq!(config.owner().ok(), Some(owner));
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.persistence.snapshot_path,
            Some(PathBuf::from("/var/lib/boxoffice/state.json"))
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = parse_without_env("http:\n  port: 7000\n");

        assert_eq!(config.http.port, 7000);
        // Everything else uses defaults
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_rejects_malformed_owner() {
        let result: Result<ServiceConfig, _> =
            serde_yml::from_str("registry:\n  owner: \"nope\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn overrides_replace_yaml_values() {
        let owner = AccountId::new();
        let owner_str = owner.to_string();
        let mut config = ServiceConfig::default();

        let result = config.apply_overrides(|var| match var {
            "BOXOFFICE_OWNER" => Some(owner_str.clone()),
            "BOXOFFICE_HOST" => Some("10.0.0.5".to_owned()),
            "BOXOFFICE_PORT" => Some("8181".to_owned()),
            "BOXOFFICE_SNAPSHOT_PATH" => Some("state.json".to_owned()),
            "BOXOFFICE_LOG_FORMAT" => Some("JSON".to_owned()),
            _ => None,
        });

        assert!(result.is_ok());
        assert_eq!(config.owner().ok(), Some(owner));
        assert_eq!(config.http.host, "10.0.0.5");
        assert_eq!(config.http.port, 8181);
        assert_eq!(config.persistence.snapshot_path, Some(PathBuf::from("state.json")));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn empty_snapshot_override_disables_persistence() {
        let mut config = parse_without_env("persistence:\n  snapshot_path: \"a.json\"\n");
        let result = config.apply_overrides(|var| {
            (var == "BOXOFFICE_SNAPSHOT_PATH").then(String::new)
        });
        assert!(result.is_ok());
        assert!(config.persistence.snapshot_path.is_none());
    }

    #[test]
    fn invalid_port_override_is_rejected() {
        let mut config = ServiceConfig::default();
        let result = config.apply_overrides(|var| {
            (var == "BOXOFFICE_PORT").then(|| "eighty".to_owned())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOverride {
                var: "BOXOFFICE_PORT",
                ..
            })
        ));
    }

    #[test]
    fn invalid_log_format_override_is_rejected() {
        let mut config = ServiceConfig::default();
        let result = config.apply_overrides(|var| {
            (var == "BOXOFFICE_LOG_FORMAT").then(|| "xml".to_owned())
        });
        assert!(result.is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("boxoffice.yaml");
        if path.exists() {
            let config = ServiceConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
