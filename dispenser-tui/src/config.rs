//! Configuration loading for the dispenser TUI.
//!
//! The config file is optional. Without `--config` or `DISPENSER_TUI_CONFIG`
//! every field takes its default; with a file, omitted fields do too.

use dispenser_core::{DispenserConfig, StaticCredentials, UserId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::theme::Theme;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    /// LMDB environment directory.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,
    /// Log file; the terminal itself is owned by the UI.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    /// `EnvFilter` directives. `RUST_LOG` wins when set.
    #[serde(default)]
    pub log_filter: Option<String>,
    /// How often the UI checks for a new day while idle.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Ledger settings. Without a `[ledger]` section they come from the
    /// `DISPENSER_*` environment variables. With one, the file is
    /// authoritative: fields it omits take the built-in defaults and the
    /// environment is not consulted.
    #[serde(default = "DispenserConfig::from_env")]
    pub ledger: DispenserConfig,
    /// Accounts allowed to log in. Empty means the two demo accounts.
    #[serde(default)]
    pub credentials: Vec<CredentialConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "synthbrute".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            map_size_mb: default_map_size_mb(),
            log_path: default_log_path(),
            log_filter: None,
            refresh_interval_ms: default_refresh_interval_ms(),
            theme: ThemeConfig::default(),
            ledger: DispenserConfig::from_env(),
            credentials: Vec::new(),
        }
    }
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let config = match path {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.map_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "map_size_mb",
                reason: "must be > 0".to_string(),
            });
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if Theme::by_name(&self.theme.name).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: format!(
                    "unknown theme '{}', expected one of: {}",
                    self.theme.name,
                    Theme::NAMES.join(", ")
                ),
            });
        }
        if let Err(e) = self.ledger.validate() {
            return Err(ConfigError::InvalidValue {
                field: "ledger",
                reason: e.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &self.credentials {
            if let Err(e) = UserId::parse(&entry.username) {
                return Err(ConfigError::InvalidValue {
                    field: "credentials.username",
                    reason: e.to_string(),
                });
            }
            if entry.password.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "credentials.password",
                    reason: format!("empty password for '{}'", entry.username.trim()),
                });
            }
            if !seen.insert(entry.username.trim()) {
                return Err(ConfigError::InvalidValue {
                    field: "credentials.username",
                    reason: format!("duplicate user '{}'", entry.username.trim()),
                });
            }
        }
        Ok(())
    }

    /// Credential table for the login view.
    pub fn credentials(&self) -> StaticCredentials {
        if self.credentials.is_empty() {
            return StaticCredentials::demo();
        }
        self.credentials
            .iter()
            .map(|c| (c.username.trim().to_string(), c.password.trim().to_string()))
            .collect()
    }

    /// Theme selected by name, falling back to the default palette.
    pub fn theme(&self) -> Theme {
        Theme::by_name(&self.theme.name).unwrap_or_default()
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("dispenser-data")
}

fn default_map_size_mb() -> usize {
    16
}

fn default_log_path() -> PathBuf {
    PathBuf::from("dispenser.log")
}

fn default_refresh_interval_ms() -> u64 {
    1_000
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("DISPENSER_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
