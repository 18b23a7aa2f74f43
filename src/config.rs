use std::path::{Path, PathBuf};

use directories::BaseDirs;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::Locale;
use crate::db::DATA_DIR_NAME;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BANDSCHED_CONFIG";
/// Prefix for per-key overrides, e.g. `BANDSCHED_STORAGE__BACKEND=local`.
pub const ENV_PREFIX: &str = "BANDSCHED_";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "band-schedule.log";
/// Months of Sundays seeded into an empty schedule collection.
pub const DEFAULT_SEED_MONTHS: u32 = 4;

#[derive(Debug, Error)]
#[error("Config error: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

/// Top-level config (config.toml + BANDSCHED_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Embedded relational store.
    #[default]
    Sqlite,
    /// Single JSON document.
    Local,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Overrides the file inside the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_seed_months")]
    pub seed_months: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            seed_months: DEFAULT_SEED_MONTHS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| data_dir().join(LOG_FILE_NAME))
    }
}

fn default_seed_months() -> u32 {
    DEFAULT_SEED_MONTHS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

/// `BANDSCHED_CONFIG` when set, otherwise `~/.band-schedule-manager/config.toml`.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Load config from a TOML file with `BANDSCHED_*` env var overrides. A
    /// missing file simply yields the defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|err| ConfigError(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.schedule.seed_months, DEFAULT_SEED_MONTHS);
        assert_eq!(config.display.locale, Locale::Es);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
            [storage]
            backend = "local"
            path = "/tmp/band.json"

            [schedule]
            seed_months = 2

            [display]
            locale = "en"
            "#,
        )
        .unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/band.json")));
        assert_eq!(config.schedule.seed_months, 2);
        assert_eq!(config.display.locale, Locale::En);
    }

    #[test]
    fn invalid_backend_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[storage]\nbackend = \"postgres\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
