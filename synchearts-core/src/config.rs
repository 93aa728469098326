//! Application configuration at ~/.config/synchearts/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_WINDOW_DAYS};
use crate::error::{SyncError, SyncResult};

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("synchearts"))
        .unwrap_or_else(|| PathBuf::from("~/.synchearts"))
}

fn default_window_days() -> usize {
    DEFAULT_WINDOW_DAYS
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Where the local store keeps its files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How many upcoming days are kept populated.
    #[serde(default = "default_window_days")]
    pub window_days: usize,

    /// Polling interval of the HTTP change feed.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Used when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: default_data_dir(),
            window_days: default_window_days(),
            poll_interval_secs: default_poll_interval_secs(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> SyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("synchearts");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, creating a commented default on first run.
    pub fn load() -> SyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> SyncResult<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))?;

        if config.window_days == 0 {
            return Err(SyncError::Config("window_days must be at least 1".into()));
        }

        Ok(config)
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Write a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> SyncResult<()> {
        let contents = format!(
            "\
# SyncHearts configuration

# Where local data lives:
# data_dir = \"{}\"

# How many upcoming days to show and keep populated:
# window_days = {}

# Seconds between remote change checks:
# poll_interval_secs = {}

# Log level when RUST_LOG is not set:
# log_level = \"warn\"
",
            default_data_dir().display(),
            DEFAULT_WINDOW_DAYS,
            DEFAULT_POLL_INTERVAL_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commented_default_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        AppConfig::create_default_config(&path).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"~/couple\"\nwindow_days = 7\npoll_interval_secs = 0\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.window_days, 7);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.data_path().ends_with("couple"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.window_days, DEFAULT_WINDOW_DAYS);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "window_days = 0\n").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(SyncError::Config(_))));
    }
}
