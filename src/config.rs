use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::db::default_db_path;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub storage: Option<StorageConfig>,
    pub display: Option<DisplayConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    /// Hide the "Completed" section in the TUI.
    pub hide_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw).with_context(|| format!("invalid config at {}", path.display()))
        } else {
            Ok(AppConfig::default())
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage.as_ref()
            .and_then(|s| s.db_path.clone())
            .unwrap_or_else(default_db_path)
    }

    pub fn hide_completed(&self) -> bool {
        self.display.as_ref().and_then(|d| d.hide_completed).unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.logging.as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasktracker")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(!cfg.hide_completed());
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.db_path(), default_db_path());
    }

    #[test]
    fn reads_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, r#"
            [storage]
            db_path = "/tmp/tasks.db"

            [display]
            hide_completed = true

            [logging]
            level = "debug"
        "#).unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/tasks.db"));
        assert!(cfg.hide_completed());
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn partial_sections_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\n").unwrap();
        let cfg = AppConfig::load_from(&path).unwrap();
        assert!(!cfg.hide_completed());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display\nhide_completed = ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }
}
