//! Application configuration
//!
//! Sources, in priority order: built-in defaults, then the first
//! config file found (`./.usher.json`, `./usher.json`,
//! `<config_dir>/usher/usher.json`), then `USHER_*` environment
//! variables. CLI flags are applied on top by the CLI layer.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme name ("dark" or "light")
    pub theme: String,

    /// Event-loop tick interval in milliseconds
    pub tick_rate_ms: u64,

    /// Whether mouse capture is enabled
    pub mouse_enabled: bool,

    /// Whether open dialogs dim the rest of the screen
    pub dim_background: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            tick_rate_ms: 100,
            mouse_enabled: true,
            dim_background: true,
        }
    }
}

impl Config {
    /// Initialize configuration from defaults, files, and environment
    pub async fn init() -> Result<Self> {
        debug!("initializing configuration");

        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path).await?;
                debug!(path = %path.display(), "loaded config file");
                break;
            }
        }

        config.load_from_env();
        Ok(config)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./.usher.json"), PathBuf::from("./usher.json")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("usher").join("usher.json"));
        }
        paths
    }

    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply `USHER_*` environment variable overrides
    pub fn load_from_env(&mut self) {
        if let Ok(theme) = std::env::var("USHER_THEME") {
            self.theme = theme;
        }
        if let Ok(tick) = std::env::var("USHER_TICK_RATE_MS") {
            if let Ok(tick) = tick.parse() {
                self.tick_rate_ms = tick;
            }
        }
        if let Ok(mouse) = std::env::var("USHER_MOUSE") {
            self.mouse_enabled = mouse.to_lowercase() == "true" || mouse == "1";
        }
        if let Ok(dim) = std::env::var("USHER_DIM_BACKGROUND") {
            self.dim_background = dim.to_lowercase() == "true" || dim == "1";
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !matches!(self.theme.as_str(), "dark" | "light") {
            anyhow::bail!("unknown theme '{}' (expected 'dark' or 'light')", self.theme);
        }
        if self.tick_rate_ms == 0 {
            anyhow::bail!("tick_rate_ms must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.theme, "dark");
        assert_eq!(config.tick_rate_ms, 100);
        assert!(config.mouse_enabled);
    }

    #[tokio::test]
    async fn test_load_from_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"theme": "light", "tick_rate_ms": 50}}"#).unwrap();

        let config = Config::load_from_file(file.path()).await.unwrap();
        assert_eq!(config.theme, "light");
        assert_eq!(config.tick_rate_ms, 50);
        // Unspecified fields keep their defaults
        assert!(config.mouse_enabled);
        assert!(config.dim_background);
    }

    #[tokio::test]
    async fn test_load_from_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(Config::load_from_file(file.path()).await.is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        std::env::set_var("USHER_THEME", "light");
        std::env::set_var("USHER_TICK_RATE_MS", "25");

        let mut config = Config::default();
        config.load_from_env();

        std::env::remove_var("USHER_THEME");
        std::env::remove_var("USHER_TICK_RATE_MS");

        assert_eq!(config.theme, "light");
        assert_eq!(config.tick_rate_ms, 25);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            theme: "solarized".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            tick_rate_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
