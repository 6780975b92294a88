use crate::bridge::BridgeSettings;
use crate::gesture::ClassifierSettings;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};

const CONFIG_DIR: &str = ".gesturecontrol";
const CONFIG_FILE: &str = "config.toml";

/// Application config, one TOML file with a section per subsystem.
/// Missing keys fall back to their defaults.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// trace, debug, info, warn or error
    pub log_level: String,
    pub classifier: ClassifierSettings,
    pub bridge: BridgeSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            classifier: ClassifierSettings::default(),
            bridge: BridgeSettings::default(),
        }
    }
}

impl AppConfig {
    /// `~/.gesturecontrol/config.toml`
    pub fn default_path() -> PathBuf {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Loads and validates the config. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file: {}", e))?;

        let config = Self::from_toml(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| eyre!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| eyre!("Failed to serialize config: {}", e))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| eyre!("Failed to write config file: {}", e))?;

        debug!("Config written to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.log_level()?;
        self.classifier
            .validate()
            .map_err(|e| eyre!("Invalid classifier config: {}", e))?;
        self.bridge
            .validate()
            .map_err(|e| eyre!("Invalid bridge config: {}", e))?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<Level> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| eyre!("Unknown log level: {}", self.log_level))
    }
}

/// Writes the default config if there is none at `path` yet.
/// Returns `true` if a file was created.
pub async fn ensure_default_config(path: &Path) -> Result<bool> {
    if tokio::fs::try_exists(path)
        .await
        .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
    {
        return Ok(false);
    }

    info!("Creating default configuration at {}", path.display());
    AppConfig::default().save(path).await?;
    Ok(true)
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("gesturecontrol-{}-{}", name, std::process::id()));
        path.push(CONFIG_FILE);
        path
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "debug"

            [classifier]
            smoothing_window = 7

            [bridge]
            hand_timeout_ms = 3000
            "#,
        )
        .expect("valid config");

        assert_eq!(config.log_level().expect("level"), Level::DEBUG);
        assert_eq!(config.classifier.smoothing_window, 7);
        assert_eq!(config.classifier.zoom_dist_rate_min, 0.015);
        assert_eq!(config.bridge.hand_timeout_ms, 3000);
        assert_eq!(config.bridge.heartbeat_interval_ms, 500);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(AppConfig::from_toml("log_level = \"loud\"").is_err());
        assert!(AppConfig::from_toml("[classifier]\nsmoothing_window = 1").is_err());
        assert!(AppConfig::from_toml("[bridge]\nheartbeat_interval_ms = 0").is_err());
        assert!(AppConfig::from_toml("classifier = 3").is_err());
    }

    #[test]
    fn test_default_path() {
        let path = AppConfig::default_path();
        assert!(path.ends_with(".gesturecontrol/config.toml"));
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let path = scratch_path("missing");
        let config = AppConfig::load(&path).await.expect("defaults");
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_ensure_default_config_writes_once() {
        let path = scratch_path("ensure");
        let _ = tokio::fs::remove_file(&path).await;

        assert!(ensure_default_config(&path).await.expect("created"));
        assert!(!ensure_default_config(&path).await.expect("exists"));

        let loaded = AppConfig::load(&path).await.expect("load");
        assert_eq!(loaded, AppConfig::default());

        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }
}
