use super::schema::HelmConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./helm.yaml
    /// 2. ~/.helm/config.yaml
    /// 3. Default configuration
    ///
    /// A file that cannot be read or parsed is logged and replaced by defaults.
    pub async fn load_default() -> HelmConfig {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path).await,
            None => HelmConfig::default(),
        }
    }

    /// First config file that exists in the default locations.
    pub fn default_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("./helm.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?.join(".helm").join("config.yaml");
        home_config.exists().then_some(home_config)
    }

    pub async fn load_from(path: &Path) -> Result<HelmConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: HelmConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub async fn load_or_default(path: &Path) -> HelmConfig {
        match Self::load_from(path).await {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), "Using default configuration: {}", e);
                HelmConfig::default()
            }
        }
    }
}
