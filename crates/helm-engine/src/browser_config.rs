use crate::storage::{self, BROWSER_CONFIG, Storage};
use helm_common::platform::Platform;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    /// `host:port`
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub platform: Platform,
}

impl BrowserConfig {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            proxy: None,
            extensions: Vec::new(),
            user_agent: platform.default_user_agent().to_string(),
            platform,
        }
    }
}

/// Persisted browser settings: proxy, extensions and user agent.
pub struct BrowserConfigStore {
    config: BrowserConfig,
    storage: Arc<dyn Storage>,
}

impl BrowserConfigStore {
    /// Load saved settings. The detected platform always replaces the saved
    /// tag and seeds the user agent when none was saved.
    pub fn load(storage: Arc<dyn Storage>, platform: Platform) -> Self {
        let config = match storage::load_json::<BrowserConfig>(&*storage, BROWSER_CONFIG) {
            Some(mut config) => {
                config.platform = platform;
                if config.user_agent.trim().is_empty() {
                    config.user_agent = platform.default_user_agent().to_string();
                }
                config
            }
            None => BrowserConfig::for_platform(platform),
        };
        Self { config, storage }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.config.platform
    }

    pub fn set_proxy(&mut self, proxy: Option<String>) {
        match &proxy {
            Some(address) => info!("Proxy set to {}", address),
            None => info!("Proxy cleared"),
        }
        self.config.proxy = proxy;
        self.persist();
    }

    /// Returns false when the extension was already installed.
    pub fn install_extension(&mut self, name: &str) -> bool {
        if self.has_extension(name) {
            return false;
        }
        self.config.extensions.push(name.to_string());
        self.persist();
        true
    }

    /// Returns false when no extension with that name was installed.
    pub fn remove_extension(&mut self, name: &str) -> bool {
        let before = self.config.extensions.len();
        self.config
            .extensions
            .retain(|ext| !ext.eq_ignore_ascii_case(name));
        let removed = self.config.extensions.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.config
            .extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(name))
    }

    fn persist(&self) {
        storage::persist(&*self.storage, BROWSER_CONFIG, &self.config);
    }
}
