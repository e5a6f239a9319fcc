use crate::executor::ExecutorOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HelmConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".helm").join("state"),
        None => PathBuf::from("./.helm/state"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}

impl ExecutorConfig {
    pub fn options(&self) -> ExecutorOptions {
        ExecutorOptions {
            latency: Duration::from_millis(self.latency_ms),
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
        }
    }
}

fn default_latency_ms() -> u64 {
    2000
}

fn default_reveal_delay_ms() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
        }
    }
}

fn default_scheduler_enabled() -> bool {
    true
}
