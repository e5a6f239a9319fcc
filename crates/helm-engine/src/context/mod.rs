//! Conversational memory carried across commands.

pub mod extracted;
pub mod store;

pub use extracted::ExtractedDataMap;
pub use store::ContextStore;

use chrono::{DateTime, Utc};
use helm_common::protocol::new_id;
use serde::{Deserialize, Serialize};

/// Cap on `recent_topics` and `previous_commands`.
pub const MAX_HISTORY: usize = 10;

pub const DEFAULT_SEARCH_ENGINE: &str = "google";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    /// Most recent first, no duplicates.
    #[serde(default)]
    pub recent_topics: Vec<String>,
    /// Most recent first.
    #[serde(default)]
    pub previous_commands: Vec<String>,
    #[serde(default)]
    pub extracted_data: ExtractedDataMap,
    pub session: SessionInfo,
    #[serde(default)]
    pub preferences: UserPreferences,
}

impl ConversationContext {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            recent_topics: Vec::new(),
            previous_commands: Vec::new(),
            extracted_data: ExtractedDataMap::new(),
            session: SessionInfo::fresh(at),
            preferences: UserPreferences::default(),
        }
    }

    pub fn current_site(&self) -> Option<&str> {
        self.session.current_site.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub start_time: DateTime<Utc>,
    pub session_id: String,
    #[serde(default)]
    pub current_site: Option<String>,
}

impl SessionInfo {
    pub fn fresh(at: DateTime<Utc>) -> Self {
        Self {
            start_time: at,
            session_id: new_id(),
            current_site: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default = "default_search_engine")]
    pub default_search_engine: String,
    /// Insertion ordered, no duplicates.
    #[serde(default)]
    pub favorite_sites: Vec<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_search_engine: default_search_engine(),
            favorite_sites: Vec::new(),
        }
    }
}

fn default_search_engine() -> String {
    DEFAULT_SEARCH_ENGINE.to_string()
}

/// A single preference write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preference {
    DefaultSearchEngine(String),
}
