use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// Generate an identifier for actions, tasks and sessions.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The kind of synthetic browser step an action describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[serde(rename = "navigation")]
    Navigate,
    Click,
    Input,
    Extract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Active,
    #[default]
    Completed,
    Error,
}

/// One step of an action trace.
///
/// Actions are produced by the intent resolver or the task scheduler and are
/// never mutated once handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserAction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub description: String,
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl BrowserAction {
    pub fn new(kind: ActionKind, description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            kind,
            description: description.into(),
            status: ActionStatus::Completed,
            details: None,
            timestamp: at,
        }
    }

    pub fn navigate(description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(ActionKind::Navigate, description, at)
    }

    pub fn click(description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(ActionKind::Click, description, at)
    }

    pub fn input(description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(ActionKind::Input, description, at)
    }

    pub fn extract(description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(ActionKind::Extract, description, at)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.status = status;
        self
    }
}

/// Shape of an extracted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Table,
    Json,
    Link,
    #[default]
    Text,
}

impl DataKind {
    /// Map a command keyword onto a data kind. Plurals are accepted.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "table" | "tables" => Some(Self::Table),
            "json" => Some(Self::Json),
            "link" | "links" => Some(Self::Link),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Link => "link",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    #[serde(rename = "type")]
    pub kind: DataKind,
    pub content: Value,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl ExtractedData {
    pub fn new(kind: DataKind, content: Value, source: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            content,
            source: source.into(),
            timestamp: at,
        }
    }

    /// The record as it is cached in the conversation context.
    pub fn to_value(&self) -> Value {
        json!({
            "type": self.kind,
            "content": self.content,
            "source": self.source,
            "timestamp": self.timestamp,
        })
    }

    /// Read a cached record back. Values that are not records are wrapped
    /// as JSON content labelled with `source`.
    pub fn from_cached(value: &Value, source: &str, at: DateTime<Utc>) -> Self {
        serde_json::from_value(value.clone())
            .unwrap_or_else(|_| Self::new(DataKind::Json, value.clone(), source, at))
    }

    /// Number of entries in the payload: rows, links or keys. Plain text counts as one.
    pub fn entry_count(&self) -> usize {
        match &self.content {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            Value::Null => 0,
            _ => 1,
        }
    }
}

/// What a single command hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub response: String,
    pub actions: Vec<BrowserAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_url: Option<String>,
    #[serde(default)]
    pub extracted_data: Vec<ExtractedData>,
}
