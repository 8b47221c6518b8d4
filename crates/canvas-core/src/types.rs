use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Title the server assigns when a canvas is created without one.
pub const DEFAULT_TITLE: &str = "Untitled Canvas";

/// A server-persisted canvas record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub chat_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub data: CanvasData,
    /// Epoch seconds, set by the server.
    pub created_at: i64,
    /// Epoch seconds, refreshed by the server on every update.
    pub updated_at: i64,
}

impl Canvas {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.updated_at, 0)
    }

    pub fn belongs_to_chat(&self, chat_id: &str) -> bool {
        self.chat_id.as_deref() == Some(chat_id)
    }
}

/// Opaque canvas payload.
///
/// The client never inspects it; whoever owns the payload schema decodes it
/// with [`CanvasData::decode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanvasData(serde_json::Value);

impl CanvasData {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// An empty object, the payload the server stores by default.
    pub fn empty() -> Self {
        Self(serde_json::Value::Object(serde_json::Map::new()))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> crate::error::Result<T> {
        Ok(serde_json::from_value(self.0.clone())?)
    }
}

impl From<serde_json::Value> for CanvasData {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Client-built payload for create and update.
///
/// `chat_id` has three states: `None` leaves it out of the body, `Some(None)`
/// sends an explicit `null`, `Some(Some(id))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasFormData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CanvasData>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub chat_id: Option<Option<String>>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl CanvasFormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<CanvasData>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(Some(chat_id.into()));
        self
    }

    /// Send an explicit `null` chat association.
    pub fn without_chat(mut self) -> Self {
        self.chat_id = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.data.is_none() && self.chat_id.is_none()
    }
}

/// Input to content processing: plain text or a structured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanvasContent {
    Text(String),
    Structured(serde_json::Value),
}

impl From<&str> for CanvasContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CanvasContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for CanvasContent {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

/// Processing command understood by the server.
///
/// Unknown commands are still sent; the server falls back to a generic
/// instruction for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessCommand {
    Summarize,
    Echo,
    ExplainCode,
    Custom(String),
}

impl ProcessCommand {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Summarize => "summarize",
            Self::Echo => "echo",
            Self::ExplainCode => "explain_code",
            Self::Custom(cmd) => cmd,
        }
    }
}

impl From<String> for ProcessCommand {
    fn from(value: String) -> Self {
        match value.as_str() {
            "summarize" => Self::Summarize,
            "echo" => Self::Echo,
            "explain_code" => Self::ExplainCode,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for ProcessCommand {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ProcessCommand> for String {
    fn from(cmd: ProcessCommand) -> Self {
        match cmd {
            ProcessCommand::Custom(cmd) => cmd,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ProcessCommand {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST canvases/{id}/process_content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessContentRequest {
    pub content: CanvasContent,
    pub command: ProcessCommand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedContent {
    pub processed_content: String,
}
