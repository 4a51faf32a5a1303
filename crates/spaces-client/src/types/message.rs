//! Inbound chat message DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat message received on a subscribed channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// HTML text of the message.
    pub body_text: String,
    pub sender: SenderInfo,
    pub space: SpaceInfo,
}

/// Author of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderInfo {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "displayname", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Remaining sender fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SenderInfo {
    /// Display name, falling back to the id.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// The space a chat message was posted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}
