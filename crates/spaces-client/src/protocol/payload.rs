//! JSON payloads of the chat namespace events.

use crate::error::{Result, SpacesError};
use crate::protocol::constants::{CATEGORY_CHAT, SENDER_TYPE_USER};
use crate::types::{ChannelRef, ChatMessage, SenderInfo, SpaceInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel as addressed by `SUBSCRIBE_CHANNEL` / `UNSUBSCRIBE_CHANNEL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPayload {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ChannelPayload {
    pub fn new(channel: &ChannelRef, password: Option<&str>) -> Self {
        Self {
            id: channel.id.clone(),
            kind: channel.kind.as_str().to_string(),
            password: password.map(str::to_string),
        }
    }
}

/// Body of `SUBSCRIBE_CHANNEL` and `UNSUBSCRIBE_CHANNEL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeChannelPayload {
    pub channel: ChannelPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "bodyText")]
    pub body_text: String,
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of `SEND_MESSAGE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub content: MessageContent,
    pub sender: SenderRef,
    pub topic_id: String,
    pub category: String,
}

impl SendMessagePayload {
    pub fn chat(text: &str, channel: &ChannelRef, sender_id: &str) -> Self {
        Self {
            content: MessageContent {
                body_text: text.to_string(),
                data: Vec::new(),
            },
            sender: SenderRef {
                id: sender_id.to_string(),
                kind: SENDER_TYPE_USER.to_string(),
            },
            topic_id: channel.id.clone(),
            category: CATEGORY_CHAT.to_string(),
        }
    }
}

fn required_str<'a>(payload: &'a Value, pointer: &str) -> Result<&'a str> {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| SpacesError::MalformedEvent(format!("MESSAGE_SENT is missing {}", pointer)))
}

/// Translate a `MESSAGE_SENT` payload.
///
/// Returns `Ok(None)` for categories other than chat, and `MalformedEvent`
/// when a chat message lacks one of the fields listeners rely on.
pub fn parse_message_sent(payload: &Value) -> Result<Option<ChatMessage>> {
    let category = required_str(payload, "/category")?;
    if category != CATEGORY_CHAT {
        return Ok(None);
    }

    let body_text = required_str(payload, "/content/bodyText")?.to_string();
    let sender_value = payload
        .get("sender")
        .ok_or_else(|| SpacesError::MalformedEvent("MESSAGE_SENT is missing /sender".to_string()))?;
    let sender: SenderInfo = serde_json::from_value(sender_value.clone())
        .map_err(|e| SpacesError::MalformedEvent(format!("invalid sender: {}", e)))?;
    let space = SpaceInfo {
        id: required_str(payload, "/topicId")?.to_string(),
        title: required_str(payload, "/topicTitle")?.to_string(),
        kind: required_str(payload, "/topicType")?.to_string(),
    };

    Ok(Some(ChatMessage {
        body_text,
        sender,
        space,
    }))
}
