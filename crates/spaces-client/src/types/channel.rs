//! Addressing of group channels.

use crate::protocol::CHANNEL_TYPE_TOPIC;
use std::fmt;

/// Kind of channel a payload is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelKind {
    /// A group space.
    #[default]
    Topic,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Topic => CHANNEL_TYPE_TOPIC,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a channel by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelRef {
    pub id: String,
    pub kind: ChannelKind,
}

impl ChannelRef {
    pub fn topic(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ChannelKind::Topic,
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
