//! Protocol constants for the Spaces real-time service.

/// Namespace that carries all chat traffic.
pub const CHAT_NAMESPACE: &str = "/chat";

/// Root Socket.IO namespace.
pub const ROOT_NAMESPACE: &str = "/";

/// Event names on the chat namespace.
pub mod events {
    pub const CONNECT: &str = "connect";
    pub const CONNECT_ERROR: &str = "connect_error";

    // Inbound
    pub const CHANNEL_SUBSCRIBED: &str = "CHANNEL_SUBSCRIBED";
    pub const MESSAGE_SENT: &str = "MESSAGE_SENT";

    // Outbound
    pub const SUBSCRIBE_CHANNEL: &str = "SUBSCRIBE_CHANNEL";
    pub const UNSUBSCRIBE_CHANNEL: &str = "UNSUBSCRIBE_CHANNEL";
    pub const SEND_MESSAGE: &str = "SEND_MESSAGE";
}

/// Message category of ordinary chat text.
pub const CATEGORY_CHAT: &str = "chat";

/// Channel type used for group spaces.
pub const CHANNEL_TYPE_TOPIC: &str = "topic";

/// Sender type of a user-authored message.
pub const SENDER_TYPE_USER: &str = "user";
