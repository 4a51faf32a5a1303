//! Protocol-level types for the Spaces real-time service.
//!
//! The service speaks Socket.IO over a raw WebSocket. Each text frame is an
//! Engine.IO packet; Engine.IO `message` packets carry Socket.IO packets, and
//! the chat traffic lives on the `/chat` namespace.

pub mod constants;
pub mod packet;
pub mod payload;

pub use constants::*;
pub use packet::{EngineIoVersion, EnginePacket, Handshake, SocketPacket};
pub use payload::{
    parse_message_sent, ChannelPayload, MessageContent, SendMessagePayload, SenderRef,
    SubscribeChannelPayload,
};
