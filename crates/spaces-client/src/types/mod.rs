//! Domain types shared by the REST helpers, the transport and the session.

mod channel;
mod message;
mod profile;

pub use channel::{ChannelKind, ChannelRef};
pub use message::{ChatMessage, SenderInfo, SpaceInfo};
pub use profile::{OAuthTokens, SpaceDetails, UserProfile};
