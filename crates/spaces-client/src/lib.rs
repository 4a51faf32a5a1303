//! spaces-client: client library for the Spaces chat service.
//!
//! - **auth**: guest and OAuth2 credentials, identities and login.
//! - **network**: REST helpers over reqwest and the WebSocket connector.
//! - **protocol**: Engine.IO / Socket.IO framing and the chat event payloads.
//! - **realtime**: the `/chat` channel transport.
//! - **session**: start, enter a group space, send, stop.
//!
//! ```no_run
//! use spaces_client::{chat_listener, ClientConfig, Identity, Session};
//!
//! # async fn run() -> spaces_client::Result<()> {
//! let mut session = Session::new(Identity::guest("Bot"), ClientConfig::default())?;
//! session.login().await?;
//! session.add_chat_listener(chat_listener(|m| {
//!     println!("{}: {}", m.sender.name(), m.body_text);
//! }));
//! session.start().await?;
//! session.enter_group_space("5a1f...").await?;
//! session.send_group_chat_message("hello").await?;
//! session.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod listeners;
pub mod network;
pub mod protocol;
pub mod realtime;
pub mod session;
pub mod traits;
pub mod types;

pub use auth::{Credential, Identity, IdentityKind, TokenType};
pub use config::ClientConfig;
pub use error::{Result, SpacesError};
pub use listeners::{chat_listener, ChatListener, ListenerRegistry};
pub use network::{HttpApi, WebSocketConnector};
pub use protocol::EngineIoVersion;
pub use realtime::{ChatHandler, RealtimeTransport, TransportState};
pub use session::Session;
pub use traits::{OAuthClientCredentials, SocketConnector, SocketLink, SpacesApi};
pub use types::{
    ChannelKind, ChannelRef, ChatMessage, OAuthTokens, SenderInfo, SpaceDetails, SpaceInfo,
    UserProfile,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
