use crate::error::Result;
use crate::types::{OAuthTokens, SpaceDetails, UserProfile};
use async_trait::async_trait;

/// OAuth2 client registration used for the refresh grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Abstraction for the Spaces REST calls.
///
/// `authorization` is the full `Authorization` header value, scheme included.
#[async_trait]
pub trait SpacesApi: Send + Sync + 'static {
    /// Issue a guest JWT for a display name.
    async fn issue_guest_token(&self, display_name: &str) -> Result<String>;

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh_access_token(
        &self,
        client: &OAuthClientCredentials,
        refresh_token: &str,
    ) -> Result<OAuthTokens>;

    async fn fetch_current_user(&self, authorization: &str) -> Result<UserProfile>;

    async fn fetch_space(&self, authorization: &str, space_id: &str) -> Result<SpaceDetails>;
}

/// Both halves of an open text-frame socket.
///
/// Frames written to `outgoing` are sent in order; closing `outgoing` closes
/// the socket. `incoming` ends when the socket closes.
pub struct SocketLink {
    pub outgoing: async_channel::Sender<String>,
    pub incoming: async_channel::Receiver<Result<String>>,
}

/// Abstraction for opening the raw real-time socket.
#[async_trait]
pub trait SocketConnector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<SocketLink>;
}
