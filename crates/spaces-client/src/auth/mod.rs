//! Credentials and identities.
//!
//! A [`Credential`] holds the bearer token and knows how to present it, both
//! as an HTTP `Authorization` value and as the query string of the real-time
//! connection. An [`Identity`] pairs a credential with the server-assigned
//! user id obtained at login.

mod identity;

pub use identity::{Identity, IdentityKind};

use crate::error::{Result, SpacesError};
use crate::traits::{OAuthClientCredentials, SpacesApi};
use std::fmt;

/// Kind of bearer token, deciding its header scheme and query tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Anonymous guest JWT.
    GuestJwt,
    /// OAuth2 access token of a registered user.
    OAuthBearer,
}

impl TokenType {
    /// Value of the `tokenType` connection parameter.
    pub fn query_value(&self) -> &'static str {
        match self {
            TokenType::GuestJwt => "jwt",
            TokenType::OAuthBearer => "oauth",
        }
    }

    /// Scheme of the `Authorization` header.
    pub fn auth_scheme(&self) -> &'static str {
        match self {
            TokenType::GuestJwt => "jwt",
            TokenType::OAuthBearer => "Bearer",
        }
    }
}

/// A bearer credential.
///
/// The token is either absent or a non-empty string.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: Option<String>,
    token_type: TokenType,
    refresh_token: Option<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token_type", &self.token_type)
            .field("has_token", &self.token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

fn non_empty(token: String) -> Result<String> {
    if token.is_empty() {
        Err(SpacesError::InvalidCredential("empty token".to_string()))
    } else {
        Ok(token)
    }
}

impl Credential {
    /// Empty guest credential, populated by guest login.
    pub fn guest() -> Self {
        Self {
            token: None,
            token_type: TokenType::GuestJwt,
            refresh_token: None,
        }
    }

    /// OAuth credential holding only a refresh token; call
    /// [`Credential::refresh`] to obtain the access token.
    pub fn oauth_refreshable(refresh_token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            token: None,
            token_type: TokenType::OAuthBearer,
            refresh_token: Some(non_empty(refresh_token.into())?),
        })
    }

    /// OAuth credential with an access token obtained elsewhere.
    pub fn oauth_bearer(access_token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            token: Some(non_empty(access_token.into())?),
            token_type: TokenType::OAuthBearer,
            refresh_token: None,
        })
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Has an access token been obtained?
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub(crate) fn install_token(&mut self, token: String) -> Result<()> {
        self.token = Some(non_empty(token)?);
        Ok(())
    }

    fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(SpacesError::NotAuthenticated)
    }

    /// Value for the HTTP `Authorization` header.
    pub fn authorization_header_value(&self) -> Result<String> {
        Ok(format!("{} {}", self.token_type.auth_scheme(), self.token()?))
    }

    /// Query string authenticating the real-time connection.
    pub fn connection_query_params(&self) -> Result<String> {
        let token = self.token()?;
        Ok(url::form_urlencoded::Serializer::new(String::new())
            .append_pair("token", token)
            .append_pair("tokenType", self.token_type.query_value())
            .finish())
    }

    /// Run the OAuth2 refresh grant, replacing both tokens.
    pub async fn refresh(
        &mut self,
        api: &dyn SpacesApi,
        client: &OAuthClientCredentials,
    ) -> Result<()> {
        if self.token_type != TokenType::OAuthBearer {
            return Err(SpacesError::InvalidCredential(
                "only OAuth credentials can be refreshed".to_string(),
            ));
        }
        let refresh_token = self
            .refresh_token
            .as_deref()
            .ok_or(SpacesError::NotAuthenticated)?;

        let tokens = api.refresh_access_token(client, refresh_token).await?;
        let access_token = non_empty(tokens.access_token)?;
        let refresh_token = non_empty(tokens.refresh_token)?;
        self.token = Some(access_token);
        self.refresh_token = Some(refresh_token);
        tracing::info!("[Spaces-Auth] OAuth access token refreshed");
        Ok(())
    }
}
