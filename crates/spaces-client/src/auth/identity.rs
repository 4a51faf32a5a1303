use super::Credential;
use crate::error::{Result, SpacesError};
use crate::traits::SpacesApi;
use crate::types::UserProfile;

/// How an identity obtains its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityKind {
    /// Anonymous guest; the token is issued at login for `display_name`.
    /// Guest tokens are valid for 24 hours.
    Guest { display_name: String },
    /// Registered OAuth2 user; the credential is valid before login.
    Registered,
}

/// A user of the service.
///
/// `id` is set iff login has completed.
#[derive(Debug, Clone)]
pub struct Identity {
    kind: IdentityKind,
    credential: Credential,
    profile: Option<UserProfile>,
}

impl Identity {
    pub fn guest(display_name: impl Into<String>) -> Self {
        Self {
            kind: IdentityKind::Guest {
                display_name: display_name.into(),
            },
            credential: Credential::guest(),
            profile: None,
        }
    }

    pub fn registered(credential: Credential) -> Self {
        Self {
            kind: IdentityKind::Registered,
            credential,
            profile: None,
        }
    }

    pub fn kind(&self) -> &IdentityKind {
        &self.kind
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Mutable access for refreshing an OAuth credential in place.
    pub fn credential_mut(&mut self) -> &mut Credential {
        &mut self.credential
    }

    pub fn id(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.id.as_str())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.profile.is_some()
    }

    /// Log in.
    ///
    /// A guest first exchanges its display name for a token, then fetches
    /// its profile. Nothing is stored unless both steps succeed. A
    /// registered identity only fetches its profile.
    pub async fn login(&mut self, api: &dyn SpacesApi) -> Result<()> {
        match &self.kind {
            IdentityKind::Guest { display_name } => {
                if self.credential.has_token() {
                    return Err(SpacesError::InvalidCredential(
                        "guest identity is already logged in".to_string(),
                    ));
                }
                tracing::info!("[Spaces-Auth] Logging in as guest user {:?}", display_name);

                let mut credential = self.credential.clone();
                credential.install_token(api.issue_guest_token(display_name).await?)?;
                let profile = api
                    .fetch_current_user(&credential.authorization_header_value()?)
                    .await?;

                self.credential = credential;
                self.profile = Some(profile);
            }
            IdentityKind::Registered => {
                let authorization = self.credential.authorization_header_value()?;
                self.profile = Some(api.fetch_current_user(&authorization).await?);
            }
        }

        tracing::info!(
            "[Spaces-Auth] Logged in as user {}",
            self.id().unwrap_or_default()
        );
        Ok(())
    }
}
