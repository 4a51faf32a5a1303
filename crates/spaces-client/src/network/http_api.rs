use crate::config::ClientConfig;
use crate::error::{Result, SpacesError};
use crate::traits::{OAuthClientCredentials, SpacesApi};
use crate::types::{OAuthTokens, SpaceDetails, UserProfile};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
struct GuestTokenResponse {
    token: String,
}

/// reqwest-backed [`SpacesApi`].
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("spaces-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SpacesError::Config(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("[Spaces-Api] Request failed with status {}", status);
            return Err(SpacesError::Http {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| SpacesError::MalformedResponse(e.to_string()))
    }

    async fn post_form<T: DeserializeOwned>(&self, url: &str, fields: &[(&str, &str)]) -> Result<T> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        tracing::debug!("[Spaces-Api] POST {}", url);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, authorization: &str) -> Result<T> {
        tracing::debug!("[Spaces-Api] GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl SpacesApi for HttpApi {
    async fn issue_guest_token(&self, display_name: &str) -> Result<String> {
        let url = self.api_url("/api/anonymous/auth");
        let response: GuestTokenResponse = self
            .post_form(
                &url,
                &[
                    ("displayname", display_name),
                    ("username", ""),
                    ("picturefile", ""),
                ],
            )
            .await?;
        Ok(response.token)
    }

    async fn refresh_access_token(
        &self,
        client: &OAuthClientCredentials,
        refresh_token: &str,
    ) -> Result<OAuthTokens> {
        let url = format!(
            "{}/oauth2/access_token",
            self.config.accounts_url.trim_end_matches('/')
        );
        self.post_form(
            &url,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
            ],
        )
        .await
    }

    async fn fetch_current_user(&self, authorization: &str) -> Result<UserProfile> {
        let url = self.api_url("/api/users/me");
        self.get_json(&url, authorization).await
    }

    async fn fetch_space(&self, authorization: &str, space_id: &str) -> Result<SpaceDetails> {
        let encoded: String = url::form_urlencoded::byte_serialize(space_id.as_bytes()).collect();
        let url = self.api_url(&format!("/api/spaces/{}", encoded));
        self.get_json(&url, authorization).await
    }
}
