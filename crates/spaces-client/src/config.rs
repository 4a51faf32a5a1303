//! Configuration for the Spaces client.

use crate::error::{Result, SpacesError};
use crate::protocol::EngineIoVersion;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://spacesapis.avayacloud.com";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.avayacloud.com";
pub const DEFAULT_REALTIME_URL: &str = "https://spacesapis-socket.avayacloud.com";

/// Configuration for the Spaces client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API (guest auth, users, spaces).
    pub api_url: String,
    /// Base URL of the OAuth2 account service.
    pub accounts_url: String,
    /// Base URL of the real-time Socket.IO service.
    pub realtime_url: String,
    /// Engine.IO path on the real-time host.
    pub socket_io_path: String,
    /// Engine.IO protocol revision spoken by the real-time host.
    pub engine_io: EngineIoVersion,
    /// How long `connect` waits for the chat namespace ack.
    pub connect_timeout: Duration,
    /// Timeout for REST requests.
    pub request_timeout: Duration,
    /// Capacity of the outbound frame queue.
    pub outbound_queue: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            realtime_url: DEFAULT_REALTIME_URL.to_string(),
            socket_io_path: "socket.io".to_string(),
            engine_io: EngineIoVersion::V3,
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            outbound_queue: 64,
        }
    }
}

impl ClientConfig {
    /// Default config with overrides from `SPACES_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("SPACES_API_URL") {
            config.api_url = url;
        }
        if let Ok(url) = std::env::var("SPACES_ACCOUNTS_URL") {
            config.accounts_url = url;
        }
        if let Ok(url) = std::env::var("SPACES_REALTIME_URL") {
            config.realtime_url = url;
        }
        if let Ok(secs) = std::env::var("SPACES_CONNECT_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SpacesError::Config(format!("SPACES_CONNECT_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.connect_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    #[must_use]
    pub fn with_accounts_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_url = url.into();
        self
    }

    #[must_use]
    pub fn with_realtime_url(mut self, url: impl Into<String>) -> Self {
        self.realtime_url = url.into();
        self
    }

    #[must_use]
    pub fn with_engine_io(mut self, version: EngineIoVersion) -> Self {
        self.engine_io = version;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// WebSocket URL of the Engine.IO endpoint, carrying the caller's auth
    /// query in front of the transport parameters.
    pub fn socket_url(&self, auth_query: &str) -> Result<String> {
        let mut url = url::Url::parse(&self.realtime_url)
            .map_err(|e| SpacesError::Config(format!("Invalid realtime URL: {}", e)))?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => {
                return Err(SpacesError::Config(format!(
                    "Unsupported realtime URL scheme: {}",
                    other
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| SpacesError::Config("Cannot set websocket scheme".to_string()))?;
        url.set_path(&format!("/{}/", self.socket_io_path.trim_matches('/')));

        let mut query = String::from(auth_query);
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str("transport=websocket&EIO=");
        query.push_str(self.engine_io.query_value());
        url.set_query(Some(&query));
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.accounts_url, DEFAULT_ACCOUNTS_URL);
        assert_eq!(config.realtime_url, DEFAULT_REALTIME_URL);
        assert_eq!(config.engine_io, EngineIoVersion::V3);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig {
            outbound_queue: 8,
            ..Default::default()
        };
        assert_eq!(config.outbound_queue, 8);
        assert_eq!(config.socket_io_path, "socket.io");
    }

    #[test]
    fn test_socket_url() {
        let config = ClientConfig::default();
        let url = config.socket_url("token=abc&tokenType=jwt").unwrap();
        assert_eq!(
            url,
            "wss://spacesapis-socket.avayacloud.com/socket.io/?token=abc&tokenType=jwt&transport=websocket&EIO=3"
        );
    }

    #[test]
    fn test_socket_url_plain_http_v4() {
        let config = ClientConfig::default()
            .with_realtime_url("http://localhost:3000/chat")
            .with_engine_io(EngineIoVersion::V4);
        let url = config.socket_url("").unwrap();
        assert_eq!(url, "ws://localhost:3000/socket.io/?transport=websocket&EIO=4");
    }

    #[test]
    fn test_socket_url_rejects_unknown_scheme() {
        let config = ClientConfig::default().with_realtime_url("ftp://example.com");
        assert!(matches!(config.socket_url(""), Err(SpacesError::Config(_))));
    }
}
