//! Native implementations of the network seams.

mod http_api;
mod websocket;

pub use http_api::HttpApi;
pub use websocket::WebSocketConnector;

/// Strip the query from a URL before logging it; it carries the access token.
pub(crate) fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_query() {
        assert_eq!(
            redact_query("wss://host/socket.io/?token=secret&EIO=3"),
            "wss://host/socket.io/"
        );
        assert_eq!(redact_query("wss://host/"), "wss://host/");
    }
}
