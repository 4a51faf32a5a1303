//! Engine.IO and Socket.IO packet framing.
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by its body. Engine.IO `message` packets (`4`) carry one
//! Socket.IO packet, itself a type digit, an optional `/namespace,` prefix,
//! an optional numeric ack id and a JSON body.
//!
//! ```text
//! 0{"sid":"…","pingInterval":25000}   open
//! 2 / 3                               ping / pong
//! 40/chat,                            CONNECT /chat
//! 42/chat,["MESSAGE_SENT",{…}]        EVENT on /chat
//! 44/chat,{"message":"…"}             CONNECT_ERROR on /chat
//! ```

use crate::error::{Result, SpacesError};
use crate::protocol::constants::ROOT_NAMESPACE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Engine.IO protocol revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineIoVersion {
    /// Engine.IO 3 (Socket.IO 2): the client sends pings, the server pongs.
    #[default]
    V3,
    /// Engine.IO 4 (Socket.IO 3+): the server sends pings, the client pongs.
    V4,
}

impl EngineIoVersion {
    /// Value of the `EIO` query parameter.
    pub fn query_value(&self) -> &'static str {
        match self {
            EngineIoVersion::V3 => "3",
            EngineIoVersion::V4 => "4",
        }
    }

    /// Whether the client is responsible for the ping side of the heartbeat.
    pub fn client_pings(&self) -> bool {
        matches!(self, EngineIoVersion::V3)
    }
}

/// Body of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

impl Handshake {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_interval)
    }

    /// How long to wait for a pong before treating the connection as dead.
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout)
    }
}

/// A single Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| SpacesError::Protocol("empty Engine.IO frame".to_string()))?;
        let body = chars.as_str();

        match kind {
            '0' => {
                let handshake = serde_json::from_str(body)
                    .map_err(|e| SpacesError::Protocol(format!("invalid open packet: {}", e)))?;
                Ok(EnginePacket::Open(handshake))
            }
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(body.to_string())),
            '3' => Ok(EnginePacket::Pong(body.to_string())),
            '4' => Ok(EnginePacket::Message(body.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(SpacesError::Protocol(format!(
                "unknown Engine.IO packet type '{}'",
                other
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => {
                format!("0{}", serde_json::to_string(handshake).unwrap_or_default())
            }
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{}", data),
            EnginePacket::Pong(data) => format!("3{}", data),
            EnginePacket::Message(data) => format!("4{}", data),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

/// A Socket.IO packet, as carried inside an Engine.IO `message`.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Value,
    },
}

impl SocketPacket {
    pub fn connect(namespace: &str) -> Self {
        SocketPacket::Connect {
            namespace: namespace.to_string(),
            data: None,
        }
    }

    pub fn disconnect(namespace: &str) -> Self {
        SocketPacket::Disconnect {
            namespace: namespace.to_string(),
        }
    }

    /// Single-argument event without an ack id.
    pub fn event(namespace: &str, name: &str, payload: Value) -> Self {
        SocketPacket::Event {
            namespace: namespace.to_string(),
            id: None,
            name: name.to_string(),
            args: vec![payload],
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    pub fn decode(body: &str) -> Result<Self> {
        let mut chars = body.chars();
        let kind = chars
            .next()
            .ok_or_else(|| SpacesError::Protocol("empty Socket.IO packet".to_string()))?;
        let mut rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(SpacesError::Protocol(
                "binary Socket.IO packets are not supported".to_string(),
            ));
        }

        let namespace = if rest.starts_with('/') {
            let end = rest.find(',').unwrap_or(rest.len());
            let nsp = &rest[..end];
            rest = rest.get(end + 1..).unwrap_or("");
            // v3 clients may append a query to the namespace
            nsp.split('?').next().unwrap_or(nsp).to_string()
        } else {
            ROOT_NAMESPACE.to_string()
        };

        let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        let id = if digits > 0 {
            Some(
                rest[..digits]
                    .parse::<u64>()
                    .map_err(|e| SpacesError::Protocol(format!("invalid ack id: {}", e)))?,
            )
        } else {
            None
        };
        rest = &rest[digits..];

        let data: Option<Value> = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(rest)
                    .map_err(|e| SpacesError::Protocol(format!("invalid packet data: {}", e)))?,
            )
        };

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, data }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let mut args = match data {
                    Some(Value::Array(args)) if !args.is_empty() => args,
                    _ => {
                        return Err(SpacesError::Protocol(
                            "event packet without an argument array".to_string(),
                        ))
                    }
                };
                let name = match args.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(SpacesError::Protocol(format!(
                            "event name is not a string: {}",
                            other
                        )))
                    }
                };
                Ok(SocketPacket::Event {
                    namespace,
                    id,
                    name,
                    args,
                })
            }
            '3' => {
                let id = id.ok_or_else(|| {
                    SpacesError::Protocol("ack packet without an id".to_string())
                })?;
                let args = match data {
                    Some(Value::Array(args)) => args,
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                Ok(SocketPacket::Ack {
                    namespace,
                    id,
                    args,
                })
            }
            '4' => Ok(SocketPacket::ConnectError {
                namespace,
                data: data.unwrap_or(Value::Null),
            }),
            other => Err(SpacesError::Protocol(format!(
                "unknown Socket.IO packet type '{}'",
                other
            ))),
        }
    }

    pub fn encode(&self, version: EngineIoVersion) -> String {
        let mut out = String::new();
        match self {
            SocketPacket::Connect { namespace, data } => {
                out.push('0');
                push_namespace(&mut out, namespace, data.is_some(), version);
                if let Some(data) = data {
                    out.push_str(&data.to_string());
                }
            }
            SocketPacket::Disconnect { namespace } => {
                out.push('1');
                push_namespace(&mut out, namespace, false, version);
            }
            SocketPacket::Event {
                namespace,
                id,
                name,
                args,
            } => {
                out.push('2');
                push_namespace(&mut out, namespace, true, version);
                if let Some(id) = id {
                    out.push_str(&id.to_string());
                }
                let mut array = Vec::with_capacity(args.len() + 1);
                array.push(Value::String(name.clone()));
                array.extend(args.iter().cloned());
                out.push_str(&Value::Array(array).to_string());
            }
            SocketPacket::Ack {
                namespace,
                id,
                args,
            } => {
                out.push('3');
                push_namespace(&mut out, namespace, true, version);
                out.push_str(&id.to_string());
                out.push_str(&Value::Array(args.clone()).to_string());
            }
            SocketPacket::ConnectError { namespace, data } => {
                out.push('4');
                push_namespace(&mut out, namespace, true, version);
                out.push_str(&data.to_string());
            }
        }
        out
    }

    /// Encode as a complete WebSocket text frame (Engine.IO `message`).
    pub fn to_frame(&self, version: EngineIoVersion) -> String {
        EnginePacket::Message(self.encode(version)).encode()
    }
}

fn push_namespace(out: &mut String, namespace: &str, more: bool, version: EngineIoVersion) {
    if namespace.is_empty() || namespace == ROOT_NAMESPACE {
        return;
    }
    out.push_str(namespace);
    if more || version == EngineIoVersion::V4 {
        out.push(',');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let frame = r#"0{"sid":"abc123","upgrades":[],"pingInterval":25000,"pingTimeout":60000}"#;
        match EnginePacket::decode(frame).unwrap() {
            EnginePacket::Open(handshake) => {
                assert_eq!(handshake.sid, "abc123");
                assert_eq!(handshake.ping_interval(), Duration::from_secs(25));
                assert_eq!(handshake.ping_timeout(), Duration::from_secs(60));
            }
            other => panic!("Expected open packet, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_open_without_intervals() {
        match EnginePacket::decode(r#"0{"sid":"x"}"#).unwrap() {
            EnginePacket::Open(handshake) => assert_eq!(handshake.ping_interval, 25_000),
            other => panic!("Expected open packet, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_heartbeat() {
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(
            EnginePacket::decode("3heartbeat").unwrap(),
            EnginePacket::Pong("heartbeat".to_string())
        );
        assert_eq!(EnginePacket::Pong(String::new()).encode(), "3");
    }

    #[test]
    fn test_decode_engine_errors() {
        assert!(EnginePacket::decode("").is_err());
        assert!(EnginePacket::decode("9").is_err());
        assert!(EnginePacket::decode("0not-json").is_err());
    }

    #[test]
    fn test_decode_namespace_connect_v3() {
        let packet = SocketPacket::decode("0/chat").unwrap();
        assert_eq!(
            packet,
            SocketPacket::Connect {
                namespace: "/chat".to_string(),
                data: None
            }
        );
    }

    #[test]
    fn test_decode_namespace_connect_v4() {
        let packet = SocketPacket::decode(r#"0/chat,{"sid":"nsp-sid"}"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Connect {
                namespace: "/chat".to_string(),
                data: Some(json!({"sid": "nsp-sid"}))
            }
        );
    }

    #[test]
    fn test_decode_root_connect() {
        let packet = SocketPacket::decode("0").unwrap();
        assert_eq!(packet.namespace(), "/");
    }

    #[test]
    fn test_decode_namespace_with_query() {
        let packet = SocketPacket::decode("0/chat?token=abc,").unwrap();
        assert_eq!(packet.namespace(), "/chat");
    }

    #[test]
    fn test_decode_event() {
        let body = r#"2/chat,["MESSAGE_SENT",{"category":"chat","topicId":"s1"}]"#;
        match SocketPacket::decode(body).unwrap() {
            SocketPacket::Event {
                namespace,
                id,
                name,
                args,
            } => {
                assert_eq!(namespace, "/chat");
                assert_eq!(id, None);
                assert_eq!(name, "MESSAGE_SENT");
                assert_eq!(args, vec![json!({"category": "chat", "topicId": "s1"})]);
            }
            other => panic!("Expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_event_with_ack_id() {
        match SocketPacket::decode(r#"2/chat,12["PING",1]"#).unwrap() {
            SocketPacket::Event { id, .. } => assert_eq!(id, Some(12)),
            other => panic!("Expected event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_connect_error_variants() {
        match SocketPacket::decode(r#"4/chat,"Not authorized""#).unwrap() {
            SocketPacket::ConnectError { data, .. } => assert_eq!(data, json!("Not authorized")),
            other => panic!("Expected connect error, got {:?}", other),
        }
        match SocketPacket::decode(r#"4/chat,{"message":"invalid token"}"#).unwrap() {
            SocketPacket::ConnectError { namespace, data } => {
                assert_eq!(namespace, "/chat");
                assert_eq!(data["message"], "invalid token");
            }
            other => panic!("Expected connect error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_bad_packets() {
        assert!(SocketPacket::decode("").is_err());
        assert!(SocketPacket::decode(r#"2/chat,{"not":"array"}"#).is_err());
        assert!(SocketPacket::decode(r#"2/chat,[42]"#).is_err());
        assert!(SocketPacket::decode(r#"51-/chat,["bin",{"_placeholder":true,"num":0}]"#).is_err());
        assert!(SocketPacket::decode("3/chat,[]").is_err());
    }

    #[test]
    fn test_encode_connect() {
        let packet = SocketPacket::connect("/chat");
        assert_eq!(packet.to_frame(EngineIoVersion::V3), "40/chat");
        assert_eq!(packet.to_frame(EngineIoVersion::V4), "40/chat,");
    }

    #[test]
    fn test_encode_disconnect() {
        let packet = SocketPacket::disconnect("/chat");
        assert_eq!(packet.to_frame(EngineIoVersion::V3), "41/chat");
    }

    #[test]
    fn test_encode_event() {
        let packet = SocketPacket::event(
            "/chat",
            "SUBSCRIBE_CHANNEL",
            json!({"channel": {"_id": "space42"}}),
        );
        assert_eq!(
            packet.to_frame(EngineIoVersion::V3),
            r#"42/chat,["SUBSCRIBE_CHANNEL",{"channel":{"_id":"space42"}}]"#
        );
    }

    #[test]
    fn test_client_pings() {
        assert!(EngineIoVersion::V3.client_pings());
        assert!(!EngineIoVersion::V4.client_pings());
    }
}
