#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use spaces_client::{
    OAuthClientCredentials, OAuthTokens, Result, SocketConnector, SocketLink, SpaceDetails,
    SpacesApi, SpacesError, UserProfile,
};
use std::sync::Arc;
use std::time::Duration;

pub const GUEST_TOKEN: &str = "guest-jwt-token";
pub const USER_ID: &str = "user-123";

/// In-memory Spaces REST backend.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    pub fail_guest_token: bool,
    pub fail_profile: bool,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl SpacesApi for FakeApi {
    async fn issue_guest_token(&self, display_name: &str) -> Result<String> {
        self.record(format!("guest_token:{}", display_name));
        if self.fail_guest_token {
            return Err(SpacesError::Http {
                status: 500,
                body: "guest auth unavailable".into(),
            });
        }
        Ok(GUEST_TOKEN.to_string())
    }

    async fn refresh_access_token(
        &self,
        client: &OAuthClientCredentials,
        refresh_token: &str,
    ) -> Result<OAuthTokens> {
        self.record(format!("refresh:{}:{}", client.client_id, refresh_token));
        Ok(OAuthTokens {
            access_token: "fresh-access".into(),
            refresh_token: "fresh-refresh".into(),
        })
    }

    async fn fetch_current_user(&self, authorization: &str) -> Result<UserProfile> {
        self.record(format!("me:{}", authorization));
        if self.fail_profile {
            return Err(SpacesError::Http {
                status: 401,
                body: "Unauthorized".into(),
            });
        }
        Ok(UserProfile {
            id: USER_ID.into(),
            display_name: Some("Bot".into()),
            extra: Default::default(),
        })
    }

    async fn fetch_space(&self, authorization: &str, space_id: &str) -> Result<SpaceDetails> {
        self.record(format!("space:{}:{}", space_id, authorization));
        Ok(SpaceDetails {
            id: space_id.into(),
            title: format!("Space {}", space_id),
            extra: Default::default(),
        })
    }
}

/// How the fake real-time server answers the `/chat` namespace CONNECT.
#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceReply {
    Accept,
    /// Send the namespace ack before the Engine.IO open.
    AcceptBeforeOpen,
    Reject(Value),
    Silent,
}

#[derive(Default)]
struct ServerState {
    urls: Vec<String>,
    frames: Vec<String>,
    inbound: Option<async_channel::Sender<Result<String>>>,
}

/// Fake real-time server speaking Engine.IO v3 over in-memory channels.
#[derive(Clone)]
pub struct MockSocketServer {
    reply: NamespaceReply,
    state: Arc<Mutex<ServerState>>,
}

impl MockSocketServer {
    pub fn new(reply: NamespaceReply) -> Self {
        Self {
            reply,
            state: Arc::new(Mutex::new(ServerState::default())),
        }
    }

    pub fn accepting() -> Self {
        Self::new(NamespaceReply::Accept)
    }

    pub fn connector(&self) -> Arc<dyn SocketConnector> {
        Arc::new(self.clone())
    }

    pub fn urls(&self) -> Vec<String> {
        self.state.lock().urls.clone()
    }

    /// Every frame the client has sent so far.
    pub fn frames(&self) -> Vec<String> {
        self.state.lock().frames.clone()
    }

    /// Frames carrying a `/chat` event, in send order.
    pub fn events(&self) -> Vec<(String, Value)> {
        self.frames()
            .iter()
            .filter_map(|f| f.strip_prefix("42/chat,"))
            .filter_map(|body| serde_json::from_str::<Vec<Value>>(body).ok())
            .filter_map(|mut args| {
                let name = args.first()?.as_str()?.to_string();
                let payload = if args.len() > 1 { args.remove(1) } else { Value::Null };
                Some((name, payload))
            })
            .collect()
    }

    /// Wait until at least `count` frames satisfy `pred`.
    pub async fn wait_for<F>(&self, count: usize, pred: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        for _ in 0..200 {
            let matching: Vec<String> = self
                .frames()
                .into_iter()
                .filter(|f| pred(f.as_str()))
                .collect();
            if matching.len() >= count {
                return matching;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {} frames, saw {:?}", count, self.frames());
    }

    /// Push a frame from the server to the client.
    pub async fn inject(&self, frame: impl Into<String>) {
        let inbound = self.state.lock().inbound.clone();
        if let Some(inbound) = inbound {
            inbound.send(Ok(frame.into())).await.expect("client socket closed");
        }
    }

    fn namespace_reply(&self) -> Option<String> {
        match &self.reply {
            NamespaceReply::Accept => Some("40/chat".to_string()),
            NamespaceReply::Reject(data) => Some(format!("44/chat,{}", data)),
            NamespaceReply::AcceptBeforeOpen | NamespaceReply::Silent => None,
        }
    }
}

#[async_trait]
impl SocketConnector for MockSocketServer {
    async fn connect(&self, url: &str) -> Result<SocketLink> {
        let (out_tx, out_rx) = async_channel::bounded::<String>(64);
        let (in_tx, in_rx) = async_channel::bounded::<Result<String>>(64);

        let open = json!({
            "sid": "mock-sid",
            "upgrades": [],
            "pingInterval": 25000,
            "pingTimeout": 60000
        });
        let mut greeting = vec![format!("0{}", open)];
        if self.reply == NamespaceReply::AcceptBeforeOpen {
            greeting.insert(0, "40/chat".to_string());
        }
        for frame in greeting {
            in_tx
                .send(Ok(frame))
                .await
                .map_err(|_| SpacesError::Transport("mock inbound closed".into()))?;
        }

        {
            let mut state = self.state.lock();
            state.urls.push(url.to_string());
            state.inbound = Some(in_tx.clone());
        }

        let server = self.clone();
        tokio::spawn(async move {
            while let Ok(frame) = out_rx.recv().await {
                server.state.lock().frames.push(frame.clone());
                if frame.starts_with("40/chat") {
                    if let Some(reply) = server.namespace_reply() {
                        let _ = in_tx.send(Ok(reply)).await;
                    }
                } else if frame.starts_with('2') && !frame.starts_with("2/") {
                    let _ = in_tx.send(Ok("3".to_string())).await;
                }
            }
        });

        Ok(SocketLink {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }
}

/// Engine.IO frame carrying a `MESSAGE_SENT` event.
pub fn message_sent_frame(category: &str, text: &str) -> String {
    let payload = json!({
        "category": category,
        "content": { "bodyText": text },
        "sender": { "_id": "other-user", "displayname": "Alice", "type": "user" },
        "topicId": "space42",
        "topicTitle": "Lobby",
        "topicType": "group"
    });
    format!("42/chat,{}", json!(["MESSAGE_SENT", payload]))
}
