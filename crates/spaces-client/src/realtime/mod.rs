//! Real-time channel transport.
//!
//! One persistent Socket.IO connection, used through the `/chat` namespace.
//! The transport moves through `Idle -> Connecting -> Ready -> Closed` and is
//! not reusable once closed; a failed `connect` also leaves it closed.
//!
//! Subscribe, unsubscribe and send are fire-and-forget on the wire: the
//! backend has no request/reply correlation, so these calls complete as soon
//! as the frame is queued on the socket. Confirmation, if any, arrives later
//! as an inbound event.

mod driver;

pub use driver::ConnectProgress;

use crate::config::ClientConfig;
use crate::error::{Result, SpacesError};
use crate::protocol::{
    events, ChannelPayload, EnginePacket, SendMessagePayload, SocketPacket,
    SubscribeChannelPayload, CHAT_NAMESPACE,
};
use crate::traits::SocketConnector;
use crate::types::{ChannelRef, ChatMessage};
use driver::Driver;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Receives every inbound chat message, on the connection's driver task.
pub type ChatHandler = Arc<dyn Fn(ChatMessage) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Connecting,
    Ready,
    Closed,
}

struct ActiveLink {
    outgoing: async_channel::Sender<String>,
    driver: JoinHandle<()>,
}

impl ActiveLink {
    fn shutdown(self) {
        self.outgoing.close();
        self.driver.abort();
    }
}

pub struct RealtimeTransport {
    config: Arc<ClientConfig>,
    connector: Arc<dyn SocketConnector>,
    on_chat: ChatHandler,
    state: TransportState,
    link: Option<ActiveLink>,
}

impl RealtimeTransport {
    pub fn new(
        config: Arc<ClientConfig>,
        connector: Arc<dyn SocketConnector>,
        on_chat: ChatHandler,
    ) -> Self {
        Self {
            config,
            connector,
            on_chat,
            state: TransportState::Idle,
            link: None,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == TransportState::Ready
    }

    /// Open the connection and wait until the `/chat` namespace is usable.
    ///
    /// `auth_params` is the credential's connection query string.
    pub async fn connect(&mut self, auth_params: &str) -> Result<()> {
        if self.state != TransportState::Idle {
            return Err(SpacesError::AlreadyConnected);
        }
        self.state = TransportState::Connecting;

        match self.open(auth_params).await {
            Ok(link) => {
                self.link = Some(link);
                self.state = TransportState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[Spaces-Socket] Connect failed: {}", e);
                self.state = TransportState::Closed;
                Err(e)
            }
        }
    }

    async fn open(&self, auth_params: &str) -> Result<ActiveLink> {
        let url = self.config.socket_url(auth_params)?;
        let link = self.connector.connect(&url).await?;

        let (ready_tx, ready_rx) = oneshot::channel();
        let driver = Driver::new(
            self.config.engine_io,
            link.outgoing.clone(),
            self.on_chat.clone(),
            ready_tx,
        );
        let active = ActiveLink {
            outgoing: link.outgoing,
            driver: tokio::spawn(driver.run(link.incoming)),
        };

        let timeout = self.config.connect_timeout;
        let outcome = match tokio::time::timeout(timeout, ready_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(SpacesError::Transport(
                "connection task ended before signalling readiness".to_string(),
            )),
            Err(_) => Err(SpacesError::ConnectTimeout(timeout)),
        };

        match outcome {
            Ok(()) => Ok(active),
            Err(e) => {
                active.shutdown();
                Err(e)
            }
        }
    }

    /// Close the connection. Network errors while closing are ignored.
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.state != TransportState::Ready {
            return Err(SpacesError::NotConnected);
        }
        self.state = TransportState::Closed;

        if let Some(link) = self.link.take() {
            let version = self.config.engine_io;
            let goodbye = [
                SocketPacket::disconnect(CHAT_NAMESPACE).to_frame(version),
                EnginePacket::Close.encode(),
            ];
            for frame in goodbye {
                if link.outgoing.try_send(frame).is_err() {
                    break;
                }
            }
            link.shutdown();
        }
        tracing::info!("[Spaces-Socket] Disconnect requested");
        Ok(())
    }

    async fn emit(&self, event: &str, payload: Value) -> Result<()> {
        let link = match (&self.state, &self.link) {
            (TransportState::Ready, Some(link)) => link,
            _ => return Err(SpacesError::NotConnected),
        };
        let frame = SocketPacket::event(CHAT_NAMESPACE, event, payload).to_frame(self.config.engine_io);
        link.outgoing
            .send(frame)
            .await
            .map_err(|_| SpacesError::Transport("socket is closed".to_string()))?;
        tracing::debug!("[Spaces-Socket] Emitted {}", event);
        Ok(())
    }

    pub async fn subscribe(&self, channel: &ChannelRef, password: Option<&str>) -> Result<()> {
        let payload = SubscribeChannelPayload {
            channel: ChannelPayload::new(channel, password),
        };
        self.emit(events::SUBSCRIBE_CHANNEL, serde_json::to_value(&payload)?)
            .await
    }

    pub async fn unsubscribe(&self, channel: &ChannelRef) -> Result<()> {
        let payload = SubscribeChannelPayload {
            channel: ChannelPayload::new(channel, None),
        };
        self.emit(events::UNSUBSCRIBE_CHANNEL, serde_json::to_value(&payload)?)
            .await
    }

    pub async fn send(&self, text: &str, channel: &ChannelRef, sender_id: &str) -> Result<()> {
        let payload = SendMessagePayload::chat(text, channel, sender_id);
        self.emit(events::SEND_MESSAGE, serde_json::to_value(&payload)?)
            .await
    }
}

impl Drop for RealtimeTransport {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            link.shutdown();
        }
    }
}
