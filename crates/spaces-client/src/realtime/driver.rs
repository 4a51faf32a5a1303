//! Background task owning the inbound half of a real-time connection.

use super::ChatHandler;
use crate::error::{Result, SpacesError};
use crate::protocol::{
    events, parse_message_sent, EngineIoVersion, EnginePacket, SocketPacket, CHAT_NAMESPACE,
};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{interval_at, sleep_until, Instant, Interval};

/// Tracks the two acknowledgements a connection needs before it is usable:
/// the Engine.IO handshake and the `/chat` namespace CONNECT.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectProgress {
    socket_open: bool,
    namespace_ack: bool,
}

impl ConnectProgress {
    /// Record the raw socket handshake; returns whether the connection is now ready.
    pub fn socket_opened(&mut self) -> bool {
        self.socket_open = true;
        self.is_ready()
    }

    /// Record the namespace ack; returns whether the connection is now ready.
    pub fn namespace_connected(&mut self) -> bool {
        self.namespace_ack = true;
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        self.socket_open && self.namespace_ack
    }
}

pub(crate) struct Driver {
    version: EngineIoVersion,
    outgoing: async_channel::Sender<String>,
    on_chat: ChatHandler,
    ready_tx: Option<oneshot::Sender<Result<()>>>,
    progress: ConnectProgress,
    ping: Option<Interval>,
    ping_timeout: Option<Duration>,
    pong_deadline: Option<Instant>,
}

/// Client ping timer for a server-advertised interval. None when the
/// interval is zero or does not fit on the clock.
pub(crate) fn ping_timer(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let start = Instant::now().checked_add(period)?;
    Some(interval_at(start, period))
}

async fn next_ping(ping: &mut Option<Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn pong_overdue(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

impl Driver {
    pub(crate) fn new(
        version: EngineIoVersion,
        outgoing: async_channel::Sender<String>,
        on_chat: ChatHandler,
        ready_tx: oneshot::Sender<Result<()>>,
    ) -> Self {
        Self {
            version,
            outgoing,
            on_chat,
            ready_tx: Some(ready_tx),
            progress: ConnectProgress::default(),
            ping: None,
            ping_timeout: None,
            pong_deadline: None,
        }
    }

    pub(crate) async fn run(mut self, incoming: async_channel::Receiver<Result<String>>) {
        loop {
            let received = tokio::select! {
                received = incoming.recv() => received,
                _ = next_ping(&mut self.ping) => {
                    self.send_ping().await;
                    continue;
                }
                _ = pong_overdue(self.pong_deadline) => {
                    tracing::warn!("[Spaces-Socket] No pong from server, closing connection");
                    break;
                }
            };

            match received {
                Ok(Ok(frame)) => {
                    if !self.handle_frame(&frame).await {
                        break;
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!("[Spaces-Socket] Socket error: {}", e);
                    self.resolve(Err(e));
                    break;
                }
                Err(_) => break,
            }
        }

        tracing::info!("[Spaces-Socket] Socket disconnected");
        self.outgoing.close();
        if self.ready_tx.is_some() {
            self.resolve(Err(SpacesError::Transport(
                "socket closed before the chat namespace connected".to_string(),
            )));
        }
    }

    /// Returns false once the server has closed the connection.
    async fn handle_frame(&mut self, frame: &str) -> bool {
        let packet = match EnginePacket::decode(frame) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("[Spaces-Socket] Dropping frame: {}", e);
                return true;
            }
        };

        match packet {
            EnginePacket::Open(handshake) => {
                tracing::info!("[Spaces-Socket] Socket connected (sid {})", handshake.sid);
                if self.version.client_pings() {
                    self.ping = ping_timer(handshake.ping_interval());
                    if self.ping.is_none() {
                        tracing::warn!(
                            "[Spaces-Socket] Unusable ping interval {:?}, client pings disabled",
                            handshake.ping_interval()
                        );
                    }
                    let timeout = handshake.ping_timeout();
                    self.ping_timeout = (!timeout.is_zero()).then_some(timeout);
                }
                self.send_frame(SocketPacket::connect(CHAT_NAMESPACE).to_frame(self.version))
                    .await;
                if self.progress.socket_opened() {
                    self.resolve(Ok(()));
                }
            }
            EnginePacket::Ping(data) => self.send_frame(EnginePacket::Pong(data).encode()).await,
            EnginePacket::Pong(_) => {
                tracing::trace!("[Spaces-Socket] pong");
                self.pong_deadline = None;
            }
            EnginePacket::Close => {
                tracing::info!("[Spaces-Socket] Server closed the connection");
                return false;
            }
            EnginePacket::Message(body) => self.handle_packet(&body),
            EnginePacket::Upgrade | EnginePacket::Noop => {}
        }
        true
    }

    fn handle_packet(&mut self, body: &str) {
        let packet = match SocketPacket::decode(body) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("[Spaces-Socket] Dropping packet: {}", e);
                return;
            }
        };

        match packet {
            SocketPacket::Connect { namespace, .. } if namespace == CHAT_NAMESPACE => {
                tracing::info!("[Spaces-Socket] {} socket connected", CHAT_NAMESPACE);
                if self.progress.namespace_connected() {
                    self.resolve(Ok(()));
                }
            }
            SocketPacket::Connect { namespace, .. } => {
                tracing::debug!("[Spaces-Socket] Namespace {} connected", namespace);
            }
            SocketPacket::ConnectError { namespace, data } => {
                tracing::warn!(
                    "[Spaces-Socket] {} socket connection failed: {}",
                    namespace,
                    data
                );
                self.resolve(Err(SpacesError::AuthenticationRejected(data)));
            }
            SocketPacket::Disconnect { namespace } => {
                tracing::info!("[Spaces-Socket] Server disconnected namespace {}", namespace);
            }
            SocketPacket::Event {
                namespace,
                name,
                args,
                ..
            } if namespace == CHAT_NAMESPACE => {
                let payload = args.into_iter().next().unwrap_or(Value::Null);
                self.handle_event(&name, payload);
            }
            SocketPacket::Event {
                namespace, name, ..
            } => {
                tracing::debug!("[Spaces-Socket] Ignoring {} on {}", name, namespace);
            }
            SocketPacket::Ack { id, .. } => {
                tracing::debug!("[Spaces-Socket] Ignoring ack {}", id);
            }
        }
    }

    fn handle_event(&self, name: &str, payload: Value) {
        match name {
            events::MESSAGE_SENT => match parse_message_sent(&payload) {
                Ok(Some(message)) => {
                    tracing::debug!(
                        "[Spaces-Socket] Chat message from {} in {}",
                        message.sender.id,
                        message.space.id
                    );
                    let on_chat = &self.on_chat;
                    if catch_unwind(AssertUnwindSafe(|| on_chat(message))).is_err() {
                        tracing::error!("[Spaces-Socket] Chat handler panicked");
                    }
                }
                Ok(None) => {
                    tracing::debug!("[Spaces-Socket] Dropping non-chat message: {}", payload);
                }
                Err(e) => tracing::warn!("[Spaces-Socket] {}", e),
            },
            events::CHANNEL_SUBSCRIBED => {
                tracing::info!("[Spaces-Socket] Received channel subscribed: {}", payload);
            }
            other => {
                tracing::debug!("[Spaces-Socket] Unhandled event {}: {}", other, payload);
            }
        }
    }

    async fn send_ping(&mut self) {
        self.send_frame(EnginePacket::Ping(String::new()).encode()).await;
        if self.pong_deadline.is_none() {
            self.pong_deadline = self
                .ping_timeout
                .and_then(|timeout| Instant::now().checked_add(timeout));
        }
    }

    async fn send_frame(&self, frame: String) {
        if self.outgoing.send(frame).await.is_err() {
            tracing::debug!("[Spaces-Socket] Outgoing queue closed, frame dropped");
        }
    }

    /// Complete the pending `connect`, if it is still waiting.
    fn resolve(&mut self, outcome: Result<()>) {
        if let Some(ready_tx) = self.ready_tx.take() {
            let _ = ready_tx.send(outcome);
        } else if let Err(e) = outcome {
            tracing::debug!("[Spaces-Socket] After connect: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Harness {
        inbound: async_channel::Sender<Result<String>>,
        outbound: async_channel::Receiver<String>,
        ready: oneshot::Receiver<Result<()>>,
    }

    fn spawn_driver(version: EngineIoVersion) -> Harness {
        let (out_tx, out_rx) = async_channel::bounded(16);
        let (in_tx, in_rx) = async_channel::bounded(16);
        let (ready_tx, ready_rx) = oneshot::channel();
        let on_chat: ChatHandler = Arc::new(|_| {});
        tokio::spawn(Driver::new(version, out_tx, on_chat, ready_tx).run(in_rx));
        Harness {
            inbound: in_tx,
            outbound: out_rx,
            ready: ready_rx,
        }
    }

    impl Harness {
        async fn feed(&self, frame: &str) {
            self.inbound.send(Ok(frame.to_string())).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_ping_timer_rejects_unusable_periods() {
        assert!(ping_timer(Duration::ZERO).is_none());
        assert!(ping_timer(Duration::MAX).is_none());
        assert!(ping_timer(Duration::from_secs(25)).is_some());
    }

    #[tokio::test]
    async fn test_zero_ping_interval_still_connects() {
        let mut harness = spawn_driver(EngineIoVersion::V3);
        harness.feed(r#"0{"sid":"x","pingInterval":0}"#).await;
        harness.feed("40/chat").await;

        assert!(matches!((&mut harness.ready).await, Ok(Ok(()))));
        assert_eq!(harness.outbound.recv().await.unwrap(), "40/chat");
        assert!(harness.outbound.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_pong_closes_connection() {
        let mut harness = spawn_driver(EngineIoVersion::V3);
        harness
            .feed(r#"0{"sid":"x","pingInterval":1000,"pingTimeout":500}"#)
            .await;
        harness.feed("40/chat").await;
        assert!(matches!((&mut harness.ready).await, Ok(Ok(()))));

        assert_eq!(harness.outbound.recv().await.unwrap(), "40/chat");
        assert_eq!(harness.outbound.recv().await.unwrap(), "2");
        assert!(harness.outbound.recv().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pong_keeps_connection_alive() {
        let mut harness = spawn_driver(EngineIoVersion::V3);
        harness
            .feed(r#"0{"sid":"x","pingInterval":1000,"pingTimeout":500}"#)
            .await;
        harness.feed("40/chat").await;
        assert!(matches!((&mut harness.ready).await, Ok(Ok(()))));

        assert_eq!(harness.outbound.recv().await.unwrap(), "40/chat");
        assert_eq!(harness.outbound.recv().await.unwrap(), "2");
        harness.feed("3").await;
        assert_eq!(harness.outbound.recv().await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_server_close_before_ready_fails_connect() {
        let mut harness = spawn_driver(EngineIoVersion::V3);
        harness.feed(r#"0{"sid":"x"}"#).await;
        harness.feed("1").await;

        assert!(matches!(
            (&mut harness.ready).await,
            Ok(Err(SpacesError::Transport(_)))
        ));
        assert_eq!(harness.outbound.recv().await.unwrap(), "40/chat");
        assert!(harness.outbound.recv().await.is_err());
    }

    #[test]
    fn test_ready_after_both_acks_in_order() {
        let mut progress = ConnectProgress::default();
        assert!(!progress.socket_opened());
        assert!(progress.namespace_connected());
    }

    #[test]
    fn test_ready_after_both_acks_reversed() {
        let mut progress = ConnectProgress::default();
        assert!(!progress.namespace_connected());
        assert!(!progress.is_ready());
        assert!(progress.socket_opened());
        assert!(progress.is_ready());
    }
}
