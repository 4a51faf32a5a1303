use crate::config::ClientConfig;
use crate::error::{Result, SpacesError};
use crate::network::redact_query;
use crate::traits::{SocketConnector, SocketLink};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio_tungstenite::tungstenite::{self, protocol::Message};

/// tokio-tungstenite backed [`SocketConnector`].
///
/// Each link runs two pump tasks: one writes queued frames to the socket,
/// the other forwards received text frames.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    handshake_timeout: Duration,
    queue: usize,
}

impl WebSocketConnector {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            handshake_timeout: config.connect_timeout,
            queue: config.outbound_queue.max(1),
        }
    }
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

#[async_trait]
impl SocketConnector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<SocketLink> {
        tracing::debug!("[Spaces-Socket] Opening {}", redact_query(url));

        let connected =
            tokio::time::timeout(self.handshake_timeout, tokio_tungstenite::connect_async(url))
                .await;
        let ws_stream = match connected {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(tungstenite::Error::Http(response))) => {
                let body = response
                    .body()
                    .as_deref()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default();
                return Err(SpacesError::Http {
                    status: response.status().as_u16(),
                    body,
                });
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(SpacesError::ConnectTimeout(self.handshake_timeout)),
        };

        let (mut sink, mut stream) = ws_stream.split();
        let (out_tx, out_rx) = async_channel::bounded::<String>(self.queue);
        let (in_tx, in_rx) = async_channel::bounded::<Result<String>>(self.queue);

        tokio::spawn(async move {
            while let Ok(frame) = out_rx.recv().await {
                tracing::trace!("[Spaces-Socket] >> {}", frame);
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    tracing::warn!("[Spaces-Socket] Write failed: {}", e);
                    break;
                }
            }
            let _ = sink.send(Message::Close(None)).await;
            let _ = sink.close().await;
            tracing::debug!("[Spaces-Socket] Writer finished");
        });

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let frame = text.as_str().to_owned();
                        tracing::trace!("[Spaces-Socket] << {}", frame);
                        if in_tx.send(Ok(frame)).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        tracing::debug!("[Spaces-Socket] Close frame received: {:?}", frame);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = in_tx.send(Err(e.into())).await;
                        break;
                    }
                }
            }
            tracing::debug!("[Spaces-Socket] Reader finished");
        });

        Ok(SocketLink {
            outgoing: out_tx,
            incoming: in_rx,
        })
    }
}
