//! A chat session: one identity, one real-time connection, at most one
//! group space at a time.

use crate::auth::Identity;
use crate::config::ClientConfig;
use crate::error::{Result, SpacesError};
use crate::listeners::{ChatListener, ListenerRegistry};
use crate::network::{HttpApi, WebSocketConnector};
use crate::realtime::{ChatHandler, RealtimeTransport};
use crate::traits::{SocketConnector, SpacesApi};
use crate::types::{ChannelRef, SpaceDetails};
use std::sync::Arc;

/// An authenticated session with Spaces.
///
/// Methods that change the connection or the current space take `&mut self`,
/// so a session has a single writer. Listeners run on the connection's
/// background task and may be added or removed from any thread.
pub struct Session {
    identity: Identity,
    config: Arc<ClientConfig>,
    api: Arc<dyn SpacesApi>,
    connector: Arc<dyn SocketConnector>,
    listeners: Arc<ListenerRegistry>,
    transport: Option<RealtimeTransport>,
    current_space: Option<ChannelRef>,
}

impl Session {
    /// Session over the real network.
    pub fn new(identity: Identity, config: ClientConfig) -> Result<Self> {
        let api = Arc::new(HttpApi::new(config.clone())?);
        let connector = Arc::new(WebSocketConnector::new(&config));
        Ok(Self::with_backends(identity, config, api, connector))
    }

    pub fn with_backends(
        identity: Identity,
        config: ClientConfig,
        api: Arc<dyn SpacesApi>,
        connector: Arc<dyn SocketConnector>,
    ) -> Self {
        Self {
            identity,
            config: Arc::new(config),
            api,
            connector,
            listeners: Arc::new(ListenerRegistry::new()),
            transport: None,
            current_space: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.transport.is_some()
    }

    pub fn current_space(&self) -> Option<&ChannelRef> {
        self.current_space.as_ref()
    }

    /// Log the owned identity in through this session's API backend.
    pub async fn login(&mut self) -> Result<()> {
        self.identity.login(self.api.as_ref()).await
    }

    /// Register a listener for incoming chat messages.
    pub fn add_chat_listener(&self, listener: ChatListener) {
        self.listeners.add(listener);
    }

    /// Remove the first registration of `listener`.
    pub fn remove_chat_listener(&self, listener: &ChatListener) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Open the real-time connection with the identity's credential.
    pub async fn start(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(SpacesError::AlreadyStarted);
        }
        if !self.identity.credential().has_token() {
            return Err(SpacesError::NotAuthenticated);
        }
        let auth_query = self.identity.credential().connection_query_params()?;

        let listeners = self.listeners.clone();
        let on_chat: ChatHandler = Arc::new(move |message| {
            listeners.dispatch(&message);
        });
        let mut transport =
            RealtimeTransport::new(self.config.clone(), self.connector.clone(), on_chat);
        transport.connect(&auth_query).await?;

        self.transport = Some(transport);
        tracing::info!("[Spaces-Session] Session started");
        Ok(())
    }

    /// Close the real-time connection and forget the current space.
    pub async fn stop(&mut self) -> Result<()> {
        let mut transport = self.transport.take().ok_or(SpacesError::NotStarted)?;
        self.current_space = None;
        transport.disconnect().await?;
        tracing::info!("[Spaces-Session] Session stopped");
        Ok(())
    }

    /// Subscribe to a group space, leaving the current one first.
    pub async fn enter_group_space(&mut self, space_id: &str) -> Result<()> {
        self.enter_group_space_with_password(space_id, None).await
    }

    /// Like [`Session::enter_group_space`], for password-protected spaces.
    ///
    /// The unsubscribe from the previous space is queued before the new
    /// subscribe, so the server sees them in that order.
    pub async fn enter_group_space_with_password(
        &mut self,
        space_id: &str,
        password: Option<&str>,
    ) -> Result<()> {
        if space_id.trim().is_empty() {
            return Err(SpacesError::InvalidSpaceId(space_id.to_string()));
        }
        if self.transport.is_none() {
            return Err(SpacesError::NotStarted);
        }
        if self.current_space.is_some() {
            self.leave_group_space().await?;
        }

        let channel = ChannelRef::topic(space_id);
        let transport = self.transport.as_ref().ok_or(SpacesError::NotStarted)?;
        transport.subscribe(&channel, password).await?;
        tracing::info!("[Spaces-Session] Entered space {}", space_id);
        self.current_space = Some(channel);
        Ok(())
    }

    /// Unsubscribe from the current group space.
    pub async fn leave_group_space(&mut self) -> Result<()> {
        let channel = self.current_space.as_ref().ok_or(SpacesError::NotInChannel)?;
        let transport = self.transport.as_ref().ok_or(SpacesError::NotStarted)?;
        transport.unsubscribe(channel).await?;
        tracing::info!("[Spaces-Session] Left space {}", channel.id);
        self.current_space = None;
        Ok(())
    }

    /// Send a chat message to the current group space.
    pub async fn send_group_chat_message(&self, text: &str) -> Result<()> {
        let channel = self.current_space.as_ref().ok_or(SpacesError::NotInChannel)?;
        let transport = self.transport.as_ref().ok_or(SpacesError::NotStarted)?;
        let sender_id = self.identity.id().ok_or(SpacesError::NotAuthenticated)?;
        transport.send(text, channel, sender_id).await
    }

    /// Fetch metadata of a space.
    pub async fn get_space_info(&self, space_id: &str) -> Result<SpaceDetails> {
        let authorization = self.identity.credential().authorization_header_value()?;
        self.api.fetch_space(&authorization, space_id).await
    }
}
