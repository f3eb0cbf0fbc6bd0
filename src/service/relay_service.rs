//! Relay service: the connection lifecycle and broadcast rules.

use std::sync::Arc;

use axum::extract::ws::Message;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::domain::registry::OutboundReceiver;
use crate::domain::{
    BroadcastOutcome, ChatMessage, ConnectionHandle, ConnectionId, ConnectionRegistry,
};
use crate::error::RelayError;

/// Chat payload sent by a client.
///
/// Any JSON value except `null` is accepted. `username` and `message` are
/// taken as given, whatever their type; any other field (including
/// `type`) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingChat {
    /// Sender name, absent if the client sent none.
    pub username: Option<Value>,
    /// Chat text, absent if the client sent none.
    pub message: Option<Value>,
}

impl IncomingChat {
    /// Parses a client payload.
    ///
    /// Returns `Ok(None)` for a JSON `null`, which carries no fields to
    /// relay.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if `raw` is not JSON.
    pub fn parse(raw: &str) -> Result<Option<Self>, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(Self {
            username: value.get("username").cloned(),
            message: value.get("message").cloned(),
        }))
    }
}

/// Coordinator for everything that happens to the connection set.
///
/// Each operation follows the same shape: mutate the registry if needed,
/// build a [`ChatMessage`], broadcast it, log the outcome.
#[derive(Debug, Clone)]
pub struct RelayService {
    registry: Arc<ConnectionRegistry>,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Accepts a connection: queues the welcome frame and registers it.
    ///
    /// The welcome is enqueued before the connection becomes visible to
    /// broadcasts, so it is always the first frame the client sees.
    /// Returns the receiving end of the connection's outbound queue.
    pub async fn connect(&self, id: ConnectionId) -> OutboundReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new(tx);

        match ChatMessage::welcome().to_json() {
            Ok(json) => {
                if !handle.send(Message::text(json)) {
                    tracing::warn!(connection_id = %id, "failed to queue welcome message");
                }
            }
            Err(err) => {
                tracing::warn!(connection_id = %id, error = %err, "failed to encode welcome message");
            }
        }

        let count = self.registry.register(id, handle).await;
        tracing::info!(connection_id = %id, connections = count, "New client connected");
        rx
    }

    /// Handles a text payload from a client.
    ///
    /// Malformed payloads are logged and dropped; nothing is sent back.
    /// A valid payload is relayed to every open connection, the sender
    /// included. Returns the broadcast outcome, or `None` if the payload
    /// was dropped.
    pub async fn handle_message(&self, id: ConnectionId, raw: &str) -> Option<BroadcastOutcome> {
        tracing::debug!(connection_id = %id, payload = raw, "Received");

        let incoming = match IncomingChat::parse(raw) {
            Ok(Some(incoming)) => incoming,
            Ok(None) => {
                tracing::warn!(connection_id = %id, "Error parsing message: null payload");
                return None;
            }
            Err(err) => {
                tracing::warn!(connection_id = %id, error = %err, "Error parsing message");
                return None;
            }
        };

        let msg = ChatMessage::chat(incoming.username, incoming.message);
        self.broadcast(&msg).await.ok()
    }

    /// Removes a connection and tells the remaining ones that a user left.
    pub async fn disconnect(&self, id: ConnectionId) -> Option<BroadcastOutcome> {
        let Some(handle) = self.registry.unregister(id).await else {
            tracing::debug!(connection_id = %id, "disconnect for unknown connection");
            return None;
        };

        let session = Utc::now().signed_duration_since(handle.connected_at());
        let remaining = self.registry.len().await;
        tracing::info!(
            connection_id = %id,
            session_secs = session.num_seconds(),
            connections = remaining,
            "Client disconnected"
        );

        self.broadcast(&ChatMessage::user_left()).await.ok()
    }

    /// Broadcasts the reload signal after the watched file changed.
    pub async fn file_changed(&self) -> Option<BroadcastOutcome> {
        tracing::info!("watched file changed, asking clients to reload");
        self.broadcast(&ChatMessage::reload()).await.ok()
    }

    /// Broadcasts `msg` to every open connection.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if the message cannot be
    /// encoded.
    pub async fn broadcast(&self, msg: &ChatMessage) -> Result<BroadcastOutcome, RelayError> {
        let outcome = self.registry.broadcast(msg).await.inspect_err(|err| {
            tracing::error!(error = %err, "broadcast failed");
        })?;
        tracing::debug!(
            delivered = outcome.delivered,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "broadcast complete"
        );
        Ok(outcome)
    }
}
