//! Set of live WebSocket connections.
//!
//! [`ConnectionRegistry`] maps each [`ConnectionId`] to the outbound queue
//! of its connection task. A broadcast serializes once and enqueues the
//! same frame on every open queue; writer tasks drain the queues to the
//! sockets, so a broadcast never waits on a client.

use std::collections::HashMap;

use axum::extract::ws::{Message, Utf8Bytes};
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};

use super::{ChatMessage, ConnectionId};
use crate::error::RelayError;

/// Sending half of a connection's outbound queue.
///
/// Unbounded: a slow client accumulates frames without limit.
pub type OutboundSender = mpsc::UnboundedSender<Message>;

/// Receiving half of a connection's outbound queue.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Message>;

/// Registry entry for one accepted connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    sender: OutboundSender,
    connected_at: DateTime<Utc>,
}

impl ConnectionHandle {
    /// Wraps the outbound queue of a freshly accepted connection.
    #[must_use]
    pub fn new(sender: OutboundSender) -> Self {
        Self {
            sender,
            connected_at: Utc::now(),
        }
    }

    /// Returns `true` while the connection's writer task still drains
    /// the queue.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// When the connection was accepted.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Enqueues a frame for this connection.
    ///
    /// Returns `false` if the writer side is already gone.
    pub fn send(&self, frame: Message) -> bool {
        self.sender.send(frame).is_ok()
    }
}

/// Per-broadcast delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Connections the frame was enqueued for.
    pub delivered: usize,
    /// Connections skipped because their transport was no longer open.
    pub skipped: usize,
    /// Connections whose queue rejected the frame mid-broadcast.
    pub failed: usize,
}

/// Owned set of live connections, shared through the application state.
///
/// Entries are inserted on accept and removed only by
/// [`ConnectionRegistry::unregister`]; broadcasting never removes
/// anything, it just skips closed entries.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a connection, returning the number of live connections.
    pub async fn register(&self, id: ConnectionId, handle: ConnectionHandle) -> usize {
        let mut map = self.connections.write().await;
        map.insert(id, handle);
        map.len()
    }

    /// Removes a connection, returning its handle if it was present.
    pub async fn unregister(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        self.connections.write().await.remove(&id)
    }

    /// Serializes `msg` once and enqueues it on every open connection.
    ///
    /// Closed connections are skipped; a failed enqueue is logged and the
    /// loop moves on.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if `msg` cannot be encoded,
    /// in which case nothing is sent.
    pub async fn broadcast(&self, msg: &ChatMessage) -> Result<BroadcastOutcome, RelayError> {
        let frame = Utf8Bytes::from(msg.to_json()?);
        let map = self.connections.read().await;
        let mut outcome = BroadcastOutcome::default();

        for (id, handle) in map.iter() {
            if !handle.is_open() {
                outcome.skipped = outcome.skipped.saturating_add(1);
                continue;
            }
            if handle.send(Message::Text(frame.clone())) {
                outcome.delivered = outcome.delivered.saturating_add(1);
            } else {
                outcome.failed = outcome.failed.saturating_add(1);
                tracing::warn!(connection_id = %id, "failed to enqueue broadcast frame");
            }
        }

        Ok(outcome)
    }

    /// Returns `true` if the connection is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
