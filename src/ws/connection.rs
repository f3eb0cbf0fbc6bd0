//! WebSocket connection state machine.
//!
//! Each accepted socket runs through `Open → Active → Closed`. The read
//! loop feeds inbound frames to the [`RelayService`]; a separate writer
//! task drains the connection's outbound queue into the socket, so
//! broadcasts issued by other connections never block on this one.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::domain::ConnectionId;
use crate::service::RelayService;

/// Lifecycle of a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered and welcomed, nothing received yet.
    Open,
    /// At least one inbound frame handled.
    Active,
    /// Peer closed or the transport failed; the connection is unregistered.
    Closed,
}

impl ConnectionState {
    /// State after an inbound data frame.
    #[must_use]
    pub const fn on_frame(self) -> Self {
        match self {
            Self::Open | Self::Active => Self::Active,
            Self::Closed => Self::Closed,
        }
    }

    /// State after the peer closed or the transport failed.
    #[must_use]
    pub const fn on_close(self) -> Self {
        Self::Closed
    }

    /// Returns `true` once the connection has closed.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// How long the writer may take to flush the close handshake after the
/// connection is unregistered.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs a single WebSocket connection until the peer goes away.
///
/// Frames are handled only while the state is not `Closed`; the
/// transition into `Closed` happens once and is followed by exactly one
/// disconnect.
pub async fn run_connection(socket: WebSocket, service: RelayService) {
    let id = ConnectionId::new();
    let mut outbound = service.connect(id).await;
    let mut state = ConnectionState::Open;

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Ends when the registry drops the connection's sender.
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(err) = ws_tx.send(frame).await {
                tracing::warn!(connection_id = %id, error = %err, "ws send failed");
                return;
            }
        }
        // Flushes the close reply queued by the transport.
        if let Err(err) = ws_tx.close().await {
            tracing::debug!(connection_id = %id, error = %err, "ws close failed");
        }
    });

    while !state.is_closed() {
        let next = match ws_rx.next().await {
            Some(Ok(Message::Text(text))) => {
                service.handle_message(id, text.as_str()).await;
                state.on_frame()
            }
            Some(Ok(Message::Binary(bytes))) => {
                match std::str::from_utf8(&bytes) {
                    Ok(text) => {
                        service.handle_message(id, text).await;
                    }
                    Err(err) => {
                        tracing::warn!(connection_id = %id, error = %err, "Error parsing message");
                    }
                }
                state.on_frame()
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => state,
            Some(Ok(Message::Close(_))) | None => state.on_close(),
            Some(Err(err)) => {
                tracing::warn!(connection_id = %id, error = %err, "ws receive failed");
                state.on_close()
            }
        };
        if next != state {
            tracing::debug!(connection_id = %id, from = ?state, to = ?next, "connection state changed");
            state = next;
        }
    }

    service.disconnect(id).await;

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer)
        .await
        .is_err()
    {
        tracing::debug!(connection_id = %id, "ws writer did not drain, aborting");
        writer.abort();
    }
    tracing::debug!(connection_id = %id, "ws connection closed");
}
