//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::response::Response;

use super::connection::run_connection;
use crate::app_state::AppState;

/// Hands an upgrade request over to the relay.
///
/// Shared by every route that accepts upgrades.
pub fn upgrade(ws: WebSocketUpgrade, state: &AppState) -> Response {
    let service = state.relay_service.clone();
    ws.on_upgrade(move |socket| run_connection(socket, service))
}
