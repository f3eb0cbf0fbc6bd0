//! Page endpoints: the chat page at `/` and the plaintext catch-all.
//!
//! Both also accept WebSocket upgrades, so clients may connect on any
//! path (`/ws` included).

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::any;

use crate::app_state::AppState;
use crate::error::RelayError;
use crate::ws::handler::upgrade;

/// Body of every non-page response.
pub const STATUS_TEXT: &str = "WebSocket server is running";

/// `/` — Serves the chat page, or upgrades to WebSocket.
///
/// The page is read from disk on every request so edits show up on the
/// next reload.
///
/// # Errors
///
/// Returns [`RelayError::IndexUnavailable`] (HTTP 500) if the page
/// cannot be read.
pub async fn index_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    if let Ok(ws) = ws {
        return Ok(upgrade(ws, &state));
    }

    let path = &state.config.index_path;
    let content = tokio::fs::read(path).await.map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "failed to read page");
        RelayError::IndexUnavailable {
            path: path.clone(),
            source,
        }
    })?;

    Ok(Html(content).into_response())
}

/// Any other route — Plaintext status, or upgrade to WebSocket.
pub async fn fallback_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Response {
    match ws {
        Ok(ws) => upgrade(ws, &state),
        Err(_) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            STATUS_TEXT,
        )
            .into_response(),
    }
}

/// Page routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", any(index_handler))
        .fallback(fallback_handler)
}
