//! chat-relay server entry point.
//!
//! Serves the chat page, relays WebSocket chat traffic and broadcasts a
//! reload whenever the watched page changes.

use std::sync::Arc;

use anyhow::Context;

use chat_relay::api;
use chat_relay::app_state::AppState;
use chat_relay::config::RelayConfig;
use chat_relay::domain::ConnectionRegistry;
use chat_relay::service::RelayService;
use chat_relay::telemetry;
use chat_relay::watcher::spawn_file_watcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env().context("loading configuration")?;
    telemetry::init_tracing(config.log_format);

    // Build domain + service layer
    let registry = Arc::new(ConnectionRegistry::new());
    let relay_service = RelayService::new(registry);

    // Live reload; the relay still runs without it
    let _watcher = match spawn_file_watcher(&config.watch_path, relay_service.clone()) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            tracing::warn!(error = %err, "live reload disabled");
            None
        }
    };

    // Build router
    let listen_addr = config.listen_addr;
    let app = api::build_app(AppState::new(relay_service, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("binding {listen_addr}"))?;
    tracing::info!(addr = %listen_addr, "Server is running on port {}", listen_addr.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
