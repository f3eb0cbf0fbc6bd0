//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service owning the connection registry.
    pub relay_service: RelayService,
    /// Runtime configuration (page path, listen address).
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Bundles the service and configuration.
    #[must_use]
    pub fn new(relay_service: RelayService, config: RelayConfig) -> Self {
        Self {
            relay_service,
            config: Arc::new(config),
        }
    }
}
