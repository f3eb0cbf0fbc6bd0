//! HTTP layer: the page route and the catch-all, both upgrade-aware.

pub mod handlers;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the route table without state.
pub fn build_router() -> Router<AppState> {
    handlers::page::routes()
}

/// Builds the complete application: routes, middleware and state.
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
