//! Axum router construction for the HTTP API.
//!
//! Assembles all routes into a single [`Router`] with CORS and request
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// See [`handlers`] for the endpoint table. CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // Catalog
        .route(
            "/api/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/api/events/{name}", get(handlers::get_event))
        // Tickets
        .route("/api/events/{name}/tickets", post(handlers::buy_ticket))
        .route("/api/events/{name}/holder", get(handlers::is_ticket_holder))
        .route("/api/events/{name}/resale", post(handlers::resell_ticket))
        .route("/api/tickets", get(handlers::held_events))
        // Treasury
        .route("/api/withdraw", post(handlers::withdraw))
        .route("/api/balance", get(handlers::balance))
        .route("/api/audit", get(handlers::audit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
