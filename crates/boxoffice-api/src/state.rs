//! Shared application state for the HTTP API.

use std::sync::Arc;

use boxoffice_core::office::BoxOffice;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The registry and its payment gateway.
    pub office: Arc<BoxOffice>,
}

impl AppState {
    /// Create application state around a shared box office.
    pub const fn new(office: Arc<BoxOffice>) -> Self {
        Self { office }
    }
}
