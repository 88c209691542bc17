//! HTTP API for the box office event registry.
//!
//! This crate exposes every registry operation as a JSON endpoint on an
//! Axum router:
//!
//! - **Catalog** (`/api/events`, `/api/events/{name}`): create, list, and
//!   inspect events
//! - **Tickets** (`/api/events/{name}/tickets`, `/resale`, `/holder`,
//!   `/api/tickets`): buy, resell, and query holdings
//! - **Treasury** (`/api/withdraw`, `/api/balance`, `/api/audit`): owner
//!   withdrawal and the conservation check
//! - **Status** (`GET /`, `GET /health`): HTML status page and liveness
//!
//! # Caller identity
//!
//! Caller-identified routes read the account from the `x-caller-id`
//! header through the [`Caller`] extractor. A missing or malformed header
//! is rejected with `400` before the handler runs, as is a malformed JSON
//! body or path (see [`extract`]).
//!
//! # Architecture
//!
//! Handlers hold no state of their own. Every request goes through the
//! shared [`BoxOffice`](boxoffice_core::office::BoxOffice) in [`AppState`],
//! which serializes access to the registry and payment gateway.

pub mod caller;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use caller::{CALLER_HEADER, Caller};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
