//! Error types for the box office server binary.
//!
//! [`ServerError`] is the top-level error type that wraps every failure
//! mode during startup, serving, and shutdown.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: boxoffice_core::config::ConfigError,
    },

    /// Reading or writing the registry snapshot failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: boxoffice_core::snapshot::SnapshotError,
    },

    /// Restoring the box office from a snapshot failed.
    #[error("restore error: {source}")]
    Restore {
        /// The underlying office error.
        #[from]
        source: boxoffice_core::office::OfficeError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("http error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: boxoffice_api::ServerError,
    },
}
