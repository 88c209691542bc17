//! Box office server binary.
//!
//! Wires the configuration, registry, payment ledger, and HTTP API
//! together and runs until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `boxoffice.yaml` (or `BOXOFFICE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Restore the registry from its snapshot, if one is configured and
//!    present, otherwise start empty
//! 4. Serve the HTTP API until `Ctrl-C` or `SIGTERM`
//! 5. Save the registry snapshot

mod error;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use boxoffice_api::{AppState, ServerConfig};
use boxoffice_core::config::{LogFormat, LoggingConfig, ServiceConfig};
use boxoffice_core::office::BoxOffice;
use boxoffice_core::snapshot;
use boxoffice_ledger::Ledger;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "boxoffice.yaml";

/// Application entry point for the box office server.
///
/// # Errors
///
/// Returns an error if configuration, restore, serving, or the final
/// snapshot save fails.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Load configuration.
    let config_path = std::env::var("BOXOFFICE_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config_found = config_path.exists();
    let config = if config_found {
        ServiceConfig::from_file(&config_path)?
    } else {
        let mut config = ServiceConfig::default();
        config.apply_env_overrides()?;
        config
    };

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("boxoffice-server starting");
    if config_found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        warn!(
            path = %config_path.display(),
            "Config file not found, using defaults and environment"
        );
    }

    // 3. Build the box office.
    let owner = config.owner()?;
    let snapshot_path = config.persistence.snapshot_path.clone();
    let office = match snapshot_path.as_deref().map(snapshot::load).transpose()? {
        Some(Some(saved)) => {
            let office = BoxOffice::restore(owner, saved, Box::new(Ledger::new()))?;
            info!(
                %owner,
                events = office.event_count().await,
                balance = office.balance().await,
                "Registry restored from snapshot"
            );
            office
        }
        _ => {
            info!(%owner, "Starting with an empty registry");
            BoxOffice::new(owner)
        }
    }
    .shared();

    // 4. Serve until Ctrl-C or SIGTERM.
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    let state = Arc::new(AppState::new(Arc::clone(&office)));
    boxoffice_api::start_server(&server_config, state, shutdown_signal()).await?;

    // 5. Persist.
    if let Some(path) = snapshot_path {
        save_snapshot(&office, &path).await?;
    }

    info!("boxoffice-server stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Which signal ended the serve loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    Interrupt,
    Terminate,
}

/// Resolve on `Ctrl-C` or `SIGTERM`.
///
/// A handler that cannot be installed is logged and never fires; the
/// other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let reason = first_signal(ctrl_c, terminate).await;
    info!(?reason, "Shutdown signal received");
}

/// Wait for whichever shutdown trigger fires first.
async fn first_signal<I, T>(interrupt: I, terminate: T) -> Shutdown
where
    I: Future<Output = ()>,
    T: Future<Output = ()>,
{
    tokio::select! {
        () = interrupt => Shutdown::Interrupt,
        () = terminate => Shutdown::Terminate,
    }
}

async fn save_snapshot(office: &BoxOffice, path: &Path) -> Result<(), ServerError> {
    match office.audit().await {
        boxoffice_ledger::ConservationResult::Balanced => {}
        boxoffice_ledger::ConservationResult::Anomaly(anomaly) => {
            warn!(%anomaly, "Saving snapshot despite ledger anomaly");
        }
    }
    snapshot::save(path, &office.snapshot().await)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn terminate_alone_triggers_shutdown() {
        let reason = first_signal(std::future::pending(), async {}).await;
        assert_eq!(reason, Shutdown::Terminate);
    }

    #[tokio::test]
    async fn interrupt_alone_triggers_shutdown() {
        let reason = first_signal(async {}, std::future::pending()).await;
        assert_eq!(reason, Shutdown::Interrupt);
    }

    #[tokio::test]
    async fn terminated_server_still_saves_snapshot() {
        let owner = boxoffice_types::AccountId::new();
        let office = BoxOffice::new(owner).shared();
        let state = Arc::new(AppState::new(Arc::clone(&office)));
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        };

        let shutdown = async {
            first_signal(std::future::pending(), async {}).await;
        };
        boxoffice_api::start_server(&config, state, shutdown).await.unwrap();

        let dir = std::env::temp_dir().join(format!("boxoffice-server-{owner}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("registry.json");
        save_snapshot(&office, &path).await.unwrap();
        assert_eq!(snapshot::load(&path).unwrap().unwrap().owner, owner);
        std::fs::remove_dir_all(dir).unwrap();
    }
}
