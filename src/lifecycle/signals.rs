//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//! - Trigger appropriate actions (shutdown, reload)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers a route reload, not shutdown
//! - Reloads run on the blocking pool; builds are CPU and file bound

use std::sync::Arc;

use crate::codec::store::RouteStore;
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::table::RouteTable;

/// Handle signals until shutdown.
pub async fn run_signal_loop(table: Arc<RouteTable>, store: RouteStore, shutdown: Arc<Shutdown>) {
    let mut stop = shutdown.subscribe();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut hangup, mut terminate) = match (signal(SignalKind::hangup()), signal(SignalKind::terminate())) {
            (Ok(h), Ok(t)) => (h, t),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    tracing::info!("SIGHUP received, reloading route data");
                    reload(&table, &store).await;
                }
                _ = terminate.recv() => {
                    tracing::info!("SIGTERM received");
                    shutdown.trigger();
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("SIGINT received");
                    shutdown.trigger();
                    break;
                }
                _ = stop.recv() => break,
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (&table, &store);
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received");
                shutdown.trigger();
            }
            _ = stop.recv() => {}
        }
    }
}

/// Reload off the async workers; failures are already logged by the table.
pub async fn reload(table: &Arc<RouteTable>, store: &RouteStore) {
    let table = table.clone();
    let store = store.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || table.reload(&store)).await {
        tracing::error!(error = %e, "Reload task failed");
    }
}
