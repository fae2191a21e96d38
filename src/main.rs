//! Carrier routing daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                 CARRIER-ROUTED                   │
//!                 │                                                  │
//!   route file ───┼─▶ codec ──▶ RouteData ──▶ RouteTable (ArcSwap)   │
//!        ▲        │     ▲                         │                  │
//!        │        │     │ reload                  ▼                  │
//!   save │        │  watcher / SIGHUP /       router ──▶ select      │
//!        │        │  POST /admin/reload           │                  │
//!        │        │                               ▼                  │
//!        └────────┼── POST /admin/save        RouteOutcome ──────────┼──▶ admin API
//!                 │                                                  │
//!                 │  ┌─────────────┐ ┌───────────────┐ ┌───────────┐ │
//!                 │  │   config    │ │ observability │ │ lifecycle │ │
//!                 │  └─────────────┘ └───────────────┘ └───────────┘ │
//!                 └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use carrier_route::admin::{serve_admin, AdminState};
use carrier_route::config::{load_config, RouteWatcher, RouterConfig};
use carrier_route::lifecycle::{signals::run_signal_loop, Shutdown};
use carrier_route::observability::{logging::init_logging, metrics::init_metrics};
use carrier_route::routing::RouteTable;

#[derive(Parser)]
#[command(name = "carrier-routed")]
#[command(about = "Carrier routing daemon", long_about = None)]
struct Args {
    /// Service configuration file (TOML). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "carrier-routed starting");

    let store = config.routes.store();
    tracing::info!(
        path = %store.path().display(),
        format = ?store.format(),
        watch = config.routes.watch,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // A route file that does not load at startup is fatal.
    let table = match RouteTable::from_store(&store) {
        Ok(table) => Arc::new(table),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load route data");
            return Err(e.into());
        }
    };
    {
        let data = table.load();
        tracing::info!(
            generation = data.generation(),
            carriers = data.carriers().len(),
            domains = data.domain_count(),
            rules = data.rule_count(),
            "Route data loaded"
        );
    }

    let shutdown = Arc::new(Shutdown::new());

    // Kept alive for the lifetime of the daemon.
    let _watcher = if config.routes.watch {
        match RouteWatcher::new(store.clone(), table.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start route watcher");
                None
            }
        }
    } else {
        None
    };

    let signals = tokio::spawn(run_signal_loop(table.clone(), store.clone(), shutdown.clone()));

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState {
            table: table.clone(),
            store: store.clone(),
            routing: config.routing.clone(),
            api_key: config.admin.api_key.as_str().into(),
        };
        if let Err(e) = serve_admin(listener, state, shutdown.subscribe()).await {
            tracing::error!(error = %e, "Admin API failed");
            shutdown.trigger();
        }
    }

    // Without an admin server, or after it stops, wait for the signal loop.
    if let Err(e) = signals.await {
        tracing::error!(error = %e, "Signal loop failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
