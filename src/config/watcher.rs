//! Route file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::codec::store::RouteStore;
use crate::routing::table::RouteTable;

/// A watcher that reloads the route table when the route file changes.
pub struct RouteWatcher {
    store: RouteStore,
    table: Arc<RouteTable>,
}

impl RouteWatcher {
    pub fn new(store: RouteStore, table: Arc<RouteTable>) -> Self {
        Self { store, table }
    }

    /// Start watching in a background thread.
    ///
    /// The parent directory is watched rather than the file itself so that
    /// editors and our own saves, which replace the file by rename, keep
    /// triggering reloads. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self.store.path().file_name().map(|n| n.to_os_string());
        let dir = match self.store.path().parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };
        let store = self.store.clone();
        let table = self.table.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create())
                        && event
                            .paths
                            .iter()
                            .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant {
                        tracing::info!(path = %store.path().display(), "Route file change detected, reloading...");
                        // Errors are logged by the table; the current snapshot stays live.
                        let _ = table.reload(&store);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.store.path().display(), "Route watcher started");
        Ok(watcher)
    }
}
