//! The live route table.
//!
//! # Responsibilities
//! - Hold the current snapshot behind an atomically swappable pointer
//! - Serialize reloads and saves so exactly one snapshot is published at a
//!   time and the route file is written by one saver at a time
//! - Run routing decisions against whatever snapshot is current
//!
//! # Design Decisions
//! - Readers never lock: `ArcSwap::load` on the hot path
//! - Builds happen outside the swap; only complete snapshots are stored
//! - Old snapshots are freed when their last reader drops its `Arc`

use arc_swap::{ArcSwap, Guard};
use std::sync::{Arc, Mutex};

use crate::codec::store::RouteStore;
use crate::error::Result;
use crate::observability::metrics;
use crate::routing::data::RouteData;
use crate::routing::router::{self, RouteOutcome, RouteRequest};

/// Shared, hot-reloadable routing state.
#[derive(Debug)]
pub struct RouteTable {
    current: ArcSwap<RouteData>,
    /// Generation of the last published snapshot; held while publishing.
    writer: Mutex<u64>,
}

impl RouteTable {
    /// Create a table serving `data` as generation 1.
    pub fn new(mut data: RouteData) -> Self {
        data.set_generation(1);
        metrics::set_generation(1);
        Self {
            current: ArcSwap::from_pointee(data),
            writer: Mutex::new(1),
        }
    }

    /// A table with no routes; every lookup returns NoRoute.
    pub fn empty() -> Self {
        Self::new(RouteData::default())
    }

    /// Build the initial table from a store.
    pub fn from_store(store: &RouteStore) -> Result<Self> {
        Ok(Self::new(store.load()?))
    }

    /// Borrow the current snapshot for a short read.
    pub fn load(&self) -> Guard<Arc<RouteData>> {
        self.current.load()
    }

    /// Owned handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<RouteData> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    /// Publish a fully built snapshot, returning its generation.
    pub fn publish(&self, data: RouteData) -> u64 {
        let mut last = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        self.publish_locked(&mut last, data)
    }

    fn publish_locked(&self, last: &mut u64, mut data: RouteData) -> u64 {
        *last += 1;
        data.set_generation(*last);
        self.current.store(Arc::new(data));
        metrics::set_generation(*last);
        *last
    }

    /// Rebuild from `store` and publish on success.
    ///
    /// On failure the current snapshot stays live and the error is returned.
    pub fn reload(&self, store: &RouteStore) -> Result<u64> {
        let mut last = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        match store.load() {
            Ok(data) => {
                let rules = data.rule_count();
                let generation = self.publish_locked(&mut last, data);
                metrics::record_reload(true);
                tracing::info!(
                    path = %store.path().display(),
                    generation,
                    rules,
                    "Route data reloaded"
                );
                Ok(generation)
            }
            Err(e) => {
                metrics::record_reload(false);
                tracing::error!(
                    path = %store.path().display(),
                    error = %e,
                    generation = *last,
                    "Failed to reload route data, keeping current snapshot"
                );
                Err(e)
            }
        }
    }

    /// Write the current snapshot to `store`.
    ///
    /// Holds the writer lock, so saves never interleave with each other or
    /// with a reload of the same file.
    pub fn save(&self, store: &RouteStore) -> Result<()> {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        store.save(&self.snapshot())
    }

    /// Route one request against the current snapshot.
    pub fn route(&self, request: &RouteRequest<'_>) -> RouteOutcome {
        let data = self.current.load();
        let outcome = router::route(&data, request, &mut rand::thread_rng());
        metrics::record_lookup(request.domain, &outcome);
        outcome
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::data::{CarrierTree, DEFAULT_CARRIER, DEFAULT_CARRIER_ID};
    use crate::routing::rule::{RouteRule, Target};

    fn single_route(host: &str) -> RouteData {
        let mut carrier = CarrierTree::new(DEFAULT_CARRIER_ID, DEFAULT_CARRIER);
        carrier
            .domain_mut_or_insert("voice")
            .add_rule(RouteRule::new("", Target::Host(host.into()), 1.0), None)
            .unwrap();
        RouteData::new(vec![carrier])
    }

    #[test]
    fn test_publish_swaps_snapshot() {
        let table = RouteTable::new(single_route("old"));
        let held = table.snapshot();
        assert_eq!(table.generation(), 1);

        let generation = table.publish(single_route("new"));
        assert_eq!(generation, 2);

        let outcome = table.route(&RouteRequest::new("voice", "123"));
        assert_eq!(outcome.decision().unwrap().rewrite.destination, "new");

        // A reader holding the old snapshot still sees it intact.
        let mut rng = rand::thread_rng();
        let old = router::route(&held, &RouteRequest::new("voice", "123"), &mut rng);
        assert_eq!(old.decision().unwrap().rewrite.destination, "old");
        assert_eq!(held.generation(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let table = RouteTable::new(single_route("live"));

        let missing = RouteStore::new(dir.path().join("missing.conf"));
        assert!(table.reload(&missing).is_err());

        let broken_path = dir.path().join("broken.conf");
        std::fs::write(&broken_path, "domain voice { prefix 1 {").unwrap();
        assert!(table.reload(&RouteStore::new(&broken_path)).is_err());

        assert_eq!(table.generation(), 1);
        let outcome = table.route(&RouteRequest::new("voice", "1"));
        assert_eq!(outcome.decision().unwrap().rewrite.destination, "live");
    }

    #[test]
    fn test_empty_table_has_no_routes() {
        let table = RouteTable::empty();
        assert!(!table.route(&RouteRequest::new("voice", "1")).is_routed());
    }
}
