//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming call (carrier?, domain, number, selection key)
//!     → table.rs (load current snapshot, lock-free)
//!     → router.rs (carrier + domain lookup)
//!     → trie.rs (descent path for the number)
//!     → router.rs (deepest eligible node within fallback bound)
//!     → select.rs (hash or weighted pick)
//!     → rewrite.rs (number + destination)
//!     → Return: Routed decision or NoRoute
//!
//! Reload:
//!     codec builds RouteData off to the side
//!     → table.rs publishes it with one atomic store
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable once published
//! - No locks or allocation-heavy work on the read path
//! - Deterministic under a fixed selection key or seeded RNG

pub mod data;
pub mod rewrite;
pub mod router;
pub mod rule;
pub mod select;
pub mod table;
pub mod trie;

pub use data::{CarrierTree, RouteData, DEFAULT_CARRIER, DEFAULT_CARRIER_ID};
pub use rewrite::{apply_rewrite, Rewrite};
pub use router::{find_match, route, NoRouteReason, RouteDecision, RouteOutcome, RouteRequest};
pub use rule::{RouteRule, RuleStatus, Target};
pub use table::RouteTable;
pub use trie::{DomainTree, TrieNode};
