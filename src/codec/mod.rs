//! Route file codec.
//!
//! # Data Flow
//! ```text
//! route file (native / TOML / JSON)
//!     → grammar.rs or serde (parse into RouteRecord)
//!     → build.rs (semantic checks, trie construction)
//!     → RouteData (complete, unpublished)
//!
//! On save:
//!     RouteData
//!     → build.rs (pre-order trie walk into RouteRecord)
//!     → writer.rs or serde (render)
//!     → store.rs (temp file + rename)
//! ```
//!
//! # Design Decisions
//! - A build either yields a whole snapshot or an error; nothing partial
//! - Record types mirror the grammar so every format carries the same shape

pub mod build;
pub mod grammar;
pub mod record;
pub mod store;
pub mod writer;

pub use build::{build_route_data, record_from_data};
pub use record::{DomainRecord, PrefixRecord, RouteRecord, TargetRecord};
pub use store::{RouteFormat, RouteStore};
