//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!
//! Route file changes:
//!     watcher.rs detects change
//!     → RouteTable::reload (build off to the side)
//!     → atomic swap of Arc<RouteData>
//!     → readers observe new routes on their next lookup
//! ```
//!
//! # Design Decisions
//! - Service config is immutable once loaded; route data is what hot-reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, ObservabilityConfig, RouterConfig, RoutesConfig, RoutingConfig};
pub use watcher::RouteWatcher;
