//! Carrier routing core: prefix tries, rule selection, and hot-reloadable
//! route snapshots.

pub mod admin;
pub mod codec;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use codec::{RouteFormat, RouteStore};
pub use config::schema::RouterConfig;
pub use error::{Result, RouteError};
pub use lifecycle::Shutdown;
pub use routing::{RouteData, RouteOutcome, RouteRequest, RouteTable};
