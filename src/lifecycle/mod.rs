//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Load routes → Start watcher/admin/metrics
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Notify subscribers → Stop admin server → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Reload route data
//! ```
//!
//! # Design Decisions
//! - Fail fast: a route file that does not load at startup is fatal
//! - After startup, reload failures only log; the live snapshot stays

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
