//! Error types for building, loading and saving routing data.
//!
//! # Design Decisions
//! - Errors are local to the reload/persistence path; none of them can
//!   corrupt or replace a live snapshot
//! - "No route" is a routing outcome, not an error (see `routing::router`)

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, loading or saving route data.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The persistence source does not exist.
    #[error("route file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The persistence source could not be parsed.
    #[error("parse error in {source_name} at line {line}, section {section}: {message}")]
    ConfigParse {
        source_name: String,
        line: usize,
        section: String,
        message: String,
    },

    /// The record parsed but carries values the trie cannot represent.
    #[error("malformed record in {section}: {reason}")]
    Malformed { section: String, reason: String },

    /// Memory for the new snapshot could not be reserved.
    #[error("allocation failure while building route data: {0}")]
    Allocation(#[from] TryReserveError),

    /// The same (prefix, host) pair appeared twice within one node.
    #[error("duplicate rule in domain {domain}: prefix {prefix:?}, host {host:?}")]
    DuplicateRule {
        domain: String,
        prefix: String,
        host: String,
    },

    /// Reading or writing the persistence source failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be encoded in the requested format.
    #[error("encode error: {0}")]
    Encode(String),
}

impl RouteError {
    pub(crate) fn malformed(section: impl Into<String>, reason: impl Into<String>) -> Self {
        RouteError::Malformed {
            section: section.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = RouteError> = std::result::Result<T, E>;
