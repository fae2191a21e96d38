//! Hierarchical route record: domain → prefix → target.
//!
//! This is the parsed, shape-checked form of a route file. Field names follow
//! the keys of the native grammar so the TOML and JSON renderings read the
//! same way.

use serde::{Deserialize, Serialize};

/// Root of a route record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteRecord {
    #[serde(rename = "domain")]
    pub domains: Vec<DomainRecord>,
}

/// One `domain <name> { ... }` block.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DomainRecord {
    pub name: String,
    #[serde(default, rename = "prefix")]
    pub prefixes: Vec<PrefixRecord>,
}

/// One `prefix <digits> { ... }` block. The empty prefix matches everything.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PrefixRecord {
    #[serde(default)]
    pub prefix: String,
    /// Fallback depth bound; negative means unbounded.
    #[serde(default = "default_max_locdb")]
    pub max_locdb: i64,
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetRecord>,
}

/// One `target <host> { ... }` block. The empty host keeps the original
/// destination.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetRecord {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub prob: f64,
    #[serde(default)]
    pub strip: i64,
    #[serde(default)]
    pub rewrite_prefix: String,
    #[serde(default)]
    pub rewrite_suffix: String,
    /// Zero means no hash index.
    #[serde(default)]
    pub hash_index: i64,
    #[serde(default = "default_status")]
    pub status: i64,
    #[serde(default)]
    pub comment: String,
}

pub(crate) fn default_max_locdb() -> i64 {
    -1
}

pub(crate) fn default_status() -> i64 {
    1
}

impl PrefixRecord {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_locdb: default_max_locdb(),
            targets: Vec::new(),
        }
    }
}

impl TargetRecord {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            prob: 0.0,
            strip: 0,
            rewrite_prefix: String::new(),
            rewrite_suffix: String::new(),
            hash_index: 0,
            status: default_status(),
            comment: String::new(),
        }
    }
}
