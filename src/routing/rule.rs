//! Route rules: one candidate target and its rewrite policy.
//!
//! # Design Decisions
//! - Rules are immutable once attached to a trie node
//! - "Match all" and "keep destination" are typed variants, not magic strings
//! - Status is an explicit tri-state; unknown integers fall back to Disabled

use serde::Serialize;
use std::fmt;

/// Administrative state of a rule.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// Administratively excluded.
    Disabled = 0,
    /// Eligible for real traffic.
    #[default]
    Enabled = 1,
    /// Excluded from normal traffic, on watch for recovery.
    Probing = 2,
}

impl RuleStatus {
    /// Decode the integer carried in configuration.
    ///
    /// Unrecognized values are treated as `Disabled` and logged so an operator
    /// can review them.
    pub fn from_config(value: i64) -> Self {
        match value {
            0 => RuleStatus::Disabled,
            1 => RuleStatus::Enabled,
            2 => RuleStatus::Probing,
            other => {
                tracing::warn!(status = other, "Unrecognized rule status, treating as disabled");
                RuleStatus::Disabled
            }
        }
    }

    /// Integer written back to configuration.
    pub fn as_config(self) -> i64 {
        self as u8 as i64
    }

    /// Whether a rule in this state may carry traffic.
    pub fn is_eligible(self, allow_probing: bool) -> bool {
        match self {
            RuleStatus::Enabled => true,
            RuleStatus::Probing => allow_probing,
            RuleStatus::Disabled => false,
        }
    }
}

/// Where a matched call is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "host")]
pub enum Target {
    /// Rewrite the destination to this host.
    Host(String),
    /// Keep the caller's original destination.
    KeepOriginal,
}

impl Target {
    /// Build from a configuration title; the empty title means keep original.
    pub fn from_title(title: &str) -> Self {
        if title.is_empty() {
            Target::KeepOriginal
        } else {
            Target::Host(title.to_string())
        }
    }

    /// Title written back to configuration.
    pub fn as_title(&self) -> &str {
        match self {
            Target::Host(host) => host,
            Target::KeepOriginal => "",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Host(host) => f.write_str(host),
            Target::KeepOriginal => f.write_str("<original>"),
        }
    }
}

/// One routing target attached to a trie node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRule {
    /// Digit string this rule matches; empty for the catch-all at the root.
    pub prefix: String,
    /// Destination after rewriting.
    pub target: Target,
    /// Weight in [0.0, 1.0] for weighted selection among siblings.
    pub probability: f64,
    /// Leading digits removed before rewriting.
    pub strip: usize,
    pub rewrite_prefix: String,
    pub rewrite_suffix: String,
    /// Selection-key slot; `Some` makes selection deterministic.
    pub hash_index: Option<u32>,
    pub status: RuleStatus,
    pub comment: String,
}

impl RouteRule {
    /// Create an enabled rule with no rewriting.
    pub fn new(prefix: impl Into<String>, target: Target, probability: f64) -> Self {
        Self {
            prefix: prefix.into(),
            target,
            probability,
            strip: 0,
            rewrite_prefix: String::new(),
            rewrite_suffix: String::new(),
            hash_index: None,
            status: RuleStatus::Enabled,
            comment: String::new(),
        }
    }

    pub fn with_strip(mut self, strip: usize) -> Self {
        self.strip = strip;
        self
    }

    pub fn with_rewrite(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.rewrite_prefix = prefix.into();
        self.rewrite_suffix = suffix.into();
        self
    }

    pub fn with_hash_index(mut self, index: u32) -> Self {
        self.hash_index = Some(index);
        self
    }

    pub fn with_status(mut self, status: RuleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// True when the rule may carry traffic for this request.
    pub fn is_eligible(&self, allow_probing: bool) -> bool {
        self.status.is_eligible(allow_probing)
    }
}
