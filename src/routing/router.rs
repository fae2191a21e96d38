//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Resolve carrier and domain for a request
//! - Walk the trie path deepest to shallowest, honoring the fallback bound
//! - Select a rule and apply its rewrite
//!
//! # Design Decisions
//! - Stateless: everything is read from the snapshot passed in
//! - Synchronous and lock-free; bounded by trie depth and rule-list length
//! - Explicit NoRoute outcome rather than an error

use rand::Rng;
use serde::Serialize;

use crate::routing::data::RouteData;
use crate::routing::rewrite::{apply_rewrite, Rewrite};
use crate::routing::rule::{RouteRule, Target};
use crate::routing::select::select_rule;
use crate::routing::trie::TrieNode;

/// Input of one routing decision.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    /// Carrier to route in; `None` uses the default carrier.
    pub carrier: Option<&'a str>,
    pub domain: &'a str,
    /// Dialed number, matched digit by digit.
    pub number: &'a str,
    /// Destination kept when the chosen rule does not rewrite it.
    pub destination: &'a str,
    /// Stable per-call value for hash-based selection.
    pub selection_key: Option<&'a str>,
    /// Treat probing rules as eligible.
    pub allow_probing: bool,
}

impl<'a> RouteRequest<'a> {
    pub fn new(domain: &'a str, number: &'a str) -> Self {
        Self {
            carrier: None,
            domain,
            number,
            destination: "",
            selection_key: None,
            allow_probing: false,
        }
    }

    pub fn carrier(mut self, carrier: &'a str) -> Self {
        self.carrier = Some(carrier);
        self
    }

    pub fn destination(mut self, destination: &'a str) -> Self {
        self.destination = destination;
        self
    }

    pub fn selection_key(mut self, key: &'a str) -> Self {
        self.selection_key = Some(key);
        self
    }

    pub fn allow_probing(mut self, allow: bool) -> Self {
        self.allow_probing = allow;
        self
    }
}

/// A successful routing decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    /// Prefix of the matched rule.
    pub prefix: String,
    pub target: Target,
    /// Number and destination to forward.
    pub rewrite: Rewrite,
    /// Edges climbed above the deepest rule-bearing node.
    pub fallback_steps: usize,
}

/// Why no route was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoRouteReason {
    UnknownCarrier,
    UnknownDomain,
    /// No node on the path carries rules.
    NoMatch,
    /// Rules exist but none is eligible within the fallback bound.
    NoEligibleRule,
}

impl NoRouteReason {
    pub fn as_str(self) -> &'static str {
        match self {
            NoRouteReason::UnknownCarrier => "unknown_carrier",
            NoRouteReason::UnknownDomain => "unknown_domain",
            NoRouteReason::NoMatch => "no_match",
            NoRouteReason::NoEligibleRule => "no_eligible_rule",
        }
    }
}

/// Outcome of a routing decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RouteOutcome {
    Routed(RouteDecision),
    NoRoute { reason: NoRouteReason },
}

impl RouteOutcome {
    pub fn decision(&self) -> Option<&RouteDecision> {
        match self {
            RouteOutcome::Routed(decision) => Some(decision),
            RouteOutcome::NoRoute { .. } => None,
        }
    }

    pub fn is_routed(&self) -> bool {
        matches!(self, RouteOutcome::Routed(_))
    }
}

/// Node chosen by the longest-prefix walk, with its eligible rules.
#[derive(Debug)]
pub struct PrefixMatch<'a> {
    pub node: &'a TrieNode,
    pub depth: usize,
    pub eligible: Vec<&'a RouteRule>,
    pub fallback_steps: usize,
}

/// Longest-prefix match with bounded fallback.
///
/// The first rule-bearing node met from the deepest end of the path sets the
/// fallback bound; ancestors further up than that bound are never consulted.
/// Nodes without rules are skipped.
pub fn find_match<'a>(
    root: &'a TrieNode,
    number: &str,
    allow_probing: bool,
) -> Result<PrefixMatch<'a>, NoRouteReason> {
    let path = root.lookup(number);
    let mut anchor: Option<(usize, Option<u32>)> = None;

    for &(node, depth) in path.iter().rev() {
        if node.rules().is_empty() {
            continue;
        }
        let (anchor_depth, bound) = *anchor.get_or_insert((depth, node.max_fallback_depth()));
        let climbed = anchor_depth - depth;
        if bound.is_some_and(|b| climbed > b as usize) {
            return Err(NoRouteReason::NoEligibleRule);
        }

        let eligible: Vec<&RouteRule> = node
            .rules()
            .iter()
            .filter(|r| r.is_eligible(allow_probing))
            .collect();
        if !eligible.is_empty() {
            return Ok(PrefixMatch {
                node,
                depth,
                eligible,
                fallback_steps: climbed,
            });
        }
    }

    Err(match anchor {
        Some(_) => NoRouteReason::NoEligibleRule,
        None => NoRouteReason::NoMatch,
    })
}

/// Route one request against a snapshot.
pub fn route<R>(data: &RouteData, request: &RouteRequest<'_>, rng: &mut R) -> RouteOutcome
where
    R: Rng + ?Sized,
{
    let carrier = match request.carrier {
        Some(name) => data.carrier(name),
        None => data.default_carrier(),
    };
    let Some(carrier) = carrier else {
        return RouteOutcome::NoRoute {
            reason: NoRouteReason::UnknownCarrier,
        };
    };
    let Some(domain) = carrier.domain(request.domain) else {
        return RouteOutcome::NoRoute {
            reason: NoRouteReason::UnknownDomain,
        };
    };

    let matched = match find_match(domain.root(), request.number, request.allow_probing) {
        Ok(matched) => matched,
        Err(reason) => return RouteOutcome::NoRoute { reason },
    };

    let Some(rule) = select_rule(&matched.eligible, request.selection_key, rng) else {
        return RouteOutcome::NoRoute {
            reason: NoRouteReason::NoEligibleRule,
        };
    };

    tracing::trace!(
        domain = %request.domain,
        number = %request.number,
        prefix = %rule.prefix,
        target = %rule.target,
        fallback_steps = matched.fallback_steps,
        "Route selected"
    );

    RouteOutcome::Routed(RouteDecision {
        prefix: rule.prefix.clone(),
        target: rule.target.clone(),
        rewrite: apply_rewrite(rule, request.number, request.destination),
        fallback_steps: matched.fallback_steps,
    })
}
