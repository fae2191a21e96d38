//! Rule selection among the eligible rules of a matched node.
//!
//! # Strategies
//! - Hash: deterministic, keyed by a stable per-call value (retransmissions
//!   of one call land on the same target)
//! - Weighted: random draw proportional to rule probability
//!
//! # Design Decisions
//! - Hash selection applies whenever an eligible rule carries a hash index
//!   and the caller supplied a key; otherwise weighted selection
//! - Hash slots are ordered by `hash_index`, so a rule's slot follows its
//!   index rather than its position in the file
//! - Weighted candidates are scanned in insertion order, so a seeded RNG
//!   reproduces the same picks
//! - The RNG is injected; the router owns no random state

use rand::Rng;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::routing::rule::RouteRule;

/// Seed for selection-key hashing. Changing it remaps every hashed call.
const HASH_SEED: u64 = 0x6361_7272_6965_7231;

/// Stable hash of a selection key.
pub fn key_hash(key: &str) -> u64 {
    xxh3_64_with_seed(key.as_bytes(), HASH_SEED)
}

/// Pick one rule from `eligible`, or `None` if it is empty.
pub fn select_rule<'a, R>(
    eligible: &[&'a RouteRule],
    selection_key: Option<&str>,
    rng: &mut R,
) -> Option<&'a RouteRule>
where
    R: Rng + ?Sized,
{
    if eligible.is_empty() {
        return None;
    }
    if let Some(key) = selection_key {
        if let Some(rule) = select_by_hash(eligible, key) {
            return Some(rule);
        }
    }
    select_weighted(eligible, rng)
}

/// Deterministic pick among the hash-indexed rules.
///
/// The hash-indexed candidates are sorted by `hash_index` (equal indices
/// keep insertion order) and the key hash picks a slot in that order.
/// Returns `None` when no candidate carries a hash index.
pub fn select_by_hash<'a>(eligible: &[&'a RouteRule], key: &str) -> Option<&'a RouteRule> {
    let mut hashed: Vec<(u32, &'a RouteRule)> = eligible
        .iter()
        .filter_map(|r| r.hash_index.map(|index| (index, *r)))
        .collect();
    if hashed.is_empty() {
        return None;
    }
    hashed.sort_by_key(|&(index, _)| index);
    let slot = (key_hash(key) % hashed.len() as u64) as usize;
    Some(hashed[slot].1)
}

/// Probability-weighted pick.
///
/// Weights are normalized over the candidates. Zero-weight rules only win
/// when they are the sole candidate, or when every weight is zero (the first
/// candidate then wins).
pub fn select_weighted<'a, R>(eligible: &[&'a RouteRule], rng: &mut R) -> Option<&'a RouteRule>
where
    R: Rng + ?Sized,
{
    match eligible {
        [] => return None,
        [only] => return Some(*only),
        _ => {}
    }

    let total: f64 = eligible.iter().map(|r| weight(r)).sum();
    if total <= 0.0 {
        return eligible.first().copied();
    }

    let draw = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_weighted = None;
    for rule in eligible.iter().copied() {
        let w = weight(rule);
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_weighted = Some(rule);
        if draw < cumulative {
            return Some(rule);
        }
    }
    // Float rounding can leave draw == total.
    last_weighted
}

#[inline]
fn weight(rule: &RouteRule) -> f64 {
    if rule.probability.is_finite() && rule.probability > 0.0 {
        rule.probability
    } else {
        0.0
    }
}
