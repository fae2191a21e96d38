//! Conversion between route records and route data snapshots.
//!
//! # Responsibilities
//! - Build a complete snapshot from a record, or fail without side effects
//! - Flatten a snapshot back into a record by pre-order trie traversal
//!
//! # Design Decisions
//! - Everything from configuration lands in the default carrier
//! - Semantic checks (digits, ranges, duplicates) live here, not in the reader
//! - Serialization emits nodes with rules only; branching nodes are re-derived

use crate::codec::record::{DomainRecord, PrefixRecord, RouteRecord, TargetRecord};
use crate::error::{Result, RouteError};
use crate::routing::data::{CarrierTree, RouteData, DEFAULT_CARRIER, DEFAULT_CARRIER_ID};
use crate::routing::rule::{RouteRule, RuleStatus, Target};
use crate::routing::trie::{DomainTree, TrieNode};

/// Build a snapshot from a parsed record.
pub fn build_route_data(record: &RouteRecord) -> Result<RouteData> {
    let mut carrier = CarrierTree::new(DEFAULT_CARRIER_ID, DEFAULT_CARRIER);

    for domain in &record.domains {
        if domain.name.is_empty() {
            return Err(RouteError::malformed("domain", "empty domain name"));
        }
        tracing::debug!(domain = %domain.name, prefixes = domain.prefixes.len(), "Loading domain");
        let tree = carrier.domain_mut_or_insert(&domain.name);
        for prefix in &domain.prefixes {
            add_prefix(tree, domain, prefix)?;
        }
    }

    let data = RouteData::new(vec![carrier]);
    tracing::debug!(
        domains = data.domain_count(),
        rules = data.rule_count(),
        "Route data built"
    );
    Ok(data)
}

fn add_prefix(tree: &mut DomainTree, domain: &DomainRecord, prefix: &PrefixRecord) -> Result<()> {
    let section = || format!("domain {:?} / prefix {:?}", domain.name, prefix.prefix);

    let max_fallback_depth = if prefix.max_locdb < 0 {
        None
    } else {
        Some(u32::try_from(prefix.max_locdb).map_err(|_| {
            RouteError::malformed(section(), format!("max_locdb {} out of range", prefix.max_locdb))
        })?)
    };

    tree.add_prefix(&prefix.prefix, max_fallback_depth)?;
    for target in &prefix.targets {
        let rule = rule_from_target(&prefix.prefix, target)
            .map_err(|reason| RouteError::malformed(format!("{} / target {:?}", section(), target.host), reason))?;
        tracing::trace!(prefix = %rule.prefix, target = %rule.target, prob = rule.probability, "Adding route");
        tree.add_rule(rule, max_fallback_depth)?;
    }
    Ok(())
}

fn rule_from_target(prefix: &str, target: &TargetRecord) -> std::result::Result<RouteRule, String> {
    if !target.prob.is_finite() || !(0.0..=1.0).contains(&target.prob) {
        return Err(format!("prob {} outside [0, 1]", target.prob));
    }
    let strip = usize::try_from(target.strip).map_err(|_| format!("negative strip {}", target.strip))?;
    let hash_index = match target.hash_index {
        0 => None,
        i => Some(u32::try_from(i).map_err(|_| format!("hash_index {i} out of range"))?),
    };

    Ok(RouteRule {
        prefix: prefix.to_string(),
        target: Target::from_title(&target.host),
        probability: target.prob,
        strip,
        rewrite_prefix: target.rewrite_prefix.clone(),
        rewrite_suffix: target.rewrite_suffix.clone(),
        hash_index,
        status: RuleStatus::from_config(target.status),
        comment: target.comment.clone(),
    })
}

/// Flatten the default carrier of a snapshot into a record.
pub fn record_from_data(data: &RouteData) -> RouteRecord {
    data.default_carrier()
        .map(record_from_carrier)
        .unwrap_or_default()
}

/// Flatten one carrier into a record.
pub fn record_from_carrier(carrier: &CarrierTree) -> RouteRecord {
    RouteRecord {
        domains: carrier
            .domains()
            .iter()
            .map(|tree| {
                let mut prefixes = Vec::new();
                collect_prefixes(tree.root(), &mut prefixes);
                DomainRecord {
                    name: tree.name().to_string(),
                    prefixes,
                }
            })
            .collect(),
    }
}

/// Pre-order walk: the node's own rules, then children 0-9.
fn collect_prefixes(node: &TrieNode, out: &mut Vec<PrefixRecord>) {
    if let Some(first) = node.rules().first() {
        out.push(PrefixRecord {
            prefix: first.prefix.clone(),
            max_locdb: node.max_fallback_depth().map_or(-1, i64::from),
            targets: node.rules().iter().map(target_from_rule).collect(),
        });
    }
    for (_, child) in node.children() {
        collect_prefixes(child, out);
    }
}

fn target_from_rule(rule: &RouteRule) -> TargetRecord {
    TargetRecord {
        host: rule.target.as_title().to_string(),
        prob: rule.probability,
        strip: rule.strip as i64,
        rewrite_prefix: rule.rewrite_prefix.clone(),
        rewrite_suffix: rule.rewrite_suffix.clone(),
        hash_index: rule.hash_index.map_or(0, i64::from),
        status: rule.status.as_config(),
        comment: rule.comment.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(prefixes: Vec<PrefixRecord>) -> RouteRecord {
        RouteRecord {
            domains: vec![DomainRecord {
                name: "voice".into(),
                prefixes,
            }],
        }
    }

    fn prefix(p: &str, max_locdb: i64, targets: Vec<TargetRecord>) -> PrefixRecord {
        PrefixRecord {
            prefix: p.into(),
            max_locdb,
            targets,
        }
    }

    fn target(host: &str, prob: f64) -> TargetRecord {
        TargetRecord {
            prob,
            ..TargetRecord::new(host)
        }
    }

    #[test]
    fn test_build_default_carrier() {
        let data = build_route_data(&record(vec![
            prefix("", -1, vec![target("", 1.0)]),
            prefix("49", 3, vec![target("gw1", 0.5), target("gw2", 0.5)]),
        ]))
        .unwrap();

        let carrier = data.default_carrier().unwrap();
        assert_eq!(carrier.name(), DEFAULT_CARRIER);
        assert_eq!(carrier.id(), DEFAULT_CARRIER_ID);

        let root = carrier.domain("voice").unwrap().root();
        assert_eq!(root.rules()[0].target, Target::KeepOriginal);
        let node = root.child(4).and_then(|n| n.child(9)).unwrap();
        assert_eq!(node.rules().len(), 2);
        assert_eq!(node.max_fallback_depth(), Some(3));
        assert_eq!(root.max_fallback_depth(), None);
    }

    #[test]
    fn test_repeated_domain_merges() {
        let mut rec = record(vec![prefix("1", -1, vec![target("gw1", 1.0)])]);
        rec.domains.push(DomainRecord {
            name: "voice".into(),
            prefixes: vec![prefix("2", -1, vec![target("gw2", 1.0)])],
        });
        let data = build_route_data(&rec).unwrap();
        assert_eq!(data.domain_count(), 1);
        assert_eq!(data.rule_count(), 2);
    }

    #[test]
    fn test_duplicate_target_fails_build() {
        let err = build_route_data(&record(vec![prefix(
            "1",
            -1,
            vec![target("gw1", 0.5), target("gw1", 0.5)],
        )]))
        .unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRule { .. }));
    }

    #[test]
    fn test_invalid_values_fail_build() {
        let bad_prob = record(vec![prefix("1", -1, vec![target("gw", 1.5)])]);
        assert!(matches!(build_route_data(&bad_prob), Err(RouteError::Malformed { .. })));

        let mut negative_strip = target("gw", 1.0);
        negative_strip.strip = -1;
        let bad_strip = record(vec![prefix("1", -1, vec![negative_strip])]);
        assert!(matches!(build_route_data(&bad_strip), Err(RouteError::Malformed { .. })));

        let bad_prefix = record(vec![prefix("1x", -1, vec![target("gw", 1.0)])]);
        assert!(matches!(build_route_data(&bad_prefix), Err(RouteError::Malformed { .. })));
    }

    #[test]
    fn test_record_round_trip() {
        let mut gw1 = target("gw1", 0.7);
        gw1.strip = 2;
        gw1.rewrite_prefix = "0".into();
        gw1.hash_index = 1;
        gw1.comment = "primary".into();
        let mut gw2 = target("gw2", 0.3);
        gw2.status = 0;

        let original = record(vec![
            prefix("", -1, vec![target("", 1.0)]),
            prefix("49", 2, vec![gw1, gw2]),
            prefix("4930", -1, vec![target("gw3", 1.0)]),
        ]);
        let data = build_route_data(&original).unwrap();
        assert_eq!(record_from_data(&data), original);
    }

    #[test]
    fn test_serialization_is_preorder() {
        let data = build_route_data(&record(vec![
            prefix("9", -1, vec![target("gw9", 1.0)]),
            prefix("10", -1, vec![target("gw10", 1.0)]),
            prefix("1", -1, vec![target("gw1", 1.0)]),
        ]))
        .unwrap();
        let order: Vec<String> = record_from_data(&data).domains[0]
            .prefixes
            .iter()
            .map(|p| p.prefix.clone())
            .collect();
        assert_eq!(order, vec!["1", "10", "9"]);
    }
}
