//! Decimal-digit prefix trie.
//!
//! # Responsibilities
//! - Store ordered rule lists at digit positions
//! - Produce the descent path for a dialed number
//!
//! # Design Decisions
//! - Fixed 10-slot child array, no hashing on the hot path
//! - Nodes own their children exclusively; no parent pointers
//! - Mutation is crate-private and only happens before publication

use crate::error::{Result, RouteError};
use crate::routing::rule::RouteRule;

/// Branching factor of the trie.
pub const DIGITS: usize = 10;

/// Map an ASCII digit to its child slot.
#[inline]
fn slot(c: u8) -> Option<usize> {
    c.is_ascii_digit().then(|| (c - b'0') as usize)
}

/// One digit level of the trie.
#[derive(Debug)]
pub struct TrieNode {
    rules: Vec<RouteRule>,
    children: [Option<Box<TrieNode>>; DIGITS],
    /// Ancestors the router may consult when every rule here is ineligible.
    /// `None` is unbounded.
    max_fallback_depth: Option<u32>,
}

impl Default for TrieNode {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            children: Default::default(),
            max_fallback_depth: None,
        }
    }
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules attached to this node, in insertion order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn max_fallback_depth(&self) -> Option<u32> {
        self.max_fallback_depth
    }

    pub fn child(&self, digit: u8) -> Option<&TrieNode> {
        self.children.get(digit as usize)?.as_deref()
    }

    /// Existing children in digit order 0-9.
    pub fn children(&self) -> impl Iterator<Item = (u8, &TrieNode)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(digit, child)| child.as_deref().map(|node| (digit as u8, node)))
    }

    /// Descent path for `digits`, shallowest first, as `(node, depth)`.
    ///
    /// Stops at the end of the input, the first missing child, or the first
    /// non-digit character. The root is always included at depth 0.
    pub fn lookup<'a>(&'a self, digits: &str) -> Vec<(&'a TrieNode, usize)> {
        let mut path = Vec::with_capacity(digits.len() + 1);
        path.push((self, 0));

        let mut node = self;
        for (depth, c) in digits.bytes().enumerate() {
            let Some(next) = slot(c).and_then(|i| node.children[i].as_deref()) else {
                break;
            };
            path.push((next, depth + 1));
            node = next;
        }
        path
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().map(|(_, child)| child.node_count()).sum::<usize>()
    }

    /// Number of rules in this subtree.
    pub fn rule_count(&self) -> usize {
        self.rules.len() + self.children().map(|(_, child)| child.rule_count()).sum::<usize>()
    }

    /// Find or create the node for `prefix`, creating intermediate nodes.
    pub(crate) fn descend_mut(&mut self, prefix: &str) -> Result<&mut TrieNode> {
        let mut node = self;
        for c in prefix.bytes() {
            let i = slot(c).ok_or_else(|| {
                RouteError::malformed(
                    format!("prefix {prefix:?}"),
                    format!("non-digit character {:?}", c as char),
                )
            })?;
            node = node.children[i].get_or_insert_with(Box::default);
        }
        Ok(node)
    }

    pub(crate) fn set_max_fallback_depth(&mut self, depth: Option<u32>) {
        self.max_fallback_depth = depth;
    }

    /// Append a rule, rejecting a second rule for the same target.
    ///
    /// On a duplicate the rejected rule is handed back to the caller.
    pub(crate) fn push_rule(&mut self, rule: RouteRule) -> Result<(), Box<RouteRule>> {
        if self
            .rules
            .iter()
            .any(|r| r.prefix == rule.prefix && r.target == rule.target)
        {
            return Err(Box::new(rule));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub(crate) fn reserve_rules(&mut self, additional: usize) -> Result<()> {
        self.rules.try_reserve(additional)?;
        Ok(())
    }
}

/// A named trie for one domain (traffic class).
#[derive(Debug)]
pub struct DomainTree {
    name: String,
    root: TrieNode,
}

impl DomainTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: TrieNode::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Attach `rule` at the node for its prefix.
    ///
    /// `max_fallback_depth` is recorded on that node; the last value given for
    /// a prefix wins.
    pub fn add_rule(&mut self, rule: RouteRule, max_fallback_depth: Option<u32>) -> Result<()> {
        let node = self.root.descend_mut(&rule.prefix)?;
        node.set_max_fallback_depth(max_fallback_depth);
        node.reserve_rules(1)?;
        node.push_rule(rule).map_err(|rule| RouteError::DuplicateRule {
            domain: self.name.clone(),
            prefix: rule.prefix.clone(),
            host: rule.target.as_title().to_string(),
        })
    }

    /// Create the node for `prefix` without attaching rules.
    pub fn add_prefix(&mut self, prefix: &str, max_fallback_depth: Option<u32>) -> Result<()> {
        self.root
            .descend_mut(prefix)?
            .set_max_fallback_depth(max_fallback_depth);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::rule::Target;

    fn host(h: &str) -> Target {
        Target::Host(h.into())
    }

    #[test]
    fn test_lookup_stops_at_missing_child() {
        let mut tree = DomainTree::new("voice");
        tree.add_rule(RouteRule::new("49", host("gw1"), 1.0), None).unwrap();

        let path = tree.root().lookup("4930123");
        let depths: Vec<usize> = path.iter().map(|(_, d)| *d).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(path[2].0.rules().len(), 1);
        assert!(path[1].0.rules().is_empty());
    }

    #[test]
    fn test_lookup_stops_at_non_digit() {
        let mut tree = DomainTree::new("voice");
        tree.add_rule(RouteRule::new("49", host("gw1"), 1.0), None).unwrap();

        let path = tree.root().lookup("4+9");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_empty_prefix_lands_on_root() {
        let mut tree = DomainTree::new("voice");
        tree.add_rule(RouteRule::new("", host("default"), 1.0), Some(0)).unwrap();
        assert_eq!(tree.root().rules().len(), 1);
        assert_eq!(tree.root().max_fallback_depth(), Some(0));
        assert_eq!(tree.root().node_count(), 1);
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let mut tree = DomainTree::new("voice");
        tree.add_rule(RouteRule::new("1", host("gw1"), 0.5), None).unwrap();
        tree.add_rule(RouteRule::new("1", host("gw2"), 0.5), None).unwrap();

        let err = tree.add_rule(RouteRule::new("1", host("gw1"), 0.1), None).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRule { ref prefix, ref host, .. } if prefix == "1" && host == "gw1"));
        assert_eq!(tree.root().rule_count(), 2);
    }

    #[test]
    fn test_non_digit_prefix_rejected() {
        let mut tree = DomainTree::new("voice");
        let err = tree.add_rule(RouteRule::new("4a", host("gw1"), 1.0), None).unwrap_err();
        assert!(matches!(err, RouteError::Malformed { .. }));
    }

    #[test]
    fn test_children_in_digit_order() {
        let mut tree = DomainTree::new("voice");
        for prefix in ["9", "0", "5"] {
            tree.add_rule(RouteRule::new(prefix, host("gw"), 1.0), None).unwrap();
        }
        let digits: Vec<u8> = tree.root().children().map(|(d, _)| d).collect();
        assert_eq!(digits, vec![0, 5, 9]);
    }
}
