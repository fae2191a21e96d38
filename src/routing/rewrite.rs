//! Number and destination rewriting for a chosen rule.

use serde::Serialize;

use crate::routing::rule::{RouteRule, Target};

/// Result of applying a rule's rewrite policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    /// Number to forward.
    pub number: String,
    /// Destination to forward to.
    pub destination: String,
}

/// `rewrite_prefix + number[strip..] + rewrite_suffix`, with the
/// destination replaced unless the rule keeps the original.
///
/// A strip longer than the number leaves an empty middle part.
pub fn apply_rewrite(rule: &RouteRule, number: &str, original_destination: &str) -> Rewrite {
    let rest = strip_leading(number, rule.strip);

    let mut rewritten =
        String::with_capacity(rule.rewrite_prefix.len() + rest.len() + rule.rewrite_suffix.len());
    rewritten.push_str(&rule.rewrite_prefix);
    rewritten.push_str(rest);
    rewritten.push_str(&rule.rewrite_suffix);

    let destination = match &rule.target {
        Target::Host(host) => host.clone(),
        Target::KeepOriginal => original_destination.to_string(),
    };

    Rewrite {
        number: rewritten,
        destination,
    }
}

fn strip_leading(number: &str, count: usize) -> &str {
    match number.char_indices().nth(count) {
        Some((offset, _)) => &number[offset..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_and_prefix() {
        let rule = RouteRule::new("49", Target::Host("gw1".into()), 1.0)
            .with_strip(2)
            .with_rewrite("0", "");
        let out = apply_rewrite(&rule, "49301234567", "sip.example.com");
        assert_eq!(out.number, "0301234567");
        assert_eq!(out.destination, "gw1");
    }

    #[test]
    fn test_keep_original_destination() {
        let rule = RouteRule::new("", Target::KeepOriginal, 1.0).with_rewrite("+", ";npdi");
        let out = apply_rewrite(&rule, "4930", "proxy.example.com");
        assert_eq!(out.number, "+4930;npdi");
        assert_eq!(out.destination, "proxy.example.com");
    }

    #[test]
    fn test_overlong_strip_truncates() {
        let rule = RouteRule::new("1", Target::Host("gw".into()), 1.0)
            .with_strip(20)
            .with_rewrite("00", "#");
        let out = apply_rewrite(&rule, "12345", "x");
        assert_eq!(out.number, "00#");
    }

    #[test]
    fn test_zero_strip_keeps_number() {
        let rule = RouteRule::new("1", Target::Host("gw".into()), 1.0);
        assert_eq!(apply_rewrite(&rule, "12345", "x").number, "12345");
    }
}
