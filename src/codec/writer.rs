//! Writer for the native route file grammar.

use std::fmt::Write;

use crate::codec::record::{RouteRecord, TargetRecord};

/// Render a record in the native grammar.
///
/// Prefix blocks always carry `max_locdb`; target blocks always carry
/// `prob`, `hash_index` and `status`, and the remaining options only when
/// they differ from their defaults.
pub fn write_record(record: &RouteRecord) -> String {
    let mut out = String::new();
    for domain in &record.domains {
        let _ = writeln!(out, "domain {} {{", quote(&domain.name));
        for prefix in &domain.prefixes {
            let _ = writeln!(out, "\tprefix {} {{", quote(&prefix.prefix));
            let _ = writeln!(out, "\t\tmax_locdb = {}", prefix.max_locdb);
            for target in &prefix.targets {
                out.push('\n');
                write_target(&mut out, target);
            }
            out.push_str("\t}\n");
        }
        out.push_str("}\n\n");
    }
    out
}

fn write_target(out: &mut String, target: &TargetRecord) {
    let _ = writeln!(out, "\t\ttarget {} {{", quote(&target.host));
    let _ = writeln!(out, "\t\t\tprob = {}", target.prob);
    let _ = writeln!(out, "\t\t\thash_index = {}", target.hash_index);
    let _ = writeln!(out, "\t\t\tstatus = {}", target.status);
    if target.strip != 0 {
        let _ = writeln!(out, "\t\t\tstrip = {}", target.strip);
    }
    if !target.rewrite_prefix.is_empty() {
        let _ = writeln!(out, "\t\t\trewrite_prefix = {}", quote(&target.rewrite_prefix));
    }
    if !target.rewrite_suffix.is_empty() {
        let _ = writeln!(out, "\t\t\trewrite_suffix = {}", quote(&target.rewrite_suffix));
    }
    if !target.comment.is_empty() {
        let _ = writeln!(out, "\t\t\tcomment = {}", quote(&target.comment));
    }
    out.push_str("\t\t}\n");
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::grammar::parse_record;
    use crate::codec::record::{DomainRecord, PrefixRecord};

    #[test]
    fn test_defaults_are_omitted() {
        let record = RouteRecord {
            domains: vec![DomainRecord {
                name: "voice".into(),
                prefixes: vec![PrefixRecord {
                    targets: vec![TargetRecord {
                        prob: 0.5,
                        ..TargetRecord::new("gw1")
                    }],
                    ..PrefixRecord::new("49")
                }],
            }],
        };
        let text = write_record(&record);
        assert!(text.contains("prefix \"49\" {"));
        assert!(text.contains("max_locdb = -1"));
        assert!(text.contains("prob = 0.5"));
        assert!(text.contains("status = 1"));
        assert!(!text.contains("strip"));
        assert!(!text.contains("comment"));
    }

    #[test]
    fn test_written_text_parses_back() {
        let mut target = TargetRecord::new("");
        target.prob = 0.25;
        target.strip = 3;
        target.rewrite_prefix = "+".into();
        target.rewrite_suffix = ";user=phone".into();
        target.comment = "say \"hi\"\\\n".into();
        target.status = 2;
        target.hash_index = 4;

        let record = RouteRecord {
            domains: vec![DomainRecord {
                name: "fax lines".into(),
                prefixes: vec![PrefixRecord {
                    targets: vec![target],
                    max_locdb: 0,
                    ..PrefixRecord::new("")
                }],
            }],
        };
        let parsed = parse_record(&write_record(&record), "written").unwrap();
        assert_eq!(parsed, record);
    }
}
