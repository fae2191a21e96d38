//! Carrier trees and the route data snapshot.
//!
//! # Responsibilities
//! - Group domain tries per carrier
//! - Hold everything a routing decision reads, as one unit
//!
//! # Design Decisions
//! - Built once, never mutated after publication
//! - Strict ownership tree: dropping the snapshot frees every node

use crate::routing::trie::DomainTree;

/// Name of the carrier created when configuration does not name one.
pub const DEFAULT_CARRIER: &str = "default";

/// Index of the default carrier.
pub const DEFAULT_CARRIER_ID: u32 = 1;

/// Routing tables of one carrier/tenant.
#[derive(Debug)]
pub struct CarrierTree {
    id: u32,
    name: String,
    domains: Vec<DomainTree>,
}

impl CarrierTree {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            domains: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domains(&self) -> &[DomainTree] {
        &self.domains
    }

    pub fn domain(&self, name: &str) -> Option<&DomainTree> {
        self.domains.iter().find(|d| d.name() == name)
    }

    /// Get the tree for `name`, appending a new one if absent.
    pub fn domain_mut_or_insert(&mut self, name: &str) -> &mut DomainTree {
        let index = match self.domains.iter().position(|d| d.name() == name) {
            Some(index) => index,
            None => {
                self.domains.push(DomainTree::new(name));
                self.domains.len() - 1
            }
        };
        &mut self.domains[index]
    }
}

/// Immutable routing snapshot shared by all readers.
#[derive(Debug, Default)]
pub struct RouteData {
    carriers: Vec<CarrierTree>,
    /// Publication counter, assigned by the route table.
    generation: u64,
}

impl RouteData {
    pub fn new(carriers: Vec<CarrierTree>) -> Self {
        Self {
            carriers,
            generation: 0,
        }
    }

    pub fn carriers(&self) -> &[CarrierTree] {
        &self.carriers
    }

    pub fn carrier(&self, name: &str) -> Option<&CarrierTree> {
        self.carriers.iter().find(|c| c.name() == name)
    }

    pub fn carrier_by_id(&self, id: u32) -> Option<&CarrierTree> {
        self.carriers.iter().find(|c| c.id() == id)
    }

    /// The carrier used when a request names none.
    pub fn default_carrier(&self) -> Option<&CarrierTree> {
        self.carrier_by_id(DEFAULT_CARRIER_ID)
            .or_else(|| self.carriers.first())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Total number of rules across all carriers and domains.
    pub fn rule_count(&self) -> usize {
        self.carriers
            .iter()
            .flat_map(|c| c.domains())
            .map(|d| d.root().rule_count())
            .sum()
    }

    pub fn domain_count(&self) -> usize {
        self.carriers.iter().map(|c| c.domains().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_insert_is_idempotent() {
        let mut carrier = CarrierTree::new(DEFAULT_CARRIER_ID, DEFAULT_CARRIER);
        carrier.domain_mut_or_insert("voice");
        carrier.domain_mut_or_insert("fax");
        carrier.domain_mut_or_insert("voice");

        let names: Vec<&str> = carrier.domains().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["voice", "fax"]);
    }

    #[test]
    fn test_default_carrier_lookup() {
        let data = RouteData::new(vec![
            CarrierTree::new(2, "premium"),
            CarrierTree::new(DEFAULT_CARRIER_ID, DEFAULT_CARRIER),
        ]);
        assert_eq!(data.default_carrier().map(|c| c.name()), Some(DEFAULT_CARRIER));
        assert_eq!(data.carrier("premium").map(|c| c.id()), Some(2));
        assert!(RouteData::default().default_carrier().is_none());
    }
}
