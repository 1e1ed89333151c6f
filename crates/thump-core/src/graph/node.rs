//! Graph node: a named unit plus its adjacency.
//!
//! Each node records its downstream neighbours in `next` and its upstream
//! neighbours in `prev`, keyed by node name and tagged with the
//! [`Target`] the edge lands on. The graph keeps the two maps symmetric.

use std::collections::BTreeMap;

use crate::unit::{Target, Unit};

/// A named wrapper around one processing unit.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) unit: Unit,
    pub(crate) next: BTreeMap<String, Target>,
    pub(crate) prev: BTreeMap<String, Target>,
}

impl Node {
    pub(crate) fn new(unit: Unit) -> Self {
        Self {
            unit,
            next: BTreeMap::new(),
            prev: BTreeMap::new(),
        }
    }

    /// The processing unit.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Downstream neighbours and the target each edge lands on.
    pub fn next(&self) -> &BTreeMap<String, Target> {
        &self.next
    }

    /// Upstream neighbours and the target each edge lands on here.
    pub fn prev(&self) -> &BTreeMap<String, Target> {
        &self.prev
    }

    /// True if the node has no edges in either direction.
    pub fn is_isolated(&self) -> bool {
        self.next.is_empty() && self.prev.is_empty()
    }
}
