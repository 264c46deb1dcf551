use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::framework::NodeName;

/// A direct neighbour, as configured in the cost table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbour {
    /// the local interface the neighbour is attached to
    pub itf: usize,
    /// Direct link-cost to this neighbour. Lower is better.
    pub link_cost: u32,
}

/// Static link costs to direct neighbours, immutable once the router is built.
///
/// Also defines which interface reaches which neighbour, so it must agree with the wiring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostTable {
    neighbours: BTreeMap<NodeName, Neighbour>,
}

impl CostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// builder style insert
    pub fn with(mut self, neighbour: impl Into<NodeName>, itf: usize, link_cost: u32) -> Self {
        self.insert(neighbour, itf, link_cost);
        self
    }

    pub fn insert(&mut self, neighbour: impl Into<NodeName>, itf: usize, link_cost: u32) {
        self.neighbours.insert(neighbour.into(), Neighbour { itf, link_cost });
    }

    pub fn get(&self, neighbour: &str) -> Option<&Neighbour> {
        self.neighbours.get(neighbour)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeName, &Neighbour)> {
        self.neighbours.iter()
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }
}

impl<N: Into<NodeName>> FromIterator<(N, usize, u32)> for CostTable {
    fn from_iter<I: IntoIterator<Item = (N, usize, u32)>>(iter: I) -> Self {
        let mut table = CostTable::new();
        for (neighbour, itf, cost) in iter {
            table.insert(neighbour, itf, cost);
        }
        table
    }
}
