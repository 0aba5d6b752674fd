use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use crate::NodeId;
use super::Willingness;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborEntry {
    pub node_id: NodeId,
    /// The neighbor's own one-hop set, i.e. our two-hop horizon through it.
    pub neighbors: BTreeSet<NodeId>,
    pub willingness: Willingness,
}

/// One-hop neighbors learnt from Hello messages.
///
/// Entries are refreshed on every Hello and never aged out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborTable {
    neighbors: BTreeMap<NodeId, NeighborEntry>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self {
            neighbors: BTreeMap::new(),
        }
    }

    /// Returns true if the neighbor was not known before.
    pub fn upsert(&mut self, node_id: NodeId, neighbors: BTreeSet<NodeId>, willingness: Willingness) -> bool {
        self.neighbors
            .insert(node_id, NeighborEntry { node_id, neighbors, willingness })
            .is_none()
    }

    pub fn get(&self, node_id: &NodeId) -> Option<&NeighborEntry> {
        self.neighbors.get(node_id)
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.neighbors.contains_key(node_id)
    }

    pub fn ids(&self) -> BTreeSet<NodeId> {
        self.neighbors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborEntry> {
        self.neighbors.values()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
