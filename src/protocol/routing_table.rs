use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::NodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    entries: BTreeMap<NodeId, RoutingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub destination: NodeId,
    pub next_hop: NodeId,
    pub distance: u32,
    pub path: Vec<NodeId>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn add_route(&mut self, entry: RoutingEntry) {
        self.entries.insert(entry.destination, entry);
    }

    pub fn get_route(&self, destination: &NodeId) -> Option<&RoutingEntry> {
        self.entries.get(destination)
    }

    pub fn next_hop(&self, destination: &NodeId) -> Option<NodeId> {
        self.entries.get(destination).map(|e| e.next_hop)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &RoutingEntry)> {
        self.entries.iter()
    }
}
