use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use crate::NodeId;
use crate::protocol::TcMessage;

/// Undirected weighted adjacency, keyed by node.
pub type LinkGraph = BTreeMap<NodeId, BTreeMap<NodeId, u32>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectLink {
    pub next_hop: NodeId,
    pub distance: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyEntry {
    pub advertiser: NodeId,
    pub mpr_selectors: BTreeSet<NodeId>,
    pub counter: u32,
}

/// Link-state knowledge of one node: its direct links plus the last TC
/// received from each advertiser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDatabase {
    links: BTreeMap<NodeId, DirectLink>,
    entries: BTreeMap<NodeId, TopologyEntry>,
}

impl TopologyDatabase {
    pub fn new() -> Self {
        Self {
            links: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn add_neighbor(&mut self, neighbor: NodeId) {
        self.links.insert(neighbor, DirectLink { next_hop: neighbor, distance: 1 });
    }

    /// Overwrites the advertiser's entry whatever its counter; older TCs
    /// replace newer ones. Returns the entry that was replaced.
    pub fn update_from_tc(&mut self, tc: &TcMessage) -> Option<TopologyEntry> {
        self.entries.insert(
            tc.from,
            TopologyEntry {
                advertiser: tc.from,
                mpr_selectors: tc.mpr_selectors.clone(),
                counter: tc.sequence,
            },
        )
    }

    pub fn link(&self, neighbor: &NodeId) -> Option<&DirectLink> {
        self.links.get(neighbor)
    }

    pub fn entry(&self, advertiser: &NodeId) -> Option<&TopologyEntry> {
        self.entries.get(advertiser)
    }

    pub fn links(&self) -> impl Iterator<Item = &DirectLink> {
        self.links.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = &TopologyEntry> {
        self.entries.values()
    }

    /// True if `node` appears in any stored selector set.
    pub fn is_advertised(&self, node: NodeId) -> bool {
        self.entries.values().any(|e| e.mpr_selectors.contains(&node))
    }

    /// Every node this database knows about, each flagged with whether some
    /// advertiser names it as a relay.
    pub fn mpr_flags(&self) -> BTreeMap<NodeId, bool> {
        let mut flags = BTreeMap::new();
        for link in self.links.values() {
            flags.entry(link.next_hop).or_insert(false);
        }
        for entry in self.entries.values() {
            flags.entry(entry.advertiser).or_insert(false);
            for selector in &entry.mpr_selectors {
                flags.insert(*selector, true);
            }
        }
        flags
    }

    pub fn build_graph(&self, source: NodeId) -> LinkGraph {
        let mut graph = LinkGraph::new();
        graph.entry(source).or_default();

        for link in self.links.values() {
            add_edge(&mut graph, source, link.next_hop, link.distance);
        }

        for entry in self.entries.values() {
            for selector in &entry.mpr_selectors {
                add_edge(&mut graph, entry.advertiser, *selector, 1);
            }
        }

        graph
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.entries.is_empty()
    }
}

fn add_edge(graph: &mut LinkGraph, a: NodeId, b: NodeId, cost: u32) {
    if a == b {
        return;
    }
    for (from, to) in [(a, b), (b, a)] {
        let weight = graph.entry(from).or_default().entry(to).or_insert(cost);
        *weight = (*weight).min(cost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_tc_overwrites_newer_entry() {
        let mut db = TopologyDatabase::new();
        db.update_from_tc(&TcMessage::new(4, BTreeSet::from([1, 2]), 10));
        let previous = db.update_from_tc(&TcMessage::new(4, BTreeSet::from([3]), 2));

        assert_eq!(previous.map(|e| e.counter), Some(10));
        let entry = db.entry(&4).unwrap();
        assert_eq!(entry.counter, 2);
        assert_eq!(entry.mpr_selectors, BTreeSet::from([3]));
    }

    #[test]
    fn graph_is_undirected_and_skips_self_loops() {
        let mut db = TopologyDatabase::new();
        db.add_neighbor(2);
        db.update_from_tc(&TcMessage::new(3, BTreeSet::from([2, 3]), 1));

        let graph = db.build_graph(1);
        assert_eq!(graph[&1].get(&2), Some(&1));
        assert_eq!(graph[&2].get(&1), Some(&1));
        assert_eq!(graph[&2].get(&3), Some(&1));
        assert_eq!(graph[&3].get(&2), Some(&1));
        assert!(!graph[&3].contains_key(&3));
    }

    #[test]
    fn flags_mark_advertised_nodes() {
        let mut db = TopologyDatabase::new();
        db.add_neighbor(2);
        db.update_from_tc(&TcMessage::new(3, BTreeSet::from([2]), 1));

        let flags = db.mpr_flags();
        assert_eq!(flags.get(&2), Some(&true));
        assert_eq!(flags.get(&3), Some(&false));
        assert!(db.is_advertised(2));
        assert!(!db.is_advertised(3));
    }

    #[test]
    fn isolated_graph_has_only_source() {
        let graph = TopologyDatabase::new().build_graph(9);
        assert_eq!(graph.len(), 1);
        assert!(graph[&9].is_empty());
    }
}
