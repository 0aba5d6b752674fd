use std::collections::{BTreeMap, BinaryHeap};
use std::cmp::Ordering;
use crate::NodeId;
use crate::network::LinkGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub cost: u32,
    pub next_hop: Option<NodeId>,
    pub path: Vec<NodeId>,
}

#[derive(Debug, PartialEq, Eq)]
struct State {
    cost: u32,
    node: NodeId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap, lowest id first on equal cost
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths over `graph`.
///
/// Only reachable nodes other than `source` appear in the result. Among
/// equal-cost paths the one whose predecessor has the lowest id is kept, so
/// the result does not depend on insertion order.
pub fn calculate_shortest_paths(graph: &LinkGraph, source: NodeId) -> BTreeMap<NodeId, ShortestPath> {
    let mut distances: BTreeMap<NodeId, u32> = BTreeMap::new();
    let mut previous: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut heap = BinaryHeap::new();

    distances.insert(source, 0);
    heap.push(State { cost: 0, node: source });

    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've already found a better path
        if cost > *distances.get(&node).unwrap_or(&u32::MAX) {
            continue;
        }

        let Some(edges) = graph.get(&node) else {
            continue;
        };

        for (&neighbor, &link_cost) in edges {
            let new_cost = cost.saturating_add(link_cost);
            let known = *distances.get(&neighbor).unwrap_or(&u32::MAX);

            let better = new_cost < known
                || (new_cost == known && previous.get(&neighbor).is_some_and(|p| node < *p));

            if better {
                distances.insert(neighbor, new_cost);
                previous.insert(neighbor, node);
                heap.push(State { cost: new_cost, node: neighbor });
            }
        }
    }

    distances
        .into_iter()
        .filter(|(dest, _)| *dest != source)
        .map(|(dest, cost)| {
            let path = reconstruct_path(&previous, dest);
            let next_hop = path.get(1).copied();
            (dest, ShortestPath { cost, next_hop, path })
        })
        .collect()
}

fn reconstruct_path(previous: &BTreeMap<NodeId, NodeId>, dest: NodeId) -> Vec<NodeId> {
    let mut path = vec![dest];
    let mut current = dest;

    while let Some(&prev) = previous.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(NodeId, NodeId, u32)]) -> LinkGraph {
        let mut g = LinkGraph::new();
        for &(a, b, w) in edges {
            g.entry(a).or_default().insert(b, w);
            g.entry(b).or_default().insert(a, w);
        }
        g
    }

    #[test]
    fn chain_routes_through_middle() {
        let g = graph(&[(1, 2, 1), (2, 3, 1)]);
        let paths = calculate_shortest_paths(&g, 1);

        assert_eq!(paths[&3].next_hop, Some(2));
        assert_eq!(paths[&3].cost, 2);
        assert_eq!(paths[&3].path, vec![1, 2, 3]);
        assert!(!paths.contains_key(&1));
    }

    #[test]
    fn unreachable_nodes_are_absent() {
        let mut g = graph(&[(1, 2, 1)]);
        g.entry(7).or_default().insert(8, 1);
        let paths = calculate_shortest_paths(&g, 1);

        assert_eq!(paths.len(), 1);
        assert!(!paths.contains_key(&8));
    }

    #[test]
    fn weighted_edges_are_respected() {
        let g = graph(&[(1, 2, 5), (1, 3, 1), (3, 2, 1)]);
        let paths = calculate_shortest_paths(&g, 1);

        assert_eq!(paths[&2].cost, 2);
        assert_eq!(paths[&2].next_hop, Some(3));
    }

    #[test]
    fn equal_cost_prefers_lowest_predecessor() {
        // Square 1-4-9 and 1-2-9
        let g = graph(&[(1, 4, 1), (4, 9, 1), (1, 2, 1), (2, 9, 1)]);
        let paths = calculate_shortest_paths(&g, 1);

        assert_eq!(paths[&9].next_hop, Some(2));
        assert_eq!(paths[&9].path, vec![1, 2, 9]);
    }

    #[test]
    fn source_missing_from_graph_yields_nothing() {
        assert!(calculate_shortest_paths(&LinkGraph::new(), 1).is_empty());
    }
}
