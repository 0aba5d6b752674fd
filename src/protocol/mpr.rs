//! Multi-Point Relay selection.
//!
//! Greedy set cover over the two-hop horizon, the usual OLSR heuristic. The
//! result is not guaranteed minimal. Candidates are ranked by the number of
//! still-uncovered two-hop nodes they reach, then by willingness (highest
//! first), then by node id (lowest first), so the same neighbor table always
//! yields the same set.

use std::collections::{BTreeMap, BTreeSet};
use log::debug;
use crate::NodeId;
use super::{NeighborTable, Willingness};

struct Candidate {
    two_hop: BTreeSet<NodeId>,
    willingness: Willingness,
}

pub fn select_mpr(local_id: NodeId, neighbors: &NeighborTable) -> BTreeSet<NodeId> {
    let one_hop = neighbors.ids();

    let mut coverage: BTreeMap<NodeId, Candidate> = neighbors
        .iter()
        .filter(|entry| entry.willingness.is_eligible())
        .map(|entry| {
            let two_hop = entry
                .neighbors
                .iter()
                .filter(|n| **n != local_id && !one_hop.contains(n))
                .copied()
                .collect();
            (entry.node_id, Candidate { two_hop, willingness: entry.willingness })
        })
        .collect();

    let mut covered = BTreeSet::new();
    let mut mpr_set = BTreeSet::new();

    // Strictly larger count wins, then strictly higher willingness; BTreeMap
    // order keeps the lowest id among exact ties.
    while let Some(best) = coverage
        .iter()
        .filter(|(_, c)| !c.two_hop.is_empty())
        .fold(None::<(NodeId, usize, Willingness)>, |best, (id, c)| {
            let count = c.two_hop.len();
            match best {
                Some((_, best_count, best_will))
                    if (count, c.willingness) <= (best_count, best_will) => best,
                _ => Some((*id, count, c.willingness)),
            }
        })
        .map(|(id, _, _)| id)
    {
        if let Some(candidate) = coverage.remove(&best) {
            debug!("MPR {} covers {:?}", best, candidate.two_hop);
            covered.extend(candidate.two_hop);
        }
        mpr_set.insert(best);

        for c in coverage.values_mut() {
            c.two_hop.retain(|n| !covered.contains(n));
        }
    }

    mpr_set
}

/// Two-hop nodes reachable through any eligible neighbor.
pub fn two_hop_neighbors(local_id: NodeId, neighbors: &NeighborTable) -> BTreeSet<NodeId> {
    let one_hop = neighbors.ids();
    neighbors
        .iter()
        .filter(|entry| entry.willingness.is_eligible())
        .flat_map(|entry| entry.neighbors.iter().copied())
        .filter(|n| *n != local_id && !one_hop.contains(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(NodeId, &[NodeId], Willingness)]) -> NeighborTable {
        let mut t = NeighborTable::new();
        for (id, ns, w) in entries {
            t.upsert(*id, ns.iter().copied().collect(), *w);
        }
        t
    }

    #[test]
    fn isolated_node_selects_nothing() {
        assert!(select_mpr(1, &NeighborTable::new()).is_empty());
    }

    #[test]
    fn chain_end_selects_middle() {
        // A(1) - B(2) - C(3)
        let at_a = table(&[(2, &[1, 3], Willingness::Default)]);
        assert_eq!(select_mpr(1, &at_a), BTreeSet::from([2]));

        let at_b = table(&[(1, &[2], Willingness::Default), (3, &[2], Willingness::Default)]);
        assert!(select_mpr(2, &at_b).is_empty());
    }

    #[test]
    fn star_center_selects_nothing() {
        let leaves: Vec<(NodeId, &[NodeId], Willingness)> =
            (1..=5).map(|l| (l, &[0][..], Willingness::Default)).collect();
        assert!(select_mpr(0, &table(&leaves)).is_empty());
    }

    #[test]
    fn star_leaf_selects_center() {
        // Leaf 1 hears the center 0, which advertises every leaf.
        let at_leaf = table(&[(0, &[1, 2, 3, 4, 5], Willingness::Default)]);
        assert_eq!(select_mpr(1, &at_leaf), BTreeSet::from([0]));
    }

    #[test]
    fn already_adjacent_nodes_need_no_relay() {
        // 2 and 3 are both neighbors and advertise each other.
        let t = table(&[(2, &[1, 3], Willingness::Default), (3, &[1, 2], Willingness::Default)]);
        assert!(select_mpr(1, &t).is_empty());
    }

    #[test]
    fn widest_coverage_wins_then_redundant_skipped() {
        // 2 reaches {10, 11, 12}, 3 reaches {12}, 4 reaches {13}.
        let t = table(&[
            (2, &[1, 10, 11, 12], Willingness::Low),
            (3, &[1, 12], Willingness::High),
            (4, &[1, 13], Willingness::Default),
        ]);
        assert_eq!(select_mpr(1, &t), BTreeSet::from([2, 4]));
    }

    #[test]
    fn willingness_breaks_ties() {
        let t = table(&[
            (2, &[1, 10], Willingness::Low),
            (3, &[1, 10], Willingness::High),
        ]);
        assert_eq!(select_mpr(1, &t), BTreeSet::from([3]));
    }

    #[test]
    fn lowest_id_breaks_full_ties() {
        let t = table(&[
            (7, &[1, 10], Willingness::Default),
            (3, &[1, 10], Willingness::Default),
            (5, &[1, 10], Willingness::Default),
        ]);
        assert_eq!(select_mpr(1, &t), BTreeSet::from([3]));
    }

    #[test]
    fn never_willing_neighbor_is_skipped() {
        let t = table(&[
            (2, &[1, 10, 11], Willingness::Never),
            (3, &[1, 10], Willingness::Low),
        ]);
        assert_eq!(select_mpr(1, &t), BTreeSet::from([3]));
        assert_eq!(two_hop_neighbors(1, &t), BTreeSet::from([10]));
    }

    #[test]
    fn repeated_calls_agree() {
        let t = table(&[
            (2, &[1, 10, 11], Willingness::Default),
            (3, &[1, 11, 12], Willingness::Default),
            (4, &[1, 12, 10], Willingness::Default),
        ]);
        let first = select_mpr(1, &t);
        assert_eq!(first, select_mpr(1, &t));
        assert_eq!(first.len(), 2);
    }
}
