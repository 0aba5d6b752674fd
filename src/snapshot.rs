//! Topology snapshots taken when a node becomes an MPR.
//!
//! Snapshots are handed to a [`SnapshotSink`] injected into each node. The
//! engine only writes to the sink; [`SnapshotLog`] keeps them for offline
//! analysis of how the relay set converges.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::NodeId;
use crate::network::TopologyDatabase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub node: NodeId,
    pub tc_counter: u32,
    /// Relay role of every node known to `node`, itself included.
    pub mpr_flags: BTreeMap<NodeId, bool>,
    pub topology: TopologyDatabase,
    pub recorded_at: DateTime<Utc>,
}

pub trait SnapshotSink: Send + Sync {
    fn record(&self, snapshot: TopologySnapshot);
}

/// Bounded snapshot history; the oldest snapshot is dropped when full.
#[derive(Debug)]
pub struct SnapshotLog {
    capacity: usize,
    entries: Mutex<VecDeque<TopologySnapshot>>,
}

impl SnapshotLog {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn snapshots(&self) -> Vec<TopologySnapshot> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn snapshots_for(&self, node: NodeId) -> Vec<TopologySnapshot> {
        self.entries
            .lock()
            .iter()
            .filter(|s| s.node == node)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Merges the flags of every retained snapshot, later ones winning.
    pub fn mpr_flags(&self) -> BTreeMap<NodeId, bool> {
        let mut flags = BTreeMap::new();
        for snapshot in self.entries.lock().iter() {
            flags.extend(snapshot.mpr_flags.iter().map(|(k, v)| (*k, *v)));
        }
        flags
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let entries = self.entries.lock();
        serde_json::to_string_pretty(&*entries)
    }
}

impl Default for SnapshotLog {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl SnapshotSink for SnapshotLog {
    fn record(&self, snapshot: TopologySnapshot) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(node: NodeId, flags: &[(NodeId, bool)]) -> TopologySnapshot {
        TopologySnapshot {
            node,
            tc_counter: 1,
            mpr_flags: flags.iter().copied().collect(),
            topology: TopologyDatabase::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn oldest_snapshot_is_evicted() {
        let log = SnapshotLog::with_capacity(2);
        assert_eq!(log.capacity(), 2);
        assert_eq!(SnapshotLog::with_capacity(0).capacity(), 1);
        log.record(snapshot(1, &[]));
        log.record(snapshot(2, &[]));
        log.record(snapshot(3, &[]));

        let nodes: Vec<_> = log.snapshots().iter().map(|s| s.node).collect();
        assert_eq!(nodes, vec![2, 3]);
        assert!(log.snapshots_for(1).is_empty());
    }

    #[test]
    fn later_flags_win() {
        let log = SnapshotLog::default();
        log.record(snapshot(1, &[(1, true), (2, false)]));
        log.record(snapshot(2, &[(2, true)]));

        assert_eq!(log.mpr_flags(), BTreeMap::from([(1, true), (2, true)]));
    }

    #[test]
    fn exports_json() {
        let log = SnapshotLog::default();
        log.record(snapshot(4, &[(4, true)]));

        let json = log.to_json().unwrap();
        let parsed: Vec<TopologySnapshot> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].node, 4);
    }
}
