//! In-process transport used to wire simulated nodes together.
//!
//! Each registered node gets an unbounded inbox; links are undirected and
//! can be added or removed while the nodes run.

use std::collections::{BTreeSet, HashMap};
use log::{debug, warn};
use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::NodeId;
use crate::error::{OlsrError, OlsrResult};
use crate::protocol::ProtocolMessage;
use super::Transport;

pub type MessageReceiver = mpsc::UnboundedReceiver<ProtocolMessage>;

#[derive(Debug, Default)]
pub struct LocalMesh {
    inboxes: RwLock<HashMap<NodeId, mpsc::UnboundedSender<ProtocolMessage>>>,
    links: RwLock<BTreeSet<(NodeId, NodeId)>>,
}

impl LocalMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from an undirected edge list. Inboxes are not created;
    /// call [`LocalMesh::register`] for every node.
    pub fn from_edges(edges: &[(NodeId, NodeId)]) -> Self {
        let mesh = Self::new();
        for &(a, b) in edges {
            mesh.connect(a, b);
        }
        mesh
    }

    /// Registers `node` and returns the receiving end of its inbox. A second
    /// registration replaces the first.
    pub fn register(&self, node: NodeId) -> MessageReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.inboxes.write().insert(node, tx).is_some() {
            warn!("Node {} registered twice, previous inbox dropped", node);
        }
        rx
    }

    pub fn unregister(&self, node: NodeId) {
        self.inboxes.write().remove(&node);
    }

    pub fn connect(&self, a: NodeId, b: NodeId) {
        if a != b {
            self.links.write().insert(ordered(a, b));
        }
    }

    pub fn disconnect(&self, a: NodeId, b: NodeId) {
        self.links.write().remove(&ordered(a, b));
    }

    pub fn is_linked(&self, a: NodeId, b: NodeId) -> bool {
        self.links.read().contains(&ordered(a, b))
    }

    pub fn neighbors_of(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.links
            .read()
            .iter()
            .filter_map(|&(a, b)| {
                if a == node {
                    Some(b)
                } else if b == node {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    fn deliver(&self, to: NodeId, message: ProtocolMessage) -> OlsrResult<()> {
        let inboxes = self.inboxes.read();
        let inbox = inboxes.get(&to).ok_or(OlsrError::NodeUnavailable(to))?;
        inbox.send(message).map_err(|_| OlsrError::NodeUnavailable(to))
    }
}

impl Transport for LocalMesh {
    fn broadcast(&self, from: NodeId, message: ProtocolMessage) -> OlsrResult<()> {
        for neighbor in self.neighbors_of(from) {
            // A silent neighbor must not stop the others from hearing us.
            if let Err(e) = self.deliver(neighbor, message.clone()) {
                debug!("Broadcast from {} missed {}: {}", from, neighbor, e);
            }
        }
        Ok(())
    }

    fn send_to(&self, from: NodeId, to: NodeId, message: ProtocolMessage) -> OlsrResult<()> {
        if !self.is_linked(from, to) {
            return Err(OlsrError::Unreachable { from, to });
        }
        self.deliver(to, message)
    }
}

fn ordered(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}
