//! Error types for the OLSR engine.
//!
//! None of these are fatal to a node: the engine logs them and keeps running
//! on soft state.

use thiserror::Error;

use crate::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OlsrError {
    /// Destination is absent from the routing table; the packet was dropped.
    #[error("no route to destination {destination}")]
    NoRoute { destination: NodeId },

    /// The transport has no link between the two nodes.
    #[error("node {to} is not a neighbor of {from}")]
    Unreachable { from: NodeId, to: NodeId },

    /// The target node is not registered with the transport.
    #[error("node {0} is not registered")]
    NodeUnavailable(NodeId),

    /// The node actor has shut down.
    #[error("node mailbox closed")]
    MailboxClosed,
}

pub type OlsrResult<T> = Result<T, OlsrError>;
