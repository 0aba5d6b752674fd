pub mod mesh;
pub mod topology;

pub use mesh::{LocalMesh, MessageReceiver};
pub use topology::{DirectLink, LinkGraph, TopologyDatabase, TopologyEntry};

use crate::NodeId;
use crate::error::OlsrResult;
use crate::protocol::ProtocolMessage;

/// Delivery of protocol messages between nodes.
///
/// Calls must not block: handlers invoke these while holding the node's
/// state and expect them to return immediately.
pub trait Transport: Send + Sync {
    /// Sends `message` to every current neighbor of `from`.
    fn broadcast(&self, from: NodeId, message: ProtocolMessage) -> OlsrResult<()>;

    /// Sends `message` to a single neighbor of `from`.
    fn send_to(&self, from: NodeId, to: NodeId, message: ProtocolMessage) -> OlsrResult<()>;
}
