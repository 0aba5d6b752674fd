pub mod protocol;
pub mod network;
pub mod algorithms;
pub mod config;
pub mod error;
pub mod application;
pub mod snapshot;
pub mod node;

pub use application::{Application, Inbox};
pub use config::NodeConfig;
pub use error::{OlsrError, OlsrResult};
pub use network::{LocalMesh, Transport};
pub use node::{spawn_node, NodeHandle, NodeStatus};
pub use protocol::{
    Address, DataPacket, ForwardOutcome, HelloMessage, OlsrEngine, ProtocolMessage, RoutingEntry,
    RoutingTable, TcMessage, Willingness,
};
pub use snapshot::{SnapshotLog, SnapshotSink, TopologySnapshot};

pub type NodeId = u32;
