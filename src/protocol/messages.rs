use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::NodeId;
use super::Willingness;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Address {
    Broadcast,
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolMessage {
    Hello(HelloMessage),
    Tc(TcMessage), // Topology Control
    Data(DataPacket),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    pub from: NodeId,
    pub to: Address,
    pub neighbors: BTreeSet<NodeId>,
    pub willingness: Willingness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcMessage {
    pub from: NodeId,
    pub to: Address,
    pub mpr_selectors: BTreeSet<NodeId>,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    pub from: NodeId,
    pub to: NodeId,
    pub next_hop: Option<NodeId>,
    pub payload: String,
    /// Incremented on every forwarding step.
    pub sequence_number: u32,
}

impl ProtocolMessage {
    pub fn from(&self) -> NodeId {
        match self {
            ProtocolMessage::Hello(hello) => hello.from,
            ProtocolMessage::Tc(tc) => tc.from,
            ProtocolMessage::Data(packet) => packet.from,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

impl HelloMessage {
    pub fn new(from: NodeId, neighbors: BTreeSet<NodeId>, willingness: Willingness) -> Self {
        Self {
            from,
            to: Address::Broadcast,
            neighbors,
            willingness,
        }
    }
}

impl TcMessage {
    pub fn new(from: NodeId, mpr_selectors: BTreeSet<NodeId>, sequence: u32) -> Self {
        Self {
            from,
            to: Address::Broadcast,
            mpr_selectors,
            sequence,
        }
    }
}

impl DataPacket {
    pub fn new(from: NodeId, to: NodeId, payload: impl Into<String>) -> Self {
        Self {
            from,
            to,
            next_hop: None,
            payload: payload.into(),
            sequence_number: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tc_decodes_from_wire() {
        let tc = ProtocolMessage::Tc(TcMessage::new(4, BTreeSet::from([1, 2]), 9));
        let bytes = tc.serialize().unwrap();

        let decoded = ProtocolMessage::deserialize(&bytes).unwrap();
        assert_eq!(decoded, tc);
        assert_eq!(decoded.from(), 4);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ProtocolMessage::deserialize(b"HELLO:not-json").is_err());
    }

    #[test]
    fn control_messages_are_broadcast() {
        let hello = HelloMessage::new(1, BTreeSet::new(), Willingness::Low);
        assert_eq!(hello.to, Address::Broadcast);

        let packet = DataPacket::new(1, 3, "ping");
        assert_eq!(packet.next_hop, None);
        assert_eq!(packet.sequence_number, 0);
    }
}
