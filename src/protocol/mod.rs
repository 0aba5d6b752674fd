pub mod messages;
pub mod mpr;
pub mod neighbor;
pub mod routing_table;
pub mod types;

pub use messages::*;
pub use neighbor::*;
pub use routing_table::*;
pub use types::*;

use crate::NodeId;
use crate::application::Application;
use crate::config::NodeConfig;
use crate::error::{OlsrError, OlsrResult};
use crate::network::{TopologyDatabase, Transport};
use crate::snapshot::{SnapshotSink, TopologySnapshot};
use std::collections::BTreeSet;
use std::sync::Arc;
use log::{info, warn, error, debug};

/// What happened to a data packet handed to [`OlsrEngine::forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    Delivered,
    Forwarded { next_hop: NodeId },
}

/// Per-node OLSR state machine.
///
/// All handlers are synchronous and must be serialized by the caller; the
/// node actor in [`crate::node`] does this for timer ticks and inbound
/// messages alike.
pub struct OlsrEngine {
    id: NodeId,
    config: NodeConfig,
    neighbors: NeighborTable,
    topology: TopologyDatabase,
    routing_table: RoutingTable,
    selected_as_mpr: bool,
    tc_counter: u32,
    transport: Arc<dyn Transport>,
    application: Arc<dyn Application>,
    snapshots: Arc<dyn SnapshotSink>,
}

impl OlsrEngine {
    pub fn new(
        id: NodeId,
        config: NodeConfig,
        transport: Arc<dyn Transport>,
        application: Arc<dyn Application>,
        snapshots: Arc<dyn SnapshotSink>,
    ) -> Self {
        Self {
            id,
            config,
            neighbors: NeighborTable::new(),
            topology: TopologyDatabase::new(),
            routing_table: RoutingTable::new(),
            selected_as_mpr: false,
            tc_counter: 1,
            transport,
            application,
            snapshots,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn willingness(&self) -> Willingness {
        self.config.willingness
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn topology(&self) -> &TopologyDatabase {
        &self.topology
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn is_mpr(&self) -> bool {
        self.selected_as_mpr
    }

    pub fn tc_counter(&self) -> u32 {
        self.tc_counter
    }

    pub fn handle_message(&mut self, message: ProtocolMessage) -> OlsrResult<()> {
        match message {
            ProtocolMessage::Hello(hello) => self.on_hello(hello),
            ProtocolMessage::Tc(tc) => self.on_tc(tc),
            ProtocolMessage::Data(packet) => {
                self.forward(packet)?;
            }
        }
        Ok(())
    }

    pub fn send_hello(&self) {
        let hello = HelloMessage::new(self.id, self.neighbors.ids(), self.config.willingness);

        if let Err(e) = self.transport.broadcast(self.id, ProtocolMessage::Hello(hello)) {
            warn!("Node {} failed to send hello: {}", self.id, e);
        }
    }

    pub fn on_hello(&mut self, hello: HelloMessage) {
        debug!("Node {} received HELLO from {} - neighbors: {:?}", self.id, hello.from, hello.neighbors);

        if self.neighbors.upsert(hello.from, hello.neighbors, hello.willingness) {
            info!("Node {} discovered neighbor {}", self.id, hello.from);
        }
        self.topology.add_neighbor(hello.from);
    }

    pub fn select_mpr(&self) -> BTreeSet<NodeId> {
        mpr::select_mpr(self.id, &self.neighbors)
    }

    pub fn send_tc(&mut self) {
        self.tc_counter = self.tc_counter.wrapping_add(1);
        let tc = TcMessage::new(self.id, self.select_mpr(), self.tc_counter);
        debug!("Node {} sending TC #{} - MPRs: {:?}", self.id, tc.sequence, tc.mpr_selectors);

        if let Err(e) = self.transport.broadcast(self.id, ProtocolMessage::Tc(tc)) {
            warn!("Node {} failed to send TC: {}", self.id, e);
        }
    }

    pub fn on_tc(&mut self, tc: TcMessage) {
        if tc.from == self.id {
            debug!("Node {} ignoring its own TC #{}", self.id, tc.sequence);
            return;
        }

        debug!("Node {} received TC #{} from {} - MPR selectors: {:?}", self.id, tc.sequence, tc.from, tc.mpr_selectors);

        let previous = self.topology.update_from_tc(&tc);
        let already_seen = previous.is_some_and(|p| p.counter == tc.sequence);

        let tc_names_us = tc.mpr_selectors.contains(&self.id);

        if tc_names_us && !already_seen {
            debug!("Node {} relaying TC #{} from {}", self.id, tc.sequence, tc.from);
            if let Err(e) = self.transport.broadcast(self.id, ProtocolMessage::Tc(tc)) {
                warn!("Node {} failed to relay TC: {}", self.id, e);
            }
        }

        // Role follows the latest TC only, whoever advertised it.
        self.set_selected_as_mpr(tc_names_us);
        self.recompute_routes();
    }

    fn set_selected_as_mpr(&mut self, value: bool) {
        if value == self.selected_as_mpr {
            return;
        }
        self.selected_as_mpr = value;

        if value {
            info!("Node {} SELECTED AS MPR", self.id);
            let mut mpr_flags = self.topology.mpr_flags();
            mpr_flags.insert(self.id, true);
            self.snapshots.record(TopologySnapshot {
                node: self.id,
                tc_counter: self.tc_counter,
                mpr_flags,
                topology: self.topology.clone(),
                recorded_at: chrono::Utc::now(),
            });
        } else {
            info!("Node {} no longer an MPR", self.id);
        }
    }

    pub fn recompute_routes(&mut self) {
        use crate::algorithms::dijkstra::calculate_shortest_paths;

        let graph = self.topology.build_graph(self.id);
        let paths = calculate_shortest_paths(&graph, self.id);

        self.routing_table.clear();

        for (destination, path) in paths {
            if let Some(next_hop) = path.next_hop {
                self.routing_table.add_route(RoutingEntry {
                    destination,
                    next_hop,
                    distance: path.cost,
                    path: path.path,
                });
            }
        }

        debug!("Node {} routing table updated with {} routes", self.id, self.routing_table.len());
    }

    /// Delivers, forwards or drops a data packet.
    pub fn forward(&mut self, packet: DataPacket) -> OlsrResult<ForwardOutcome> {
        if packet.to == self.id {
            debug!("Node {} delivering packet from {} after {} hops", self.id, packet.from, packet.sequence_number);
            self.application.deliver_up(packet);
            return Ok(ForwardOutcome::Delivered);
        }

        let Some(next_hop) = self.routing_table.next_hop(&packet.to) else {
            error!("No route found for destination {}. Dropping packet.", packet.to);
            return Err(OlsrError::NoRoute { destination: packet.to });
        };

        let forwarded = DataPacket {
            next_hop: Some(next_hop),
            sequence_number: packet.sequence_number.saturating_add(1),
            ..packet
        };
        if let Err(e) = self.transport.send_to(self.id, next_hop, ProtocolMessage::Data(forwarded)) {
            warn!("Node {} failed to forward packet to {}: {}", self.id, next_hop, e);
            return Err(e);
        }

        Ok(ForwardOutcome::Forwarded { next_hop })
    }

    /// Sends `payload` from this node towards `destination`.
    pub fn originate(&mut self, destination: NodeId, payload: impl Into<String>) -> OlsrResult<ForwardOutcome> {
        self.forward(DataPacket::new(self.id, destination, payload))
    }
}
