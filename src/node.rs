//! Node actor.
//!
//! One task per node owns its [`OlsrEngine`]. Hello ticks, TC ticks,
//! inbound protocol messages and control queries all go through the same
//! `select!` loop, so no two handlers of a node ever run at once.

use std::collections::BTreeSet;
use log::{info, warn, debug};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::NodeId;
use crate::error::{OlsrError, OlsrResult};
use crate::network::{MessageReceiver, TopologyDatabase};
use crate::protocol::{ForwardOutcome, OlsrEngine, RoutingTable};

#[derive(Debug, Clone)]
pub struct NodeStatus {
    pub id: NodeId,
    pub selected_as_mpr: bool,
    pub tc_counter: u32,
    pub neighbors: BTreeSet<NodeId>,
    /// Relays this node currently selects.
    pub mprs: BTreeSet<NodeId>,
    pub routing_table: RoutingTable,
    pub topology: TopologyDatabase,
}

enum NodeCommand {
    Status(oneshot::Sender<NodeStatus>),
    SendData {
        destination: NodeId,
        payload: String,
        reply: oneshot::Sender<OlsrResult<ForwardOutcome>>,
    },
}

pub struct NodeHandle {
    id: NodeId,
    commands: mpsc::UnboundedSender<NodeCommand>,
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

/// Starts the actor for `engine`, reading protocol messages from `inbox`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_node(engine: OlsrEngine, inbox: MessageReceiver) -> anyhow::Result<NodeHandle> {
    engine.config().validate()?;

    let id = engine.id();
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let task = tokio::spawn(async move {
        node_task(engine, inbox, command_rx, shutdown_rx).await;
    });

    info!("Node {} started", id);
    Ok(NodeHandle { id, commands, shutdown_tx, task })
}

async fn node_task(
    mut engine: OlsrEngine,
    mut inbox: MessageReceiver,
    mut commands: mpsc::UnboundedReceiver<NodeCommand>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut hello_timer = interval(engine.config().hello_period());
    let mut tc_timer = interval(engine.config().tc_period());
    hello_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tc_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut inbox_open = true;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                break;
            }
            _ = hello_timer.tick() => {
                engine.send_hello();
            }
            _ = tc_timer.tick() => {
                engine.send_tc();
            }
            message = inbox.recv(), if inbox_open => {
                match message {
                    Some(message) => {
                        // The engine logs its own drops.
                        let _ = engine.handle_message(message);
                    }
                    None => {
                        debug!("Node {} inbox closed", engine.id());
                        inbox_open = false;
                    }
                }
            }
            command = commands.recv() => {
                match command {
                    Some(command) => handle_command(&mut engine, command),
                    None => break,
                }
            }
        }
    }

    info!("Node {} stopped", engine.id());
}

fn handle_command(engine: &mut OlsrEngine, command: NodeCommand) {
    match command {
        NodeCommand::Status(reply) => {
            let status = NodeStatus {
                id: engine.id(),
                selected_as_mpr: engine.is_mpr(),
                tc_counter: engine.tc_counter(),
                neighbors: engine.neighbors().ids(),
                mprs: engine.select_mpr(),
                routing_table: engine.routing_table().clone(),
                topology: engine.topology().clone(),
            };
            let _ = reply.send(status);
        }
        NodeCommand::SendData { destination, payload, reply } => {
            let _ = reply.send(engine.originate(destination, payload));
        }
    }
}

impl NodeHandle {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub async fn status(&self) -> OlsrResult<NodeStatus> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(NodeCommand::Status(tx))
            .map_err(|_| OlsrError::MailboxClosed)?;
        rx.await.map_err(|_| OlsrError::MailboxClosed)
    }

    pub async fn routing_table(&self) -> OlsrResult<RoutingTable> {
        Ok(self.status().await?.routing_table)
    }

    /// Originates a data packet at this node.
    pub async fn send_data(&self, destination: NodeId, payload: impl Into<String>) -> OlsrResult<ForwardOutcome> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(NodeCommand::SendData {
                destination,
                payload: payload.into(),
                reply,
            })
            .map_err(|_| OlsrError::MailboxClosed)?;
        rx.await.map_err(|_| OlsrError::MailboxClosed)?
    }

    /// Stops the timers and waits for the actor to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            warn!("Node {} task ended abnormally: {}", self.id, e);
        }
    }
}
