use crate::SessionError;
use crate::handshake::{HostSession, SessionConfig, answer_peer};
use crate::relay::{PeerSummary, PeerTable, RelayCommand, RelayConfig};
use crate::signaling::{PeerSnapshot, SignalingClient, poll_peers};
use crate::transport::{Transport, TransportEvent};
use murmur_core::{PeerDescription, PeerId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

const SNAPSHOT_BUFFER: usize = 16;
const COMMAND_BUFFER: usize = 64;
const TRANSPORT_BUFFER: usize = 256;

/// Host-side relay actor.
///
/// Owns the [`PeerTable`]; admission, slot updates and broadcasts all happen
/// on this one task, so they never interleave.
pub struct Relay {
    session: HostSession,
    config: RelayConfig,
    table: PeerTable,
    /// Peers turned away by `max_peers`, remembered so they are logged once.
    refused: HashSet<PeerId>,
    transport: Arc<dyn Transport>,
    signaling: Arc<dyn SignalingClient>,
    handshakes: JoinSet<()>,
    snapshot_rx: mpsc::Receiver<PeerSnapshot>,
    command_rx: mpsc::Receiver<RelayCommand>,
    command_tx: mpsc::Sender<RelayCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Relay {
    pub fn new(
        session: HostSession,
        config: RelayConfig,
        transport: Arc<dyn Transport>,
        signaling: Arc<dyn SignalingClient>,
        snapshot_rx: mpsc::Receiver<PeerSnapshot>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            session,
            config,
            table: PeerTable::new(),
            refused: HashSet::new(),
            transport,
            signaling,
            handshakes: JoinSet::new(),
            snapshot_rx,
            command_rx,
            command_tx,
            transport_rx,
            transport_tx,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    pub fn commands(&self) -> mpsc::Sender<RelayCommand> {
        self.command_tx.clone()
    }

    /// Receiver that flips to `true` when the relay is asked to stop.
    /// Tasks working for the relay should watch it.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn spawn(self) -> RelayHandle {
        let commands = self.commands();
        let shutdown = Arc::clone(&self.shutdown_tx);
        let task = tokio::spawn(self.run());

        RelayHandle {
            commands,
            shutdown,
            tasks: vec![task],
        }
    }

    pub async fn run(mut self) {
        info!("Relay for room '{}' started", self.session.room);
        let mut snapshots_open = true;

        loop {
            tokio::select! {
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("Shutdown requested. Stopping relay.");
                        break;
                    }
                }

                snapshot = self.snapshot_rx.recv(), if snapshots_open => {
                    match snapshot {
                        Some(s) => self.handle_snapshot(s),
                        None => {
                            warn!("Peer snapshots ended; no new peers will be admitted");
                            snapshots_open = false;
                        }
                    }
                }

                Some(cmd) = self.command_rx.recv() => self.handle_command(cmd),

                Some(evt) = self.transport_rx.recv() => self.handle_transport_event(evt).await,

                Some(joined) = self.handshakes.join_next(), if !self.handshakes.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("Handshake task panicked: {}", e);
                        }
                    }
                }
            }
        }

        self.handshakes.shutdown().await;
        self.close_unattached().await;
        self.table.close_all().await;
        info!("Relay for room '{}' finished", self.session.room);
    }

    /// Close connections whose handshake finished after the loop stopped
    /// taking commands. They never reached the table.
    async fn close_unattached(&mut self) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            if let RelayCommand::Answered {
                peer_id,
                connection,
            } = cmd
            {
                debug!("Closing late answer for {}", peer_id);
                let _ = connection.close().await;
            }
        }
    }

    fn handle_snapshot(&mut self, snapshot: PeerSnapshot) {
        let mut fresh: Vec<(PeerId, PeerDescription)> = snapshot
            .into_iter()
            .filter(|(peer_id, _)| !self.table.contains(peer_id) && !self.refused.contains(peer_id))
            .collect();
        fresh.sort_by(|a, b| a.0.cmp(&b.0));

        for (peer_id, description) in fresh {
            if self
                .config
                .max_peers
                .is_some_and(|max| self.table.active() >= max)
            {
                warn!(
                    "Room is full, not admitting '{}' ({})",
                    description.username, peer_id
                );
                self.refused.insert(peer_id);
                continue;
            }

            info!("Admitting '{}' ({})", description.username, peer_id);
            self.table.admit(peer_id.clone(), description.clone());
            self.spawn_handshake(peer_id, description);
        }
    }

    fn spawn_handshake(&mut self, peer_id: PeerId, description: PeerDescription) {
        let transport = Arc::clone(&self.transport);
        let signaling = Arc::clone(&self.signaling);
        let session = self.session.clone();
        let events = self.transport_tx.clone();
        let commands = self.command_tx.clone();

        self.handshakes.spawn(async move {
            let outcome = match answer_peer(
                transport.as_ref(),
                signaling.as_ref(),
                &session,
                peer_id.clone(),
                &description,
                events,
            )
            .await
            {
                Ok(connection) => RelayCommand::Answered {
                    peer_id,
                    connection,
                },
                Err(error) => RelayCommand::HandshakeFailed { peer_id, error },
            };
            let _ = commands.send(outcome).await;
        });
    }

    fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Answered {
                peer_id,
                connection,
            } => {
                if !self.table.attach_connection(&peer_id, connection) {
                    warn!("Answer completed for unknown peer {}", peer_id);
                }
            }

            RelayCommand::HandshakeFailed { peer_id, error } => {
                self.table.mark_failed(&peer_id);
                error!(
                    "Handshake with {} failed, peer stays unconnected: {}",
                    peer_id, error
                );
            }

            RelayCommand::ListPeers(reply) => {
                let _ = reply.send(self.table.summaries());
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::ChannelOpen(peer_id, channel) => {
                if self.table.attach_channel(&peer_id, channel) {
                    info!("Peer {} fully joined (channel ready)", peer_id);
                } else {
                    warn!("Channel opened for unknown peer {}", peer_id);
                }
            }

            TransportEvent::Message(peer_id, text) => {
                let report = self
                    .table
                    .broadcast(&peer_id, &text, self.config.include_sender)
                    .await;
                debug!(
                    "Relayed message from {} to {} peers ({} failed)",
                    peer_id, report.delivered, report.failed
                );
            }

            TransportEvent::Disconnected(peer_id) => {
                info!("Transport disconnected for {}", peer_id);
            }
        }
    }
}

/// Handle to a running relay and the tasks serving it.
pub struct RelayHandle {
    commands: mpsc::Sender<RelayCommand>,
    shutdown: Arc<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl RelayHandle {
    /// Tie another task's lifetime to the relay's; it is awaited on shutdown.
    pub fn track(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    pub async fn peers(&self) -> Result<Vec<PeerSummary>, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(RelayCommand::ListPeers(tx))
            .await
            .map_err(|_| SessionError::RelayClosed)?;
        rx.await.map_err(|_| SessionError::RelayClosed)
    }

    /// Signal every task, then wait for all of them to drain.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Start relaying for `session`: the relay actor plus the poll loop feeding it.
pub fn spawn_relay(
    session: HostSession,
    config: RelayConfig,
    session_config: &SessionConfig,
    transport: Arc<dyn Transport>,
    signaling: Arc<dyn SignalingClient>,
) -> RelayHandle {
    let (snapshot_tx, snapshot_rx) = mpsc::channel(SNAPSHOT_BUFFER);
    let relay = Relay::new(
        session.clone(),
        config,
        transport,
        Arc::clone(&signaling),
        snapshot_rx,
    );

    let poller = tokio::spawn(poll_peers(
        signaling,
        session.room,
        session.host_secret,
        session_config.poll_interval,
        snapshot_tx,
        relay.shutdown_signal(),
    ));

    let mut handle = relay.spawn();
    handle.track(poller);
    handle
}
