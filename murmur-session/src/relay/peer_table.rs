use crate::transport::{PeerChannel, PeerConnection};
use murmur_core::{PeerDescription, PeerId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Host-side record of one admitted peer.
pub struct ConnectedPeer {
    pub peer_id: PeerId,
    /// Snapshot taken at admission time.
    pub description: PeerDescription,
    /// Set once the answer was submitted.
    pub connection: Option<Arc<dyn PeerConnection>>,
    /// Set once the peer's data channel opened.
    pub channel: Option<Arc<dyn PeerChannel>>,
    /// The handshake gave up. The slot is kept so the id is never admitted again.
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSummary {
    pub peer_id: PeerId,
    pub username: String,
    pub answered: bool,
    pub channel_open: bool,
    pub failed: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Every peer the host has ever admitted, in admission order.
///
/// Ids are never removed, so a peer can be admitted at most once.
#[derive(Default)]
pub struct PeerTable {
    slots: Vec<ConnectedPeer>,
    index: HashMap<PeerId, usize>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an empty slot for `peer_id`. Returns `false` if it was already admitted.
    pub fn admit(&mut self, peer_id: PeerId, description: PeerDescription) -> bool {
        if self.index.contains_key(&peer_id) {
            return false;
        }

        self.index.insert(peer_id.clone(), self.slots.len());
        self.slots.push(ConnectedPeer {
            peer_id,
            description,
            connection: None,
            channel: None,
            failed: false,
        });
        true
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.index.contains_key(peer_id)
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&ConnectedPeer> {
        self.index.get(peer_id).map(|&i| &self.slots[i])
    }

    fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut ConnectedPeer> {
        self.index.get(peer_id).map(|&i| &mut self.slots[i])
    }

    pub fn attach_connection(
        &mut self,
        peer_id: &PeerId,
        connection: Arc<dyn PeerConnection>,
    ) -> bool {
        let Some(slot) = self.get_mut(peer_id) else {
            return false;
        };
        slot.connection = Some(connection);
        true
    }

    pub fn attach_channel(&mut self, peer_id: &PeerId, channel: Arc<dyn PeerChannel>) -> bool {
        let Some(slot) = self.get_mut(peer_id) else {
            return false;
        };
        slot.channel = Some(channel);
        true
    }

    pub fn mark_failed(&mut self, peer_id: &PeerId) -> bool {
        let Some(slot) = self.get_mut(peer_id) else {
            return false;
        };
        slot.failed = true;
        true
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots whose handshake has not failed.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| !s.failed).count()
    }

    pub fn open_channels(&self) -> usize {
        self.slots.iter().filter(|s| s.channel.is_some()).count()
    }

    pub fn summaries(&self) -> Vec<PeerSummary> {
        self.slots
            .iter()
            .map(|slot| PeerSummary {
                peer_id: slot.peer_id.clone(),
                username: slot.description.username.clone(),
                answered: slot.connection.is_some(),
                channel_open: slot.channel.is_some(),
                failed: slot.failed,
            })
            .collect()
    }

    /// Send `text` verbatim to every open channel, one after another.
    ///
    /// A failed send is logged and counted; it never stops the others.
    pub async fn broadcast(&self, from: &PeerId, text: &str, include_sender: bool) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for slot in &self.slots {
            let Some(channel) = &slot.channel else {
                continue;
            };
            if !include_sender && &slot.peer_id == from {
                continue;
            }

            match channel.send_text(text).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    error!("Failed to forward message to {}: {:#}", slot.peer_id, e);
                }
            }
        }

        report
    }

    pub async fn close_all(&mut self) {
        for slot in &mut self.slots {
            slot.channel = None;
            if let Some(connection) = slot.connection.take() {
                let _ = connection.close().await;
            }
        }
    }
}
