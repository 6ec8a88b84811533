use crate::transport::TransportEvent;
use anyhow::Result;
use async_trait::async_trait;
use murmur_core::{PeerDescription, PeerId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound half of an open, ordered, reliable message channel to one peer.
#[async_trait]
pub trait PeerChannel: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
}

/// A negotiated (or negotiating) connection to one peer.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Apply the remote side's answer. Candidates added earlier are flushed afterwards.
    async fn set_remote_answer(&self, sdp: String) -> Result<()>;

    /// Add one remote ICE candidate (JSON encoded `RTCIceCandidateInit`).
    async fn add_candidate(&self, candidate_json: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Result of preparing the joining side of a connection.
pub struct OfferConnection {
    pub offer: String,
    pub candidates: Vec<String>,
    pub connection: Arc<dyn PeerConnection>,
    pub channel: Arc<dyn PeerChannel>,
}

/// Result of answering a joining peer's offer on the host.
pub struct AnswerConnection {
    pub answer: String,
    pub candidates: Vec<String>,
    pub connection: Arc<dyn PeerConnection>,
}

/// Connection factory the handshake flows are written against.
///
/// Both calls suspend until local candidate gathering is over. Channel open,
/// inbound messages and disconnects are reported on `events`, tagged with
/// `peer_id`.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn create_offer(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<OfferConnection>;

    async fn create_answer(
        &self,
        peer_id: PeerId,
        description: &PeerDescription,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<AnswerConnection>;
}
