use crate::SessionError;
use crate::relay::PeerSummary;
use crate::transport::PeerConnection;
use murmur_core::PeerId;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Messages handled by the relay task besides snapshots and transport events.
pub enum RelayCommand {
    /// A handshake task submitted its answer; the connection is negotiating.
    Answered {
        peer_id: PeerId,
        connection: Arc<dyn PeerConnection>,
    },

    /// A handshake task gave up. The peer's slot stays unconnected.
    HandshakeFailed { peer_id: PeerId, error: SessionError },

    /// Read-only view of the peer table.
    ListPeers(oneshot::Sender<Vec<PeerSummary>>),
}
