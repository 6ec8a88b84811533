use crate::transport::PeerChannel;
use murmur_core::PeerId;
use std::sync::Arc;

/// Events a connection reports back to whoever owns it (the relay on the host,
/// the member loop on a joiner).
pub enum TransportEvent {
    /// The data channel is open and ready for writes.
    ChannelOpen(PeerId, Arc<dyn PeerChannel>),

    /// Text received on the peer's data channel.
    Message(PeerId, String),

    /// The peer connection failed, disconnected or closed.
    Disconnected(PeerId),
}

impl std::fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportEvent::ChannelOpen(peer_id, _) => {
                f.debug_tuple("ChannelOpen").field(peer_id).finish()
            }
            TransportEvent::Message(peer_id, text) => {
                f.debug_tuple("Message").field(peer_id).field(text).finish()
            }
            TransportEvent::Disconnected(peer_id) => {
                f.debug_tuple("Disconnected").field(peer_id).finish()
            }
        }
    }
}
