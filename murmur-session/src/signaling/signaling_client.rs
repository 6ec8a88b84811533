use crate::SessionError;
use async_trait::async_trait;
use murmur_core::{HostSecret, PeerDescription, PeerId, PeerSecret, RoomName, SessionAnswer};
use std::collections::HashMap;

/// Every peer description the rendezvous service currently holds for a room.
/// Always a full snapshot, never a delta.
pub type PeerSnapshot = HashMap<PeerId, PeerDescription>;

/// Narrow request/response view of the rendezvous service.
#[async_trait]
pub trait SignalingClient: Send + Sync {
    /// Create a room and receive the capability token for hosting it.
    async fn create_room(&self, room: &RoomName, password: &str) -> Result<HostSecret, SessionError>;

    /// Leave an offer for the host of `room`.
    async fn submit_offer(
        &self,
        room: &RoomName,
        password: &str,
        description: &PeerDescription,
    ) -> Result<PeerSecret, SessionError>;

    /// Hand the host's answer for `peer_id` back to the service.
    async fn submit_answer(
        &self,
        room: &RoomName,
        host_secret: &HostSecret,
        peer_id: &PeerId,
        answer: &SessionAnswer,
    ) -> Result<(), SessionError>;

    async fn fetch_peers(
        &self,
        room: &RoomName,
        host_secret: &HostSecret,
    ) -> Result<PeerSnapshot, SessionError>;

    /// `Ok(None)` while the host has not answered yet.
    async fn fetch_answer(
        &self,
        room: &RoomName,
        peer_secret: &PeerSecret,
        username: &str,
    ) -> Result<Option<SessionAnswer>, SessionError>;
}
