use crate::RendezvousError;
use crate::registry::{Room, WaitingPeer};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use murmur_core::{
    HostSecret, PeerDescription, PeerId, PeerSecret, RoomName, SessionAnswer,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Every room the service knows about. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomName, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn create_room(&self, name: RoomName, password: String) -> Result<HostSecret, RendezvousError> {
        if name.as_str().is_empty() {
            return Err(RendezvousError::EmptyRoomName);
        }

        match self.rooms.entry(name) {
            Entry::Occupied(entry) => Err(RendezvousError::RoomExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!("Creating room '{}'", entry.key());
                let room = Room::new(password);
                let secret = room.host_secret.clone();
                entry.insert(room);
                Ok(secret)
            }
        }
    }

    /// Register a joining peer's offer. Usernames are unique per room since
    /// joiners look their answer up by username.
    pub fn submit_offer(
        &self,
        name: &RoomName,
        password: &str,
        description: PeerDescription,
    ) -> Result<(PeerId, PeerSecret), RendezvousError> {
        if description.username.is_empty() {
            return Err(RendezvousError::EmptyUsername);
        }

        let mut room = self
            .rooms
            .get_mut(name)
            .ok_or_else(|| RendezvousError::RoomNotFound(name.clone()))?;

        if room.password != password {
            return Err(RendezvousError::WrongPassword);
        }
        if room.username_taken(&description.username) {
            return Err(RendezvousError::UsernameTaken(description.username));
        }

        let peer_id = PeerId::new();
        let secret = PeerSecret::generate();
        info!(
            "'{}' ({}) is waiting in room '{}'",
            description.username, peer_id, name
        );
        room.peers.insert(
            peer_id.clone(),
            WaitingPeer {
                secret: secret.clone(),
                description,
                answer: None,
            },
        );

        Ok((peer_id, secret))
    }

    /// Full snapshot of the room's peer descriptions, answered ones included.
    pub fn peers(
        &self,
        name: &RoomName,
        host_secret: &str,
    ) -> Result<HashMap<PeerId, PeerDescription>, RendezvousError> {
        let room = self
            .rooms
            .get(name)
            .ok_or_else(|| RendezvousError::RoomNotFound(name.clone()))?;

        if !room.is_host(host_secret) {
            return Err(RendezvousError::Unauthorized);
        }

        Ok(room.descriptions())
    }

    pub fn submit_answer(
        &self,
        name: &RoomName,
        host_secret: &str,
        peer_id: &PeerId,
        answer: SessionAnswer,
    ) -> Result<(), RendezvousError> {
        let mut room = self
            .rooms
            .get_mut(name)
            .ok_or_else(|| RendezvousError::RoomNotFound(name.clone()))?;

        if !room.is_host(host_secret) {
            return Err(RendezvousError::Unauthorized);
        }

        let peer = room
            .peers
            .get_mut(peer_id)
            .ok_or_else(|| RendezvousError::PeerNotFound(peer_id.to_string()))?;

        debug!(
            "Host answered {} with {} candidates",
            peer_id,
            answer.candidates.len()
        );
        peer.answer = Some(answer);
        Ok(())
    }

    /// The host's answer for `username`, or `None` while it is still pending.
    pub fn answer_for(
        &self,
        name: &RoomName,
        peer_secret: &str,
        username: &str,
    ) -> Result<Option<SessionAnswer>, RendezvousError> {
        let room = self
            .rooms
            .get(name)
            .ok_or_else(|| RendezvousError::RoomNotFound(name.clone()))?;

        let peer = room
            .find_by_username(username)
            .ok_or_else(|| RendezvousError::PeerNotFound(username.to_owned()))?;

        if peer.secret.as_str() != peer_secret {
            return Err(RendezvousError::Unauthorized);
        }

        Ok(peer.answer.clone())
    }
}
