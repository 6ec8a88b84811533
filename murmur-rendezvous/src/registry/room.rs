use murmur_core::{HostSecret, PeerDescription, PeerId, PeerSecret, SessionAnswer};
use std::collections::HashMap;

/// A joining peer's entry in a room.
#[derive(Debug, Clone)]
pub struct WaitingPeer {
    pub secret: PeerSecret,
    pub description: PeerDescription,
    /// Filled in once the host answered.
    pub answer: Option<SessionAnswer>,
}

/// One room as the service stores it. Peers stay listed after being
/// answered; hosts skip ids they already know.
#[derive(Debug)]
pub struct Room {
    pub password: String,
    pub host_secret: HostSecret,
    pub peers: HashMap<PeerId, WaitingPeer>,
}

impl Room {
    pub fn new(password: String) -> Self {
        Self {
            password,
            host_secret: HostSecret::generate(),
            peers: HashMap::new(),
        }
    }

    pub fn is_host(&self, secret: &str) -> bool {
        self.host_secret.as_str() == secret
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.peers
            .values()
            .any(|peer| peer.description.username == username)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&WaitingPeer> {
        self.peers
            .values()
            .find(|peer| peer.description.username == username)
    }

    pub fn descriptions(&self) -> HashMap<PeerId, PeerDescription> {
        self.peers
            .iter()
            .map(|(id, peer)| (id.clone(), peer.description.clone()))
            .collect()
    }
}
