//! JSON bodies exchanged with the rendezvous service over HTTP.

use crate::model::{HostSecret, PeerDescription, PeerId, PeerSecret};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header carrying the [`HostSecret`] on host-only endpoints.
pub const HOST_SECRET_HEADER: &str = "x-host-secret";

/// Header carrying the [`PeerSecret`] on the answer poll endpoint.
pub const PEER_SECRET_HEADER: &str = "x-peer-secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub host_secret: HostSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOfferRequest {
    pub password: String,
    #[serde(flatten)]
    pub description: PeerDescription,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOfferResponse {
    pub peer_secret: PeerSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub peer_id: PeerId,
    pub answer: String,
    pub candidates: Vec<String>,
}

/// Full snapshot of every peer description the service holds for a room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeersResponse {
    pub peers: HashMap<PeerId, PeerDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerQuery {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
