use serde::{Deserialize, Serialize};

/// What a joining peer leaves at the rendezvous service for the host:
/// its SDP offer and the ICE candidates it gathered, in gathering order.
///
/// Candidates are JSON encoded `RTCIceCandidateInit` values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerDescription {
    pub username: String,
    pub offer: String,
    pub candidates: Vec<String>,
}

/// The host's reply to a [`PeerDescription`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionAnswer {
    pub answer: String,
    pub candidates: Vec<String>,
}
