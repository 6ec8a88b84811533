use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the session layer.
///
/// `Rejected`, `RemoteDescription` and `AnswerTimeout` end a join attempt for
/// good; everything else is contained by whoever hit it.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The rendezvous service refused the request (unknown room, bad secret or password).
    #[error("rendezvous service rejected the request ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("signaling request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected signaling response ({status}): {reason}")]
    Unexpected { status: u16, reason: String },

    #[error("transport failure: {0:#}")]
    Transport(anyhow::Error),

    #[error("could not apply the remote description: {0:#}")]
    RemoteDescription(anyhow::Error),

    #[error("no answer from the host within {0:?}")]
    AnswerTimeout(Duration),

    #[error("relay is no longer running")]
    RelayClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::Rejected { .. })
    }
}
