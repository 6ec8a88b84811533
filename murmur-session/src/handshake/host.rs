use crate::SessionError;
use crate::signaling::SignalingClient;
use crate::transport::{PeerConnection, Transport, TransportEvent};
use murmur_core::{HostSecret, PeerDescription, PeerId, RoomName, SessionAnswer};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The room a host is serving and the secret that proves it.
#[derive(Clone, Debug)]
pub struct HostSession {
    pub room: RoomName,
    pub host_secret: HostSecret,
}

impl HostSession {
    /// Create `room` at the rendezvous service. Failure here is fatal for a host.
    pub async fn create(
        signaling: &dyn SignalingClient,
        room: RoomName,
        password: &str,
    ) -> Result<Self, SessionError> {
        let host_secret = signaling.create_room(&room, password).await?;
        info!("Hosting room '{}'", room);
        Ok(Self { room, host_secret })
    }
}

/// Host side of the handshake for one joining peer: answer its offer and hand
/// the answer to the rendezvous service.
///
/// On success the connection is negotiating; its channel shows up later as a
/// [`TransportEvent::ChannelOpen`] on `events`. Nothing is retried.
pub async fn answer_peer(
    transport: &dyn Transport,
    signaling: &dyn SignalingClient,
    session: &HostSession,
    peer_id: PeerId,
    description: &PeerDescription,
    events: mpsc::Sender<TransportEvent>,
) -> Result<Arc<dyn PeerConnection>, SessionError> {
    debug!(
        "Answering '{}' ({}) with {} remote candidates",
        description.username,
        peer_id,
        description.candidates.len()
    );

    let negotiated = transport
        .create_answer(peer_id.clone(), description, events)
        .await
        .map_err(SessionError::Transport)?;
    let guard = CloseOnDrop::new(peer_id.clone(), negotiated.connection);

    let answer = SessionAnswer {
        answer: negotiated.answer,
        candidates: negotiated.candidates,
    };

    if let Err(e) = signaling
        .submit_answer(&session.room, &session.host_secret, &peer_id, &answer)
        .await
    {
        let _ = guard.disarm().close().await;
        return Err(e);
    }

    info!("Answer for '{}' ({}) submitted", description.username, peer_id);
    Ok(guard.disarm())
}

/// Closes a connection that never left the handshake, even when the
/// handshake future is dropped half way.
struct CloseOnDrop {
    peer_id: PeerId,
    connection: Arc<dyn PeerConnection>,
    armed: bool,
}

impl CloseOnDrop {
    fn new(peer_id: PeerId, connection: Arc<dyn PeerConnection>) -> Self {
        Self {
            peer_id,
            connection,
            armed: true,
        }
    }

    fn disarm(mut self) -> Arc<dyn PeerConnection> {
        self.armed = false;
        Arc::clone(&self.connection)
    }
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("No runtime left to close the connection of {}", self.peer_id);
            return;
        };

        debug!("Handshake with {} cancelled, closing its connection", self.peer_id);
        let connection = Arc::clone(&self.connection);
        runtime.spawn(async move {
            let _ = connection.close().await;
        });
    }
}
