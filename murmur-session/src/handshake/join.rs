use crate::SessionError;
use crate::handshake::SessionConfig;
use crate::signaling::{SignalingClient, poll_answer};
use crate::transport::{PeerChannel, PeerConnection, Transport, TransportEvent};
use murmur_core::{PeerDescription, PeerId, PeerSecret, RoomName};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Tag the joining side puts on its own transport events.
pub const HOST_PEER: &str = "host";

const EVENT_BUFFER: usize = 256;

#[derive(Clone, Debug)]
pub struct JoinRequest {
    pub room: RoomName,
    pub password: String,
    pub username: String,
}

/// A joiner's live connection to the host.
pub struct Membership {
    pub username: String,
    pub peer_secret: PeerSecret,
    pub connection: Arc<dyn PeerConnection>,
    pub channel: Arc<dyn PeerChannel>,
    pub events: mpsc::Receiver<TransportEvent>,
}

/// Join flow: offer, register with the rendezvous service, wait for the
/// host's answer and apply it.
///
/// Any error returned here is meant to end the joining process.
pub async fn join_room(
    transport: &dyn Transport,
    signaling: &dyn SignalingClient,
    request: &JoinRequest,
    config: &SessionConfig,
) -> Result<Membership, SessionError> {
    let (events_tx, events) = mpsc::channel(EVENT_BUFFER);

    let offered = transport
        .create_offer(PeerId::from(HOST_PEER), events_tx)
        .await
        .map_err(SessionError::Transport)?;

    let description = PeerDescription {
        username: request.username.clone(),
        offer: offered.offer,
        candidates: offered.candidates,
    };

    let peer_secret = match signaling
        .submit_offer(&request.room, &request.password, &description)
        .await
    {
        Ok(secret) => secret,
        Err(e) => {
            let _ = offered.connection.close().await;
            return Err(e);
        }
    };
    info!(
        "Offer for '{}' left in room '{}', waiting for the host",
        request.username, request.room
    );

    let answer = match poll_answer(
        signaling,
        &request.room,
        &peer_secret,
        &request.username,
        config.poll_interval,
        config.answer_timeout,
    )
    .await
    {
        Ok(answer) => answer,
        Err(e) => {
            let _ = offered.connection.close().await;
            return Err(e);
        }
    };

    // Receipt order; the connection queues them until the answer is applied.
    for candidate in &answer.candidates {
        if let Err(e) = offered.connection.add_candidate(candidate).await {
            warn!("Skipping host candidate: {:#}", e);
        }
    }

    if let Err(e) = offered.connection.set_remote_answer(answer.answer).await {
        let _ = offered.connection.close().await;
        return Err(SessionError::RemoteDescription(e));
    }

    info!("Joined room '{}' as '{}'", request.room, request.username);
    Ok(Membership {
        username: request.username.clone(),
        peer_secret,
        connection: offered.connection,
        channel: offered.channel,
        events,
    })
}
