use crate::SessionError;
use crate::signaling::{PeerSnapshot, SignalingClient};
use murmur_core::{HostSecret, PeerSecret, RoomName, SessionAnswer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Poll the host's room for peer descriptions until shutdown or until the
/// receiving side goes away. Transient failures are logged and retried on
/// the next tick.
pub async fn poll_peers(
    signaling: Arc<dyn SignalingClient>,
    room: RoomName,
    host_secret: HostSecret,
    interval: Duration,
    snapshots: mpsc::Sender<PeerSnapshot>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Polling room '{}' for joining peers", room);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                match signaling.fetch_peers(&room, &host_secret).await {
                    Ok(snapshot) => {
                        debug!("Room '{}' lists {} peers", room, snapshot.len());
                        if snapshots.send(snapshot).await.is_err() {
                            info!("Relay stopped listening. Ending peer poll.");
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to poll peers for '{}': {}", room, e),
                }
            }
        }
    }

    info!("Peer poll for room '{}' finished", room);
}

/// Wait for the host's answer, asking every `interval`, for at most `timeout`.
///
/// A rejection by the service ends the wait immediately; any other failure
/// is retried.
pub async fn poll_answer(
    signaling: &dyn SignalingClient,
    room: &RoomName,
    peer_secret: &PeerSecret,
    username: &str,
    interval: Duration,
    timeout: Duration,
) -> Result<SessionAnswer, SessionError> {
    let wait = async {
        loop {
            match signaling.fetch_answer(room, peer_secret, username).await {
                Ok(Some(answer)) => return Ok(answer),
                Ok(None) => debug!("No answer for '{}' yet", username),
                Err(e) if e.is_rejection() => return Err(e),
                Err(e) => warn!("Answer poll for '{}' failed, retrying: {}", username, e),
            }
            tokio::time::sleep(interval).await;
        }
    };

    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| SessionError::AnswerTimeout(timeout))?
}
