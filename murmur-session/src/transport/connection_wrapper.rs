use crate::transport::{
    AnswerConnection, OfferConnection, PeerChannel, PeerConnection, Transport, TransportConfig,
    TransportEvent,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use murmur_core::{PeerDescription, PeerId};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

#[async_trait]
impl PeerChannel for RTCDataChannel {
    async fn send_text(&self, text: &str) -> Result<()> {
        RTCDataChannel::send_text(self, text.to_owned()).await?;
        Ok(())
    }
}

/// One `RTCPeerConnection` plus the bookkeeping the handshake needs:
/// locally gathered candidates and remote candidates that arrived before the
/// remote description.
pub struct ConnectionWrapper {
    pub peer_id: PeerId,
    pub peer_connection: Arc<RTCPeerConnection>,
    config: TransportConfig,
    events: mpsc::Sender<TransportEvent>,
    local_candidates: Arc<Mutex<Vec<String>>>,
    pending_candidates: Mutex<Vec<RTCIceCandidateInit>>,
}

impl ConnectionWrapper {
    /// Build a peer connection and hook its callbacks up to `events`.
    pub async fn new(
        peer_id: PeerId,
        config: TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        let uid_state = peer_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", uid, s);
                    match s {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(TransportEvent::Disconnected(uid)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        let local_candidates = Arc::new(Mutex::new(Vec::new()));
        let gathered = Arc::clone(&local_candidates);
        let uid_ice = peer_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let gathered = Arc::clone(&gathered);
            let uid = uid_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(str_candidate) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                debug!("Gathered local candidate for {}", uid);
                gathered.lock().await.push(str_candidate);
            })
        }));

        // Answering side: the joiner opens the channel.
        let dc_tx = events.clone();
        let uid_dc = peer_id.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let uid = uid_dc.clone();

            Box::pin(async move {
                debug!("Remote data channel '{}' announced by {}", dc.label(), uid);
                wire_data_channel(uid, &dc, tx);
            })
        }));

        Ok(Self {
            peer_id,
            peer_connection,
            config,
            events,
            local_candidates,
            pending_candidates: Mutex::new(Vec::new()),
        })
    }

    /// Open the chat channel, create an offer and gather candidates for it.
    pub async fn create_offer(&self) -> Result<(String, Vec<String>, Arc<RTCDataChannel>)> {
        let dc = self
            .peer_connection
            .create_data_channel(&self.config.channel_label, None)
            .await
            .context("Failed to create data channel")?;
        wire_data_channel(self.peer_id.clone(), &dc, self.events.clone());

        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("Failed to create offer")?;
        let (sdp, candidates) = self.set_local_and_gather(offer).await?;

        Ok((sdp, candidates, dc))
    }

    /// Apply a joiner's offer and candidates, then create and gather the answer.
    pub async fn accept_offer(&self, description: &PeerDescription) -> Result<(String, Vec<String>)> {
        let offer = RTCSessionDescription::offer(description.offer.clone())?;
        self.peer_connection
            .set_remote_description(offer)
            .await
            .context("Failed to apply remote offer")?;

        for candidate in &description.candidates {
            if let Err(e) = self.add_candidate(candidate).await {
                warn!("Skipping candidate from {}: {:#}", self.peer_id, e);
            }
        }

        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("Failed to create answer")?;

        self.set_local_and_gather(answer).await
    }

    async fn set_local_and_gather(
        &self,
        description: RTCSessionDescription,
    ) -> Result<(String, Vec<String>)> {
        let fallback_sdp = description.sdp.clone();
        // Must be obtained before gathering starts or the signal can be missed.
        let mut gathering_complete = self.peer_connection.gathering_complete_promise().await;

        self.peer_connection
            .set_local_description(description)
            .await
            .context("Failed to set local description")?;

        let timeout = self.config.gathering_timeout;
        if tokio::time::timeout(timeout, gathering_complete.recv())
            .await
            .is_err()
        {
            warn!(
                "ICE gathering for {} did not complete within {:?}, using what we have",
                self.peer_id, timeout
            );
        }

        let candidates = self.local_candidates.lock().await.clone();
        debug!("Gathered {} candidates for {}", candidates.len(), self.peer_id);

        let sdp = self
            .peer_connection
            .local_description()
            .await
            .map(|d| d.sdp)
            .unwrap_or(fallback_sdp);

        Ok((sdp, candidates))
    }
}

#[async_trait]
impl PeerConnection for ConnectionWrapper {
    async fn set_remote_answer(&self, sdp: String) -> Result<()> {
        let mut pending = self.pending_candidates.lock().await;

        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection
            .set_remote_description(answer)
            .await
            .context("Failed to set remote description")?;

        for candidate in pending.drain(..) {
            if let Err(e) = self.peer_connection.add_ice_candidate(candidate).await {
                warn!("Failed to add ICE candidate for {}: {}", self.peer_id, e);
            }
        }
        Ok(())
    }

    async fn add_candidate(&self, candidate_json: &str) -> Result<()> {
        let candidate: RTCIceCandidateInit =
            serde_json::from_str(candidate_json).context("Failed to parse ICE candidate JSON")?;

        // Held across the check so candidates keep their order against set_remote_answer.
        let mut pending = self.pending_candidates.lock().await;
        if self.peer_connection.remote_description().await.is_none() {
            pending.push(candidate);
            return Ok(());
        }
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn wire_data_channel(peer_id: PeerId, dc: &Arc<RTCDataChannel>, tx: mpsc::Sender<TransportEvent>) {
    let dc_on_open = Arc::clone(dc);
    let tx_open = tx.clone();
    let uid_open = peer_id.clone();
    dc.on_open(Box::new(move || {
        let channel: Arc<dyn PeerChannel> = dc_on_open;

        Box::pin(async move {
            info!("Data channel open for {}", uid_open);
            let _ = tx_open
                .send(TransportEvent::ChannelOpen(uid_open, channel))
                .await;
        })
    }));

    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx.clone();
        let uid = peer_id.clone();
        Box::pin(async move {
            let text = String::from_utf8_lossy(&msg.data).into_owned();
            let _ = tx.send(TransportEvent::Message(uid, text)).await;
        })
    }));
}

/// [`Transport`] backed by the `webrtc` crate.
#[derive(Clone, Default)]
pub struct WebrtcTransport {
    config: TransportConfig,
}

impl WebrtcTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transport for WebrtcTransport {
    async fn create_offer(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<OfferConnection> {
        let wrapper = ConnectionWrapper::new(peer_id, self.config.clone(), events).await?;

        match wrapper.create_offer().await {
            Ok((offer, candidates, channel)) => Ok(OfferConnection {
                offer,
                candidates,
                connection: Arc::new(wrapper),
                channel,
            }),
            Err(e) => {
                let _ = wrapper.close().await;
                Err(e)
            }
        }
    }

    async fn create_answer(
        &self,
        peer_id: PeerId,
        description: &PeerDescription,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<AnswerConnection> {
        let wrapper = ConnectionWrapper::new(peer_id, self.config.clone(), events).await?;

        match wrapper.accept_offer(description).await {
            Ok((answer, candidates)) => Ok(AnswerConnection {
                answer,
                candidates,
                connection: Arc::new(wrapper),
            }),
            Err(e) => {
                let _ = wrapper.close().await;
                Err(e)
            }
        }
    }
}
