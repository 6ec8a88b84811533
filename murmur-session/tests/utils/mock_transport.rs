use anyhow::{Result, bail};
use async_trait::async_trait;
use murmur_core::{PeerDescription, PeerId};
use murmur_session::{
    AnswerConnection, OfferConnection, PeerChannel, PeerConnection, Transport, TransportEvent,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Channel that keeps every text it was asked to send.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<String>>,
}

impl RecordingChannel {
    pub async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PeerChannel for RecordingChannel {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.sent.lock().await.push(text.to_owned());
        Ok(())
    }
}

/// Channel whose sends always fail.
pub struct BrokenChannel;

#[async_trait]
impl PeerChannel for BrokenChannel {
    async fn send_text(&self, _text: &str) -> Result<()> {
        bail!("data channel is closed")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCall {
    AddCandidate(String),
    SetRemoteAnswer(String),
    Close,
}

/// Connection that records the order of calls made on it.
#[derive(Default)]
pub struct MockConnection {
    calls: Mutex<Vec<ConnectionCall>>,
    reject_answer: bool,
}

impl MockConnection {
    pub fn rejecting_answers() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject_answer: true,
        }
    }

    pub async fn calls(&self) -> Vec<ConnectionCall> {
        self.calls.lock().await.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.calls.lock().await.contains(&ConnectionCall::Close)
    }
}

#[async_trait]
impl PeerConnection for MockConnection {
    async fn set_remote_answer(&self, sdp: String) -> Result<()> {
        if self.reject_answer {
            bail!("malformed session description");
        }
        self.calls
            .lock()
            .await
            .push(ConnectionCall::SetRemoteAnswer(sdp));
        Ok(())
    }

    async fn add_candidate(&self, candidate_json: &str) -> Result<()> {
        self.calls
            .lock()
            .await
            .push(ConnectionCall::AddCandidate(candidate_json.to_owned()));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.calls.lock().await.push(ConnectionCall::Close);
        Ok(())
    }
}

/// Transport double. Remembers the event sender of every connection it made
/// so tests can play the remote side.
pub struct MockTransport {
    offer_connection: Arc<MockConnection>,
    offer_channel: Arc<RecordingChannel>,
    answer_calls: Mutex<HashMap<PeerId, usize>>,
    answer_connections: Mutex<HashMap<PeerId, Arc<MockConnection>>>,
    failing_answers: Mutex<HashSet<PeerId>>,
    events: Mutex<HashMap<PeerId, mpsc::Sender<TransportEvent>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_offer_connection(MockConnection::default())
    }

    pub fn with_offer_connection(connection: MockConnection) -> Self {
        Self {
            offer_connection: Arc::new(connection),
            offer_channel: Arc::new(RecordingChannel::default()),
            answer_calls: Mutex::new(HashMap::new()),
            answer_connections: Mutex::new(HashMap::new()),
            failing_answers: Mutex::new(HashSet::new()),
            events: Mutex::new(HashMap::new()),
        }
    }

    pub fn offer_connection(&self) -> Arc<MockConnection> {
        Arc::clone(&self.offer_connection)
    }

    pub fn offer_channel(&self) -> Arc<RecordingChannel> {
        Arc::clone(&self.offer_channel)
    }

    pub async fn fail_answers_for(&self, peer_id: &str) {
        self.failing_answers
            .lock()
            .await
            .insert(PeerId::from(peer_id));
    }

    /// How many times an answer was created for `peer_id`.
    pub async fn answer_count(&self, peer_id: &str) -> usize {
        self.answer_calls
            .lock()
            .await
            .get(&PeerId::from(peer_id))
            .copied()
            .unwrap_or(0)
    }

    pub async fn answer_connection(&self, peer_id: &str) -> Option<Arc<MockConnection>> {
        self.answer_connections
            .lock()
            .await
            .get(&PeerId::from(peer_id))
            .cloned()
    }

    /// Report `channel` as open for `peer_id`, as the remote side would.
    pub async fn open_channel(&self, peer_id: &str, channel: Arc<dyn PeerChannel>) {
        self.emit(peer_id, TransportEvent::ChannelOpen(PeerId::from(peer_id), channel))
            .await;
    }

    /// Deliver an inbound message from `peer_id`.
    pub async fn deliver(&self, peer_id: &str, text: &str) {
        self.emit(
            peer_id,
            TransportEvent::Message(PeerId::from(peer_id), text.to_owned()),
        )
        .await;
    }

    pub async fn disconnect(&self, peer_id: &str) {
        self.emit(peer_id, TransportEvent::Disconnected(PeerId::from(peer_id)))
            .await;
    }

    async fn emit(&self, peer_id: &str, event: TransportEvent) {
        let sender = self
            .events
            .lock()
            .await
            .get(&PeerId::from(peer_id))
            .cloned()
            .expect("no connection was created for this peer");
        sender.send(event).await.expect("event receiver dropped");
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn create_offer(
        &self,
        peer_id: PeerId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<OfferConnection> {
        self.events.lock().await.insert(peer_id, events);

        Ok(OfferConnection {
            offer: "mock-offer".to_owned(),
            candidates: vec!["offer-candidate".to_owned()],
            connection: self.offer_connection.clone(),
            channel: self.offer_channel.clone(),
        })
    }

    async fn create_answer(
        &self,
        peer_id: PeerId,
        description: &PeerDescription,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<AnswerConnection> {
        *self
            .answer_calls
            .lock()
            .await
            .entry(peer_id.clone())
            .or_insert(0) += 1;

        if self.failing_answers.lock().await.contains(&peer_id) {
            bail!("could not parse offer from {}", description.username);
        }

        let connection = Arc::new(MockConnection::default());
        self.answer_connections
            .lock()
            .await
            .insert(peer_id.clone(), connection.clone());
        self.events.lock().await.insert(peer_id.clone(), events);

        Ok(AnswerConnection {
            answer: format!("answer-for-{}", description.username),
            candidates: vec![format!("host-candidate-{}", peer_id)],
            connection,
        })
    }
}
