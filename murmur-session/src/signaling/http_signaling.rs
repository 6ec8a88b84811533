use crate::SessionError;
use crate::signaling::{PeerSnapshot, SignalingClient};
use anyhow::{Context, bail};
use async_trait::async_trait;
use murmur_core::wire::{
    AnswerQuery, CreateRoomRequest, CreateRoomResponse, ErrorBody, HOST_SECRET_HEADER,
    PEER_SECRET_HEADER, PeersResponse, SubmitAnswerRequest, SubmitOfferRequest,
    SubmitOfferResponse,
};
use murmur_core::{HostSecret, PeerDescription, PeerId, PeerSecret, RoomName, SessionAnswer};
use reqwest::{Response, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// [`SignalingClient`] talking JSON over HTTP to a rendezvous service.
#[derive(Clone, Debug)]
pub struct HttpSignalingClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpSignalingClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("Invalid signaling server address")?;
        if base_url.cannot_be_a_base() {
            bail!("Signaling server address {} cannot be used as a base URL", base_url);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn room_url(&self, room: &RoomName, tail: &str) -> Url {
        self.url(&["rooms", room.as_str(), tail])
    }
}

/// Turn non-2xx responses into errors, keeping the service's reason if it sent one.
async fn check(response: Response) -> Result<Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown").to_owned(),
    };

    if status.is_client_error() {
        Err(SessionError::Rejected {
            status: status.as_u16(),
            reason,
        })
    } else {
        Err(SessionError::Unexpected {
            status: status.as_u16(),
            reason,
        })
    }
}

#[async_trait]
impl SignalingClient for HttpSignalingClient {
    async fn create_room(&self, room: &RoomName, password: &str) -> Result<HostSecret, SessionError> {
        let body = CreateRoomRequest {
            name: room.to_string(),
            password: password.to_owned(),
        };
        let response = self.http.post(self.url(&["rooms"])).json(&body).send().await?;
        let created: CreateRoomResponse = check(response).await?.json().await?;

        debug!("Created room '{}'", room);
        Ok(created.host_secret)
    }

    async fn submit_offer(
        &self,
        room: &RoomName,
        password: &str,
        description: &PeerDescription,
    ) -> Result<PeerSecret, SessionError> {
        let body = SubmitOfferRequest {
            password: password.to_owned(),
            description: description.clone(),
        };
        let response = self
            .http
            .post(self.room_url(room, "offers"))
            .json(&body)
            .send()
            .await?;
        let submitted: SubmitOfferResponse = check(response).await?.json().await?;

        debug!(
            "Submitted offer for '{}' with {} candidates",
            description.username,
            description.candidates.len()
        );
        Ok(submitted.peer_secret)
    }

    async fn submit_answer(
        &self,
        room: &RoomName,
        host_secret: &HostSecret,
        peer_id: &PeerId,
        answer: &SessionAnswer,
    ) -> Result<(), SessionError> {
        let body = SubmitAnswerRequest {
            peer_id: peer_id.clone(),
            answer: answer.answer.clone(),
            candidates: answer.candidates.clone(),
        };
        let response = self
            .http
            .post(self.room_url(room, "answers"))
            .header(HOST_SECRET_HEADER, host_secret.as_str())
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn fetch_peers(
        &self,
        room: &RoomName,
        host_secret: &HostSecret,
    ) -> Result<PeerSnapshot, SessionError> {
        let response = self
            .http
            .get(self.room_url(room, "peers"))
            .header(HOST_SECRET_HEADER, host_secret.as_str())
            .send()
            .await?;
        let snapshot: PeersResponse = check(response).await?.json().await?;
        Ok(snapshot.peers)
    }

    async fn fetch_answer(
        &self,
        room: &RoomName,
        peer_secret: &PeerSecret,
        username: &str,
    ) -> Result<Option<SessionAnswer>, SessionError> {
        let query = AnswerQuery {
            username: username.to_owned(),
        };
        let response = self
            .http
            .get(self.room_url(room, "answer"))
            .header(PEER_SECRET_HEADER, peer_secret.as_str())
            .query(&query)
            .send()
            .await?;
        let response = check(response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }
}
