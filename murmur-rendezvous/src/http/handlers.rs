use crate::{RendezvousError, RoomRegistry};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use murmur_core::wire::{
    AnswerQuery, CreateRoomRequest, CreateRoomResponse, HOST_SECRET_HEADER, PEER_SECRET_HEADER,
    PeersResponse, SubmitAnswerRequest, SubmitOfferRequest, SubmitOfferResponse,
};
use murmur_core::{RoomName, SessionAnswer};
use tracing::warn;

fn secret_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, RendezvousError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(RendezvousError::Unauthorized)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn create_room(
    State(registry): State<RoomRegistry>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), RendezvousError> {
    let host_secret = registry
        .create_room(RoomName::from(req.name), req.password)
        .inspect_err(|e| warn!("Room creation refused: {}", e))?;

    Ok((StatusCode::CREATED, Json(CreateRoomResponse { host_secret })))
}

pub async fn submit_offer(
    State(registry): State<RoomRegistry>,
    Path(room): Path<String>,
    Json(req): Json<SubmitOfferRequest>,
) -> Result<(StatusCode, Json<SubmitOfferResponse>), RendezvousError> {
    let room = RoomName::from(room);
    let (_, peer_secret) = registry
        .submit_offer(&room, &req.password, req.description)
        .inspect_err(|e| warn!("Offer for room '{}' refused: {}", room, e))?;

    Ok((StatusCode::CREATED, Json(SubmitOfferResponse { peer_secret })))
}

pub async fn list_peers(
    State(registry): State<RoomRegistry>,
    Path(room): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PeersResponse>, RendezvousError> {
    let secret = secret_header(&headers, HOST_SECRET_HEADER)?;
    let peers = registry.peers(&RoomName::from(room), secret)?;

    Ok(Json(PeersResponse { peers }))
}

pub async fn submit_answer(
    State(registry): State<RoomRegistry>,
    Path(room): Path<String>,
    headers: HeaderMap,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<StatusCode, RendezvousError> {
    let secret = secret_header(&headers, HOST_SECRET_HEADER)?;
    let answer = SessionAnswer {
        answer: req.answer,
        candidates: req.candidates,
    };
    registry.submit_answer(&RoomName::from(room), secret, &req.peer_id, answer)?;

    Ok(StatusCode::NO_CONTENT)
}

/// 200 with the answer once the host replied, 204 while it is pending.
pub async fn fetch_answer(
    State(registry): State<RoomRegistry>,
    Path(room): Path<String>,
    Query(query): Query<AnswerQuery>,
    headers: HeaderMap,
) -> Result<Response, RendezvousError> {
    let secret = secret_header(&headers, PEER_SECRET_HEADER)?;

    match registry.answer_for(&RoomName::from(room), secret, &query.username)? {
        Some(answer) => Ok(Json(answer).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
