use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use murmur_core::RoomName;
use murmur_core::wire::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RendezvousError {
    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("room '{0}' already exists")]
    RoomExists(RoomName),

    #[error("room '{0}' does not exist")]
    RoomNotFound(RoomName),

    #[error("no peer '{0}' is waiting in this room")]
    PeerNotFound(String),

    #[error("username '{0}' is already taken in this room")]
    UsernameTaken(String),

    #[error("wrong room password")]
    WrongPassword,

    #[error("missing or invalid secret")]
    Unauthorized,
}

impl RendezvousError {
    pub fn status(&self) -> StatusCode {
        match self {
            RendezvousError::EmptyRoomName | RendezvousError::EmptyUsername => {
                StatusCode::BAD_REQUEST
            }
            RendezvousError::RoomExists(_) | RendezvousError::UsernameTaken(_) => {
                StatusCode::CONFLICT
            }
            RendezvousError::RoomNotFound(_) | RendezvousError::PeerNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RendezvousError::WrongPassword | RendezvousError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for RendezvousError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
