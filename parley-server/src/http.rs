use crate::relay::{RelayCommand, RelayService};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use parley_core::RoomId;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    #[serde(rename = "roomId")]
    pub room_id: RoomId,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRoomRequest {
    #[serde(rename = "roomId")]
    pub room_id: RoomId,
}

#[derive(Debug, Serialize)]
pub struct ValidateRoomResponse {
    pub valid: bool,
}

pub async fn create_room(
    State(service): State<RelayService>,
) -> Result<Json<CreateRoomResponse>, StatusCode> {
    let (reply, reply_rx) = oneshot::channel();

    if service
        .command_tx
        .send(RelayCommand::CreateRoom { reply })
        .await
        .is_err()
    {
        error!("Relay task is gone");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    match reply_rx.await {
        Ok(room_id) => Ok(Json(CreateRoomResponse { room_id })),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

pub async fn validate_room(
    State(service): State<RelayService>,
    Json(request): Json<ValidateRoomRequest>,
) -> Result<Json<ValidateRoomResponse>, StatusCode> {
    let (reply, reply_rx) = oneshot::channel();

    if service
        .command_tx
        .send(RelayCommand::ValidateRoom {
            room: request.room_id,
            reply,
        })
        .await
        .is_err()
    {
        error!("Relay task is gone");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    match reply_rx.await {
        Ok(valid) => Ok(Json(ValidateRoomResponse { valid })),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
