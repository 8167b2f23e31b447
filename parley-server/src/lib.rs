mod http;
mod registry;
mod relay;

pub use http::{CreateRoomResponse, ValidateRoomRequest, ValidateRoomResponse};
pub use registry::{RegistryError, RoomRegistry};
pub use relay::{Relay, RelayCommand, RelayOutput, RelayService, ws_handler};

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

/// Builds the full HTTP surface: the room side-channel endpoints and the
/// WebSocket signaling endpoint, with CORS open for browser clients.
pub fn router(service: RelayService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/create-room", post(http::create_room))
        .route("/validate-room", post(http::validate_room))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(service)
}
