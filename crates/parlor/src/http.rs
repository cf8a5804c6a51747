//! The HTTP room API.
//!
//! Two endpoints, both JSON:
//!
//! - `POST /api/create-room` with `{"playerName": ..}` mints a room
//! - `GET /api/room/{roomId}` returns a room snapshot
//!
//! Every reply carries `success`; failures add a human-readable
//! `message`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parlor_protocol::{RoomId, RoomSnapshot};
use parlor_room::{GameLogic, RoomError, RoomRegistry};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

/// Builds the API router over a shared registry.
pub fn router<G: GameLogic>(rooms: RoomRegistry<G>) -> Router {
    Router::new()
        .route("/api/create-room", post(create_room::<G>))
        .route("/api/room/{room_id}", get(get_room::<G>))
        .layer(CorsLayer::permissive())
        .with_state(rooms)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    player_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomReply {
    success: bool,
    room_id: RoomId,
}

#[derive(Serialize)]
struct RoomReply<S> {
    success: bool,
    room: RoomSnapshot<S>,
}

#[derive(Serialize)]
struct Failure {
    success: bool,
    message: String,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Failure {
        success: false,
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

async fn create_room<G: GameLogic>(
    State(rooms): State<RoomRegistry<G>>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "malformed create-room body");
            return failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match rooms.create_room(&request.player_name) {
        Ok(room_id) => {
            let body = CreateRoomReply {
                success: true,
                room_id,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => failure(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

async fn get_room<G: GameLogic>(
    State(rooms): State<RoomRegistry<G>>,
    Path(raw_id): Path<String>,
) -> Response {
    // A code of the wrong shape can't name a live room.
    let Some(room_id) = RoomId::parse(&raw_id) else {
        let message = format!("room {raw_id} not found");
        return failure(StatusCode::NOT_FOUND, message);
    };

    let snapshot = match rooms.lookup(&room_id) {
        Ok(room) => room.snapshot().await,
        Err(e) => Err(e),
    };
    match snapshot {
        Ok(room) => {
            let body = RoomReply {
                success: true,
                room,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e @ RoomError::NotFound(_)) => failure(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => {
            tracing::warn!(%room_id, error = %e, "room snapshot failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
