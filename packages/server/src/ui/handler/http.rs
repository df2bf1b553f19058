//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::{
        conversion::format_timestamp,
        http::{CreateRoomRequest, CreateRoomResponse, ErrorResponse, RoomDetailDto},
    },
    ui::state::AppState,
    usecase::{CreateRoomError, GetRoomError},
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room for `creator_identity` and hand back the creator token.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    match state
        .create_room_usecase
        .execute(request.creator_identity)
        .await
    {
        Ok(token) => Ok((
            StatusCode::CREATED,
            Json(CreateRoomResponse {
                expires_at: format_timestamp(token.expires_at()),
                room_id: token.room_id.into_string(),
                token: token.token.into_string(),
            }),
        )),
        Err(e @ CreateRoomError::InvalidIdentity(_)) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e @ CreateRoomError::Repository(_)) => {
            tracing::error!("Failed to create room: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to create room"))
        }
    }
}

/// Validate a room: 200 when active, 410 when ended, 404 when unknown.
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    match state.get_room_usecase.execute(room_id).await {
        Ok(room) => Ok(Json(room.into())),
        Err(e @ GetRoomError::Ended) => Err(api_error(StatusCode::GONE, e.to_string())),
        Err(e @ GetRoomError::NotFound) => Err(api_error(StatusCode::NOT_FOUND, e.to_string())),
    }
}
