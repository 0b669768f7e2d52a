use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    db,
    error::ApiError,
    models::{MessageResponse, User},
    state::AppState,
};

fn parse_id(raw_id: &str) -> Result<i64, ApiError> {
    raw_id
        .parse::<i64>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Buffers the whole request body. There is no size cap.
async fn read_body(body: Body) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// A bare `null` body decodes as an empty user.
fn decode_user(bytes: &[u8]) -> Result<User, ApiError> {
    serde_json::from_slice::<Option<User>>(bytes)
        .map(Option::unwrap_or_default)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// POST /user
pub async fn create_user(
    State(state): State<AppState>,
    body: Body,
) -> Result<Json<MessageResponse>, ApiError> {
    let bytes = read_body(body).await?;
    let user = decode_user(&bytes)?;

    state.users.create_user(user).await?;
    Ok(Json(MessageResponse::ok()))
}

/// GET /users
pub async fn get_all_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.get_all_users().await?;
    Ok(Json(users))
}

/// GET /user/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&raw_id)?;
    let user = state.users.get_user(id).await?;
    Ok(Json(user))
}

/// PUT /user/{id}
///
/// The id always comes from the path; an id in the body is overwritten.
pub async fn update_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Body,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let bytes = read_body(body).await?;
    let mut user = decode_user(&bytes)?;
    user.id = id;

    state.users.update_user(user).await?;
    Ok(Json(MessageResponse::ok()))
}

/// DELETE /user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    state.users.delete_user(id).await?;
    Ok(Json(MessageResponse::ok()))
}

/// GET /healthz - pings the database.
pub async fn healthz(State(state): State<AppState>) -> Response {
    match db::ping(&state.db).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}
