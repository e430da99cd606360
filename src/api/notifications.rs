use crate::api::AppState;
use crate::api::schemas::notifications::{SendPushRequest, SendPushResponse};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};

/// Dispatches a push notification to every active device of a user.
///
/// Partial delivery failure still yields 200; the counts in the body tell the caller what happened.
///
/// # Errors
/// Returns `AppError::BadRequest` for malformed payloads and `AppError::Dispatch` when the
/// pipeline cannot reach any device.
pub async fn send_push(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendPushRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    payload.validate().map_err(AppError::BadRequest)?;

    let (user_id, message) = payload.into_message();
    let result = state.dispatch_service.dispatch(&user_id, &message).await?;

    Ok(Json(SendPushResponse::from(result)))
}
