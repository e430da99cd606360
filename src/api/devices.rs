use crate::api::AppState;
use crate::api::schemas::devices::RegisterDeviceRequest;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

/// Registers or reactivates a device token for a user.
///
/// # Errors
/// Returns `AppError::BadRequest` if the payload is invalid.
/// Returns `AppError::Database` if the database operation fails.
pub async fn register_device(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    payload.validate().map_err(AppError::BadRequest)?;

    state.device_service.register(payload.into()).await?;
    Ok(StatusCode::OK)
}
