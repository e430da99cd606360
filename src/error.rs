use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Fatal conditions that abort a whole dispatch before any device is contacted.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Push configuration error: {0}")]
    Configuration(String),
    #[error("Failed to look up device registrations: {0}")]
    Lookup(String),
    #[error("Push gateway authentication failed: {0}")]
    Auth(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Dispatch(e) => {
                tracing::error!(error = %e, "Dispatch aborted");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
