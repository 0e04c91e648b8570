use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Application error type. Handlers return this and let the
/// `IntoResponse` impl pick the status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("geocoder error: {0}")]
    Geocoder(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(f64),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) | AppError::Geocoder(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCoordinate(_) => StatusCode::BAD_REQUEST,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
