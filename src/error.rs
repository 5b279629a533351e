use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Reading store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("No readings recorded yet")]
    EmptyStore,

    #[error("Malformed reading: {0}")]
    MalformedReading(String),
}

impl AppError {
    /// Stable machine-readable kind, sent as `code` in error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::EmptyStore => "empty_store",
            Self::MalformedReading(_) => "malformed_reading",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::StoreUnavailable(e) => {
                tracing::error!("Reading store error: {e:?}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Reading store unavailable".to_string(),
                )
            }
            Self::EmptyStore => {
                tracing::debug!("Snapshot requested before any reading was stored");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            Self::MalformedReading(msg) => {
                tracing::error!("Malformed reading: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
