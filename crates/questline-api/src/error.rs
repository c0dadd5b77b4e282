//! Questline API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use questline_core::error::DomainError;
use questline_core::ids::ParticipantId;
use questline_stats::StatsError;
use serde::Serialize;
use thiserror::Error;

/// Startup errors for the API server and the upload tool.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The quest store could not be opened or read.
    #[error("storage error: {0}")]
    Storage(#[from] DomainError),

    /// The stats aggregator could not be started.
    #[error("stats error: {0}")]
    Stats(#[from] StatsError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer errors that implement `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A domain operation failed.
    Domain(DomainError),
    /// The stats aggregator is not running.
    Stats(StatsError),
    /// The participant may not run admin commands.
    Forbidden(ParticipantId),
    /// The current stage has no media attached.
    NoMedia(ParticipantId),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        Self::Stats(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Domain(err) => {
                let (status, code) = match err {
                    DomainError::UnknownQuest(_) => (StatusCode::NOT_FOUND, "unknown_quest"),
                    DomainError::NoActiveSession(_) => {
                        (StatusCode::NOT_FOUND, "no_active_session")
                    }
                    DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    DomainError::MalformedStageRecord { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "malformed_stage_record")
                    }
                    DomainError::BackendUnavailable(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable")
                    }
                };
                (status, code, err.to_string())
            }
            Self::Stats(err) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "stats_unavailable",
                err.to_string(),
            ),
            Self::Forbidden(participant) => (
                StatusCode::FORBIDDEN,
                "forbidden",
                format!("participant {participant} may not request stats"),
            ),
            Self::NoMedia(participant) => (
                StatusCode::NOT_FOUND,
                "no_media",
                format!("current question of participant {participant} has no media"),
            ),
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
