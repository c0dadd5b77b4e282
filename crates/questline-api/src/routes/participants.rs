//! Participant queries.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use questline_core::error::DomainError;
use questline_core::ids::ParticipantId;
use questline_session::CurrentQuestion;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /participants/{participant_id}/media
#[instrument(skip(state))]
async fn current_media(
    State(state): State<AppState>,
    Path(participant_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let participant = ParticipantId(participant_id);
    let CurrentQuestion::Question(view) = state.engine.current_question(participant) else {
        return Err(DomainError::NoActiveSession(participant).into());
    };
    let media = view
        .media()
        .ok_or(ApiError::NoMedia(participant))?
        .to_vec();
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], media))
}

/// Returns the router for participant queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/participants/{participant_id}/media", get(current_media))
}
