//! Quest upload endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use questline_core::ids::{QuestId, StageId};
use questline_core::quest::Stage;
use questline_store::{QuestRecord, StageRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// One stage of an uploaded quest.
#[derive(Debug, Deserialize)]
pub struct StageUpload {
    /// Ordering key. When absent the stage is appended after every stored
    /// stage, keeping upload order.
    #[serde(default)]
    pub stage_id: Option<String>,
    /// Question text.
    pub question: String,
    /// Accepted answers.
    pub answers: Vec<String>,
    /// Optional media payload as a byte array.
    #[serde(default)]
    pub media: Option<Vec<u8>>,
}

/// Request body for POST /quests.
#[derive(Debug, Deserialize)]
pub struct QuestUpload {
    /// Identifier of the quest to create or extend.
    pub quest_id: String,
    /// Stages in play order.
    pub stages: Vec<StageUpload>,
}

/// Response body for POST /quests.
#[derive(Debug, Serialize)]
pub struct QuestUploadResponse {
    /// Stored quest.
    pub quest_id: QuestId,
    /// Number of stages in the quest after reloading it.
    pub stage_count: usize,
}

impl QuestUpload {
    fn into_record(self, uploaded_at: DateTime<Utc>) -> Result<QuestRecord, DomainError> {
        let quest_id = QuestId::parse(self.quest_id)?;
        if self.stages.is_empty() {
            return Err(DomainError::Validation(format!(
                "quest '{quest_id}' upload has no stages"
            )));
        }
        let stages = self
            .stages
            .into_iter()
            .enumerate()
            .map(|(index, upload)| {
                let stage_id = match upload.stage_id {
                    Some(raw) => StageId::parse(raw)?,
                    None => StageId::timestamped(uploaded_at, index),
                };
                let mut stage = Stage::new(upload.question, &upload.answers)?;
                if let Some(media) = upload.media {
                    stage = stage.with_media(media);
                }
                Ok(StageRecord { stage_id, stage })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(QuestRecord { quest_id, stages })
    }
}

/// POST /quests
///
/// Stores the stages, then reloads the whole quest so the engine sees the
/// stored ordering including stages written earlier.
#[instrument(skip(state, request), fields(quest_id = %request.quest_id))]
async fn upload_quest(
    State(state): State<AppState>,
    Json(request): Json<QuestUpload>,
) -> Result<(StatusCode, Json<QuestUploadResponse>), ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, stages = request.stages.len(), "handling quest upload");

    let record = request.into_record(Utc::now())?;
    state.storage.store_quest(&record).await?;
    let stored = state.storage.load_quest(&record.quest_id).await?;
    let quest = stored.to_quest();
    let stage_count = quest.stage_count();
    state.engine.add_quest(stored.quest_id.clone(), quest);

    Ok((
        StatusCode::CREATED,
        Json(QuestUploadResponse {
            quest_id: stored.quest_id,
            stage_count,
        }),
    ))
}

/// Returns the router for quest uploads.
pub fn router() -> Router<AppState> {
    Router::new().route("/quests", post(upload_quest))
}
