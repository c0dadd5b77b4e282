//! Domain error types.

use thiserror::Error;

use crate::ids::{ParticipantId, QuestId};

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A start was requested for a quest that is not in the catalog.
    #[error("quest '{0}' is not registered")]
    UnknownQuest(QuestId),

    /// The participant has no quest in progress.
    #[error("participant {0} has no active quest")]
    NoActiveSession(ParticipantId),

    /// A persisted stage is missing its question text or accepted answers.
    #[error("malformed stage record {quest_id}/{stage_id}: {reason}")]
    MalformedStageRecord {
        /// Quest the stage belongs to.
        quest_id: String,
        /// Stage key component as found in the store.
        stage_id: String,
        /// What was wrong with the record.
        reason: String,
    },

    /// The persistence backend could not be reached or failed a request.
    #[error("storage backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Invalid input to a domain constructor or write path.
    #[error("validation error: {0}")]
    Validation(String),
}

impl DomainError {
    /// Shorthand for a [`DomainError::MalformedStageRecord`].
    pub fn malformed(
        quest_id: impl Into<String>,
        stage_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedStageRecord {
            quest_id: quest_id.into(),
            stage_id: stage_id.into(),
            reason: reason.into(),
        }
    }
}
