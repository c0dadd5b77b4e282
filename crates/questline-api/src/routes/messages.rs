//! Chat message endpoint: every participant interaction enters here.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use questline_core::error::DomainError;
use questline_core::ids::{ParticipantId, QuestId};
use questline_session::{AnswerOutcome, CurrentQuestion, StartOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::command::ChatCommand;
use crate::error::ApiError;
use crate::render;
use crate::state::AppState;

/// Request body for POST /messages.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Sender of the message.
    pub participant_id: ParticipantId,
    /// Sender's username, remembered for reports.
    #[serde(default)]
    pub username: Option<String>,
    /// Raw message text.
    pub text: String,
}

/// Response body for POST /messages.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Text to show the participant.
    pub reply: String,
    /// Whether the current question has media, fetched separately.
    pub has_media: bool,
    /// Machine-readable tag describing what happened.
    pub outcome: &'static str,
}

impl MessageResponse {
    fn text(outcome: &'static str, reply: String) -> Self {
        Self {
            reply,
            has_media: false,
            outcome,
        }
    }

    fn with_question(outcome: &'static str, reply: String, current: &CurrentQuestion) -> Self {
        let has_media = matches!(current, CurrentQuestion::Question(view) if view.media().is_some());
        Self {
            reply,
            has_media,
            outcome,
        }
    }
}

/// POST /messages
#[instrument(skip(state, request), fields(participant_id = %request.participant_id))]
async fn handle_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let correlation_id = Uuid::new_v4();
    let participant = request.participant_id;
    if let Some(username) = &request.username {
        state.directory.record(participant, username);
    }

    let response = match ChatCommand::parse(&request.text) {
        ChatCommand::Start(Some(quest)) => {
            info!(correlation_id = %correlation_id, quest = %quest, "handling start command");
            start(&state, participant, &quest)
        }
        ChatCommand::Start(None) => MessageResponse::text("usage", render::usage("start")),
        ChatCommand::Question => {
            info!(correlation_id = %correlation_id, "handling question command");
            let current = state.engine.current_question(participant);
            let outcome = match current {
                CurrentQuestion::Question(_) => "question",
                CurrentQuestion::NoActiveQuest => "no_active_quest",
            };
            MessageResponse::with_question(outcome, render::current_question(&current), &current)
        }
        ChatCommand::Stats(quest) => {
            info!(correlation_id = %correlation_id, "handling stats command");
            if !state.is_admin(participant) {
                return Err(ApiError::Forbidden(participant));
            }
            let Some(quest) = quest else {
                return Ok(Json(MessageResponse::text("usage", render::usage("stats"))));
            };
            let quest_id = QuestId::parse(quest.as_str())?;
            state.stats.send_report(quest_id)?;
            MessageResponse::text("stats_requested", render::stats_requested(&quest))
        }
        ChatCommand::Quests => {
            MessageResponse::text("quests", render::quest_list(&state.engine.quest_ids()))
        }
        ChatCommand::Answer(text) => {
            info!(correlation_id = %correlation_id, "handling answer");
            let (outcome, next) = state.engine.check_answer_with_next(participant, &text);
            let tag = match outcome {
                AnswerOutcome::Inactive => "no_active_quest",
                AnswerOutcome::Incorrect => "incorrect",
                AnswerOutcome::Correct { finished: false } => "correct",
                AnswerOutcome::Correct { finished: true } => "finished",
            };
            let reply = render::answer(outcome, &next);
            if outcome.correct() && !outcome.finished() {
                MessageResponse::with_question(tag, reply, &next)
            } else {
                MessageResponse::text(tag, reply)
            }
        }
    };

    Ok(Json(response))
}

fn start(state: &AppState, participant: ParticipantId, quest: &str) -> MessageResponse {
    let started = QuestId::parse(quest)
        .and_then(|quest_id| state.engine.start_quest(participant, &quest_id).map(|o| (quest_id, o)));
    match started {
        Ok((_, StartOutcome::Started)) => {
            let current = state.engine.current_question(participant);
            MessageResponse::with_question("started", render::current_question(&current), &current)
        }
        Ok((quest_id, StartOutcome::Finished)) => {
            MessageResponse::text("finished", render::finished_on_start(&quest_id))
        }
        Err(DomainError::UnknownQuest(_) | DomainError::Validation(_)) => {
            MessageResponse::text("unknown_quest", render::unknown_quest(quest))
        }
        Err(other) => MessageResponse::text("error", other.to_string()),
    }
}

/// Returns the router for chat messages.
pub fn router() -> Router<AppState> {
    Router::new().route("/messages", post(handle_message))
}
