//! Lifecycle events emitted by the session engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ParticipantId, QuestId};

/// The four classes of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleKind {
    /// A participant started a quest.
    Started,
    /// A participant answered the last stage correctly.
    Finished,
    /// A participant answered a stage correctly.
    AnsweredCorrectly,
    /// A participant gave a wrong answer.
    AnsweredIncorrectly,
}

impl LifecycleKind {
    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "quest.started",
            Self::Finished => "quest.finished",
            Self::AnsweredCorrectly => "quest.answered_correctly",
            Self::AnsweredIncorrectly => "quest.answered_incorrectly",
        }
    }
}

/// A single lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    /// Event class.
    pub kind: LifecycleKind,
    /// Quest the event refers to.
    pub quest_id: QuestId,
    /// Participant the event refers to.
    pub participant_id: ParticipantId,
    /// Wall-clock time at emission.
    pub occurred_at: DateTime<Utc>,
}

impl LifecycleEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(
        kind: LifecycleKind,
        quest_id: QuestId,
        participant_id: ParticipantId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            quest_id,
            participant_id,
            occurred_at,
        }
    }
}

/// Receiver of lifecycle events.
///
/// `emit` must not block: the engine calls it on the request path.
pub trait LifecycleSink: Send + Sync {
    /// Hands an event off for asynchronous processing.
    fn emit(&self, event: LifecycleEvent);
}
