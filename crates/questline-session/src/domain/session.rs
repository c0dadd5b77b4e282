//! Per-participant session state machine.
//!
//! A participant is either idle (no session) or in progress at some stage
//! index. Transitions are pure; the engine decides where the result lives.

use std::sync::Arc;

use questline_core::ids::QuestId;
use questline_core::quest::{Quest, Stage};

/// Progress of one participant through one quest.
///
/// Invariant: `stage_index < quest.stage_count()`. A session that would move
/// past the last stage is finished and no longer exists.
#[derive(Debug, Clone)]
pub struct Session {
    quest_id: QuestId,
    quest: Arc<Quest>,
    stage_index: usize,
}

/// Result of applying an answer to a session.
#[derive(Debug, Clone)]
pub enum Advance {
    /// The answer did not match; the session is unchanged.
    Incorrect,
    /// The answer matched and the next stage is now current.
    Advanced(Session),
    /// The answer matched the last stage.
    Finished,
}

impl Session {
    /// Opens a session at the first stage.
    ///
    /// Returns `None` for a quest without stages, which is finished on start.
    #[must_use]
    pub fn start(quest_id: QuestId, quest: Arc<Quest>) -> Option<Self> {
        if quest.is_degenerate() {
            return None;
        }
        Some(Self {
            quest_id,
            quest,
            stage_index: 0,
        })
    }

    /// Checks `answer` against the current stage.
    #[must_use]
    pub fn answer(&self, answer: &str) -> Advance {
        if !self.current_stage().accepts(answer) {
            return Advance::Incorrect;
        }
        let next = self.stage_index + 1;
        if next >= self.quest.stage_count() {
            Advance::Finished
        } else {
            Advance::Advanced(Self {
                quest_id: self.quest_id.clone(),
                quest: Arc::clone(&self.quest),
                stage_index: next,
            })
        }
    }

    /// The stage the participant has to answer.
    #[must_use]
    pub fn current_stage(&self) -> &Stage {
        &self.quest.stages()[self.stage_index]
    }

    /// Quest being played.
    #[must_use]
    pub fn quest_id(&self) -> &QuestId {
        &self.quest_id
    }

    /// Shared quest definition this session was started with.
    #[must_use]
    pub fn quest(&self) -> &Arc<Quest> {
        &self.quest
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn stage_index(&self) -> usize {
        self.stage_index
    }
}
