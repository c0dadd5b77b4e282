//! Structured results of engine operations.
//!
//! The engine never renders text; transports turn these into replies.

use std::sync::Arc;

use questline_core::ids::QuestId;
use questline_core::quest::Quest;

/// Result of a successful `start_quest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A session is open at the first stage.
    Started,
    /// The quest has no stages and was finished immediately.
    Finished,
}

/// Result of `check_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The participant has no quest in progress.
    Inactive,
    /// The answer did not match the current stage.
    Incorrect,
    /// The answer matched; `finished` is set when it was the last stage.
    Correct {
        /// Whether the quest is now complete.
        finished: bool,
    },
}

impl AnswerOutcome {
    /// Whether the participant had a quest in progress.
    #[must_use]
    pub fn active(self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Whether the answer was accepted.
    #[must_use]
    pub fn correct(self) -> bool {
        matches!(self, Self::Correct { .. })
    }

    /// Whether the answer completed the quest.
    #[must_use]
    pub fn finished(self) -> bool {
        matches!(self, Self::Correct { finished: true })
    }
}

/// The question a participant currently has to answer.
#[derive(Debug, Clone)]
pub struct QuestionView {
    quest_id: QuestId,
    quest: Arc<Quest>,
    stage_index: usize,
}

impl QuestionView {
    pub(crate) fn new(quest_id: QuestId, quest: Arc<Quest>, stage_index: usize) -> Self {
        Self {
            quest_id,
            quest,
            stage_index,
        }
    }

    /// Quest being played.
    #[must_use]
    pub fn quest_id(&self) -> &QuestId {
        &self.quest_id
    }

    /// Question text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.quest.stages()[self.stage_index].question()
    }

    /// Media attached to the question.
    #[must_use]
    pub fn media(&self) -> Option<&[u8]> {
        self.quest.stages()[self.stage_index].media()
    }

    /// One-based stage number.
    #[must_use]
    pub fn stage_number(&self) -> usize {
        self.stage_index + 1
    }

    /// Total number of stages in the quest.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.quest.stage_count()
    }
}

/// Result of `current_question`.
#[derive(Debug, Clone)]
pub enum CurrentQuestion {
    /// The participant is idle.
    NoActiveQuest,
    /// The participant is in progress.
    Question(QuestionView),
}

/// Where a participant stands in their quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Quest being played.
    pub quest_id: QuestId,
    /// Zero-based index of the current stage.
    pub stage_index: usize,
    /// Total number of stages.
    pub stage_count: usize,
}

#[cfg(test)]
mod tests {
    use super::AnswerOutcome;

    #[test]
    fn test_answer_outcome_flags() {
        let cases = [
            (AnswerOutcome::Inactive, (false, false, false)),
            (AnswerOutcome::Incorrect, (true, false, false)),
            (AnswerOutcome::Correct { finished: false }, (true, true, false)),
            (AnswerOutcome::Correct { finished: true }, (true, true, true)),
        ];

        for (outcome, (active, correct, finished)) in cases {
            assert_eq!(outcome.active(), active, "{outcome:?}");
            assert_eq!(outcome.correct(), correct, "{outcome:?}");
            assert_eq!(outcome.finished(), finished, "{outcome:?}");
        }
    }
}
