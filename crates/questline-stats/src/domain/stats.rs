//! Per-quest, per-participant statistics.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use questline_core::event::{LifecycleEvent, LifecycleKind};
use questline_core::ids::{ParticipantId, QuestId};

/// What is known about one participant's run through one quest.
///
/// Each field is updated by exactly one event class, so the result does not
/// depend on the order in which different classes arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestStats {
    /// Time of the most recent start.
    pub started: Option<DateTime<Utc>>,
    /// Time of the most recent finish.
    pub finished: Option<DateTime<Utc>>,
    /// Times of every correct answer, in arrival order.
    pub answered_times: Vec<DateTime<Utc>>,
    /// Number of wrong answers.
    pub incorrect_answers: u32,
}

impl QuestStats {
    /// Time between start and finish, when both are known and ordered.
    ///
    /// A participant who restarted after finishing has a start later than
    /// the finish and therefore no duration.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        let (started, finished) = (self.started?, self.finished?);
        (finished >= started).then(|| finished - started)
    }
}

/// Statistics for every quest seen so far.
#[derive(Debug, Default)]
pub struct StatsTable {
    quests: HashMap<QuestId, BTreeMap<ParticipantId, QuestStats>>,
}

impl StatsTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the table and returns the updated entry.
    pub fn apply(&mut self, event: &LifecycleEvent) -> &QuestStats {
        let stats = self
            .quests
            .entry(event.quest_id.clone())
            .or_default()
            .entry(event.participant_id)
            .or_default();
        match event.kind {
            LifecycleKind::Started => stats.started = Some(event.occurred_at),
            LifecycleKind::Finished => stats.finished = Some(event.occurred_at),
            LifecycleKind::AnsweredCorrectly => stats.answered_times.push(event.occurred_at),
            LifecycleKind::AnsweredIncorrectly => {
                stats.incorrect_answers = stats.incorrect_answers.saturating_add(1);
            }
        }
        stats
    }

    /// Statistics for one quest, keyed by participant.
    #[must_use]
    pub fn quest(&self, quest_id: &QuestId) -> Option<&BTreeMap<ParticipantId, QuestStats>> {
        self.quests.get(quest_id)
    }
}
