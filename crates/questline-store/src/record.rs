//! Persistence records: a quest together with its stage ordering keys.

use questline_core::ids::{QuestId, StageId};
use questline_core::quest::{Quest, Stage};

/// A stage and the key that orders it within its quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    /// Ordering key.
    pub stage_id: StageId,
    /// Stage content.
    pub stage: Stage,
}

/// A quest as stored: identifier plus stage records in play order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestRecord {
    /// Quest identifier.
    pub quest_id: QuestId,
    /// Stage records in play order.
    pub stages: Vec<StageRecord>,
}

impl QuestRecord {
    /// Builds a record from an in-memory quest, generating index-based stage
    /// ids so the stored order matches play order.
    #[must_use]
    pub fn from_quest(quest_id: QuestId, quest: &Quest) -> Self {
        let stages = quest
            .stages()
            .iter()
            .enumerate()
            .map(|(index, stage)| StageRecord {
                stage_id: StageId::from_index(index),
                stage: stage.clone(),
            })
            .collect();
        Self { quest_id, stages }
    }

    /// Converts the record into a playable quest, keeping record order.
    #[must_use]
    pub fn to_quest(&self) -> Quest {
        Quest::new(self.stages.iter().map(|r| r.stage.clone()).collect())
    }
}
