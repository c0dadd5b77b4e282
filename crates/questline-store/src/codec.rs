//! Quest persistence codec.
//!
//! Writes quest records stage by stage and rebuilds them through a prefix
//! scan of the quest namespace followed by a nested scan per quest.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use questline_core::error::DomainError;
use questline_core::ids::{QuestId, StageId};
use questline_core::quest::Stage;
use questline_core::store::KeyValueStore;
use tracing::{debug, info, warn};

use crate::keys;
use crate::record::{QuestRecord, StageRecord};

/// Reads and writes quest definitions against a [`KeyValueStore`].
#[derive(Clone)]
pub struct QuestStorage {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for QuestStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestStorage").finish_non_exhaustive()
    }
}

impl QuestStorage {
    /// Creates a codec over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Writes every stage of `record`, in order.
    ///
    /// The record is validated before the first write. There is no rollback:
    /// if the backend fails part-way, stages written before the failure stay
    /// in place and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for duplicate stage ids and
    /// `DomainError::BackendUnavailable` if a write fails.
    pub async fn store_quest(&self, record: &QuestRecord) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for stage in &record.stages {
            if !seen.insert(&stage.stage_id) {
                return Err(DomainError::Validation(format!(
                    "quest '{}' has duplicate stage id '{}'",
                    record.quest_id, stage.stage_id
                )));
            }
        }

        for stage in &record.stages {
            self.store_stage(&record.quest_id, stage).await?;
        }

        info!(
            quest_id = %record.quest_id,
            stages = record.stages.len(),
            "quest stored"
        );
        Ok(())
    }

    /// Writes a single stage. Rewriting an existing stage replaces it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BackendUnavailable` if a write fails.
    pub async fn store_stage(
        &self,
        quest_id: &QuestId,
        record: &StageRecord,
    ) -> Result<(), DomainError> {
        let question_key = keys::question_key(quest_id, &record.stage_id);
        self.store
            .set_field(
                &question_key,
                keys::TEXT_FIELD,
                record.stage.question().as_bytes(),
            )
            .await?;

        match record.stage.media() {
            Some(media) => {
                self.store
                    .set_field(&question_key, keys::MEDIA_FIELD, media)
                    .await?;
            }
            None => {
                self.store
                    .remove_field(&question_key, keys::MEDIA_FIELD)
                    .await?;
            }
        }

        let answers: Vec<String> = record.stage.answers().iter().cloned().collect();
        self.store
            .replace_list(&keys::answers_key(quest_id, &record.stage_id), &answers)
            .await?;

        debug!(quest_id = %quest_id, stage_id = %record.stage_id, "stage stored");
        Ok(())
    }

    /// Loads every quest in the namespace.
    ///
    /// Failure isolation is per quest: a quest that cannot be loaded is
    /// skipped with a warning and the remaining quests are still returned.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BackendUnavailable` if the namespace scan itself
    /// fails.
    pub async fn load_all(&self) -> Result<Vec<QuestRecord>, DomainError> {
        let quest_keys = self.store.scan_prefix(&keys::all_quests_prefix()).await?;

        let unique_ids: BTreeSet<&str> = quest_keys
            .iter()
            .filter_map(|key| keys::quest_component(key))
            .collect();

        let mut records = Vec::with_capacity(unique_ids.len());
        for raw_id in unique_ids {
            let quest_id = match QuestId::parse(raw_id) {
                Ok(id) => id,
                Err(e) => {
                    warn!(quest_id = raw_id, error = %e, "skipping quest with invalid id");
                    continue;
                }
            };
            match self.load_quest(&quest_id).await {
                Ok(record) => {
                    info!(
                        quest_id = %record.quest_id,
                        stages = record.stages.len(),
                        "quest loaded"
                    );
                    records.push(record);
                }
                Err(e) => {
                    warn!(quest_id = %quest_id, error = %e, "unable to load quest");
                }
            }
        }
        Ok(records)
    }

    /// Loads one quest, ordering its stages by stage id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownQuest` if no key exists for the quest,
    /// the first stage error (`MalformedStageRecord`) if any stage is
    /// incomplete, or `BackendUnavailable` on backend failure.
    pub async fn load_quest(&self, quest_id: &QuestId) -> Result<QuestRecord, DomainError> {
        let prefix = keys::quest_prefix(quest_id);
        let quest_keys = self.store.scan_prefix(&prefix).await?;
        if quest_keys.is_empty() {
            return Err(DomainError::UnknownQuest(quest_id.clone()));
        }

        let mut stage_ids = BTreeSet::new();
        for key in &quest_keys {
            match keys::stage_component(key, &prefix) {
                Some(raw) => {
                    let stage_id = StageId::parse(raw).map_err(|e| {
                        DomainError::malformed(quest_id.as_str(), raw, e.to_string())
                    })?;
                    stage_ids.insert(stage_id);
                }
                None => debug!(quest_id = %quest_id, key = %key, "ignoring unrecognized key"),
            }
        }

        let mut stages = Vec::with_capacity(stage_ids.len());
        for stage_id in stage_ids {
            let stage = self.load_stage(quest_id, &stage_id).await.inspect_err(|e| {
                warn!(quest_id = %quest_id, stage_id = %stage_id, error = %e, "unable to load stage");
            })?;
            stages.push(StageRecord { stage_id, stage });
        }

        Ok(QuestRecord {
            quest_id: quest_id.clone(),
            stages,
        })
    }

    /// Loads one stage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedStageRecord` if the question text is
    /// missing, blank or not UTF-8, or if the answer list is empty, and
    /// `BackendUnavailable` on backend failure.
    pub async fn load_stage(
        &self,
        quest_id: &QuestId,
        stage_id: &StageId,
    ) -> Result<Stage, DomainError> {
        let malformed =
            |reason: &str| DomainError::malformed(quest_id.as_str(), stage_id.as_str(), reason);

        let mut fields = self
            .store
            .fields(&keys::question_key(quest_id, stage_id))
            .await?;

        let text = fields
            .remove(keys::TEXT_FIELD)
            .ok_or_else(|| malformed("missing question text"))?;
        let text = String::from_utf8(text).map_err(|_| malformed("question text is not UTF-8"))?;
        if text.trim().is_empty() {
            return Err(malformed("empty question text"));
        }

        let answers = self
            .store
            .list(&keys::answers_key(quest_id, stage_id))
            .await?;
        if answers.is_empty() {
            return Err(malformed("empty list of answers"));
        }

        let stage = Stage::new(text, &answers).map_err(|e| malformed(&e.to_string()))?;
        Ok(match fields.remove(keys::MEDIA_FIELD) {
            Some(media) => stage.with_media(media),
            None => stage,
        })
    }

    /// Removes every key of a quest. Returns the number of keys removed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::BackendUnavailable` on backend failure.
    pub async fn delete_quest(&self, quest_id: &QuestId) -> Result<usize, DomainError> {
        let quest_keys = self.store.scan_prefix(&keys::quest_prefix(quest_id)).await?;
        let mut removed = 0;
        for key in &quest_keys {
            if self.store.delete(key).await? {
                removed += 1;
            }
        }
        info!(quest_id = %quest_id, removed, "quest deleted");
        Ok(removed)
    }
}
