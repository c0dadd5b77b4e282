//! Quest catalog.

use std::collections::HashMap;
use std::sync::Arc;

use questline_core::ids::QuestId;
use questline_core::quest::Quest;

/// Mapping from quest identifier to a shared, immutable quest.
#[derive(Debug, Clone, Default)]
pub struct QuestCatalog {
    quests: HashMap<QuestId, Arc<Quest>>,
}

impl QuestCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from `(id, quest)` pairs. Later duplicates win.
    pub fn from_quests<I>(quests: I) -> Self
    where
        I: IntoIterator<Item = (QuestId, Quest)>,
    {
        let mut catalog = Self::new();
        for (id, quest) in quests {
            catalog.insert(id, quest);
        }
        catalog
    }

    /// Inserts or replaces a quest, returning the previous definition.
    pub fn insert(&mut self, quest_id: QuestId, quest: impl Into<Arc<Quest>>) -> Option<Arc<Quest>> {
        self.quests.insert(quest_id, quest.into())
    }

    /// Shared handle to a quest.
    #[must_use]
    pub fn get(&self, quest_id: &QuestId) -> Option<Arc<Quest>> {
        self.quests.get(quest_id).cloned()
    }

    /// All quest ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<QuestId> {
        let mut ids: Vec<QuestId> = self.quests.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of quests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
