//! Shared application state.

use std::collections::BTreeSet;
use std::sync::Arc;

use questline_core::clock::Clock;
use questline_core::ids::ParticipantId;
use questline_session::{QuestCatalog, SessionEngine};
use questline_stats::{StatsAggregator, StatsHandle};
use questline_store::QuestStorage;
use tracing::info;

use crate::directory::NameRegistry;
use crate::error::AppError;
use crate::outbox::Outbox;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session engine holding the catalog and active sessions.
    pub engine: Arc<SessionEngine>,
    /// Handle to the stats aggregator.
    pub stats: StatsHandle,
    /// Quest persistence codec.
    pub storage: QuestStorage,
    /// Display names learned from messages.
    pub directory: Arc<NameRegistry>,
    /// Queued notifications for admins.
    pub outbox: Arc<Outbox>,
    /// Participants allowed to request stats.
    pub admins: Arc<BTreeSet<ParticipantId>>,
}

impl AppState {
    /// Loads every quest from `storage`, starts the stats aggregator and
    /// wires the engine to it.
    ///
    /// Quests that fail to load are skipped by the codec.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the catalog scan fails and
    /// `AppError::Stats` if `admins` is empty.
    pub async fn bootstrap(
        storage: QuestStorage,
        admins: Vec<ParticipantId>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let records = storage.load_all().await?;
        let catalog = QuestCatalog::from_quests(
            records
                .into_iter()
                .map(|record| {
                    let quest = record.to_quest();
                    (record.quest_id, quest)
                }),
        );
        info!(quests = catalog.len(), "quest catalog loaded");

        let outbox = Arc::new(Outbox::new());
        let directory = Arc::new(NameRegistry::new());
        let (stats, _task) =
            StatsAggregator::spawn(admins.clone(), outbox.clone(), directory.clone())?;

        let engine = SessionEngine::new(catalog, clock, Arc::new(stats.clone()));

        Ok(Self {
            engine: Arc::new(engine),
            stats,
            storage,
            directory,
            outbox,
            admins: Arc::new(admins.into_iter().collect()),
        })
    }

    /// Whether `participant` may run admin commands.
    #[must_use]
    pub fn is_admin(&self, participant: ParticipantId) -> bool {
        self.admins.contains(&participant)
    }
}
