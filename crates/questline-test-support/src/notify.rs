//! Test notifier and name directory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use questline_core::error::DomainError;
use questline_core::ids::ParticipantId;
use questline_core::notify::{NameDirectory, Notifier};

/// A notifier that records every `(recipient, message)` pair.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(ParticipantId, String)>>,
}

impl RecordingNotifier {
    /// Creates an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all sent messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<(ParticipantId, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages sent to a single recipient, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent_to(&self, recipient: ParticipantId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == recipient)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: ParticipantId, message: &str) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push((recipient, message.to_owned()));
        Ok(())
    }
}

/// A name directory with a fixed set of entries.
#[derive(Debug, Default, Clone)]
pub struct StaticNames(pub HashMap<ParticipantId, String>);

impl StaticNames {
    /// Builds a directory from `(id, name)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(i64, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(id, name)| (ParticipantId(*id), (*name).to_owned()))
                .collect(),
        )
    }
}

impl NameDirectory for StaticNames {
    fn display_name(&self, participant: ParticipantId) -> Option<String> {
        self.0.get(&participant).cloned()
    }
}
