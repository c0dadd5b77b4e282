//! Participant display names learned from incoming messages.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use questline_core::ids::ParticipantId;
use questline_core::notify::NameDirectory;

/// Last known username per participant.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: RwLock<HashMap<ParticipantId, String>>,
}

impl NameRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers `username` for `participant`. Blank names are ignored.
    pub fn record(&self, participant: ParticipantId, username: &str) {
        let username = username.trim();
        if username.is_empty() {
            return;
        }
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(participant, username.to_owned());
    }
}

impl NameDirectory for NameRegistry {
    fn display_name(&self, participant: ParticipantId) -> Option<String> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&participant)
            .cloned()
    }
}
