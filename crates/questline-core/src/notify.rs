//! Outbound seams of the stats aggregator.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::ids::ParticipantId;

/// Delivers formatted text to an administrative recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `message` to `recipient`.
    async fn notify(&self, recipient: ParticipantId, message: &str) -> Result<(), DomainError>;
}

/// Best-effort lookup of participant display names.
pub trait NameDirectory: Send + Sync {
    /// Returns the display name of `participant`, if known.
    fn display_name(&self, participant: ParticipantId) -> Option<String>;
}

/// Resolves a display name, falling back to the numeric id.
#[must_use]
pub fn display_name_or_id(names: &dyn NameDirectory, participant: ParticipantId) -> String {
    names
        .display_name(participant)
        .unwrap_or_else(|| participant.to_string())
}
