//! Outbound notifications for administrative recipients.
//!
//! The stats aggregator delivers into per-recipient queues which the
//! notifications endpoint drains.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use questline_core::ids::ParticipantId;
use questline_core::notify::Notifier;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// A message waiting to be picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Unique id of this notification.
    pub id: Uuid,
    /// Formatted text.
    pub message: String,
    /// When the message was queued.
    pub queued_at: DateTime<Utc>,
}

/// In-memory per-recipient message queues.
#[derive(Debug, Default)]
pub struct Outbox {
    queues: Mutex<HashMap<ParticipantId, Vec<Notification>>>,
}

impl Outbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything queued for `recipient`, oldest first.
    pub fn drain(&self, recipient: ParticipantId) -> Vec<Notification> {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&recipient)
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn notify(&self, recipient: ParticipantId, message: &str) -> Result<(), DomainError> {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.to_owned(),
            queued_at: Utc::now(),
        };
        debug!(recipient = %recipient, notification_id = %notification.id, "notification queued");
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(recipient)
            .or_default()
            .push(notification);
        Ok(())
    }
}
