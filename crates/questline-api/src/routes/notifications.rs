//! Admin notification pickup.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use questline_core::ids::ParticipantId;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::outbox::Notification;
use crate::state::AppState;

/// Response body for GET /notifications/{recipient}.
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    /// Recipient the notifications were queued for.
    pub recipient: ParticipantId,
    /// Drained notifications, oldest first.
    pub notifications: Vec<Notification>,
}

/// GET /notifications/{recipient}
#[instrument(skip(state))]
async fn drain_notifications(
    State(state): State<AppState>,
    Path(recipient): Path<i64>,
) -> Json<NotificationsResponse> {
    let recipient = ParticipantId(recipient);
    let notifications = state.outbox.drain(recipient);
    debug!(count = notifications.len(), "notifications drained");
    Json(NotificationsResponse {
        recipient,
        notifications,
    })
}

/// Returns the router for notification pickup.
pub fn router() -> Router<AppState> {
    Router::new().route("/notifications/{recipient}", get(drain_notifications))
}
