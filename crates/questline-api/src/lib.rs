//! Questline — HTTP chat adapter.
//!
//! Exposes the session engine, quest uploads and admin notifications over
//! axum, and renders engine outcomes as reply text.

pub mod command;
pub mod config;
pub mod directory;
pub mod error;
pub mod outbox;
pub mod render;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the full route tree over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest(
            "/api/v1",
            Router::new()
                .merge(routes::messages::router())
                .merge(routes::participants::router())
                .merge(routes::quests::router())
                .merge(routes::notifications::router()),
        )
        .with_state(state)
}
