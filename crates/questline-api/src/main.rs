//! Questline API server entry point.

use std::error::Error;
use std::sync::Arc;

use questline_api::config::AppConfig;
use questline_api::state::AppState;
use questline_core::clock::SystemClock;
use questline_store::{QuestStorage, SqliteKeyValueStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Questline API server");

    let config = AppConfig::from_env()?;

    // Open the quest store and load the catalog.
    let store = SqliteKeyValueStore::connect(&config.database_url).await?;
    let storage = QuestStorage::new(Arc::new(store));
    let app_state = AppState::bootstrap(storage, config.admins.clone(), Arc::new(SystemClock)).await?;

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = questline_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.listen_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
