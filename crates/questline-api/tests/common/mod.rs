//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use questline_core::clock::Clock;
use questline_core::ids::{ParticipantId, QuestId};
use questline_core::quest::{Quest, Stage};
use questline_core::store::KeyValueStore;
use questline_store::{QuestRecord, QuestStorage};
use questline_test_support::{MemoryKeyValueStore, SteppingClock};
use tower::ServiceExt;

use questline_api::state::AppState;

/// Admin configured for every test app.
pub const ADMIN: ParticipantId = ParticipantId(900);

/// Clock starting at a fixed instant and advancing a minute per reading.
fn stepping_clock() -> Arc<dyn Clock> {
    Arc::new(SteppingClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        chrono::Duration::minutes(1),
    ))
}

/// Two-stage geography quest; the second stage carries media.
pub fn geo_quest() -> Quest {
    Quest::new(vec![
        Stage::new("Capital of France?", ["Paris"]).unwrap(),
        Stage::new("Capital of Japan?", ["Tokyo", "Токио"])
            .unwrap()
            .with_media(vec![0x89, 0x50, 0x4E, 0x47]),
    ])
}

/// Bootstraps state over `store` after seeding it with `quests`.
pub async fn build_state_with(store: Arc<dyn KeyValueStore>, quests: Vec<(&str, Quest)>) -> AppState {
    let storage = QuestStorage::new(store);
    for (id, quest) in quests {
        let record = QuestRecord::from_quest(QuestId::parse(id).unwrap(), &quest);
        storage.store_quest(&record).await.unwrap();
    }
    AppState::bootstrap(storage, vec![ADMIN], stepping_clock())
        .await
        .unwrap()
}

/// Bootstraps state over an in-memory store holding the geo quest.
pub async fn build_state() -> AppState {
    build_state_with(Arc::new(MemoryKeyValueStore::new()), vec![("geo", geo_quest())]).await
}

/// Full app router, same route structure as `main.rs`.
pub fn build_app(state: &AppState) -> Router {
    questline_api::app(state.clone())
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the raw response body.
pub async fn get_bytes(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, body_bytes)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body_bytes) = get_bytes(app, uri).await;
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Post a chat message from `participant`.
pub async fn say(state: &AppState, participant: i64, text: &str) -> (StatusCode, serde_json::Value) {
    post_json(
        build_app(state),
        "/api/v1/messages",
        &serde_json::json!({ "participant_id": participant, "text": text }),
    )
    .await
}

/// Drain `recipient`'s notifications until `count` have arrived.
pub async fn wait_for_notifications(state: &AppState, recipient: ParticipantId, count: usize) -> Vec<String> {
    let mut messages = Vec::new();
    for _ in 0..200 {
        let (status, json) =
            get_json(build_app(state), &format!("/api/v1/notifications/{}", recipient.0)).await;
        assert_eq!(status, StatusCode::OK);
        messages.extend(
            json["notifications"]
                .as_array()
                .unwrap()
                .iter()
                .map(|n| n["message"].as_str().unwrap().to_owned()),
        );
        if messages.len() >= count {
            return messages;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {count} notifications, got {messages:?}");
}
