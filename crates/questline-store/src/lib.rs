//! Questline persistence.
//!
//! Maps quest definitions onto a flat key-value store and back, and provides
//! a SQLite implementation of that store.

pub mod codec;
pub mod keys;
pub mod record;
pub mod schema;
pub mod sqlite;

pub use codec::QuestStorage;
pub use record::{QuestRecord, StageRecord};
pub use sqlite::SqliteKeyValueStore;
