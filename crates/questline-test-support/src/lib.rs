//! Shared test mocks and utilities for the Questline quiz engine.

mod clock;
mod notify;
mod sink;
mod store;

pub use clock::{FixedClock, SteppingClock};
pub use notify::{RecordingNotifier, StaticNames};
pub use sink::RecordingSink;
pub use store::{FailingKeyValueStore, FlakyKeyValueStore, MemoryKeyValueStore};
