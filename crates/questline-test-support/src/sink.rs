//! Test sink — records lifecycle events instead of aggregating them.

use std::sync::Mutex;

use questline_core::event::{LifecycleEvent, LifecycleKind, LifecycleSink};

/// A lifecycle sink that keeps every emitted event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the kinds of all recorded events, in emission order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn kinds(&self) -> Vec<LifecycleKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl LifecycleSink for RecordingSink {
    fn emit(&self, event: LifecycleEvent) {
        self.events.lock().unwrap().push(event);
    }
}
