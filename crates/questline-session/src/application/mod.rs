//! Concurrent engine wrapping the domain types.

pub mod engine;
