//! Questline Core — shared domain abstractions.
//!
//! This crate defines the quest model, identifiers, the error taxonomy and
//! the seam traits (storage backend, lifecycle sink, notifications) that the
//! other crates depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod ids;
pub mod notify;
pub mod quest;
pub mod store;
