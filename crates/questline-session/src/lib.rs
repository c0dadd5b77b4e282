//! Questline — session engine.
//!
//! Owns the quest catalog and the table of in-progress sessions, and turns
//! participant commands into structured outcomes plus lifecycle events.

pub mod application;
pub mod domain;

pub use application::engine::SessionEngine;
pub use domain::catalog::QuestCatalog;
pub use domain::outcomes::{AnswerOutcome, CurrentQuestion, Progress, QuestionView, StartOutcome};
