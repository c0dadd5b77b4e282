//! Questline — stats bounded context.
//!
//! Consumes lifecycle events from the session engine, keeps per-quest,
//! per-participant statistics and sends notices and reports to the
//! administrative recipients.

pub mod application;
pub mod domain;

pub use application::aggregator::{StatsAggregator, StatsHandle};
pub use domain::error::StatsError;
pub use domain::stats::{QuestStats, StatsTable};
