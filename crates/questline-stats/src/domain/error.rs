//! Stats error types.

use thiserror::Error;

/// Errors raised by the stats aggregator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    /// The aggregator needs at least one recipient for its reports.
    #[error("stats aggregator requires at least one recipient")]
    NoRecipients,

    /// The aggregator loop is no longer running.
    #[error("stats aggregator has stopped")]
    Stopped,
}
