//! Statistics model and report formatting.

pub mod error;
pub mod report;
pub mod stats;
