//! The aggregator actor and its handle.

pub mod aggregator;
