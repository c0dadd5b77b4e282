//! Catalog, session state machine and outcome types.

pub mod catalog;
pub mod outcomes;
pub mod session;
