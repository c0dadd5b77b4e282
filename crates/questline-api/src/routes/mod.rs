//! Route modules.

pub mod health;
pub mod messages;
pub mod notifications;
pub mod participants;
pub mod quests;
