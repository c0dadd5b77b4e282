//! Identifier newtypes.
//!
//! Quest and stage identifiers end up as components of storage keys, so they
//! are validated once at construction: non-empty, no whitespace and no
//! [`KEY_SEPARATOR`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Separator between storage key components.
pub const KEY_SEPARATOR: char = ':';

/// Timestamp layout of upload-generated stage ids.
pub const STAGE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%.3f";

/// Numeric chat participant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::Validation(format!("invalid participant id '{s}': {e}")))
    }
}

fn validate_component(kind: &str, raw: &str) -> Result<(), DomainError> {
    if raw.is_empty() {
        return Err(DomainError::Validation(format!("{kind} id must not be empty")));
    }
    if let Some(bad) = raw
        .chars()
        .find(|c| *c == KEY_SEPARATOR || c.is_whitespace())
    {
        return Err(DomainError::Validation(format!(
            "{kind} id '{raw}' contains forbidden character {bad:?}"
        )));
    }
    Ok(())
}

/// Identifier of a quest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuestId(String);

impl QuestId {
    /// Validates and wraps a quest identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the identifier is empty or
    /// contains whitespace or the key separator.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        validate_component("quest", &raw)?;
        Ok(Self(raw))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for QuestId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<QuestId> for String {
    fn from(value: QuestId) -> Self {
        value.0
    }
}

impl FromStr for QuestId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Ordering key of a stage inside a persisted quest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StageId(String);

impl StageId {
    /// Validates and wraps a stage identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` under the same rules as
    /// [`QuestId::parse`].
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        validate_component("stage", &raw)?;
        Ok(Self(raw))
    }

    /// Stage id derived from a position, zero-padded to the width of
    /// `usize::MAX` so lexical order matches numeric order for any index.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("{index:020}"))
    }

    /// Stage id for a stage appended at `at`; `index` orders stages uploaded
    /// together. Sorts after every index-based id and after earlier uploads.
    #[must_use]
    pub fn timestamped(at: DateTime<Utc>, index: usize) -> Self {
        Self(format!("{}.{index:04}", at.format(STAGE_TIMESTAMP_FORMAT)))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StageId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StageId> for String {
    fn from(value: StageId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quest_id_rejects_separator_and_whitespace() {
        assert!(QuestId::parse("geo").is_ok());
        assert!(matches!(QuestId::parse(""), Err(DomainError::Validation(_))));
        assert!(matches!(QuestId::parse("a:b"), Err(DomainError::Validation(_))));
        assert!(matches!(QuestId::parse("a b"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_stage_id_from_index_sorts_lexically() {
        let mut ids: Vec<StageId> = [10, 2, 1].into_iter().map(StageId::from_index).collect();
        ids.sort();
        let rendered: Vec<&str> = ids.iter().map(StageId::as_str).collect();
        assert_eq!(
            rendered,
            vec![
                "00000000000000000001",
                "00000000000000000002",
                "00000000000000000010"
            ]
        );
    }

    #[test]
    fn test_stage_id_from_index_keeps_order_past_ten_thousand() {
        // Arrange
        let indices = [0, 9_999, 10_000, 10_001, 123_456, usize::MAX];

        // Act
        let mut ids: Vec<StageId> = indices.iter().rev().copied().map(StageId::from_index).collect();
        ids.sort();

        // Assert
        let expected: Vec<StageId> = indices.into_iter().map(StageId::from_index).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_timestamped_stage_ids_sort_after_index_ids_and_by_time() {
        use chrono::TimeZone;

        // Arrange
        let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 1).unwrap();

        // Act
        let first = StageId::timestamped(earlier, 0);
        let second = StageId::timestamped(earlier, 1);
        let third = StageId::timestamped(later, 0);

        // Assert
        assert_eq!(first.as_str(), "20240501120000.000.0000");
        assert!(StageId::parse(first.as_str()).is_ok());
        assert!(StageId::from_index(usize::MAX) < first);
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_quest_id_deserialization_validates() {
        let ok: QuestId = serde_json::from_str("\"geo\"").unwrap();
        assert_eq!(ok.as_str(), "geo");
        assert!(serde_json::from_str::<QuestId>("\"tg:quest\"").is_err());
    }

    #[test]
    fn test_participant_id_parses_and_displays() {
        let id: ParticipantId = " 42 ".parse().unwrap();
        assert_eq!(id, ParticipantId(42));
        assert_eq!(id.to_string(), "42");
        assert!("alice".parse::<ParticipantId>().is_err());
    }
}
