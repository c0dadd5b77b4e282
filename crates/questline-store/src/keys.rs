//! Storage key layout.
//!
//! ```text
//! quest:{quest_id}:{stage_id}:question   field record: text, media
//! quest:{quest_id}:{stage_id}:answers    list record: accepted answers
//! ```
//!
//! Enumeration relies on lexical prefix matching, which is why ids may not
//! contain the separator.

use questline_core::ids::{KEY_SEPARATOR, QuestId, StageId};

/// Namespace prefix of every quest key.
pub const QUEST_NAMESPACE: &str = "quest";

/// Field holding the question text.
pub const TEXT_FIELD: &str = "text";

/// Field holding the optional media payload.
pub const MEDIA_FIELD: &str = "media";

const QUESTION_SUFFIX: &str = "question";
const ANSWERS_SUFFIX: &str = "answers";

/// Prefix matching every quest key.
#[must_use]
pub fn all_quests_prefix() -> String {
    format!("{QUEST_NAMESPACE}{KEY_SEPARATOR}")
}

/// Prefix matching every key of one quest.
#[must_use]
pub fn quest_prefix(quest_id: &QuestId) -> String {
    format!("{QUEST_NAMESPACE}{KEY_SEPARATOR}{quest_id}{KEY_SEPARATOR}")
}

/// Key of a stage's question record.
#[must_use]
pub fn question_key(quest_id: &QuestId, stage_id: &StageId) -> String {
    format!("{}{stage_id}{KEY_SEPARATOR}{QUESTION_SUFFIX}", quest_prefix(quest_id))
}

/// Key of a stage's answer list.
#[must_use]
pub fn answers_key(quest_id: &QuestId, stage_id: &StageId) -> String {
    format!("{}{stage_id}{KEY_SEPARATOR}{ANSWERS_SUFFIX}", quest_prefix(quest_id))
}

/// Extracts the quest component from any key under [`all_quests_prefix`].
#[must_use]
pub fn quest_component(key: &str) -> Option<&str> {
    key.strip_prefix(QUEST_NAMESPACE)?
        .strip_prefix(KEY_SEPARATOR)?
        .split(KEY_SEPARATOR)
        .next()
        .filter(|c| !c.is_empty())
}

/// Extracts the stage component from a question or answers key under
/// `quest_prefix`. Any other key shape yields `None`.
#[must_use]
pub fn stage_component<'a>(key: &'a str, quest_prefix: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(quest_prefix)?;
    let (stage, suffix) = rest.split_once(KEY_SEPARATOR)?;
    if stage.is_empty() || !matches!(suffix, QUESTION_SUFFIX | ANSWERS_SUFFIX) {
        return None;
    }
    Some(stage)
}
