//! User-facing reply text.

use questline_core::ids::QuestId;
use questline_session::{AnswerOutcome, CurrentQuestion, QuestionView};

/// Reply when a participant without a quest asks for a question or answers.
pub const NO_ACTIVE_QUEST: &str = "You do not have any active quest :(";

/// Reply to a wrong answer.
pub const INCORRECT: &str = "Wrong answer, try again.";

/// Reply to the answer that completes a quest.
pub const FINISHED: &str = "Correct! You have finished the quest.";

/// A question with its position in the quest.
#[must_use]
pub fn question(view: &QuestionView) -> String {
    format!(
        "Question {}/{}: {}",
        view.stage_number(),
        view.stage_count(),
        view.text()
    )
}

/// The current question or the no-quest fallback.
#[must_use]
pub fn current_question(current: &CurrentQuestion) -> String {
    match current {
        CurrentQuestion::Question(view) => question(view),
        CurrentQuestion::NoActiveQuest => NO_ACTIVE_QUEST.to_owned(),
    }
}

/// Reply to an answer. A correct answer that does not finish the quest is
/// followed by the next question.
#[must_use]
pub fn answer(outcome: AnswerOutcome, next: &CurrentQuestion) -> String {
    match outcome {
        AnswerOutcome::Inactive => NO_ACTIVE_QUEST.to_owned(),
        AnswerOutcome::Incorrect => INCORRECT.to_owned(),
        AnswerOutcome::Correct { finished: true } => FINISHED.to_owned(),
        AnswerOutcome::Correct { finished: false } => {
            format!("Correct!\n\n{}", current_question(next))
        }
    }
}

/// Reply when `/start` names a quest that does not exist.
#[must_use]
pub fn unknown_quest(quest: &str) -> String {
    format!("I could not start a quest named '{quest}'")
}

/// Reply when a started quest has no questions.
#[must_use]
pub fn finished_on_start(quest_id: &QuestId) -> String {
    format!("Quest '{quest_id}' has no questions. You are done!")
}

/// Reply listing registered quests.
#[must_use]
pub fn quest_list(ids: &[QuestId]) -> String {
    if ids.is_empty() {
        return "No quests are available yet.".to_owned();
    }
    let names: Vec<&str> = ids.iter().map(QuestId::as_str).collect();
    format!("Available quests: {}", names.join(", "))
}

/// Reply confirming a stats request.
#[must_use]
pub fn stats_requested(quest: &str) -> String {
    format!("Stats for '{quest}' have been requested.")
}

/// Usage hint for a command that needs an argument.
#[must_use]
pub fn usage(command: &str) -> String {
    format!("Usage: /{command} <quest>")
}
