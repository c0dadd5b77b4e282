//! Quest and stage definitions.

use std::collections::BTreeSet;

use crate::error::DomainError;

/// Normalizes an answer for storage and comparison.
#[must_use]
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One question of a quest together with the answers that pass it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    question: String,
    media: Option<Vec<u8>>,
    answers: BTreeSet<String>,
}

impl Stage {
    /// Builds a stage, normalizing every accepted answer.
    ///
    /// Blank answers are dropped before the emptiness check.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the question is blank or no
    /// non-blank answer remains.
    pub fn new<I, A>(question: impl Into<String>, answers: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(DomainError::Validation(
                "stage question must not be empty".to_owned(),
            ));
        }

        let answers: BTreeSet<String> = answers
            .into_iter()
            .map(|a| normalize_answer(a.as_ref()))
            .filter(|a| !a.is_empty())
            .collect();
        if answers.is_empty() {
            return Err(DomainError::Validation(format!(
                "stage '{question}' has no accepted answers"
            )));
        }

        Ok(Self {
            question,
            media: None,
            answers,
        })
    }

    /// Attaches a media payload shown with the question.
    #[must_use]
    pub fn with_media(mut self, media: Vec<u8>) -> Self {
        self.media = Some(media);
        self
    }

    /// The question text.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The optional media payload.
    #[must_use]
    pub fn media(&self) -> Option<&[u8]> {
        self.media.as_deref()
    }

    /// Normalized accepted answers.
    #[must_use]
    pub fn answers(&self) -> &BTreeSet<String> {
        &self.answers
    }

    /// Returns whether `answer` matches one of the accepted answers.
    #[must_use]
    pub fn accepts(&self, answer: &str) -> bool {
        self.answers.contains(&normalize_answer(answer))
    }
}

/// An ordered sequence of stages. Order determines progression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quest {
    stages: Vec<Stage>,
}

impl Quest {
    /// Creates a quest from stages in play order.
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Stages in play order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Stage at `index`, if any.
    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// Number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// A quest without stages is finished as soon as it starts.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.stages.is_empty()
    }
}
