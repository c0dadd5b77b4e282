//! Session engine — the concurrent core of the quiz.
//!
//! One mutex guards both the catalog and the active-session table. Every
//! operation does its read-modify-write in a single critical section and
//! emits lifecycle events only after the guard is released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use questline_core::clock::Clock;
use questline_core::error::DomainError;
use questline_core::event::{LifecycleEvent, LifecycleKind, LifecycleSink};
use questline_core::ids::{ParticipantId, QuestId};
use questline_core::quest::Quest;
use tracing::{debug, info};

use crate::domain::catalog::QuestCatalog;
use crate::domain::outcomes::{AnswerOutcome, CurrentQuestion, Progress, QuestionView, StartOutcome};
use crate::domain::session::{Advance, Session};

#[derive(Debug, Default)]
struct EngineState {
    catalog: QuestCatalog,
    active: HashMap<ParticipantId, Session>,
}

/// Tracks which participant is on which stage of which quest.
pub struct SessionEngine {
    state: Mutex<EngineState>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LifecycleSink>,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine").finish_non_exhaustive()
    }
}

impl SessionEngine {
    /// Creates an engine over `catalog` with no active sessions.
    #[must_use]
    pub fn new(catalog: QuestCatalog, clock: Arc<dyn Clock>, sink: Arc<dyn LifecycleSink>) -> Self {
        Self {
            state: Mutex::new(EngineState {
                catalog,
                active: HashMap::new(),
            }),
            clock,
            sink,
        }
    }

    // Each update is a single map insert or remove, so a poisoned guard
    // still protects consistent data.
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, kind: LifecycleKind, quest_id: &QuestId, participant: ParticipantId) {
        self.sink.emit(LifecycleEvent::new(
            kind,
            quest_id.clone(),
            participant,
            self.clock.now(),
        ));
    }

    /// Starts (or restarts) `quest_id` for `participant`.
    ///
    /// Any session the participant already had is discarded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownQuest` if the quest is not in the
    /// catalog. The participant's existing session is left untouched.
    pub fn start_quest(
        &self,
        participant: ParticipantId,
        quest_id: &QuestId,
    ) -> Result<StartOutcome, DomainError> {
        let outcome = {
            let mut state = self.lock();
            let quest = state
                .catalog
                .get(quest_id)
                .ok_or_else(|| DomainError::UnknownQuest(quest_id.clone()))?;
            if let Some(session) = Session::start(quest_id.clone(), quest) {
                state.active.insert(participant, session);
                StartOutcome::Started
            } else {
                state.active.remove(&participant);
                StartOutcome::Finished
            }
        };

        info!(participant_id = %participant, quest_id = %quest_id, "quest started");
        self.emit(LifecycleKind::Started, quest_id, participant);
        if outcome == StartOutcome::Finished {
            self.emit(LifecycleKind::Finished, quest_id, participant);
        }
        Ok(outcome)
    }

    /// Checks an answer against the participant's current stage.
    pub fn check_answer(&self, participant: ParticipantId, answer: &str) -> AnswerOutcome {
        self.check_answer_with_next(participant, answer).0
    }

    /// Checks an answer and returns the question that is current right after
    /// it, both observed under the same lock hold.
    pub fn check_answer_with_next(
        &self,
        participant: ParticipantId,
        answer: &str,
    ) -> (AnswerOutcome, CurrentQuestion) {
        let (quest_id, outcome, next) = {
            let mut state = self.lock();
            let Some(session) = state.active.get(&participant) else {
                debug!(participant_id = %participant, "answer without active quest");
                return (AnswerOutcome::Inactive, CurrentQuestion::NoActiveQuest);
            };
            let quest_id = session.quest_id().clone();
            match session.answer(answer) {
                Advance::Incorrect => {
                    let next = question_of(session);
                    (quest_id, AnswerOutcome::Incorrect, next)
                }
                Advance::Advanced(next_session) => {
                    let next = question_of(&next_session);
                    state.active.insert(participant, next_session);
                    (quest_id, AnswerOutcome::Correct { finished: false }, next)
                }
                Advance::Finished => {
                    state.active.remove(&participant);
                    (
                        quest_id,
                        AnswerOutcome::Correct { finished: true },
                        CurrentQuestion::NoActiveQuest,
                    )
                }
            }
        };

        match outcome {
            AnswerOutcome::Incorrect => {
                debug!(participant_id = %participant, quest_id = %quest_id, "incorrect answer");
                self.emit(LifecycleKind::AnsweredIncorrectly, &quest_id, participant);
            }
            AnswerOutcome::Correct { finished } => {
                debug!(participant_id = %participant, quest_id = %quest_id, finished, "correct answer");
                self.emit(LifecycleKind::AnsweredCorrectly, &quest_id, participant);
                if finished {
                    info!(participant_id = %participant, quest_id = %quest_id, "quest finished");
                    self.emit(LifecycleKind::Finished, &quest_id, participant);
                }
            }
            AnswerOutcome::Inactive => {}
        }
        (outcome, next)
    }

    /// The question the participant currently has to answer.
    pub fn current_question(&self, participant: ParticipantId) -> CurrentQuestion {
        self.lock()
            .active
            .get(&participant)
            .map_or(CurrentQuestion::NoActiveQuest, question_of)
    }

    /// Where the participant stands in their quest.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoActiveSession` if the participant is idle.
    pub fn progress(&self, participant: ParticipantId) -> Result<Progress, DomainError> {
        let state = self.lock();
        let session = state
            .active
            .get(&participant)
            .ok_or(DomainError::NoActiveSession(participant))?;
        Ok(Progress {
            quest_id: session.quest_id().clone(),
            stage_index: session.stage_index(),
            stage_count: session.quest().stage_count(),
        })
    }

    /// Registers or replaces a quest.
    ///
    /// Sessions already in progress keep the definition they started with.
    pub fn add_quest(&self, quest_id: QuestId, quest: impl Into<Arc<Quest>>) {
        let quest = quest.into();
        let stages = quest.stage_count();
        let replaced = self.lock().catalog.insert(quest_id.clone(), quest).is_some();
        info!(quest_id = %quest_id, stages, replaced, "quest registered");
    }

    /// Ids of all registered quests, sorted.
    pub fn quest_ids(&self) -> Vec<QuestId> {
        self.lock().catalog.ids()
    }

    /// Number of participants with a quest in progress.
    pub fn active_sessions(&self) -> usize {
        self.lock().active.len()
    }
}

fn question_of(session: &Session) -> CurrentQuestion {
    CurrentQuestion::Question(QuestionView::new(
        session.quest_id().clone(),
        Arc::clone(session.quest()),
        session.stage_index(),
    ))
}
