//! Stats aggregator — a single task fed through five mailboxes.
//!
//! Each lifecycle class has its own unbounded mailbox plus one for report
//! requests. The loop selects among them without priority, so events of
//! different classes may be handled in any order relative to each other.
//! Order within one mailbox is preserved.

use std::collections::BTreeMap;
use std::sync::Arc;

use questline_core::event::{LifecycleEvent, LifecycleKind, LifecycleSink};
use questline_core::ids::{ParticipantId, QuestId};
use questline_core::notify::{NameDirectory, Notifier, display_name_or_id};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::error::StatsError;
use crate::domain::report::{finished_notice, not_found_notice, quest_report, started_notice};
use crate::domain::stats::{QuestStats, StatsTable};

type Snapshot = Option<BTreeMap<ParticipantId, QuestStats>>;

#[derive(Debug)]
enum Request {
    Report(QuestId),
    Snapshot {
        quest_id: QuestId,
        reply: oneshot::Sender<Snapshot>,
    },
}

/// Cloneable sending side of the aggregator.
///
/// Dropping every handle stops the aggregator loop.
#[derive(Debug, Clone)]
pub struct StatsHandle {
    started: mpsc::UnboundedSender<LifecycleEvent>,
    finished: mpsc::UnboundedSender<LifecycleEvent>,
    answered_correctly: mpsc::UnboundedSender<LifecycleEvent>,
    answered_incorrectly: mpsc::UnboundedSender<LifecycleEvent>,
    requests: mpsc::UnboundedSender<Request>,
}

impl StatsHandle {
    /// Asks the aggregator to send the report for `quest_id` to every
    /// recipient. Returns as soon as the request is queued.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Stopped` if the aggregator loop has ended.
    pub fn send_report(&self, quest_id: QuestId) -> Result<(), StatsError> {
        self.requests
            .send(Request::Report(quest_id))
            .map_err(|_| StatsError::Stopped)
    }

    /// Snapshot of the statistics for `quest_id`, or `None` if no event
    /// for that quest has been handled yet.
    ///
    /// Requests are served in order, so a snapshot taken after
    /// `send_report` observes the report as already delivered.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Stopped` if the aggregator loop has ended.
    pub async fn quest_stats(&self, quest_id: QuestId) -> Result<Snapshot, StatsError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Snapshot { quest_id, reply })
            .map_err(|_| StatsError::Stopped)?;
        response.await.map_err(|_| StatsError::Stopped)
    }
}

impl LifecycleSink for StatsHandle {
    fn emit(&self, event: LifecycleEvent) {
        let mailbox = match event.kind {
            LifecycleKind::Started => &self.started,
            LifecycleKind::Finished => &self.finished,
            LifecycleKind::AnsweredCorrectly => &self.answered_correctly,
            LifecycleKind::AnsweredIncorrectly => &self.answered_incorrectly,
        };
        if let Err(mpsc::error::SendError(event)) = mailbox.send(event) {
            warn!(
                kind = event.kind.as_str(),
                quest_id = %event.quest_id,
                participant_id = %event.participant_id,
                "stats aggregator stopped, dropping event"
            );
        }
    }
}

/// State owned by the aggregator task.
pub struct StatsAggregator {
    table: StatsTable,
    recipients: Vec<ParticipantId>,
    notifier: Arc<dyn Notifier>,
    names: Arc<dyn NameDirectory>,
}

struct Mailboxes {
    started: mpsc::UnboundedReceiver<LifecycleEvent>,
    finished: mpsc::UnboundedReceiver<LifecycleEvent>,
    answered_correctly: mpsc::UnboundedReceiver<LifecycleEvent>,
    answered_incorrectly: mpsc::UnboundedReceiver<LifecycleEvent>,
    requests: mpsc::UnboundedReceiver<Request>,
}

impl StatsAggregator {
    /// Spawns the aggregator on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::NoRecipients` if `recipients` is empty.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(
        recipients: Vec<ParticipantId>,
        notifier: Arc<dyn Notifier>,
        names: Arc<dyn NameDirectory>,
    ) -> Result<(StatsHandle, JoinHandle<()>), StatsError> {
        if recipients.is_empty() {
            return Err(StatsError::NoRecipients);
        }

        let (started_tx, started) = mpsc::unbounded_channel();
        let (finished_tx, finished) = mpsc::unbounded_channel();
        let (correct_tx, answered_correctly) = mpsc::unbounded_channel();
        let (incorrect_tx, answered_incorrectly) = mpsc::unbounded_channel();
        let (requests_tx, requests) = mpsc::unbounded_channel();

        let handle = StatsHandle {
            started: started_tx,
            finished: finished_tx,
            answered_correctly: correct_tx,
            answered_incorrectly: incorrect_tx,
            requests: requests_tx,
        };
        let mailboxes = Mailboxes {
            started,
            finished,
            answered_correctly,
            answered_incorrectly,
            requests,
        };
        let aggregator = Self {
            table: StatsTable::new(),
            recipients,
            notifier,
            names,
        };

        info!(recipients = aggregator.recipients.len(), "stats aggregator started");
        let task = tokio::spawn(aggregator.run(mailboxes));
        Ok((handle, task))
    }

    async fn run(mut self, mut mailboxes: Mailboxes) {
        loop {
            tokio::select! {
                Some(event) = mailboxes.started.recv() => self.on_started(&event).await,
                Some(event) = mailboxes.finished.recv() => self.on_finished(&event).await,
                Some(event) = mailboxes.answered_correctly.recv() => self.on_answer(&event),
                Some(event) = mailboxes.answered_incorrectly.recv() => self.on_answer(&event),
                Some(request) = mailboxes.requests.recv() => self.on_request(request).await,
                else => break,
            }
        }
        info!("stats aggregator stopped");
    }

    async fn on_started(&mut self, event: &LifecycleEvent) {
        self.table.apply(event);
        debug!(quest_id = %event.quest_id, participant_id = %event.participant_id, "participant started a quest");
        let name = display_name_or_id(self.names.as_ref(), event.participant_id);
        self.broadcast(&started_notice(&event.quest_id, &name, event.occurred_at))
            .await;
    }

    async fn on_finished(&mut self, event: &LifecycleEvent) {
        let stats = self.table.apply(event).clone();
        debug!(
            quest_id = %event.quest_id,
            participant_id = %event.participant_id,
            mistakes = stats.incorrect_answers,
            "participant finished a quest"
        );
        let name = display_name_or_id(self.names.as_ref(), event.participant_id);
        self.broadcast(&finished_notice(&event.quest_id, &name, event.occurred_at, &stats))
            .await;
    }

    fn on_answer(&mut self, event: &LifecycleEvent) {
        let stats = self.table.apply(event);
        debug!(
            quest_id = %event.quest_id,
            participant_id = %event.participant_id,
            kind = event.kind.as_str(),
            correct = stats.answered_times.len(),
            incorrect = stats.incorrect_answers,
            "answer recorded"
        );
    }

    async fn on_request(&mut self, request: Request) {
        match request {
            Request::Report(quest_id) => self.send_report(&quest_id).await,
            Request::Snapshot { quest_id, reply } => {
                // The requester may have given up waiting.
                let _ = reply.send(self.table.quest(&quest_id).cloned());
            }
        }
    }

    async fn send_report(&self, quest_id: &QuestId) {
        let Some(participants) = self.table.quest(quest_id) else {
            info!(quest_id = %quest_id, "report requested for unknown quest");
            self.broadcast(&not_found_notice(quest_id)).await;
            return;
        };
        info!(quest_id = %quest_id, participants = participants.len(), "sending quest report");
        for view in quest_report(quest_id, participants, self.names.as_ref()) {
            self.broadcast(&view).await;
        }
    }

    async fn broadcast(&self, message: &str) {
        for recipient in &self.recipients {
            if let Err(e) = self.notifier.notify(*recipient, message).await {
                warn!(recipient = %recipient, error = %e, "failed to deliver stats message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use questline_core::event::{LifecycleEvent, LifecycleKind, LifecycleSink};
    use questline_core::ids::{ParticipantId, QuestId};
    use questline_test_support::{RecordingNotifier, StaticNames};

    use super::{StatsAggregator, StatsHandle};
    use crate::domain::error::StatsError;
    use crate::domain::stats::QuestStats;

    const ADMIN: ParticipantId = ParticipantId(100);
    const OTHER_ADMIN: ParticipantId = ParticipantId(101);

    fn geo() -> QuestId {
        QuestId::parse("geo").unwrap()
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn event(kind: LifecycleKind, participant: i64, minute: u32) -> LifecycleEvent {
        LifecycleEvent::new(kind, geo(), ParticipantId(participant), at(minute))
    }

    fn spawn(recipients: Vec<ParticipantId>) -> (StatsHandle, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let names = Arc::new(StaticNames::from_pairs(&[(1, "alice"), (2, "bob")]));
        let (handle, _task) = StatsAggregator::spawn(recipients, notifier.clone(), names).unwrap();
        (handle, notifier)
    }

    // Cross-class order is not guaranteed, so wait until the snapshot
    // satisfies `settled`.
    async fn settle<F>(handle: &StatsHandle, participant: i64, settled: F) -> QuestStats
    where
        F: Fn(&QuestStats) -> bool,
    {
        for _ in 0..200 {
            let stats = handle
                .quest_stats(geo())
                .await
                .unwrap()
                .and_then(|m| m.get(&ParticipantId(participant)).cloned());
            if let Some(stats) = stats.filter(|s| settled(s)) {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("stats for participant {participant} never settled");
    }

    #[tokio::test]
    async fn test_spawn_requires_recipients() {
        let result = StatsAggregator::spawn(
            Vec::new(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(StaticNames::default()),
        );

        assert!(matches!(result, Err(StatsError::NoRecipients)));
    }

    #[tokio::test]
    async fn test_events_accumulate_into_stats() {
        // Arrange
        let (handle, _notifier) = spawn(vec![ADMIN]);

        // Act
        handle.emit(event(LifecycleKind::Started, 1, 0));
        handle.emit(event(LifecycleKind::AnsweredIncorrectly, 1, 1));
        handle.emit(event(LifecycleKind::AnsweredIncorrectly, 1, 2));
        handle.emit(event(LifecycleKind::AnsweredCorrectly, 1, 3));
        handle.emit(event(LifecycleKind::AnsweredCorrectly, 1, 4));
        handle.emit(event(LifecycleKind::Finished, 1, 4));

        // Assert
        let stats = settle(&handle, 1, |s| {
            s.started.is_some()
                && s.finished.is_some()
                && s.answered_times.len() == 2
                && s.incorrect_answers == 2
        })
        .await;
        assert_eq!(stats.started, Some(at(0)));
        assert_eq!(stats.finished, Some(at(4)));
        assert_eq!(stats.answered_times, vec![at(3), at(4)]);
    }

    #[tokio::test]
    async fn test_unknown_quest_report_sends_only_not_found_notice() {
        // Arrange
        let (handle, notifier) = spawn(vec![ADMIN, OTHER_ADMIN]);

        // Act
        handle.send_report(QuestId::parse("nope").unwrap()).unwrap();
        let snapshot = handle.quest_stats(QuestId::parse("nope").unwrap()).await.unwrap();

        // Assert
        assert!(snapshot.is_none());
        assert_eq!(
            notifier.sent(),
            vec![
                (ADMIN, "Quest 'nope' not found for stats".to_owned()),
                (OTHER_ADMIN, "Quest 'nope' not found for stats".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_report_sends_three_views_to_every_recipient() {
        // Arrange
        let (handle, notifier) = spawn(vec![ADMIN, OTHER_ADMIN]);
        handle.emit(event(LifecycleKind::Started, 1, 0));
        handle.emit(event(LifecycleKind::Started, 2, 1));
        handle.emit(event(LifecycleKind::Finished, 2, 6));
        settle(&handle, 1, |s| s.started.is_some()).await;
        settle(&handle, 2, |s| s.started.is_some() && s.finished.is_some()).await;

        // Act
        handle.send_report(geo()).unwrap();
        handle.quest_stats(geo()).await.unwrap();

        // Assert
        let reports: Vec<String> = notifier
            .sent_to(OTHER_ADMIN)
            .into_iter()
            .filter(|m| m.starts_with("Ordered"))
            .collect();
        assert_eq!(reports.len(), 3);
        assert!(reports[0].contains("User 'alice' -> 2024-05-01 12:00:00 UTC\n User 'bob'"));
        assert!(reports[1].contains("User 'bob' -> 2024-05-01 12:06:00 UTC\n User 'alice' -> not finished"));
        assert!(reports[2].contains("User 'bob' -> 5m 0s"));
    }

    #[tokio::test]
    async fn test_live_notices_use_display_names() {
        // Arrange
        let (handle, notifier) = spawn(vec![ADMIN]);

        // Act
        handle.emit(event(LifecycleKind::Started, 1, 0));
        handle.emit(event(LifecycleKind::Started, 42, 0));
        settle(&handle, 1, |s| s.started.is_some()).await;
        settle(&handle, 42, |s| s.started.is_some()).await;

        // Assert
        let sent = notifier.sent_to(ADMIN);
        assert!(sent.contains(&"Started 'geo' by alice at 2024-05-01 12:00:00 UTC".to_owned()));
        assert!(sent.contains(&"Started 'geo' by 42 at 2024-05-01 12:00:00 UTC".to_owned()));
    }

    #[tokio::test]
    async fn test_finished_notice_reports_time_spent_and_mistakes() {
        // Arrange
        let (handle, notifier) = spawn(vec![ADMIN]);
        handle.emit(event(LifecycleKind::Started, 2, 0));
        handle.emit(event(LifecycleKind::AnsweredIncorrectly, 2, 1));
        settle(&handle, 2, |s| s.started.is_some() && s.incorrect_answers == 1).await;

        // Act
        handle.emit(event(LifecycleKind::Finished, 2, 10));
        settle(&handle, 2, |s| s.finished.is_some()).await;

        // Assert
        assert!(notifier.sent_to(ADMIN).contains(
            &"Finished 'geo' by bob at 2024-05-01 12:10:00 UTC (spent 10m 0s, made 1 mistakes)"
                .to_owned()
        ));
    }

    #[tokio::test]
    async fn test_loop_stops_when_handles_are_dropped() {
        // Arrange
        let (handle, task) = StatsAggregator::spawn(
            vec![ADMIN],
            Arc::new(RecordingNotifier::new()),
            Arc::new(StaticNames::default()),
        )
        .unwrap();
        let clone = handle.clone();

        // Act
        drop(handle);
        drop(clone);

        // Assert
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("aggregator did not stop")
            .unwrap();
    }
}
