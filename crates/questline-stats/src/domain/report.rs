//! Text of live notices and quest reports.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, TimeDelta, Utc};
use questline_core::ids::{ParticipantId, QuestId};
use questline_core::notify::{NameDirectory, display_name_or_id};

use crate::domain::stats::QuestStats;

const NOT_STARTED: &str = "not started";
const NOT_FINISHED: &str = "not finished";

/// Renders a timestamp for administrators.
#[must_use]
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Renders a duration as `1h 2m 3s`, omitting leading zero units.
#[must_use]
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        format!("{sign}{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m {seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

/// Notice sent when a participant starts a quest.
#[must_use]
pub fn started_notice(quest_id: &QuestId, name: &str, at: DateTime<Utc>) -> String {
    format!("Started '{quest_id}' by {name} at {}", format_time(at))
}

/// Notice sent when a participant finishes a quest.
#[must_use]
pub fn finished_notice(quest_id: &QuestId, name: &str, at: DateTime<Utc>, stats: &QuestStats) -> String {
    let spent = stats
        .duration()
        .map_or_else(|| "unknown time".to_owned(), format_duration);
    format!(
        "Finished '{quest_id}' by {name} at {} (spent {spent}, made {} mistakes)",
        format_time(at),
        stats.incorrect_answers
    )
}

/// Notice sent when a report is requested for a quest nobody played.
#[must_use]
pub fn not_found_notice(quest_id: &QuestId) -> String {
    format!("Quest '{quest_id}' not found for stats")
}

// Known values ascending, unknown ones last. The sort is stable, so ties
// keep participant id order.
fn known_first<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn view<T, K, F>(
    title: String,
    participants: &BTreeMap<ParticipantId, QuestStats>,
    names: &dyn NameDirectory,
    key: K,
    render: F,
    missing: &str,
) -> String
where
    T: Ord,
    K: Fn(&QuestStats) -> Option<T>,
    F: Fn(T) -> String,
{
    let mut rows: Vec<(ParticipantId, Option<T>)> = participants
        .iter()
        .map(|(participant, stats)| (*participant, key(stats)))
        .collect();
    rows.sort_by(|(_, a), (_, b)| known_first(a.as_ref(), b.as_ref()));

    let mut text = title;
    for (participant, value) in rows {
        let value = value.map_or_else(|| missing.to_owned(), &render);
        let _ = write!(
            text,
            "\n User '{}' -> {value}",
            display_name_or_id(names, participant)
        );
    }
    text
}

/// The three report views for one quest: start times, finish times and
/// time spent, each ascending.
#[must_use]
pub fn quest_report(
    quest_id: &QuestId,
    participants: &BTreeMap<ParticipantId, QuestStats>,
    names: &dyn NameDirectory,
) -> [String; 3] {
    [
        view(
            format!("Ordered start times for quest '{quest_id}'"),
            participants,
            names,
            |s| s.started,
            format_time,
            NOT_STARTED,
        ),
        view(
            format!("Ordered finish times for quest '{quest_id}'"),
            participants,
            names,
            |s| s.finished,
            format_time,
            NOT_FINISHED,
        ),
        view(
            format!("Ordered time spent on quest '{quest_id}'"),
            participants,
            names,
            QuestStats::duration,
            format_duration,
            NOT_FINISHED,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use questline_core::ids::{ParticipantId, QuestId};
    use questline_test_support::StaticNames;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn stats(started: Option<u32>, finished: Option<u32>) -> QuestStats {
        QuestStats {
            started: started.map(at),
            finished: finished.map(at),
            ..QuestStats::default()
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::seconds(0)), "0s");
        assert_eq!(format_duration(TimeDelta::seconds(59)), "59s");
        assert_eq!(format_duration(TimeDelta::seconds(61)), "1m 1s");
        assert_eq!(format_duration(TimeDelta::seconds(3723)), "1h 2m 3s");
    }

    #[test]
    fn test_notices() {
        let quest = QuestId::parse("geo").unwrap();
        let finished = QuestStats {
            incorrect_answers: 2,
            ..stats(Some(0), Some(5))
        };

        assert_eq!(
            started_notice(&quest, "alice", at(0)),
            "Started 'geo' by alice at 2024-05-01 12:00:00 UTC"
        );
        assert_eq!(
            finished_notice(&quest, "alice", at(5), &finished),
            "Finished 'geo' by alice at 2024-05-01 12:05:00 UTC (spent 5m 0s, made 2 mistakes)"
        );
        assert_eq!(not_found_notice(&quest), "Quest 'geo' not found for stats");
    }

    #[test]
    fn test_report_orders_views_and_lists_missing_last() {
        // Arrange
        let quest = QuestId::parse("geo").unwrap();
        let names = StaticNames::from_pairs(&[(1, "alice"), (2, "bob")]);
        let participants = BTreeMap::from([
            (ParticipantId(1), stats(Some(5), Some(30))),
            (ParticipantId(2), stats(Some(0), Some(40))),
            (ParticipantId(3), stats(Some(10), None)),
        ]);

        // Act
        let [starts, finishes, spent] = quest_report(&quest, &participants, &names);

        // Assert
        assert_eq!(
            starts,
            "Ordered start times for quest 'geo'\n \
             User 'bob' -> 2024-05-01 12:00:00 UTC\n \
             User 'alice' -> 2024-05-01 12:05:00 UTC\n \
             User '3' -> 2024-05-01 12:10:00 UTC"
        );
        assert_eq!(
            finishes,
            "Ordered finish times for quest 'geo'\n \
             User 'alice' -> 2024-05-01 12:30:00 UTC\n \
             User 'bob' -> 2024-05-01 12:40:00 UTC\n \
             User '3' -> not finished"
        );
        assert_eq!(
            spent,
            "Ordered time spent on quest 'geo'\n \
             User 'alice' -> 25m 0s\n \
             User 'bob' -> 40m 0s\n \
             User '3' -> not finished"
        );
    }

    #[test]
    fn test_report_marks_participants_without_start() {
        let quest = QuestId::parse("geo").unwrap();
        let participants = BTreeMap::from([
            (ParticipantId(9), stats(None, Some(3))),
            (ParticipantId(4), stats(Some(1), Some(2))),
        ]);

        let [starts, _, spent] = quest_report(&quest, &participants, &StaticNames::default());

        assert!(starts.ends_with("User '4' -> 2024-05-01 12:01:00 UTC\n User '9' -> not started"));
        assert!(spent.ends_with("User '4' -> 1m 0s\n User '9' -> not finished"));
    }
}
