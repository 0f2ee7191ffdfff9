//! Timetable snapshot diffing and the alert payloads the sweep hands to an
//! external notifier. Pure functions; the caller owns snapshot storage.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{
    day_name, Activity, ActivityLog, EntryStatus, FreeSlot, Student, TimetableEntry,
};
use crate::recommend::engine::auto_pick;
use crate::recommend::scoring::ScoredActivity;
use crate::timeutil::{minutes_between, parse_time_of_day};

/// Payload for a newly detected class cancellation. Sending it (email, push)
/// is an external concern; this is just the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationAlert {
    pub entry_id: String,
    pub course: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub student_id: String,
    pub student_name: String,
    pub recommended: Option<ScoredActivity>,
}

/// Payload for a "free time starts now" notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeTimeAlert {
    pub student_id: String,
    pub course: String,
    pub slot: FreeSlot,
    pub recommended: Option<ScoredActivity>,
}

/// Entries present in both snapshots (matched by id) that transitioned from
/// scheduled to cancelled. Entries new to `current` are not transitions and
/// never diff in, even if already cancelled.
pub fn diff_cancellations(
    previous: &[TimetableEntry],
    current: &[TimetableEntry],
) -> Vec<TimetableEntry> {
    current
        .iter()
        .filter(|entry| entry.status == EntryStatus::Cancelled)
        .filter(|entry| {
            previous
                .iter()
                .any(|prev| prev.id == entry.id && prev.status == EntryStatus::Scheduled)
        })
        .cloned()
        .collect()
}

/// Build one alert per affected student for a cancelled entry, each with its
/// own personalized activity pick sized to the freed minutes.
///
/// An unparsable time span degrades to zero free minutes and no
/// recommendation rather than dropping the alert.
pub fn build_cancellation_alerts<R: Rng>(
    entry: &TimetableEntry,
    students: &[Student],
    activities: &[Activity],
    logs_by_student: impl Fn(&str) -> Vec<ActivityLog>,
    rng: &mut R,
) -> Vec<CancellationAlert> {
    let duration_minutes = match (
        parse_time_of_day(&entry.start_time),
        parse_time_of_day(&entry.end_time),
    ) {
        (Some(start), Some(end)) => minutes_between(start, end).max(0),
        _ => 0,
    };

    students
        .iter()
        .map(|student| {
            let recommended = if duration_minutes > 0 {
                let logs = logs_by_student(&student.id);
                auto_pick(activities, &logs, &entry.course, duration_minutes, rng)
            } else {
                None
            };

            CancellationAlert {
                entry_id: entry.id.clone(),
                course: entry.course.clone(),
                day: day_name(entry.day).to_string(),
                start_time: entry.start_time.clone(),
                end_time: entry.end_time.clone(),
                duration_minutes,
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                recommended,
            }
        })
        .collect()
}
