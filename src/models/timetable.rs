//! Timetable data models.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EntryStatus {
    Scheduled,
    Cancelled,
    Rescheduled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Scheduled => "scheduled",
            EntryStatus::Cancelled => "cancelled",
            EntryStatus::Rescheduled => "rescheduled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "scheduled" => Some(EntryStatus::Scheduled),
            "cancelled" => Some(EntryStatus::Cancelled),
            "rescheduled" => Some(EntryStatus::Rescheduled),
            _ => None,
        }
    }
}

/// One scheduled class slot as stored upstream.
///
/// Times are kept as the raw strings the editor saved; the detection core
/// parses them permissively and skips entries it cannot read. Entries for
/// the same course/day are assumed non-overlapping but never validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: String,
    pub course: String,
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub status: EntryStatus,
}

impl TimetableEntry {
    pub fn is_for_course(&self, course: &str) -> bool {
        self.course.eq_ignore_ascii_case(course)
    }
}

/// The seven canonical days, Monday first. Weekly views enumerate all of
/// them even when a day has no entries.
pub const WEEK_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full day name for payloads ("Monday" rather than chrono's "Mon").
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
