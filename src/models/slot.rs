//! Derived free-time models. Nothing here is persisted; slots are recomputed
//! on every query because "now" moves continuously.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::timetable::EntryStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotReason {
    TimetableGap,
    ClassCancelled,
}

/// A window of free time on one day, tagged with how it relates to "now".
///
/// `is_current` and `is_upcoming` are mutually exclusive at any instant:
/// a slot either contains "now" (half-open), starts after it, or is past.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeSlot {
    pub course: String,
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i64,
    pub reason: SlotReason,
    pub is_current: bool,
    pub is_upcoming: bool,
    /// Minutes from "now" to `end_time`; set only when `is_current`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_minutes: Option<i64>,
    /// Minutes from "now" to `start_time`; set only when `is_upcoming`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_in_minutes: Option<i64>,
}

impl FreeSlot {
    /// Same window on the same day, regardless of annotations.
    pub fn same_window(&self, other: &FreeSlot) -> bool {
        self.day == other.day
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }
}

/// One item of the human-readable daily agenda: every timetable entry (any
/// status) interleaved with qualifying gaps, in time order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleItem {
    Class {
        id: String,
        start_time: String,
        end_time: String,
        status: EntryStatus,
    },
    FreeTime {
        start_time: NaiveTime,
        end_time: NaiveTime,
        duration_minutes: i64,
        is_current: bool,
    },
}

/// One day of the weekly free-time summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: Weekday,
    pub slots: Vec<FreeSlot>,
    pub total_free_minutes: i64,
    pub slot_count: usize,
}
