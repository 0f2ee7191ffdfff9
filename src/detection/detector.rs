//! Free-slot detection over a single course/day timetable snapshot.
//!
//! Every function here is a pure computation over rows the caller already
//! fetched, with "now" threaded in explicitly so tests can pin the clock.

use chrono::{NaiveTime, Weekday};

use crate::config::DetectionConfig;
use crate::models::{EntryStatus, FreeSlot, SlotReason, TimetableEntry};
use crate::timeutil::{is_within, minutes_between, parse_time_of_day};

/// Entries for one course and day with the given status, sorted by start
/// time. Entries with an unparsable start time sort with a 00:00 fallback so
/// one bad record cannot crash the scan; that is a tolerance, not a
/// correctness guarantee.
fn day_entries(
    entries: &[TimetableEntry],
    course: &str,
    day: Weekday,
    status: EntryStatus,
) -> Vec<TimetableEntry> {
    let mut matched: Vec<TimetableEntry> = entries
        .iter()
        .filter(|e| e.is_for_course(course) && e.day == day && e.status == status)
        .cloned()
        .collect();

    matched.sort_by_key(|e| parse_time_of_day(&e.start_time).unwrap_or(NaiveTime::MIN));
    matched
}

fn build_slot(
    course: &str,
    day: Weekday,
    start: NaiveTime,
    end: NaiveTime,
    reason: SlotReason,
    now: NaiveTime,
) -> FreeSlot {
    let is_current = is_within(now, start, end);
    let is_upcoming = start > now;

    FreeSlot {
        course: course.to_string(),
        day,
        start_time: start,
        end_time: end,
        duration_minutes: minutes_between(start, end),
        reason,
        is_current,
        is_upcoming,
        remaining_minutes: is_current.then(|| minutes_between(now, end)),
        starts_in_minutes: is_upcoming.then(|| minutes_between(now, start)),
    }
}

/// Gaps between consecutive scheduled classes that meet the threshold.
///
/// Only gaps strictly between two scheduled classes count; the open time
/// before the first class or after the last one is never emitted.
pub fn detect_gap_slots(
    entries: &[TimetableEntry],
    course: &str,
    day: Weekday,
    now: NaiveTime,
    config: &DetectionConfig,
) -> Vec<FreeSlot> {
    let scheduled = day_entries(entries, course, day, EntryStatus::Scheduled);
    if scheduled.len() < 2 {
        return Vec::new();
    }

    let mut slots = Vec::new();

    for pair in scheduled.windows(2) {
        let current_end = parse_time_of_day(&pair[0].end_time);
        let next_start = parse_time_of_day(&pair[1].start_time);

        if let (Some(end), Some(start)) = (current_end, next_start) {
            let gap = minutes_between(end, start);
            // Overlapping upstream data produces a negative gap; not emitted,
            // but it signals a data-integrity bug worth catching in debug.
            debug_assert!(
                gap >= 0,
                "overlapping timetable entries {} / {}",
                pair[0].id,
                pair[1].id
            );

            if gap >= config.threshold_minutes {
                slots.push(build_slot(
                    course,
                    day,
                    end,
                    start,
                    SlotReason::TimetableGap,
                    now,
                ));
            }
        }
    }

    slots
}

/// Cancelled classes whose own span meets the threshold, each freed as a
/// slot over its original time window, independent of neighboring gaps.
pub fn detect_cancelled_slots(
    entries: &[TimetableEntry],
    course: &str,
    day: Weekday,
    now: NaiveTime,
    config: &DetectionConfig,
) -> Vec<FreeSlot> {
    let cancelled = day_entries(entries, course, day, EntryStatus::Cancelled);

    let mut slots = Vec::new();

    for entry in &cancelled {
        let start = parse_time_of_day(&entry.start_time);
        let end = parse_time_of_day(&entry.end_time);

        if let (Some(start), Some(end)) = (start, end) {
            if minutes_between(start, end) >= config.threshold_minutes {
                slots.push(build_slot(
                    course,
                    day,
                    start,
                    end,
                    SlotReason::ClassCancelled,
                    now,
                ));
            }
        }
    }

    slots
}

/// All free slots (gaps + cancellations) sorted by start time.
///
/// The sort is stable, so slots sharing a start time keep concatenation
/// order: gaps before cancellations. That is an artifact of this function,
/// not a business rule.
pub fn detect_all(
    entries: &[TimetableEntry],
    course: &str,
    day: Weekday,
    now: NaiveTime,
    config: &DetectionConfig,
) -> Vec<FreeSlot> {
    let mut slots = detect_gap_slots(entries, course, day, now, config);
    slots.extend(detect_cancelled_slots(entries, course, day, now, config));
    slots.sort_by_key(|slot| slot.start_time);
    slots
}

/// The first slot containing "now", if any.
///
/// A well-formed timetable yields at most one, but nothing enforces
/// uniqueness here; the first match wins.
pub fn current_slot(slots: &[FreeSlot]) -> Option<&FreeSlot> {
    slots.iter().find(|slot| slot.is_current)
}

/// Upcoming slots in chronological order, truncated to `limit`.
pub fn upcoming_slots(slots: &[FreeSlot], limit: usize) -> Vec<FreeSlot> {
    slots
        .iter()
        .filter(|slot| slot.is_upcoming)
        .take(limit)
        .cloned()
        .collect()
}
