//! Weekly and daily composition of the detector.

use chrono::{NaiveTime, Weekday};

use crate::config::DetectionConfig;
use crate::models::{DaySummary, ScheduleItem, TimetableEntry, WEEK_DAYS};
use crate::timeutil::{is_within, minutes_between, parse_time_of_day};

use super::detector::detect_all;

/// Free-time summary for the whole week.
///
/// Always returns exactly 7 entries, Monday through Sunday, even when a day
/// has no timetable rows; weekly totals depend on every day being present.
pub fn weekly_summary(
    entries: &[TimetableEntry],
    course: &str,
    now: NaiveTime,
    config: &DetectionConfig,
) -> Vec<DaySummary> {
    WEEK_DAYS
        .iter()
        .map(|&day| {
            let slots = detect_all(entries, course, day, now, config);
            let total_free_minutes = slots.iter().map(|s| s.duration_minutes).sum();
            DaySummary {
                day,
                slot_count: slots.len(),
                total_free_minutes,
                slots,
            }
        })
        .collect()
}

/// Chronological agenda for one day: every entry (any status) as a class
/// item, with qualifying gaps interpolated between consecutive entries.
///
/// Unlike the detector, cancelled classes still appear here as schedule
/// items; this is the human-readable agenda, not the free-time signal.
pub fn daily_schedule_with_gaps(
    entries: &[TimetableEntry],
    course: &str,
    day: Weekday,
    now: NaiveTime,
    config: &DetectionConfig,
) -> Vec<ScheduleItem> {
    let mut day_entries: Vec<&TimetableEntry> = entries
        .iter()
        .filter(|e| e.is_for_course(course) && e.day == day)
        .collect();

    day_entries.sort_by_key(|e| parse_time_of_day(&e.start_time).unwrap_or(NaiveTime::MIN));

    let mut schedule = Vec::new();

    for (i, entry) in day_entries.iter().enumerate() {
        schedule.push(ScheduleItem::Class {
            id: entry.id.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            status: entry.status,
        });

        if let Some(next) = day_entries.get(i + 1) {
            let current_end = parse_time_of_day(&entry.end_time);
            let next_start = parse_time_of_day(&next.start_time);

            if let (Some(end), Some(start)) = (current_end, next_start) {
                let gap = minutes_between(end, start);
                if gap >= config.threshold_minutes {
                    schedule.push(ScheduleItem::FreeTime {
                        start_time: end,
                        end_time: start,
                        duration_minutes: gap,
                        is_current: is_within(now, end, start),
                    });
                }
            }
        }
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryStatus;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn entry(id: &str, day: Weekday, start: &str, end: &str, status: EntryStatus) -> TimetableEntry {
        TimetableEntry {
            id: id.to_string(),
            course: "CS".to_string(),
            day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            status,
        }
    }

    #[test]
    fn weekly_summary_always_has_seven_days() {
        let summary = weekly_summary(&[], "CS", t(8, 0), &DetectionConfig::default());
        assert_eq!(summary.len(), 7);
        assert!(summary.iter().all(|d| d.slots.is_empty()));
        assert!(summary.iter().all(|d| d.total_free_minutes == 0));
    }

    #[test]
    fn weekly_summary_totals_per_day() {
        let entries = vec![
            entry("a", Weekday::Mon, "09:00", "10:00", EntryStatus::Scheduled),
            entry("b", Weekday::Mon, "11:00", "12:00", EntryStatus::Scheduled),
            entry("c", Weekday::Wed, "13:00", "14:00", EntryStatus::Cancelled),
        ];

        let summary = weekly_summary(&entries, "CS", t(8, 0), &DetectionConfig::default());
        assert_eq!(summary.len(), 7);

        let monday = &summary[0];
        assert_eq!(monday.day, Weekday::Mon);
        assert_eq!(monday.slot_count, 1);
        assert_eq!(monday.total_free_minutes, 60);

        let wednesday = &summary[2];
        assert_eq!(wednesday.slot_count, 1);
        assert_eq!(wednesday.total_free_minutes, 60);

        let tuesday = &summary[1];
        assert_eq!(tuesday.slot_count, 0);
    }

    #[test]
    fn daily_schedule_includes_cancelled_classes_and_gaps() {
        let entries = vec![
            entry("a", Weekday::Mon, "09:00", "10:00", EntryStatus::Scheduled),
            entry("b", Weekday::Mon, "11:00", "12:00", EntryStatus::Cancelled),
        ];

        let schedule =
            daily_schedule_with_gaps(&entries, "CS", Weekday::Mon, t(8, 0), &DetectionConfig::default());

        assert_eq!(schedule.len(), 3);
        assert!(matches!(&schedule[0], ScheduleItem::Class { id, .. } if id == "a"));
        assert!(matches!(
            &schedule[1],
            ScheduleItem::FreeTime { duration_minutes: 60, .. }
        ));
        assert!(matches!(
            &schedule[2],
            ScheduleItem::Class { status: EntryStatus::Cancelled, .. }
        ));
    }

    #[test]
    fn daily_schedule_skips_sub_threshold_gaps() {
        let entries = vec![
            entry("a", Weekday::Mon, "09:00", "10:00", EntryStatus::Scheduled),
            entry("b", Weekday::Mon, "10:15", "11:00", EntryStatus::Scheduled),
        ];

        let schedule =
            daily_schedule_with_gaps(&entries, "CS", Weekday::Mon, t(8, 0), &DetectionConfig::default());

        assert_eq!(schedule.len(), 2);
        assert!(schedule
            .iter()
            .all(|item| matches!(item, ScheduleItem::Class { .. })));
    }
}
