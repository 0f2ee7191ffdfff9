//! Time-of-day parsing and arithmetic.
//!
//! Timetable rows carry their times as raw strings in whatever format the
//! upstream editor saved them. Everything here is same-calendar-day math;
//! there is no timezone and no midnight wraparound.

use chrono::NaiveTime;

/// Accepted time formats, tried in order.
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M", "%I:%M %p"];

/// Parse a time-of-day string, trying "HH:MM:SS", "HH:MM", then "hh:mm AM/PM".
///
/// Returns `None` if no format matches. Callers skip the offending entry
/// instead of failing the whole computation; one malformed row must not
/// abort scanning the rest of the timetable.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
}

/// Minutes from `earlier` to `later` on the same calendar day.
///
/// Negative when `earlier > later`; used as a duration sign check, never
/// wrapped to the next day.
pub fn minutes_between(earlier: NaiveTime, later: NaiveTime) -> i64 {
    (later - earlier).num_minutes()
}

/// Half-open interval test: `start <= check < end`.
pub fn is_within(check: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    start <= check && check < end
}

/// Render a time as "HH:MM" for notification payloads.
pub fn fmt_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_all_three_formats() {
        assert_eq!(parse_time_of_day("09:30:00"), Some(t(9, 30)));
        assert_eq!(parse_time_of_day("09:30"), Some(t(9, 30)));
        assert_eq!(parse_time_of_day("02:15 PM"), Some(t(14, 15)));
        assert_eq!(parse_time_of_day("12:00 AM"), Some(t(0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_time_of_day(""), None);
        assert_eq!(parse_time_of_day("noon"), None);
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day("09:61"), None);
    }

    #[test]
    fn minutes_between_is_signed() {
        assert_eq!(minutes_between(t(10, 0), t(11, 0)), 60);
        assert_eq!(minutes_between(t(11, 0), t(10, 0)), -60);
        assert_eq!(minutes_between(t(9, 15), t(9, 15)), 0);
    }

    #[test]
    fn is_within_is_half_open() {
        assert!(is_within(t(10, 0), t(10, 0), t(11, 0)));
        assert!(is_within(t(10, 59), t(10, 0), t(11, 0)));
        assert!(!is_within(t(11, 0), t(10, 0), t(11, 0)));
        assert!(!is_within(t(9, 59), t(10, 0), t(11, 0)));
    }

    #[test]
    fn formats_hhmm() {
        assert_eq!(fmt_hhmm(t(9, 5)), "09:05");
        assert_eq!(fmt_hhmm(t(14, 30)), "14:30");
    }
}
