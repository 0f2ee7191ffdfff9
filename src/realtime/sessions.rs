//! At-most-once guard for "you are now free" notifications.
//!
//! Owned by the hosting process and injected into whatever touches it (the
//! sweep and any request handler), never a process global. State lives only
//! in memory; a restart clears it, which at worst re-notifies once.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveTime, Weekday};

use crate::models::FreeSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
struct NotifiedWindow {
    start: NaiveTime,
    end: NaiveTime,
}

/// Tracks which (student, day) pairs were already notified for which slot
/// window. Both the background sweep and concurrent request handlers may
/// call in, so the map sits behind a mutex and the check-and-set is atomic:
/// two racing "first check of the day" calls cannot both win.
#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: Mutex<HashMap<(String, Weekday), NotifiedWindow>>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the notification for this student/day/slot. Returns `true` when
    /// the caller won and should notify; `false` when this exact window was
    /// already claimed. A different window for the same day (e.g. a later
    /// gap) counts as fresh and replaces the stored one.
    pub fn begin_notification(&self, student_id: &str, day: Weekday, slot: &FreeSlot) -> bool {
        let window = NotifiedWindow {
            start: slot.start_time,
            end: slot.end_time,
        };

        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let key = (student_id.to_string(), day);

        match sessions.get(&key) {
            Some(existing) if *existing == window => false,
            _ => {
                sessions.insert(key, window);
                true
            }
        }
    }

    /// Whether any slot was already notified for this student/day.
    pub fn has_been_notified(&self, student_id: &str, day: Weekday) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.contains_key(&(student_id.to_string(), day))
    }

    /// Number of tracked sessions, for status reporting.
    pub fn active_count(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotReason;

    fn slot(start_h: u32, end_h: u32) -> FreeSlot {
        FreeSlot {
            course: "CS".to_string(),
            day: Weekday::Mon,
            start_time: NaiveTime::from_hms_opt(start_h, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end_h, 0, 0).unwrap(),
            duration_minutes: 60 * (end_h - start_h) as i64,
            reason: SlotReason::TimetableGap,
            is_current: true,
            is_upcoming: false,
            remaining_minutes: Some(30),
            starts_in_minutes: None,
        }
    }

    #[test]
    fn second_claim_for_same_window_loses() {
        let tracker = SessionTracker::new();
        let s = slot(10, 11);

        assert!(tracker.begin_notification("s1", Weekday::Mon, &s));
        assert!(!tracker.begin_notification("s1", Weekday::Mon, &s));
        assert!(tracker.has_been_notified("s1", Weekday::Mon));
    }

    #[test]
    fn different_slot_window_allows_fresh_notification() {
        let tracker = SessionTracker::new();

        assert!(tracker.begin_notification("s1", Weekday::Mon, &slot(10, 11)));
        assert!(tracker.begin_notification("s1", Weekday::Mon, &slot(13, 14)));
        // Replayed earlier window is now "different" again; it replaces.
        assert!(tracker.begin_notification("s1", Weekday::Mon, &slot(10, 11)));
    }

    #[test]
    fn days_and_students_are_independent() {
        let tracker = SessionTracker::new();
        let s = slot(10, 11);

        assert!(tracker.begin_notification("s1", Weekday::Mon, &s));
        assert!(tracker.begin_notification("s1", Weekday::Tue, &s));
        assert!(tracker.begin_notification("s2", Weekday::Mon, &s));
        assert_eq!(tracker.active_count(), 3);
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        use std::sync::Arc;

        let tracker = Arc::new(SessionTracker::new());
        let s = slot(10, 11);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let s = s.clone();
                std::thread::spawn(move || tracker.begin_notification("s1", Weekday::Mon, &s))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }
}
