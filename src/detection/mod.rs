pub mod detector;
pub mod schedule;

pub use detector::{current_slot, detect_all, detect_cancelled_slots, detect_gap_slots, upcoming_slots};
pub use schedule::{daily_schedule_with_gaps, weekly_summary};
