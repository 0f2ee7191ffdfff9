pub mod activity;
pub mod notification;
pub mod slot;
pub mod timetable;

pub use activity::{Activity, ActivityLog, LogStatus, Student, GENERAL_COURSE, KNOWN_CATEGORIES};
pub use notification::Notification;
pub use slot::{DaySummary, FreeSlot, ScheduleItem, SlotReason};
pub use timetable::{day_name, EntryStatus, TimetableEntry, WEEK_DAYS};
