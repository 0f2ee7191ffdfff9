//! Activity catalog and student history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categories the catalog editor offers by default. Teachers may define new
/// ones, so `Activity::category` stays an open string; this set is only used
/// for boundary validation and grouping.
pub const KNOWN_CATEGORIES: [&str; 4] = ["Learning", "Skill", "Wellness", "Collaboration"];

/// Course key that marks an activity as universal, same as a missing course.
pub const GENERAL_COURSE: &str = "General";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub category: String,
    pub duration_minutes: i64,
    pub difficulty: String,
    /// "Solo" or "Group".
    pub mode: String,
    /// `None` or `"General"` means universal: visible to every course.
    pub course: Option<String>,
}

impl Activity {
    /// Universal activities carry no course restriction.
    pub fn is_universal(&self) -> bool {
        match &self.course {
            None => true,
            Some(course) => course.eq_ignore_ascii_case(GENERAL_COURSE),
        }
    }

    pub fn is_for_course(&self, course: &str) -> bool {
        self.course
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(course))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LogStatus {
    Suggested,
    InProgress,
    Completed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Suggested => "suggested",
            LogStatus::InProgress => "in_progress",
            LogStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "suggested" => Some(LogStatus::Suggested),
            "in_progress" => Some(LogStatus::InProgress),
            "completed" => Some(LogStatus::Completed),
            _ => None,
        }
    }
}

/// One row of a student's activity history, most recent first when fetched.
///
/// The activity's category is denormalized onto the row (a join in the
/// store) so personalization can count categories without a catalog lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub student_id: String,
    pub activity_id: String,
    pub status: LogStatus,
    pub activity_category: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// A student as the identity provider hands it over: verified id, display
/// fields, and an optional course assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub course: Option<String>,
}
