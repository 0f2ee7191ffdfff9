//! Demo data for the runnable sweep binary. Seeds a small school so the
//! detection loop has something to chew on out of the box.

use anyhow::Result;
use chrono::Weekday;
use log::info;
use uuid::Uuid;

use crate::models::{Activity, EntryStatus, Student, TimetableEntry};
use crate::store::Database;

fn entry(course: &str, day: Weekday, start: &str, end: &str) -> TimetableEntry {
    TimetableEntry {
        id: Uuid::new_v4().to_string(),
        course: course.to_string(),
        day,
        start_time: start.to_string(),
        end_time: end.to_string(),
        status: EntryStatus::Scheduled,
    }
}

fn activity(
    title: &str,
    category: &str,
    duration: i64,
    difficulty: &str,
    mode: &str,
    course: Option<&str>,
) -> Activity {
    Activity {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        category: category.to_string(),
        duration_minutes: duration,
        difficulty: difficulty.to_string(),
        mode: mode.to_string(),
        course: course.map(str::to_string),
    }
}

/// Seed demo students, timetables, and an activity catalog. No-op when the
/// database already has courses.
pub async fn seed_if_empty(db: &Database) -> Result<()> {
    if !db.get_active_courses().await?.is_empty() {
        return Ok(());
    }

    info!("Seeding demo data");

    let students = [
        Student {
            id: Uuid::new_v4().to_string(),
            name: "Asha Rao".to_string(),
            email: Some("asha@example.edu".to_string()),
            course: Some("Computer Science".to_string()),
        },
        Student {
            id: Uuid::new_v4().to_string(),
            name: "Ben Osei".to_string(),
            email: Some("ben@example.edu".to_string()),
            course: Some("Computer Science".to_string()),
        },
        Student {
            id: Uuid::new_v4().to_string(),
            name: "Carla Mendes".to_string(),
            email: Some("carla@example.edu".to_string()),
            course: Some("Business".to_string()),
        },
    ];
    for student in &students {
        db.insert_student(student).await?;
    }

    // Computer Science: a mid-morning gap every weekday.
    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
        db.insert_entry(&entry("Computer Science", day, "09:00", "10:00")).await?;
        db.insert_entry(&entry("Computer Science", day, "11:00", "12:30")).await?;
        db.insert_entry(&entry("Computer Science", day, "14:00", "15:30")).await?;
    }

    for day in [Weekday::Mon, Weekday::Wed] {
        db.insert_entry(&entry("Business", day, "10:00", "11:30")).await?;
        db.insert_entry(&entry("Business", day, "13:00", "14:30")).await?;
    }

    let catalog = [
        activity("Algorithm flashcards", "Learning", 20, "Easy", "Solo", Some("Computer Science")),
        activity("LeetCode warm-up", "Skill", 30, "Medium", "Solo", Some("Computer Science")),
        activity("Pair debugging kata", "Collaboration", 45, "Medium", "Group", Some("Computer Science")),
        activity("Case study skim", "Learning", 25, "Easy", "Solo", Some("Business")),
        activity("Pitch practice", "Skill", 40, "Hard", "Group", Some("Business")),
        activity("Mindful walk", "Wellness", 15, "Easy", "Solo", None),
        activity("Stretch break", "Wellness", 10, "Easy", "Solo", Some("General")),
        activity("Campus library visit", "Learning", 45, "Easy", "Solo", None),
    ];
    for item in &catalog {
        db.insert_activity(item).await?;
    }

    info!("Demo data seeded: {} students, {} activities", students.len(), catalog.len());
    Ok(())
}
