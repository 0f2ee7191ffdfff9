//! The façade external callers (web handlers, report jobs) talk to.
//!
//! Fetches rows from the store, threads the clock into the pure core, and
//! shapes the results. Missing or empty data degrades to empty results;
//! only store failures surface as errors.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Local, NaiveTime, Weekday};
use rand::thread_rng;

use crate::config::DetectionConfig;
use crate::detection::{
    current_slot, daily_schedule_with_gaps, detect_all, upcoming_slots, weekly_summary,
};
use crate::models::{DaySummary, FreeSlot, Notification, ScheduleItem};
use crate::realtime::SessionTracker;
use crate::recommend::{personalize, recommend, RecommendationFilters, ScoredActivity};
use crate::store::Database;

/// Outcome of a student's "am I free right now?" query. `NoCourse` is kept
/// distinct from `Busy` so the caller can render a different message than
/// "zero free time".
#[derive(Debug, Clone)]
pub enum FreeTimeStatus {
    NoCourse,
    Busy,
    Free(FreeSlot),
}

pub struct DowntimeService {
    db: Database,
    tracker: Arc<SessionTracker>,
    config: DetectionConfig,
}

impl DowntimeService {
    pub fn new(db: Database, config: DetectionConfig) -> Self {
        Self {
            db,
            tracker: Arc::new(SessionTracker::new()),
            config,
        }
    }

    pub fn tracker(&self) -> Arc<SessionTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Free slots for a course on `day` (today when `None`).
    pub async fn downtime_for_course(
        &self,
        course: &str,
        day: Option<Weekday>,
    ) -> Result<Vec<FreeSlot>> {
        let local = Local::now();
        let day = day.unwrap_or_else(|| local.weekday());
        self.downtime_for_course_at(course, day, local.time()).await
    }

    /// Same as [`downtime_for_course`](Self::downtime_for_course) with a
    /// pinned clock.
    pub async fn downtime_for_course_at(
        &self,
        course: &str,
        day: Weekday,
        now: NaiveTime,
    ) -> Result<Vec<FreeSlot>> {
        let entries = self.db.get_timetable(course).await?;
        Ok(detect_all(&entries, course, day, now, &self.config))
    }

    /// Upcoming free slots today, chronological, truncated to `limit`
    /// (config default when `None`).
    pub async fn upcoming_free_slots(
        &self,
        course: &str,
        limit: Option<usize>,
    ) -> Result<Vec<FreeSlot>> {
        let slots = self.downtime_for_course(course, None).await?;
        Ok(upcoming_slots(
            &slots,
            limit.unwrap_or(self.config.upcoming_limit),
        ))
    }

    pub async fn weekly_summary(&self, course: &str) -> Result<Vec<DaySummary>> {
        let entries = self.db.get_timetable(course).await?;
        Ok(weekly_summary(
            &entries,
            course,
            Local::now().time(),
            &self.config,
        ))
    }

    /// Chronological agenda of classes (any status) and qualifying gaps for
    /// `day` (today when `None`).
    pub async fn daily_schedule(
        &self,
        course: &str,
        day: Option<Weekday>,
    ) -> Result<Vec<ScheduleItem>> {
        let entries = self.db.get_timetable(course).await?;
        let local = Local::now();
        let day = day.unwrap_or_else(|| local.weekday());
        Ok(daily_schedule_with_gaps(
            &entries,
            course,
            day,
            local.time(),
            &self.config,
        ))
    }

    /// Whether a student is inside a free slot right now.
    pub async fn current_free_time(&self, student_id: &str) -> Result<FreeTimeStatus> {
        let local = Local::now();
        self.current_free_time_at(student_id, local.weekday(), local.time())
            .await
    }

    pub async fn current_free_time_at(
        &self,
        student_id: &str,
        today: Weekday,
        now: NaiveTime,
    ) -> Result<FreeTimeStatus> {
        let Some(student) = self.db.get_student(student_id).await? else {
            return Ok(FreeTimeStatus::NoCourse);
        };
        let Some(course) = student.course else {
            return Ok(FreeTimeStatus::NoCourse);
        };

        let slots = self.downtime_for_course_at(&course, today, now).await?;
        Ok(match current_slot(&slots) {
            Some(slot) => FreeTimeStatus::Free(slot.clone()),
            None => FreeTimeStatus::Busy,
        })
    }

    /// Ranked activities fitting the budget.
    pub async fn recommendations(
        &self,
        course: &str,
        budget_minutes: i64,
        filters: &RecommendationFilters,
    ) -> Result<Vec<ScoredActivity>> {
        let activities = self.db.get_activities(course).await?;
        Ok(recommend(
            &activities,
            course,
            budget_minutes,
            filters,
            &mut thread_rng(),
        ))
    }

    /// History-aware ranked activities for one student.
    pub async fn personalized(
        &self,
        student_id: &str,
        course: &str,
        budget_minutes: i64,
    ) -> Result<Vec<ScoredActivity>> {
        let activities = self.db.get_activities(course).await?;
        let logs = self.db.get_activity_logs(student_id).await?;
        Ok(personalize(
            &activities,
            &logs,
            course,
            budget_minutes,
            self.config.recency_window,
            &mut thread_rng(),
        ))
    }

    pub async fn notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>> {
        self.db.get_notifications(user_id, limit).await
    }
}
