//! Recurring background detection sweep.
//!
//! Each tick snapshots every active course's timetable, diffs it against the
//! previous snapshot for fresh cancellations, and checks whether any student
//! just entered a free slot. Detected events are written as notification
//! rows and emitted on a channel for an external notifier; this module never
//! sends anything itself.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::DetectionConfig;
use crate::detection::{current_slot, detect_all};
use crate::models::{ActivityLog, LogStatus, TimetableEntry};
use crate::recommend::engine::auto_pick;
use crate::store::Database;
use crate::timeutil::fmt_hhmm;

use super::diff::{build_cancellation_alerts, diff_cancellations, FreeTimeAlert};
use super::sessions::SessionTracker;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Events the sweep hands to the hosting process for delivery.
#[derive(Debug, Clone)]
pub enum SweepEvent {
    Cancellation(super::diff::CancellationAlert),
    FreeTime(FreeTimeAlert),
}

/// Per-course timetable snapshots from the previous tick.
pub type SnapshotState = HashMap<String, Vec<TimetableEntry>>;

pub async fn detection_sweep(
    db: Database,
    tracker: Arc<SessionTracker>,
    events_tx: mpsc::Sender<SweepEvent>,
    config: DetectionConfig,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut snapshots = SnapshotState::new();
    let mut rng = StdRng::from_entropy();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let local = Local::now();
                let result = run_sweep_tick(
                    &db,
                    &tracker,
                    &events_tx,
                    &config,
                    &mut snapshots,
                    local.time(),
                    local.weekday(),
                    &mut rng,
                )
                .await;

                if let Err(err) = result {
                    log_error!("detection sweep tick failed: {err:?}");
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("detection sweep shutting down");
                break;
            }
        }
    }
}

/// One sweep pass at a pinned instant.
///
/// Running this twice for the same instant is a no-op the second time: the
/// snapshot replacement means a cancellation only diffs in on the tick that
/// observed the transition, and the session tracker absorbs duplicate
/// free-time claims.
#[allow(clippy::too_many_arguments)]
pub async fn run_sweep_tick(
    db: &Database,
    tracker: &SessionTracker,
    events_tx: &mpsc::Sender<SweepEvent>,
    config: &DetectionConfig,
    snapshots: &mut SnapshotState,
    now: NaiveTime,
    today: Weekday,
    rng: &mut StdRng,
) -> Result<()> {
    let courses = db
        .get_active_courses()
        .await
        .context("failed to list active courses")?;

    for course in courses {
        let current = db
            .get_timetable(&course)
            .await
            .with_context(|| format!("failed to fetch timetable for {course}"))?;

        if let Some(previous) = snapshots.get(&course) {
            handle_cancellations(db, events_tx, previous, &current, &course, rng).await?;
        }

        handle_free_time(db, tracker, events_tx, config, &current, &course, now, today, rng)
            .await?;

        snapshots.insert(course, current);
    }

    Ok(())
}

async fn handle_cancellations(
    db: &Database,
    events_tx: &mpsc::Sender<SweepEvent>,
    previous: &[TimetableEntry],
    current: &[TimetableEntry],
    course: &str,
    rng: &mut StdRng,
) -> Result<()> {
    let cancelled = diff_cancellations(previous, current);
    if cancelled.is_empty() {
        return Ok(());
    }

    let students = db.get_students_by_course(course).await?;
    if students.is_empty() {
        log_warn!("cancellation in {course} but no enrolled students");
        return Ok(());
    }

    let activities = db.get_activities(course).await?;

    let mut logs_by_student: HashMap<String, Vec<ActivityLog>> = HashMap::new();
    for student in &students {
        logs_by_student.insert(student.id.clone(), db.get_activity_logs(&student.id).await?);
    }

    for entry in &cancelled {
        log_info!(
            "class cancellation detected: {} {} {}-{}",
            course,
            entry.day,
            entry.start_time,
            entry.end_time
        );

        let alerts = build_cancellation_alerts(
            entry,
            &students,
            &activities,
            |student_id| logs_by_student.get(student_id).cloned().unwrap_or_default(),
            rng,
        );

        for alert in alerts {
            let message = format!(
                "Class cancelled: {} {}-{}. You now have {} minutes of free time.",
                alert.day, alert.start_time, alert.end_time, alert.duration_minutes
            );
            db.create_notification(&alert.student_id, &message).await?;

            if let Some(pick) = &alert.recommended {
                record_suggestion(db, &alert.student_id, &pick.activity.id).await?;
            }

            if events_tx
                .send(SweepEvent::Cancellation(alert))
                .await
                .is_err()
            {
                log_warn!("sweep event receiver dropped; cancellation alert not delivered");
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_free_time(
    db: &Database,
    tracker: &SessionTracker,
    events_tx: &mpsc::Sender<SweepEvent>,
    config: &DetectionConfig,
    entries: &[TimetableEntry],
    course: &str,
    now: NaiveTime,
    today: Weekday,
    rng: &mut StdRng,
) -> Result<()> {
    let slots = detect_all(entries, course, today, now, config);
    let Some(slot) = current_slot(&slots) else {
        return Ok(());
    };

    let students = db.get_students_by_course(course).await?;
    if students.is_empty() {
        return Ok(());
    }

    let activities = db.get_activities(course).await?;

    for student in &students {
        if !tracker.begin_notification(&student.id, today, slot) {
            continue;
        }

        let remaining = slot.remaining_minutes.unwrap_or(slot.duration_minutes);
        let message = format!(
            "Free time now: {} minutes remaining until {}.",
            remaining,
            fmt_hhmm(slot.end_time)
        );
        db.create_notification(&student.id, &message).await?;

        let logs = db.get_activity_logs(&student.id).await?;
        let recommended = auto_pick(&activities, &logs, course, slot.duration_minutes, rng);

        if let Some(pick) = &recommended {
            record_suggestion(db, &student.id, &pick.activity.id).await?;
        }

        let alert = FreeTimeAlert {
            student_id: student.id.clone(),
            course: course.to_string(),
            slot: slot.clone(),
            recommended,
        };

        if events_tx.send(SweepEvent::FreeTime(alert)).await.is_err() {
            log_warn!("sweep event receiver dropped; free-time alert not delivered");
        }
    }

    Ok(())
}

/// Log the auto-pick as a "suggested" history row so the student sees it and
/// later personalization can account for it.
async fn record_suggestion(db: &Database, student_id: &str, activity_id: &str) -> Result<()> {
    let log = ActivityLog {
        id: uuid::Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        activity_id: activity_id.to_string(),
        status: LogStatus::Suggested,
        activity_category: None,
        started_at: chrono::Utc::now(),
        ended_at: None,
    };
    db.insert_activity_log(&log).await
}

/// Owns the sweep task: start spawns it, stop cancels and joins.
pub struct SweepController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SweepController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start(
        &mut self,
        db: Database,
        tracker: Arc<SessionTracker>,
        events_tx: mpsc::Sender<SweepEvent>,
        config: DetectionConfig,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("sweep already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(detection_sweep(db, tracker, events_tx, config, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("detection sweep task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Default for SweepController {
    fn default() -> Self {
        Self::new()
    }
}
