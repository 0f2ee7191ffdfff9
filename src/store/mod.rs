//! SQLite persistence behind a dedicated worker thread.
//!
//! All database access funnels through one connection owned by a worker
//! thread; callers submit closures over an mpsc channel and await the reply
//! on a oneshot. This keeps the async callers free of connection locking
//! while staying on a single embedded database.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc, Weekday};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use tokio::sync::oneshot;
use uuid::Uuid;

mod migrations;

use crate::models::{
    day_name, Activity, ActivityLog, EntryStatus, LogStatus, Notification, Student,
    TimetableEntry, GENERAL_COURSE,
};
use migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

fn entry_status_from_str(value: &str) -> Result<EntryStatus> {
    EntryStatus::parse(value).ok_or_else(|| anyhow!("unknown entry status '{value}'"))
}

fn log_status_from_str(value: &str) -> Result<LogStatus> {
    LogStatus::parse(value).ok_or_else(|| anyhow!("unknown log status '{value}'"))
}

fn weekday_from_str(value: &str) -> Result<Weekday> {
    Weekday::from_str(value).map_err(|_| anyhow!("unknown day name '{value}'"))
}

fn entry_from_row(row: &Row<'_>) -> Result<TimetableEntry> {
    Ok(TimetableEntry {
        id: row.get::<_, String>(0)?,
        course: row.get::<_, String>(1)?,
        day: weekday_from_str(&row.get::<_, String>(2)?)?,
        start_time: row.get::<_, String>(3)?,
        end_time: row.get::<_, String>(4)?,
        status: entry_status_from_str(&row.get::<_, String>(5)?)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> Result<Activity> {
    Ok(Activity {
        id: row.get::<_, String>(0)?,
        title: row.get::<_, String>(1)?,
        category: row.get::<_, String>(2)?,
        duration_minutes: row.get::<_, i64>(3)?,
        difficulty: row.get::<_, String>(4)?,
        mode: row.get::<_, String>(5)?,
        course: row.get::<_, Option<String>>(6)?,
    })
}

fn student_from_row(row: &Row<'_>) -> Result<Student> {
    Ok(Student {
        id: row.get::<_, String>(0)?,
        name: row.get::<_, String>(1)?,
        email: row.get::<_, Option<String>>(2)?,
        course: row.get::<_, Option<String>>(3)?,
    })
}

#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("gap2growth-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    // --- users ---

    pub async fn insert_student(&self, student: &Student) -> Result<()> {
        let record = student.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, course) VALUES (?1, ?2, ?3, ?4)",
                params![record.id, record.name, record.email, record.course],
            )
            .with_context(|| "failed to insert student")?;
            Ok(())
        })
        .await
    }

    pub async fn get_student(&self, student_id: &str) -> Result<Option<Student>> {
        let student_id = student_id.to_string();
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, email, course FROM users WHERE id = ?1")?;
            let mut rows = stmt.query(params![student_id])?;

            match rows.next()? {
                Some(row) => Ok(Some(student_from_row(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn get_students_by_course(&self, course: &str) -> Result<Vec<Student>> {
        let course = course.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, email, course FROM users
                 WHERE course IS NOT NULL AND lower(course) = lower(?1)
                 ORDER BY name",
            )?;

            let mut rows = stmt.query(params![course])?;
            let mut students = Vec::new();
            while let Some(row) = rows.next()? {
                students.push(student_from_row(row)?);
            }
            Ok(students)
        })
        .await
    }

    /// Distinct courses with at least one enrolled student; the sweep's
    /// working set.
    pub async fn get_active_courses(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT course FROM users WHERE course IS NOT NULL ORDER BY course",
            )?;

            let mut rows = stmt.query([])?;
            let mut courses = Vec::new();
            while let Some(row) = rows.next()? {
                courses.push(row.get::<_, String>(0)?);
            }
            Ok(courses)
        })
        .await
    }

    // --- timetable ---

    pub async fn insert_entry(&self, entry: &TimetableEntry) -> Result<()> {
        let record = entry.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO timetable (id, course, day, start_time, end_time, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.course,
                    day_name(record.day),
                    record.start_time,
                    record.end_time,
                    record.status.as_str(),
                ],
            )
            .with_context(|| "failed to insert timetable entry")?;
            Ok(())
        })
        .await
    }

    pub async fn get_timetable(&self, course: &str) -> Result<Vec<TimetableEntry>> {
        let course = course.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, course, day, start_time, end_time, status FROM timetable
                 WHERE lower(course) = lower(?1)",
            )?;

            let mut rows = stmt.query(params![course])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(entry_from_row(row)?);
            }
            Ok(entries)
        })
        .await
    }

    pub async fn update_entry_status(&self, entry_id: &str, status: EntryStatus) -> Result<()> {
        let entry_id = entry_id.to_string();
        self.execute(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE timetable SET status = ?1 WHERE id = ?2",
                    params![status.as_str(), entry_id],
                )
                .with_context(|| "failed to update timetable entry status")?;

            if updated == 0 {
                return Err(anyhow!("no timetable entry with id '{entry_id}'"));
            }
            Ok(())
        })
        .await
    }

    // --- activities ---

    pub async fn insert_activity(&self, activity: &Activity) -> Result<()> {
        let record = activity.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO activities
                 (id, title, category, duration_minutes, difficulty, mode, course)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.title,
                    record.category,
                    record.duration_minutes,
                    record.difficulty,
                    record.mode,
                    record.course,
                ],
            )
            .with_context(|| "failed to insert activity")?;
            Ok(())
        })
        .await
    }

    /// Activities visible to a course: department-specific, course-less, and
    /// "General"-tagged rows.
    pub async fn get_activities(&self, course: &str) -> Result<Vec<Activity>> {
        let course = course.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, category, duration_minutes, difficulty, mode, course
                 FROM activities
                 WHERE course IS NULL
                    OR lower(course) = lower(?1)
                    OR lower(course) = lower(?2)",
            )?;

            let mut rows = stmt.query(params![course, GENERAL_COURSE])?;
            let mut activities = Vec::new();
            while let Some(row) = rows.next()? {
                activities.push(activity_from_row(row)?);
            }
            Ok(activities)
        })
        .await
    }

    // --- activity logs ---

    pub async fn insert_activity_log(&self, log: &ActivityLog) -> Result<()> {
        let record = log.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO activity_logs (id, student_id, activity_id, status, started_at, ended_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.student_id,
                    record.activity_id,
                    record.status.as_str(),
                    record.started_at.to_rfc3339(),
                    record.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
                ],
            )
            .with_context(|| "failed to insert activity log")?;
            Ok(())
        })
        .await
    }

    /// A student's history, most recent first, each row joined with the
    /// activity's category for personalization.
    pub async fn get_activity_logs(&self, student_id: &str) -> Result<Vec<ActivityLog>> {
        let student_id = student_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.student_id, l.activity_id, l.status, a.category,
                        l.started_at, l.ended_at
                 FROM activity_logs l
                 LEFT JOIN activities a ON a.id = l.activity_id
                 WHERE l.student_id = ?1
                 ORDER BY l.started_at DESC",
            )?;

            let mut rows = stmt.query(params![student_id])?;
            let mut logs = Vec::new();
            while let Some(row) = rows.next()? {
                logs.push(ActivityLog {
                    id: row.get::<_, String>(0)?,
                    student_id: row.get::<_, String>(1)?,
                    activity_id: row.get::<_, String>(2)?,
                    status: log_status_from_str(&row.get::<_, String>(3)?)?,
                    activity_category: row.get::<_, Option<String>>(4)?,
                    started_at: parse_datetime(&row.get::<_, String>(5)?)?,
                    ended_at: row
                        .get::<_, Option<String>>(6)?
                        .map(|s| parse_datetime(&s))
                        .transpose()?,
                });
            }
            Ok(logs)
        })
        .await
    }

    // --- notifications ---

    pub async fn create_notification(&self, user_id: &str, message: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let record_id = id.clone();
        let user_id = user_id.to_string();
        let message = message.to_string();

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO notifications (id, user_id, message, created_at, read)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![record_id, user_id, message, Utc::now().to_rfc3339()],
            )
            .with_context(|| "failed to insert notification")?;
            Ok(())
        })
        .await?;

        Ok(id)
    }

    pub async fn get_notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, message, created_at, read FROM notifications
                 WHERE user_id = ?1
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )?;

            let mut rows = stmt.query(params![user_id, limit as i64])?;
            let mut notifications = Vec::new();
            while let Some(row) = rows.next()? {
                notifications.push(Notification {
                    id: row.get::<_, String>(0)?,
                    user_id: row.get::<_, String>(1)?,
                    message: row.get::<_, String>(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?)?,
                    read: row.get::<_, i64>(4)? != 0,
                });
            }
            Ok(notifications)
        })
        .await
    }
}
