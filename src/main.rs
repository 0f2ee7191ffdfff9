//! Runnable detection sweep: seeds demo data on first run, then watches the
//! timetable for cancellations and free-time windows, printing every alert
//! an external notifier would deliver.

use std::path::PathBuf;

use anyhow::Result;
use log::info;
use tokio::sync::mpsc;

use gap2growth::config::DetectionConfig;
use gap2growth::demo::seed_if_empty;
use gap2growth::realtime::{SweepController, SweepEvent};
use gap2growth::service::DowntimeService;
use gap2growth::store::Database;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let db_path = std::env::var("GAP2GROWTH_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("gap2growth.db"));

    let db = Database::new(db_path)?;
    seed_if_empty(&db).await?;

    let config = DetectionConfig::from_env();
    let service = DowntimeService::new(db.clone(), config.clone());

    let (events_tx, mut events_rx) = mpsc::channel::<SweepEvent>(64);
    let mut sweep = SweepController::new();
    sweep.start(db, service.tracker(), events_tx, config)?;
    info!("Detection sweep running; Ctrl-C to stop");

    loop {
        tokio::select! {
            Some(event) = events_rx.recv() => match event {
                SweepEvent::Cancellation(alert) => {
                    println!(
                        "[cancelled] {} {} {}-{}: {} min free for {} (suggested: {})",
                        alert.course,
                        alert.day,
                        alert.start_time,
                        alert.end_time,
                        alert.duration_minutes,
                        alert.student_name,
                        alert
                            .recommended
                            .as_ref()
                            .map(|r| r.activity.title.as_str())
                            .unwrap_or("none"),
                    );
                }
                SweepEvent::FreeTime(alert) => {
                    println!(
                        "[free now] student {} in {}: {} min (suggested: {})",
                        alert.student_id,
                        alert.course,
                        alert.slot.duration_minutes,
                        alert
                            .recommended
                            .as_ref()
                            .map(|r| r.activity.title.as_str())
                            .unwrap_or("none"),
                    );
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    sweep.stop().await?;
    Ok(())
}
