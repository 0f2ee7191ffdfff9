pub mod diff;
pub mod sessions;
pub mod sweep;

pub use diff::{build_cancellation_alerts, diff_cancellations, CancellationAlert, FreeTimeAlert};
pub use sessions::SessionTracker;
pub use sweep::{detection_sweep, run_sweep_tick, SweepController, SweepEvent};
