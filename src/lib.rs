//! Downtime detection and activity recommendation core for school
//! timetables.
//!
//! The pure pieces (detection, aggregation, scoring, snapshot diffing) take
//! already-fetched rows plus an explicit "now"; the store, service, and
//! sweep wrap them for the hosting process.

pub mod config;
pub mod demo;
pub mod detection;
pub mod models;
pub mod realtime;
pub mod recommend;
pub mod service;
pub mod store;
pub mod timeutil;
pub mod utils;

pub use config::DetectionConfig;
pub use service::{DowntimeService, FreeTimeStatus};
