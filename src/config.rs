use std::time::Duration;

/// Tunable thresholds for detection and the background sweep.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Minimum gap duration (minutes) that counts as actionable free time.
    pub threshold_minutes: i64,

    /// Default cap on upcoming-slot listings.
    pub upcoming_limit: usize,

    /// How many recent completed logs exclude an activity from
    /// personalized recommendations.
    pub recency_window: usize,

    /// Background sweep cadence.
    pub sweep_interval: Duration,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold_minutes: 30,
            upcoming_limit: 5,
            recency_window: 10,
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl DetectionConfig {
    /// Defaults overridden from the environment where set.
    ///
    /// `GAP2GROWTH_THRESHOLD_MINUTES` and `GAP2GROWTH_SWEEP_SECS` are read;
    /// unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("GAP2GROWTH_THRESHOLD_MINUTES") {
            if let Ok(minutes) = value.parse::<i64>() {
                if minutes > 0 {
                    config.threshold_minutes = minutes;
                }
            }
        }

        if let Ok(value) = std::env::var("GAP2GROWTH_SWEEP_SECS") {
            if let Ok(secs) = value.parse::<u64>() {
                if secs > 0 {
                    config.sweep_interval = Duration::from_secs(secs);
                }
            }
        }

        config
    }
}
