use std::time::Duration;

pub const DEFAULT_RECOMMENDATION_INTERVAL: Duration = Duration::from_secs(3600);
pub const DEFAULT_PROXIMITY_INTERVAL: Duration = Duration::from_secs(1800);
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Cadence, queue size and retry policy of a [`crate::Scheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub recommendation_interval: Duration,
    pub proximity_interval: Duration,
    pub queue_capacity: usize,
    /// Total tries per job, first run included.
    pub max_attempts: u32,
    /// Delay before retry `n` is `n * retry_backoff`.
    pub retry_backoff: Duration,
    /// Sweep every user as soon as the scheduler starts.
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            recommendation_interval: DEFAULT_RECOMMENDATION_INTERVAL,
            proximity_interval: DEFAULT_PROXIMITY_INTERVAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            run_on_start: true,
        }
    }
}
