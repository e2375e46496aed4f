//! Orchestration around the pure matching core.
//!
//! [`MatchingService`] loads profiles and settings from a
//! [`helpix_state::MatchingStore`], runs the scoring core, persists the
//! results and notifies users. [`Scheduler`] drives the service from a
//! bounded job queue and two interval timers, retrying transient failures.

pub mod config;
pub mod error;
pub mod retry;
pub mod scheduler;
pub mod service;

pub use config::ScheduleConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use retry::retry_with_backoff;
pub use scheduler::{MatchingJob, Scheduler, SchedulerHandle};
pub use service::{BatchSummary, MatchingService, ProximityRefresh, RecommendationRefresh};
