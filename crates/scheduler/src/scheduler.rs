//! Periodic matching jobs fed through a bounded queue.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use helpix_matching::UserId;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::ScheduleConfig;
use crate::error::{SchedulerError, SchedulerResult};
use crate::retry::retry_with_backoff;
use crate::service::MatchingService;

/// A unit of work for the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchingJob {
    Recommendations(UserId),
    Proximity(UserId),
    RecommendationsForAll,
    ProximityForAll,
}

impl fmt::Display for MatchingJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recommendations(u) => write!(f, "recommendations({u})"),
            Self::Proximity(u) => write!(f, "proximity({u})"),
            Self::RecommendationsForAll => f.write_str("recommendations(*)"),
            Self::ProximityForAll => f.write_str("proximity(*)"),
        }
    }
}

/// Runs [`MatchingJob`]s on one worker task, fed by two interval timers
/// and by [`SchedulerHandle::enqueue`].
pub struct Scheduler {
    service: Arc<MatchingService>,
    config: ScheduleConfig,
}

impl Scheduler {
    pub fn new(service: Arc<MatchingService>, config: ScheduleConfig) -> Self {
        Self { service, config }
    }

    /// Spawn the worker and the timers on the current runtime.
    ///
    /// With `run_on_start` both timers fire once immediately; otherwise the
    /// first sweep happens one interval after startup.
    pub fn spawn(self) -> SchedulerHandle {
        let (jobs_tx, jobs_rx) = mpsc::channel(self.config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tracing::info!(
            target: "helpix::scheduler",
            recommendation_secs = self.config.recommendation_interval.as_secs(),
            proximity_secs = self.config.proximity_interval.as_secs(),
            queue = self.config.queue_capacity,
            "scheduler started"
        );

        let worker = tokio::spawn(run_worker(
            self.service,
            self.config.clone(),
            jobs_rx,
            shutdown_rx.clone(),
        ));
        let timers = tokio::spawn(run_timers(self.config, jobs_tx.clone(), shutdown_rx));

        SchedulerHandle {
            jobs: jobs_tx,
            shutdown: shutdown_tx,
            worker,
            timers,
        }
    }
}

/// Control surface of a running [`Scheduler`].
pub struct SchedulerHandle {
    jobs: mpsc::Sender<MatchingJob>,
    shutdown: watch::Sender<bool>,
    worker: JoinHandle<()>,
    timers: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Queue a job, waiting for room if the queue is full.
    pub async fn enqueue(&self, job: MatchingJob) -> SchedulerResult<()> {
        self.jobs
            .send(job)
            .await
            .map_err(|_| SchedulerError::QueueClosed)
    }

    /// Stop the timers and the worker. A job already running finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for (name, handle) in [("timers", self.timers), ("worker", self.worker)] {
            if let Err(e) = handle.await {
                tracing::warn!(target: "helpix::scheduler", task = name, error = %e, "task ended abnormally");
            }
        }
        tracing::info!(target: "helpix::scheduler", "scheduler stopped");
    }
}

async fn run_worker(
    service: Arc<MatchingService>,
    config: ScheduleConfig,
    mut jobs: mpsc::Receiver<MatchingJob>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let label = job.to_string();
        let outcome = retry_with_backoff(&label, config.max_attempts, config.retry_backoff, || {
            run_job(&service, &job)
        })
        .await;
        if let Err(e) = outcome {
            tracing::error!(target: "helpix::scheduler", job = %label, error = %e, "job failed");
        }
    }
}

async fn run_job(service: &MatchingService, job: &MatchingJob) -> SchedulerResult<()> {
    let now = Utc::now();
    match job {
        MatchingJob::Recommendations(user) => {
            service.refresh_recommendations(user, now).await?;
        }
        MatchingJob::Proximity(user) => {
            service.refresh_proximity_alerts(user, now).await?;
        }
        MatchingJob::RecommendationsForAll => {
            let summary = service.refresh_all_recommendations(now).await?;
            tracing::info!(
                target: "helpix::scheduler",
                refreshed = summary.refreshed,
                skipped = summary.skipped,
                failed = summary.failed,
                "recommendation sweep done"
            );
        }
        MatchingJob::ProximityForAll => {
            let summary = service.refresh_all_proximity_alerts(now).await?;
            tracing::info!(
                target: "helpix::scheduler",
                refreshed = summary.refreshed,
                skipped = summary.skipped,
                failed = summary.failed,
                "proximity sweep done"
            );
        }
    }
    Ok(())
}

async fn run_timers(
    config: ScheduleConfig,
    jobs: mpsc::Sender<MatchingJob>,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = Instant::now();
    let first = |period: Duration| if config.run_on_start { start } else { start + period };
    let mut recommendations = interval_at(
        first(config.recommendation_interval),
        config.recommendation_interval,
    );
    let mut proximity = interval_at(first(config.proximity_interval), config.proximity_interval);
    recommendations.set_missed_tick_behavior(MissedTickBehavior::Delay);
    proximity.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = recommendations.tick() => MatchingJob::RecommendationsForAll,
            _ = proximity.tick() => MatchingJob::ProximityForAll,
        };
        // a full queue already has a sweep pending
        if let Err(e) = jobs.try_send(job) {
            tracing::warn!(target: "helpix::scheduler", error = %e, "dropped scheduled job");
        }
    }
}
