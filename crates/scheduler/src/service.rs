//! Matching runs over a store: load, score, persist, notify.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use helpix_matching::{
    find_best_matches, generate_proximity_alerts, run_recommendations, CompatibilityScorer,
    MatchResult, MatchingSettings, ProximityAlert, Recommendation, Scorer, SettingsOverrides,
    TaskId, TaskMatchingProfile, UserId, UserProfile,
};
use helpix_state::{HistoryEntry, MatchingStore, Notifier};

use crate::error::{SchedulerError, SchedulerResult};

/// Outcome of a recommendation refresh for one user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationRefresh {
    pub generated: Vec<Recommendation>,
    /// Recommendations that were not already live.
    pub fresh: usize,
    pub notified: bool,
}

/// Outcome of a proximity refresh for one user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityRefresh {
    pub alerts: Vec<ProximityAlert>,
    pub fresh: usize,
    pub notified: bool,
}

/// Totals of a refresh over every user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub refreshed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Wires the pure matching core to a store and a notifier.
pub struct MatchingService {
    store: Arc<dyn MatchingStore>,
    notifier: Arc<dyn Notifier>,
    scorer: CompatibilityScorer,
    defaults: SettingsOverrides,
}

impl MatchingService {
    pub fn new(store: Arc<dyn MatchingStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            scorer: CompatibilityScorer::new(),
            defaults: SettingsOverrides::default(),
        }
    }

    /// Site-wide settings applied beneath each user's stored row.
    pub fn with_defaults(mut self, defaults: SettingsOverrides) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn store(&self) -> &Arc<dyn MatchingStore> {
        &self.store
    }

    /// Effective settings: built-in defaults, then site defaults, then the
    /// user's stored row.
    pub async fn settings_for(&self, user: &UserId) -> SchedulerResult<MatchingSettings> {
        let row = self.store.settings(user).await?.unwrap_or_default();
        Ok(MatchingSettings::for_user(user.clone())
            .merged(&self.defaults)
            .merged(&row))
    }

    /// Overlay `update` on the user's stored row and return the effective settings.
    pub async fn update_settings(
        &self,
        user: &UserId,
        update: SettingsOverrides,
    ) -> SchedulerResult<MatchingSettings> {
        self.load_user(user).await?;
        self.store.update_settings(user, update).await?;
        self.settings_for(user).await
    }

    async fn load_user(&self, id: &UserId) -> SchedulerResult<UserProfile> {
        self.store
            .user(id)
            .await?
            .ok_or_else(|| SchedulerError::UserNotFound(id.clone()))
    }

    async fn load_task(&self, id: &TaskId) -> SchedulerResult<TaskMatchingProfile> {
        self.store
            .task(id)
            .await?
            .map(|t| TaskMatchingProfile::from(&t))
            .ok_or_else(|| SchedulerError::TaskNotFound(id.clone()))
    }

    /// The user's profile with their settings applied.
    async fn snapshot(&self, id: &UserId) -> SchedulerResult<(UserProfile, MatchingSettings)> {
        let user = self.load_user(id).await?;
        let settings = self.settings_for(id).await?;
        let snapshot = settings.apply_to(&user);
        Ok((snapshot, settings))
    }

    /// Score one user against one task.
    pub async fn score_pair(&self, user: &UserId, task: &TaskId) -> SchedulerResult<MatchResult> {
        let (snapshot, _) = self.snapshot(user).await?;
        let task = self.load_task(task).await?;
        Ok(self.scorer.score(&snapshot, &task))
    }

    /// Generate, persist and announce recommendations for `user`.
    pub async fn refresh_recommendations(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> SchedulerResult<RecommendationRefresh> {
        let (snapshot, settings) = self.snapshot(user).await?;
        let pool = self.store.open_tasks().await?;
        let run = run_recommendations(&self.scorer, &snapshot, &pool, &settings, now);

        let fresh = self
            .store
            .upsert_recommendations(user, run.recommendations.clone(), now)
            .await?;
        if !run.results.is_empty() {
            self.store
                .record_history(
                    user,
                    HistoryEntry {
                        recorded_at: now,
                        results: run.results,
                    },
                )
                .await?;
        }

        let mut notified = false;
        if !fresh.is_empty() && snapshot.preferences.notify_recommendations {
            match self.notifier.recommendations_ready(user, &fresh).await {
                Ok(()) => notified = true,
                Err(e) => tracing::warn!(
                    target: "helpix::scheduler",
                    user = %user,
                    error = %e,
                    "failed to deliver recommendation notification"
                ),
            }
        }

        tracing::info!(
            target: "helpix::scheduler",
            user = %user,
            generated = run.recommendations.len(),
            fresh = fresh.len(),
            "refreshed recommendations"
        );

        Ok(RecommendationRefresh {
            generated: run.recommendations,
            fresh: fresh.len(),
            notified,
        })
    }

    /// Generate, persist and announce proximity alerts within the user's radius.
    pub async fn refresh_proximity_alerts(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> SchedulerResult<ProximityRefresh> {
        let (snapshot, settings) = self.snapshot(user).await?;
        let alerts = self.nearby_tasks(&snapshot, settings.max_distance_km, now).await?;
        let fresh = self
            .store
            .upsert_proximity_alerts(user, alerts.clone())
            .await?;

        let mut notified = false;
        if !fresh.is_empty() && snapshot.preferences.notify_proximity {
            match self.notifier.proximity_alerts(user, &fresh).await {
                Ok(()) => notified = true,
                Err(e) => tracing::warn!(
                    target: "helpix::scheduler",
                    user = %user,
                    error = %e,
                    "failed to deliver proximity notification"
                ),
            }
        }

        tracing::info!(
            target: "helpix::scheduler",
            user = %user,
            alerts = alerts.len(),
            fresh = fresh.len(),
            "refreshed proximity alerts"
        );

        Ok(ProximityRefresh {
            alerts,
            fresh: fresh.len(),
            notified,
        })
    }

    /// Proximity alerts for `user` within `radius_km`, without persisting.
    pub async fn preview_proximity_alerts(
        &self,
        user: &UserId,
        radius_km: Option<f64>,
        now: DateTime<Utc>,
    ) -> SchedulerResult<Vec<ProximityAlert>> {
        let (snapshot, settings) = self.snapshot(user).await?;
        let radius = radius_km.unwrap_or(settings.max_distance_km);
        self.nearby_tasks(&snapshot, radius, now).await
    }

    async fn nearby_tasks(
        &self,
        snapshot: &UserProfile,
        radius_km: f64,
        now: DateTime<Utc>,
    ) -> SchedulerResult<Vec<ProximityAlert>> {
        let pool = self.store.open_tasks().await?;
        Ok(generate_proximity_alerts(snapshot, &pool, radius_km, now))
    }

    /// Recommendations for `user` without persisting anything.
    pub async fn preview_recommendations(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> SchedulerResult<Vec<Recommendation>> {
        let (snapshot, settings) = self.snapshot(user).await?;
        let pool = self.store.open_tasks().await?;
        Ok(run_recommendations(&self.scorer, &snapshot, &pool, &settings, now).recommendations)
    }

    /// Best open tasks for `user`, recorded in the user's history.
    pub async fn best_tasks_for_user(
        &self,
        user: &UserId,
        limit: usize,
        now: DateTime<Utc>,
    ) -> SchedulerResult<Vec<MatchResult>> {
        let (snapshot, _) = self.snapshot(user).await?;
        let candidates: Vec<TaskMatchingProfile> = self
            .store
            .open_tasks()
            .await?
            .iter()
            .filter(|t| !t.is_owned_by(user))
            .map(TaskMatchingProfile::from)
            .collect();
        let results = find_best_matches(&self.scorer, &snapshot, &candidates, limit);
        if !results.is_empty() {
            self.store
                .record_history(
                    user,
                    HistoryEntry {
                        recorded_at: now,
                        results: results.clone(),
                    },
                )
                .await?;
        }
        Ok(results)
    }

    /// Best helpers for `task`, each scored with their own settings applied.
    pub async fn best_helpers_for_task(
        &self,
        task: &TaskId,
        limit: usize,
    ) -> SchedulerResult<Vec<MatchResult>> {
        let profile = self.load_task(task).await?;
        let mut helpers = Vec::new();
        for user in self.store.users().await? {
            if profile.owner.as_ref() == Some(&user.id) {
                continue;
            }
            let settings = self.settings_for(&user.id).await?;
            helpers.push(settings.apply_to(&user));
        }
        Ok(find_best_matches(&self.scorer, &profile, &helpers, limit))
    }

    /// Refresh recommendations for every user with auto matching enabled.
    pub async fn refresh_all_recommendations(&self, now: DateTime<Utc>) -> SchedulerResult<BatchSummary> {
        let purged = self.store.purge_expired(now).await?;
        if purged > 0 {
            tracing::debug!(target: "helpix::scheduler", purged, "purged expired recommendations");
        }
        self.for_each_enabled_user("recommendations", |user| async move {
            self.refresh_recommendations(&user, now).await.map(|_| ())
        })
        .await
    }

    /// Refresh proximity alerts for every user with auto matching enabled.
    pub async fn refresh_all_proximity_alerts(&self, now: DateTime<Utc>) -> SchedulerResult<BatchSummary> {
        self.for_each_enabled_user("proximity", |user| async move {
            self.refresh_proximity_alerts(&user, now).await.map(|_| ())
        })
        .await
    }

    /// Run `f` per enabled user. A user whose settings or refresh fails is
    /// logged and counted; only a failure to list users aborts the batch.
    async fn for_each_enabled_user<F, Fut>(&self, job: &str, f: F) -> SchedulerResult<BatchSummary>
    where
        F: Fn(UserId) -> Fut,
        Fut: std::future::Future<Output = SchedulerResult<()>>,
    {
        let mut summary = BatchSummary::default();
        for user in self.store.users().await? {
            let outcome = match self.settings_for(&user.id).await {
                Ok(settings) if !settings.auto_matching_enabled => {
                    summary.skipped += 1;
                    continue;
                }
                Ok(_) => f(user.id.clone()).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => summary.refreshed += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        target: "helpix::scheduler",
                        job,
                        user = %user.id,
                        error = %e,
                        "refresh failed for user"
                    );
                }
            }
        }
        Ok(summary)
    }
}
