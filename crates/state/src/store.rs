use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use helpix_matching::{
    MatchingSettings, ProximityAlert, Recommendation, SettingsOverrides, Task, TaskId, UserId,
    UserProfile,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::records::{HistoryEntry, RecommendationAction, HISTORY_LIMIT};

/// Read and write access to everything a matching run touches.
#[async_trait]
pub trait MatchingStore: Send + Sync {
    async fn upsert_user(&self, user: UserProfile) -> StoreResult<()>;
    async fn user(&self, id: &UserId) -> StoreResult<Option<UserProfile>>;
    async fn users(&self) -> StoreResult<Vec<UserProfile>>;

    async fn upsert_task(&self, task: Task) -> StoreResult<()>;
    async fn task(&self, id: &TaskId) -> StoreResult<Option<Task>>;
    /// Tasks still open or in progress.
    async fn open_tasks(&self) -> StoreResult<Vec<Task>>;

    /// The user's stored settings row, if one was ever written.
    async fn settings(&self, user: &UserId) -> StoreResult<Option<SettingsOverrides>>;
    /// Overlay `update` on the stored row and return the merged row.
    async fn update_settings(
        &self,
        user: &UserId,
        update: SettingsOverrides,
    ) -> StoreResult<SettingsOverrides>;

    /// Upsert by (user, task). The user's live recommendations for tasks
    /// absent from `recs` are retired unless accepted or dismissed. Returns
    /// the recommendations that were not already live for the user.
    async fn upsert_recommendations(
        &self,
        user: &UserId,
        recs: Vec<Recommendation>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Recommendation>>;
    /// Unexpired recommendations, best first.
    async fn recommendations(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Recommendation>>;
    async fn act_on_recommendation(
        &self,
        id: Uuid,
        action: RecommendationAction,
        now: DateTime<Utc>,
    ) -> StoreResult<Recommendation>;
    /// Drop expired recommendations. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize>;

    /// Replace the user's alerts, keeping id and viewed flag for tasks
    /// already alerted. Returns the alerts for tasks not alerted before.
    async fn upsert_proximity_alerts(
        &self,
        user: &UserId,
        alerts: Vec<ProximityAlert>,
    ) -> StoreResult<Vec<ProximityAlert>>;
    async fn proximity_alerts(&self, user: &UserId) -> StoreResult<Vec<ProximityAlert>>;
    async fn mark_alert_viewed(&self, id: Uuid) -> StoreResult<ProximityAlert>;

    async fn record_history(&self, user: &UserId, entry: HistoryEntry) -> StoreResult<()>;
    /// Most recent first.
    async fn history(&self, user: &UserId, limit: usize) -> StoreResult<Vec<HistoryEntry>>;
}

/// Serialized contents of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub users: BTreeMap<UserId, UserProfile>,
    pub tasks: BTreeMap<TaskId, Task>,
    pub settings: BTreeMap<UserId, SettingsOverrides>,
    pub recommendations: Vec<Recommendation>,
    pub alerts: Vec<ProximityAlert>,
    pub history: BTreeMap<UserId, Vec<HistoryEntry>>,
}

impl StoreData {
    fn open_tasks(&self) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.status.is_actionable())
            .cloned()
            .collect()
    }

    fn update_settings(&mut self, user: &UserId, update: &SettingsOverrides) -> SettingsOverrides {
        let row = self.settings.entry(user.clone()).or_default();
        row.overlay(update);
        row.clone()
    }

    fn upsert_recommendations(
        &mut self,
        user: &UserId,
        recs: Vec<Recommendation>,
        now: DateTime<Utc>,
    ) -> Vec<Recommendation> {
        let current: HashSet<TaskId> = recs.iter().map(|r| r.task_id.clone()).collect();
        let before = self.recommendations.len();
        self.recommendations.retain(|r| {
            &r.user_id != user
                || r.accepted
                || r.dismissed
                || r.is_expired(now)
                || current.contains(&r.task_id)
        });
        let retired = before - self.recommendations.len();
        if retired > 0 {
            tracing::debug!(target: "helpix::state", user = %user, retired, "retired stale recommendations");
        }

        let mut fresh = Vec::new();
        for mut rec in recs {
            let existing = self
                .recommendations
                .iter()
                .position(|r| &r.user_id == user && r.task_id == rec.task_id);
            match existing {
                Some(i) => {
                    let old = &self.recommendations[i];
                    rec.dismissed = old.dismissed;
                    if old.is_expired(now) {
                        if !rec.dismissed {
                            fresh.push(rec.clone());
                        }
                    } else {
                        rec.id = old.id;
                        rec.viewed = old.viewed;
                        rec.accepted = old.accepted;
                        rec.created_at = old.created_at;
                    }
                    self.recommendations[i] = rec;
                }
                None => {
                    fresh.push(rec.clone());
                    self.recommendations.push(rec);
                }
            }
        }
        fresh
    }

    fn recommendations(&self, user: &UserId, now: DateTime<Utc>) -> Vec<Recommendation> {
        let mut live: Vec<Recommendation> = self
            .recommendations
            .iter()
            .filter(|r| &r.user_id == user && !r.is_expired(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.task_id.cmp(&b.task_id))
        });
        live
    }

    fn act_on_recommendation(
        &mut self,
        id: Uuid,
        action: RecommendationAction,
        now: DateTime<Utc>,
    ) -> StoreResult<Recommendation> {
        let rec = self
            .recommendations
            .iter_mut()
            .find(|r| r.id == id && !r.is_expired(now))
            .ok_or_else(|| StoreError::not_found("recommendation", id))?;
        match action {
            RecommendationAction::View => rec.viewed = true,
            RecommendationAction::Accept => {
                if rec.dismissed {
                    return Err(StoreError::Conflict(format!(
                        "recommendation {id} was dismissed"
                    )));
                }
                rec.viewed = true;
                rec.accepted = true;
            }
            RecommendationAction::Dismiss => {
                if rec.accepted {
                    return Err(StoreError::Conflict(format!(
                        "recommendation {id} was accepted"
                    )));
                }
                rec.dismissed = true;
            }
        }
        Ok(rec.clone())
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.recommendations.len();
        self.recommendations.retain(|r| !r.is_expired(now));
        before - self.recommendations.len()
    }

    fn upsert_proximity_alerts(
        &mut self,
        user: &UserId,
        alerts: Vec<ProximityAlert>,
    ) -> Vec<ProximityAlert> {
        let (previous, others): (Vec<_>, Vec<_>) = std::mem::take(&mut self.alerts)
            .into_iter()
            .partition(|a| &a.user_id == user);
        self.alerts = others;

        let mut seen = HashSet::new();
        let mut fresh = Vec::new();
        for mut alert in alerts {
            if !seen.insert(alert.task_id.clone()) {
                continue;
            }
            match previous.iter().find(|p| p.task_id == alert.task_id) {
                Some(old) => {
                    alert.id = old.id;
                    alert.viewed = old.viewed;
                    alert.created_at = old.created_at;
                }
                None => fresh.push(alert.clone()),
            }
            self.alerts.push(alert);
        }
        fresh
    }

    fn proximity_alerts(&self, user: &UserId) -> Vec<ProximityAlert> {
        let mut alerts: Vec<ProximityAlert> = self
            .alerts
            .iter()
            .filter(|a| &a.user_id == user)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.task_id.cmp(&b.task_id))
        });
        alerts
    }

    fn mark_alert_viewed(&mut self, id: Uuid) -> StoreResult<ProximityAlert> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("alert", id))?;
        alert.viewed = true;
        Ok(alert.clone())
    }

    fn record_history(&mut self, user: &UserId, entry: HistoryEntry) {
        let entries = self.history.entry(user.clone()).or_default();
        entries.push(entry);
        if entries.len() > HISTORY_LIMIT {
            let excess = entries.len() - HISTORY_LIMIT;
            entries.drain(0..excess);
        }
    }

    fn history(&self, user: &UserId, limit: usize) -> Vec<HistoryEntry> {
        self.history
            .get(user)
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<StoreData>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> StoreData {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl MatchingStore for MemStore {
    async fn upsert_user(&self, user: UserProfile) -> StoreResult<()> {
        let mut guard = self.inner.lock().await;
        guard.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn user(&self, id: &UserId) -> StoreResult<Option<UserProfile>> {
        Ok(self.inner.lock().await.users.get(id).cloned())
    }

    async fn users(&self) -> StoreResult<Vec<UserProfile>> {
        Ok(self.inner.lock().await.users.values().cloned().collect())
    }

    async fn upsert_task(&self, task: Task) -> StoreResult<()> {
        let mut guard = self.inner.lock().await;
        guard.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    async fn task(&self, id: &TaskId) -> StoreResult<Option<Task>> {
        Ok(self.inner.lock().await.tasks.get(id).cloned())
    }

    async fn open_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.inner.lock().await.open_tasks())
    }

    async fn settings(&self, user: &UserId) -> StoreResult<Option<SettingsOverrides>> {
        Ok(self.inner.lock().await.settings.get(user).cloned())
    }

    async fn update_settings(
        &self,
        user: &UserId,
        update: SettingsOverrides,
    ) -> StoreResult<SettingsOverrides> {
        Ok(self.inner.lock().await.update_settings(user, &update))
    }

    async fn upsert_recommendations(
        &self,
        user: &UserId,
        recs: Vec<Recommendation>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Recommendation>> {
        Ok(self.inner.lock().await.upsert_recommendations(user, recs, now))
    }

    async fn recommendations(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Recommendation>> {
        Ok(self.inner.lock().await.recommendations(user, now))
    }

    async fn act_on_recommendation(
        &self,
        id: Uuid,
        action: RecommendationAction,
        now: DateTime<Utc>,
    ) -> StoreResult<Recommendation> {
        self.inner.lock().await.act_on_recommendation(id, action, now)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        Ok(self.inner.lock().await.purge_expired(now))
    }

    async fn upsert_proximity_alerts(
        &self,
        user: &UserId,
        alerts: Vec<ProximityAlert>,
    ) -> StoreResult<Vec<ProximityAlert>> {
        Ok(self.inner.lock().await.upsert_proximity_alerts(user, alerts))
    }

    async fn proximity_alerts(&self, user: &UserId) -> StoreResult<Vec<ProximityAlert>> {
        Ok(self.inner.lock().await.proximity_alerts(user))
    }

    async fn mark_alert_viewed(&self, id: Uuid) -> StoreResult<ProximityAlert> {
        self.inner.lock().await.mark_alert_viewed(id)
    }

    async fn record_history(&self, user: &UserId, entry: HistoryEntry) -> StoreResult<()> {
        self.inner.lock().await.record_history(user, entry);
        Ok(())
    }

    async fn history(&self, user: &UserId, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
        Ok(self.inner.lock().await.history(user, limit))
    }
}

/// Disk-backed store: a single JSON document rewritten after every change.
pub struct JsonFileStore {
    path: PathBuf,
    inner: Arc<Mutex<StoreData>>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let data = read_data(&path)?;
        tracing::debug!(
            target: "helpix::state",
            path = %path.display(),
            users = data.users.len(),
            tasks = data.tasks.len(),
            "opened store"
        );
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(data)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `f` and persist while still holding the lock, so writes reach
    /// disk in the order they were applied.
    async fn mutate<T>(&self, f: impl FnOnce(&mut StoreData) -> StoreResult<T> + Send) -> StoreResult<T> {
        let mut guard = self.inner.lock().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        write_data(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreData) -> T + Send) -> StoreResult<T> {
        let guard = self.inner.lock().await;
        Ok(f(&guard))
    }
}

fn read_data(path: &Path) -> StoreResult<StoreData> {
    if !path.exists() {
        return Ok(StoreData::default());
    }
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(StoreData::default());
    }
    serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_data(path: &Path, data: &StoreData) -> StoreResult<()> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(data)?;

    // write to a sibling temp file then rename, so readers never see a partial file
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json).map_err(io_err)?;
    fs::rename(&temp_path, path).map_err(io_err)?;
    Ok(())
}

#[async_trait]
impl MatchingStore for JsonFileStore {
    async fn upsert_user(&self, user: UserProfile) -> StoreResult<()> {
        self.mutate(|d| {
            d.users.insert(user.id.clone(), user);
            Ok(())
        })
        .await
    }

    async fn user(&self, id: &UserId) -> StoreResult<Option<UserProfile>> {
        self.read(|d| d.users.get(id).cloned()).await
    }

    async fn users(&self) -> StoreResult<Vec<UserProfile>> {
        self.read(|d| d.users.values().cloned().collect()).await
    }

    async fn upsert_task(&self, task: Task) -> StoreResult<()> {
        self.mutate(|d| {
            d.tasks.insert(task.id.clone(), task);
            Ok(())
        })
        .await
    }

    async fn task(&self, id: &TaskId) -> StoreResult<Option<Task>> {
        self.read(|d| d.tasks.get(id).cloned()).await
    }

    async fn open_tasks(&self) -> StoreResult<Vec<Task>> {
        self.read(StoreData::open_tasks).await
    }

    async fn settings(&self, user: &UserId) -> StoreResult<Option<SettingsOverrides>> {
        self.read(|d| d.settings.get(user).cloned()).await
    }

    async fn update_settings(
        &self,
        user: &UserId,
        update: SettingsOverrides,
    ) -> StoreResult<SettingsOverrides> {
        self.mutate(|d| Ok(d.update_settings(user, &update))).await
    }

    async fn upsert_recommendations(
        &self,
        user: &UserId,
        recs: Vec<Recommendation>,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Recommendation>> {
        self.mutate(|d| Ok(d.upsert_recommendations(user, recs, now)))
            .await
    }

    async fn recommendations(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<Recommendation>> {
        self.read(|d| d.recommendations(user, now)).await
    }

    async fn act_on_recommendation(
        &self,
        id: Uuid,
        action: RecommendationAction,
        now: DateTime<Utc>,
    ) -> StoreResult<Recommendation> {
        self.mutate(|d| d.act_on_recommendation(id, action, now))
            .await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        self.mutate(|d| Ok(d.purge_expired(now))).await
    }

    async fn upsert_proximity_alerts(
        &self,
        user: &UserId,
        alerts: Vec<ProximityAlert>,
    ) -> StoreResult<Vec<ProximityAlert>> {
        self.mutate(|d| Ok(d.upsert_proximity_alerts(user, alerts)))
            .await
    }

    async fn proximity_alerts(&self, user: &UserId) -> StoreResult<Vec<ProximityAlert>> {
        self.read(|d| d.proximity_alerts(user)).await
    }

    async fn mark_alert_viewed(&self, id: Uuid) -> StoreResult<ProximityAlert> {
        self.mutate(|d| d.mark_alert_viewed(id)).await
    }

    async fn record_history(&self, user: &UserId, entry: HistoryEntry) -> StoreResult<()> {
        self.mutate(|d| {
            d.record_history(user, entry);
            Ok(())
        })
        .await
    }

    async fn history(&self, user: &UserId, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
        self.read(|d| d.history(user, limit)).await
    }
}
