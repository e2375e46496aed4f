//! Delivery of new recommendations and alerts to the user-facing layer.

use anyhow::Result;
use async_trait::async_trait;
use helpix_matching::{ProximityAlert, Recommendation, UserId};
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn recommendations_ready(&self, user: &UserId, recs: &[Recommendation]) -> Result<()>;
    async fn proximity_alerts(&self, user: &UserId, alerts: &[ProximityAlert]) -> Result<()>;
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn recommendations_ready(&self, user: &UserId, recs: &[Recommendation]) -> Result<()> {
        tracing::info!(
            target: "helpix::state",
            user = %user,
            count = recs.len(),
            "new recommendations"
        );
        Ok(())
    }

    async fn proximity_alerts(&self, user: &UserId, alerts: &[ProximityAlert]) -> Result<()> {
        tracing::info!(
            target: "helpix::state",
            user = %user,
            count = alerts.len(),
            "tasks nearby"
        );
        Ok(())
    }
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Recommendations { user: UserId, count: usize },
    Proximity { user: UserId, count: usize },
}

/// In-memory notifier for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MemNotifier {
    async fn recommendations_ready(&self, user: &UserId, recs: &[Recommendation]) -> Result<()> {
        self.sent.lock().await.push(Notification::Recommendations {
            user: user.clone(),
            count: recs.len(),
        });
        Ok(())
    }

    async fn proximity_alerts(&self, user: &UserId, alerts: &[ProximityAlert]) -> Result<()> {
        self.sent.lock().await.push(Notification::Proximity {
            user: user.clone(),
            count: alerts.len(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mem_notifier_records_in_order() {
        let notifier = MemNotifier::new();
        let user = UserId::from("u");
        notifier.recommendations_ready(&user, &[]).await.unwrap();
        notifier.proximity_alerts(&user, &[]).await.unwrap();
        assert_eq!(
            notifier.sent().await,
            vec![
                Notification::Recommendations {
                    user: user.clone(),
                    count: 0
                },
                Notification::Proximity { user, count: 0 },
            ]
        );
    }
}
