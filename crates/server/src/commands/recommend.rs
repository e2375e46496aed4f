//! Handlers for `recommend`, `alerts`, `inbox` and `act`.

use super::output::{alerts_text, recommendation_line, recommendations_text, render};
use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use helpix_matching::{ProximityAlert, Recommendation, UserId};
use helpix_scheduler::MatchingService;
use helpix_state::RecommendationAction;
use serde::Serialize;
use uuid::Uuid;

/// Generate recommendations. With `persist` they are stored (keeping ids
/// of ones already live) and the stored set is printed.
pub(crate) async fn handle_recommend_command(
    service: &MatchingService,
    user: &str,
    persist: bool,
    format: OutputFormat,
) -> Result<String> {
    let user = UserId::from(user);
    let now = Utc::now();
    let recs = if persist {
        let refresh = service.refresh_recommendations(&user, now).await?;
        tracing::debug!(
            target: "helpix::server",
            user = %user,
            fresh = refresh.fresh,
            notified = refresh.notified,
            "stored recommendations"
        );
        service.store().recommendations(&user, now).await?
    } else {
        service.preview_recommendations(&user, now).await?
    };
    render(format, recs.as_slice(), recommendations_text)
}

pub(crate) async fn handle_alerts_command(
    service: &MatchingService,
    user: &str,
    radius: Option<f64>,
    persist: bool,
    format: OutputFormat,
) -> Result<String> {
    let user = UserId::from(user);
    let now = Utc::now();
    let alerts = if persist {
        if radius.is_some() {
            bail!("--radius cannot be combined with --persist; stored alerts use the user's max distance setting");
        }
        service.refresh_proximity_alerts(&user, now).await?;
        service.store().proximity_alerts(&user).await?
    } else {
        service.preview_proximity_alerts(&user, radius, now).await?
    };
    render(format, alerts.as_slice(), alerts_text)
}

#[derive(Debug, Serialize)]
struct Inbox {
    recommendations: Vec<Recommendation>,
    alerts: Vec<ProximityAlert>,
}

/// Live recommendations and stored alerts. Alerts are shown as they were
/// before this call, then marked viewed.
pub(crate) async fn handle_inbox_command(
    service: &MatchingService,
    user: &str,
    format: OutputFormat,
) -> Result<String> {
    let user = UserId::from(user);
    let store = service.store();
    if store.user(&user).await?.is_none() {
        bail!("unknown user: {user}");
    }
    let inbox = Inbox {
        recommendations: store.recommendations(&user, Utc::now()).await?,
        alerts: store.proximity_alerts(&user).await?,
    };
    for alert in inbox.alerts.iter().filter(|a| !a.viewed) {
        store.mark_alert_viewed(alert.id).await?;
    }
    render(format, &inbox, |inbox| {
        format!(
            "Recommendations\n{}\n\nNearby\n{}",
            recommendations_text(&inbox.recommendations),
            alerts_text(&inbox.alerts)
        )
    })
}

pub(crate) async fn handle_act_command(
    service: &MatchingService,
    id: Uuid,
    action: RecommendationAction,
    format: OutputFormat,
) -> Result<String> {
    let rec = service
        .store()
        .act_on_recommendation(id, action, Utc::now())
        .await
        .with_context(|| format!("cannot {action} recommendation {id}"))?;
    render(format, &rec, recommendation_line)
}
