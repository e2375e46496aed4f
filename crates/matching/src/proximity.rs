//! Distance-only alerts for open tasks near a user.

use crate::geo::Coordinates;
use crate::profile::{Task, TaskId, UserId, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An open task within a user's alert radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityAlert {
    pub id: Uuid,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub task_title: String,
    pub category: String,
    pub distance_km: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub viewed: bool,
}

/// Alerts for every actionable task within `radius_km` of the user.
///
/// Unlike recommendations, skills and budget play no part here. Tasks the
/// user owns and tasks without coordinates are skipped. The result is sorted
/// by distance, closest first, then by task id.
///
/// Returns nothing when the user has no usable location or the radius is
/// negative or not finite.
pub fn generate_proximity_alerts(
    user: &UserProfile,
    tasks: &[Task],
    radius_km: f64,
    now: DateTime<Utc>,
) -> Vec<ProximityAlert> {
    let Some(origin) = user.location.filter(Coordinates::is_valid) else {
        return Vec::new();
    };
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Vec::new();
    }

    let mut alerts: Vec<ProximityAlert> = tasks
        .iter()
        .filter(|t| t.status.is_actionable() && !t.is_owned_by(&user.id))
        .filter_map(|t| {
            let location = t.location.filter(Coordinates::is_valid)?;
            let distance_km = origin.distance_to(&location);
            (distance_km <= radius_km).then(|| ProximityAlert {
                id: Uuid::new_v4(),
                user_id: user.id.clone(),
                task_id: t.id.clone(),
                task_title: t.title.clone(),
                category: t.category.clone(),
                distance_km,
                created_at: now,
                viewed: false,
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.task_id.cmp(&b.task_id))
    });

    tracing::debug!(
        target: "helpix::matching",
        user = %user.id,
        radius_km,
        alerts = alerts.len(),
        "generated proximity alerts"
    );

    alerts
}
