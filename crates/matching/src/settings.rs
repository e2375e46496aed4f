//! Per-user matching settings and their documented defaults.

use crate::profile::{UserId, UserProfile};
use crate::skills::same_label;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Default matching radius in kilometres.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;
/// Default minimum compatibility for a recommendation.
pub const DEFAULT_MIN_COMPATIBILITY: f64 = 0.4;
/// Default cap on recommendations generated per run.
pub const DEFAULT_MAX_DAILY_RECOMMENDATIONS: usize = 10;
/// Default recommendation lifetime in hours.
pub const DEFAULT_RECOMMENDATION_TTL_HOURS: i64 = 24;
/// Longest accepted recommendation lifetime in hours (one year).
pub const MAX_RECOMMENDATION_TTL_HOURS: i64 = 24 * 365;

/// Matching configuration for one user.
///
/// Stored as one row per user, created lazily: a user without a row gets
/// [`MatchingSettings::for_user`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingSettings {
    pub user_id: UserId,
    pub auto_matching_enabled: bool,
    pub max_distance_km: f64,
    pub min_compatibility_score: f64,
    pub max_daily_recommendations: usize,
    pub recommendation_ttl_hours: i64,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub excluded_categories: Vec<String>,
    pub notify_new_recommendations: bool,
    pub notify_proximity: bool,
}

/// Partial settings, used for stored rows with missing columns, config-file
/// defaults and user updates alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub auto_matching_enabled: Option<bool>,
    pub max_distance_km: Option<f64>,
    pub min_compatibility_score: Option<f64>,
    pub max_daily_recommendations: Option<usize>,
    pub recommendation_ttl_hours: Option<i64>,
    pub preferred_categories: Option<Vec<String>>,
    pub excluded_categories: Option<Vec<String>>,
    pub notify_new_recommendations: Option<bool>,
    pub notify_proximity: Option<bool>,
}

impl MatchingSettings {
    /// The documented defaults: auto matching on, 10 km, 0.4 minimum
    /// compatibility, 10 recommendations, 24 h lifetime, notifications on.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            auto_matching_enabled: true,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            min_compatibility_score: DEFAULT_MIN_COMPATIBILITY,
            max_daily_recommendations: DEFAULT_MAX_DAILY_RECOMMENDATIONS,
            recommendation_ttl_hours: DEFAULT_RECOMMENDATION_TTL_HOURS,
            preferred_categories: Vec::new(),
            excluded_categories: Vec::new(),
            notify_new_recommendations: true,
            notify_proximity: true,
        }
    }

    /// Apply the set fields of `overrides`, sanitising numeric values.
    pub fn merged(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(v) = overrides.auto_matching_enabled {
            self.auto_matching_enabled = v;
        }
        if let Some(v) = overrides.max_distance_km.filter(|v| v.is_finite() && *v >= 0.0) {
            self.max_distance_km = v;
        }
        if let Some(v) = overrides.min_compatibility_score.filter(|v| v.is_finite()) {
            self.min_compatibility_score = v.clamp(0.0, 1.0);
        }
        if let Some(v) = overrides.max_daily_recommendations {
            self.max_daily_recommendations = v;
        }
        if let Some(v) = overrides
            .recommendation_ttl_hours
            .filter(|v| (1..=MAX_RECOMMENDATION_TTL_HOURS).contains(v))
        {
            self.recommendation_ttl_hours = v;
        }
        if let Some(v) = &overrides.preferred_categories {
            self.preferred_categories = v.clone();
        }
        if let Some(v) = &overrides.excluded_categories {
            self.excluded_categories = v.clone();
        }
        if let Some(v) = overrides.notify_new_recommendations {
            self.notify_new_recommendations = v;
        }
        if let Some(v) = overrides.notify_proximity {
            self.notify_proximity = v;
        }
        self
    }

    /// Recommendation lifetime as a duration.
    ///
    /// Rows stored before the lifetime was bounded may hold any value; those
    /// outside `1..=MAX_RECOMMENDATION_TTL_HOURS` fall back to the default.
    pub fn recommendation_ttl(&self) -> TimeDelta {
        let default = TimeDelta::hours(DEFAULT_RECOMMENDATION_TTL_HOURS);
        if !(1..=MAX_RECOMMENDATION_TTL_HOURS).contains(&self.recommendation_ttl_hours) {
            return default;
        }
        TimeDelta::try_hours(self.recommendation_ttl_hours).unwrap_or(default)
    }

    /// Expiry of a recommendation created at `now`.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.recommendation_ttl())
            .or_else(|| now.checked_add_signed(TimeDelta::hours(DEFAULT_RECOMMENDATION_TTL_HOURS)))
            .unwrap_or(now)
    }

    /// Whether `category` is excluded, compared case-insensitively.
    pub fn excludes(&self, category: &str) -> bool {
        self.excluded_categories
            .iter()
            .any(|c| same_label(c, category))
    }

    /// Produce the profile snapshot a matching run scores against.
    ///
    /// The settings radius replaces the profile's, and settings categories
    /// are added to the profile's preferred categories.
    pub fn apply_to(&self, profile: &UserProfile) -> UserProfile {
        let mut snapshot = profile.clone();
        snapshot.preferences.max_distance_km = self.max_distance_km;
        for category in &self.preferred_categories {
            let known = snapshot
                .preferences
                .preferred_categories
                .iter()
                .any(|c| same_label(c, category));
            if !known {
                snapshot
                    .preferences
                    .preferred_categories
                    .push(category.clone());
            }
        }
        snapshot.preferences.notify_recommendations &= self.notify_new_recommendations;
        snapshot.preferences.notify_proximity &= self.notify_proximity;
        snapshot
    }
}

impl SettingsOverrides {
    /// Copy every field set in `other` over `self`.
    pub fn overlay(&mut self, other: &SettingsOverrides) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        take(&mut self.auto_matching_enabled, &other.auto_matching_enabled);
        take(&mut self.max_distance_km, &other.max_distance_km);
        take(&mut self.min_compatibility_score, &other.min_compatibility_score);
        take(&mut self.max_daily_recommendations, &other.max_daily_recommendations);
        take(&mut self.recommendation_ttl_hours, &other.recommendation_ttl_hours);
        take(&mut self.preferred_categories, &other.preferred_categories);
        take(&mut self.excluded_categories, &other.excluded_categories);
        take(&mut self.notify_new_recommendations, &other.notify_new_recommendations);
        take(&mut self.notify_proximity, &other.notify_proximity);
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
