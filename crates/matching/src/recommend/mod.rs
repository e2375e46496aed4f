//! Compatibility scoring, ranking and recommendation generation.

mod explainer;
mod finder;
mod generator;
mod scorer;

pub use explainer::{generate_explanation, summarize_matches};
pub use finder::{find_best_matches, MatchSubject};
pub use generator::{generate_recommendations, run_recommendations, RecommendationRun};
pub use scorer::{score_compatibility, CompatibilityScorer, Scorer, Weights, DEFAULT_WEIGHTS};

use crate::profile::{SkillLevel, TaskId, TrustLevel, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Score of one (user, task) pair with its explanation.
///
/// Created fresh by every scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub user_id: UserId,
    pub task_id: TaskId,
    /// Weighted compatibility in [0.0, 1.0].
    pub score: f64,
    /// Weighted contribution of each factor.
    pub breakdown: ScoreBreakdown,
    /// Haversine distance when both sides have a location.
    pub distance_km: Option<f64>,
    /// Raw skill match ratio.
    pub skill_match: f64,
    /// Requirements the user lacks.
    pub missing_skills: Vec<String>,
    /// Explanatory match/mismatch details.
    pub details: Vec<MatchDetail>,
}

/// Weighted contribution of each scoring factor.
///
/// Each field is `weight * factor`, so the fields sum to the uncapped score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub distance: f64,
    pub budget: f64,
    pub availability: f64,
    pub reliability: f64,
    pub category: f64,
}

impl ScoreBreakdown {
    /// Sum of all contributions.
    pub fn total(&self) -> f64 {
        self.skills + self.distance + self.budget + self.availability + self.reliability + self.category
    }
}

/// Why a pair scored the way it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchDetail {
    /// Required skills the user has.
    SkillsSatisfied { skills: Vec<String> },
    /// Required skills the user lacks.
    SkillsMissing { skills: Vec<String> },
    /// Missing mandatory skills; the score is capped.
    MandatorySkillMissing { skills: Vec<String> },
    /// A missing skill is close to one the user has.
    SimilarSkill {
        required: String,
        owned: String,
        similarity: f64,
    },
    /// Highest level among the satisfied skills.
    SkillLevel { level: SkillLevel },
    /// Task is inside the user's radius.
    WithinRange { distance_km: f64 },
    /// Task is beyond the user's radius.
    OutOfRange { distance_km: f64, max_km: f64 },
    /// One side has no coordinates.
    LocationUnknown,
    /// Budget meets the user's minimum (or none is set).
    BudgetFits { budget: f64 },
    /// Budget is under the user's minimum.
    BudgetBelowMinimum { budget: f64, minimum: f64 },
    /// User is available right now.
    AvailableNow,
    /// User is not available.
    Unavailable,
    /// Task has high or urgent priority.
    UrgentTask,
    /// Task category is among the user's preferred ones.
    PreferredCategory { category: String },
    /// User sits high on the trust ladder.
    TrustedHelper { level: TrustLevel },
}

impl MatchDetail {
    /// Get a short label for this detail.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SkillsSatisfied { .. } => "skills-satisfied",
            Self::SkillsMissing { .. } => "skills-missing",
            Self::MandatorySkillMissing { .. } => "mandatory-skill-missing",
            Self::SimilarSkill { .. } => "similar-skill",
            Self::SkillLevel { .. } => "skill-level",
            Self::WithinRange { .. } => "within-range",
            Self::OutOfRange { .. } => "out-of-range",
            Self::LocationUnknown => "location-unknown",
            Self::BudgetFits { .. } => "budget-fits",
            Self::BudgetBelowMinimum { .. } => "budget-below-minimum",
            Self::AvailableNow => "available-now",
            Self::Unavailable => "unavailable",
            Self::UrgentTask => "urgent-task",
            Self::PreferredCategory { .. } => "preferred-category",
            Self::TrustedHelper { .. } => "trusted-helper",
        }
    }

    /// Whether this detail argues against the match.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Self::SkillsMissing { .. }
                | Self::MandatorySkillMissing { .. }
                | Self::OutOfRange { .. }
                | Self::LocationUnknown
                | Self::BudgetBelowMinimum { .. }
                | Self::Unavailable
        )
    }
}

/// A persisted, expiring suggestion derived from a [`MatchResult`].
///
/// The score is the one computed at generation time and is never recomputed
/// from live data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub task_title: String,
    pub category: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub distance_km: Option<f64>,
    pub explanation: String,
    pub details: Vec<MatchDetail>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub viewed: bool,
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub dismissed: bool,
    /// Task qualifies for the user's auto-accept rules.
    #[serde(default)]
    pub auto_accept_eligible: bool,
}

impl Recommendation {
    /// Whether the recommendation has passed its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Not expired and neither accepted nor dismissed.
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.accepted && !self.dismissed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_breakdown_total() {
        let b = ScoreBreakdown {
            skills: 0.4,
            distance: 0.1,
            budget: 0.15,
            availability: 0.05,
            reliability: 0.02,
            category: 0.05,
        };
        assert!((b.total() - 0.77).abs() < 1e-12);
    }

    #[test]
    fn test_detail_labels_and_polarity() {
        assert_eq!(MatchDetail::LocationUnknown.label(), "location-unknown");
        assert!(MatchDetail::Unavailable.is_mismatch());
        assert!(!MatchDetail::AvailableNow.is_mismatch());
    }

    #[test]
    fn test_detail_serializes_with_kind_tag() {
        let json = serde_json::to_value(MatchDetail::WithinRange { distance_km: 1.5 }).unwrap();
        assert_eq!(json["kind"], "within_range");
        assert_eq!(json["distance_km"], 1.5);
    }

    #[test]
    fn test_recommendation_expiry() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let rec = Recommendation {
            id: Uuid::new_v4(),
            user_id: UserId::from("u"),
            task_id: TaskId::from("t"),
            task_title: "t".into(),
            category: String::new(),
            score: 0.8,
            breakdown: ScoreBreakdown::default(),
            distance_km: None,
            explanation: String::new(),
            details: Vec::new(),
            created_at: created,
            expires_at: created + Duration::hours(24),
            viewed: false,
            accepted: false,
            dismissed: false,
            auto_accept_eligible: false,
        };
        assert!(rec.is_pending(created + Duration::hours(23)));
        assert!(rec.is_expired(created + Duration::hours(24)));
        assert!(!rec.is_pending(created + Duration::hours(25)));
    }
}
