//! Weighted compatibility scoring of a (user, task) pair.
//!
//! The score is a weighted sum of six factors, each in [0.0, 1.0]:
//!
//! | factor       | weight | meaning                                             |
//! |--------------|--------|-----------------------------------------------------|
//! | skills       | 0.40   | weighted share of required skills the user has      |
//! | distance     | 0.20   | `1 - d / max_distance`, zero past the radius        |
//! | budget       | 0.15   | 1 at or above the user's minimum, linear to 0 at 80% |
//! | availability | 0.10   | urgency alignment with the user's availability      |
//! | reliability  | 0.10   | track record, rating, reputation and trust          |
//! | category     | 0.05   | task category is a preferred one                    |
//!
//! Skill match dominates; distance and budget are secondary. Missing location
//! on either side zeroes the distance factor but keeps the pair. A user with
//! no skills gets a zero skill factor, even on a task that lists no
//! requirements, and can still score through the other factors. A task with
//! no requirements gives full skill credit to any user with at least one
//! skill. The exception is a mandatory requirement: a missing mandatory
//! skill caps the total at [`MANDATORY_MISS_CAP`], below the default
//! recommendation threshold, so the remaining factors cannot compensate.
//!
//! The constants are tunable; only the qualitative ordering matters.

use super::{explainer, MatchDetail, MatchResult, ScoreBreakdown};
use crate::geo::distance_between;
use crate::profile::{TaskMatchingProfile, TrustLevel, Urgency, UserProfile};
use crate::skills::{compare_skills, same_label};
use crate::types::Score;

/// Upper bound on the score of a pair missing a mandatory skill.
pub const MANDATORY_MISS_CAP: f64 = 0.3;

/// Budgets down to this fraction of the user's minimum still earn partial credit.
const BUDGET_TOLERANCE: f64 = 0.8;

/// Relative weights of the scoring factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub skills: f64,
    pub distance: f64,
    pub budget: f64,
    pub availability: f64,
    pub reliability: f64,
    pub category: f64,
}

impl Weights {
    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.skills + self.distance + self.budget + self.availability + self.reliability + self.category
    }

    /// Rescale so the weights sum to 1; falls back to the defaults if the
    /// weights are unusable (negative, non-finite or all zero).
    pub fn normalized(self) -> Self {
        let parts = [
            self.skills,
            self.distance,
            self.budget,
            self.availability,
            self.reliability,
            self.category,
        ];
        let sum = self.sum();
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) || sum <= 0.0 {
            return DEFAULT_WEIGHTS;
        }
        Self {
            skills: self.skills / sum,
            distance: self.distance / sum,
            budget: self.budget / sum,
            availability: self.availability / sum,
            reliability: self.reliability / sum,
            category: self.category / sum,
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

/// Default factor weights.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    skills: 0.40,
    distance: 0.20,
    budget: 0.15,
    availability: 0.10,
    reliability: 0.10,
    category: 0.05,
};

/// Trait for computing compatibility between a user and a task.
pub trait Scorer {
    /// Score one (user, task) pair.
    fn score(&self, user: &UserProfile, task: &TaskMatchingProfile) -> MatchResult;
}

/// Weighted-sum compatibility scorer.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityScorer {
    weights: Weights,
}

impl CompatibilityScorer {
    /// Create a scorer with [`DEFAULT_WEIGHTS`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom weights (normalised to sum to 1).
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights.normalized();
        self
    }

    /// The weights in use.
    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}

/// Score with the default scorer.
pub fn score_compatibility(user: &UserProfile, task: &TaskMatchingProfile) -> MatchResult {
    CompatibilityScorer::new().score(user, task)
}

impl Scorer for CompatibilityScorer {
    fn score(&self, user: &UserProfile, task: &TaskMatchingProfile) -> MatchResult {
        let w = &self.weights;
        let mut details = Vec::new();

        let skills = compare_skills(&user.skills, &task.required_skills);
        if !skills.satisfied.is_empty() {
            details.push(MatchDetail::SkillsSatisfied {
                skills: skills.satisfied.clone(),
            });
            if let Some(level) = user
                .skills
                .iter()
                .filter(|s| skills.satisfied.iter().any(|r| same_label(r, &s.name)))
                .map(|s| s.level)
                .max()
            {
                details.push(MatchDetail::SkillLevel { level });
            }
        }
        if !skills.missing.is_empty() {
            details.push(MatchDetail::SkillsMissing {
                skills: skills.missing.clone(),
            });
        }
        if skills.lacks_mandatory() {
            details.push(MatchDetail::MandatorySkillMissing {
                skills: skills.missing_mandatory.clone(),
            });
        }
        for s in &skills.suggestions {
            details.push(MatchDetail::SimilarSkill {
                required: s.required.clone(),
                owned: s.owned.clone(),
                similarity: s.similarity,
            });
        }

        let distance_km = distance_between(user.location.as_ref(), task.location.as_ref());
        let distance = distance_factor(distance_km, user.preferences.max_distance_km, &mut details);
        let budget = budget_factor(task.budget, user.preferences.min_budget, &mut details);
        let availability = availability_factor(user, task.urgency, &mut details);
        let reliability = reliability_factor(user, &mut details);

        let category = if !task.category.is_empty()
            && user
                .preferences
                .preferred_categories
                .iter()
                .any(|c| same_label(c, &task.category))
        {
            details.push(MatchDetail::PreferredCategory {
                category: task.category.clone(),
            });
            1.0
        } else {
            0.0
        };

        let breakdown = ScoreBreakdown {
            skills: w.skills * skills.ratio,
            distance: w.distance * distance,
            budget: w.budget * budget,
            availability: w.availability * availability,
            reliability: w.reliability * reliability,
            category: w.category * category,
        };

        let mut total = breakdown.total();
        if skills.lacks_mandatory() {
            total = total.min(MANDATORY_MISS_CAP);
        }
        let score = Score::new(total).value();

        tracing::trace!(
            target: "helpix::matching",
            user = %user.id,
            task = %task.task_id,
            score,
            "scored pair"
        );

        MatchResult {
            user_id: user.id.clone(),
            task_id: task.task_id.clone(),
            score,
            breakdown,
            distance_km,
            skill_match: skills.ratio,
            missing_skills: skills.missing,
            details,
        }
    }
}

/// Linear falloff inside the radius, zero outside or when unknown.
fn distance_factor(distance_km: Option<f64>, max_km: f64, details: &mut Vec<MatchDetail>) -> f64 {
    let Some(d) = distance_km else {
        details.push(MatchDetail::LocationUnknown);
        return 0.0;
    };
    if !max_km.is_finite() || max_km <= 0.0 || d > max_km {
        details.push(MatchDetail::OutOfRange {
            distance_km: d,
            max_km,
        });
        return 0.0;
    }
    details.push(MatchDetail::WithinRange { distance_km: d });
    (1.0 - d / max_km).clamp(0.0, 1.0)
}

/// Full credit at or above the minimum, linear down to zero at
/// [`BUDGET_TOLERANCE`] of it. No minimum means any budget fits.
fn budget_factor(budget: f64, min_budget: Option<f64>, details: &mut Vec<MatchDetail>) -> f64 {
    let budget = if budget.is_finite() { budget.max(0.0) } else { 0.0 };
    let minimum = match min_budget {
        Some(m) if m.is_finite() && m > 0.0 => m,
        _ => {
            details.push(MatchDetail::BudgetFits { budget });
            return 1.0;
        }
    };
    if budget >= minimum {
        details.push(MatchDetail::BudgetFits { budget });
        return 1.0;
    }
    details.push(MatchDetail::BudgetBelowMinimum { budget, minimum });
    let floor = minimum * BUDGET_TOLERANCE;
    if budget <= floor {
        0.0
    } else {
        ((budget - floor) / (minimum - floor)).clamp(0.0, 1.0)
    }
}

/// Available users gain from urgency, unavailable users lose from it.
fn availability_factor(user: &UserProfile, urgency: Urgency, details: &mut Vec<MatchDetail>) -> f64 {
    let u = urgency.weight();
    if urgency >= Urgency::High {
        details.push(MatchDetail::UrgentTask);
    }
    if user.availability.is_available_now() {
        details.push(MatchDetail::AvailableNow);
        0.6 + 0.4 * u
    } else {
        details.push(MatchDetail::Unavailable);
        0.4 * (1.0 - u)
    }
}

/// Blend of reliability, completion rate, rating, reputation and trust.
fn reliability_factor(user: &UserProfile, details: &mut Vec<MatchDetail>) -> f64 {
    let unit = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    let stats = &user.stats;
    let factor = 0.3 * unit(stats.reliability_score)
        + 0.2 * unit(stats.completion_rate)
        + 0.2 * unit(stats.average_rating / 5.0)
        + 0.15 * unit(user.reputation_score / 100.0)
        + 0.15 * user.trust_level.weight();
    if user.trust_level >= TrustLevel::Trusted {
        details.push(MatchDetail::TrustedHelper {
            level: user.trust_level,
        });
    }
    factor.clamp(0.0, 1.0)
}

/// Explanation for a scored pair.
pub(crate) fn explain(result: &MatchResult) -> String {
    explainer::generate_explanation(&result.details)
}
