//! Compatibility scoring between Helpix helpers and tasks.
//!
//! This crate provides:
//! - Great-circle distance between coordinates ([`geo`])
//! - Skill requirement comparison ([`skills`])
//! - Weighted compatibility scoring with per-factor breakdowns ([`recommend`])
//! - Top-N match ranking in both directions (tasks for a user, users for a task)
//! - Expiring recommendations and distance-only proximity alerts
//!
//! Everything here is pure: functions read immutable snapshots and return new
//! values, so they can be called concurrently and repeatedly without locking.

pub mod geo;
pub mod profile;
pub mod proximity;
pub mod recommend;
pub mod settings;
pub mod skills;
mod types;

pub use geo::{distance_km, Coordinates, EARTH_RADIUS_KM};
pub use profile::{
    Availability, AvailabilityStatus, Complexity, RequiredSkill, SkillLevel, Task, TaskId,
    TaskMatchingProfile, TaskPriority, TaskStatus, TrustLevel, Urgency, UserId, UserPreferences,
    UserProfile, UserSkill, UserStats,
};
pub use proximity::{generate_proximity_alerts, ProximityAlert};
pub use recommend::{
    find_best_matches, generate_explanation, generate_recommendations, run_recommendations,
    score_compatibility, summarize_matches, CompatibilityScorer, MatchDetail, MatchResult,
    MatchSubject, Recommendation, RecommendationRun, ScoreBreakdown, Scorer, Weights,
    DEFAULT_WEIGHTS,
};
pub use settings::{MatchingSettings, SettingsOverrides, MAX_RECOMMENDATION_TTL_HOURS};
pub use skills::{compare_skills, normalize_skill_name, SkillComparison, SkillSuggestion};
pub use types::Score;
