//! Helper profiles, task records and the task projection used for matching.

use crate::geo::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a Helpix user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Opaque identifier of a task.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Self-assessed proficiency with a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

/// A skill held by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSkill {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: SkillLevel,
    #[serde(default)]
    pub years_experience: Option<u32>,
    #[serde(default)]
    pub verified: bool,
}

impl UserSkill {
    /// A skill with only a name, at beginner level.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            level: SkillLevel::default(),
            years_experience: None,
            verified: false,
        }
    }

    /// Builder-style level override.
    pub fn with_level(mut self, level: SkillLevel) -> Self {
        self.level = level;
        self
    }
}

/// Community trust ladder. Ordered from least to most trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    #[default]
    New,
    Basic,
    Trusted,
    Verified,
    Ambassador,
}

impl TrustLevel {
    /// Position on the ladder mapped to [0.0, 1.0].
    pub fn weight(&self) -> f64 {
        match self {
            Self::New => 0.0,
            Self::Basic => 0.25,
            Self::Trusted => 0.5,
            Self::Verified => 0.75,
            Self::Ambassador => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Basic => "basic",
            Self::Trusted => "trusted",
            Self::Verified => "verified",
            Self::Ambassador => "ambassador",
        }
    }
}

/// Matching-relevant preferences of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Maximum distance the user is willing to travel, in kilometres.
    pub max_distance_km: f64,
    /// Categories the user would rather help with.
    pub preferred_categories: Vec<String>,
    /// Smallest task budget (in credits) the user considers worthwhile.
    pub min_budget: Option<f64>,
    pub notify_recommendations: bool,
    pub notify_proximity: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            max_distance_km: crate::settings::DEFAULT_MAX_DISTANCE_KM,
            preferred_categories: Vec::new(),
            min_budget: None,
            notify_recommendations: true,
            notify_proximity: true,
        }
    }
}

/// Coarse presence status shown to other users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Busy,
    Away,
    #[default]
    Offline,
}

/// Whether and how a user can take on work right now.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Availability {
    pub is_available: bool,
    pub status: AvailabilityStatus,
    /// Tasks within this radius may be accepted automatically.
    pub auto_accept_radius_km: Option<f64>,
    /// Categories eligible for automatic acceptance.
    pub auto_accept_categories: Vec<String>,
}

impl Availability {
    /// Available now: flagged available and not marked busy/away/offline.
    pub fn is_available_now(&self) -> bool {
        self.is_available && self.status == AvailabilityStatus::Available
    }
}

/// Computed track record of a user.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    /// Completed / accepted, in [0.0, 1.0].
    pub completion_rate: f64,
    /// Mean rating on a 0-5 scale.
    pub average_rating: f64,
    /// Reliability in [0.0, 1.0].
    pub reliability_score: f64,
    pub tasks_completed: u32,
}

/// A helper's profile as loaded for a matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub skills: Vec<UserSkill>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub stats: UserStats,
    /// Community reputation on a 0-100 scale.
    #[serde(default)]
    pub reputation_score: f64,
    #[serde(default)]
    pub trust_level: TrustLevel,
}

impl UserProfile {
    /// An empty profile with default preferences.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UserId(id.into()),
            display_name: String::new(),
            location: None,
            skills: Vec::new(),
            certifications: Vec::new(),
            badges: Vec::new(),
            preferences: UserPreferences::default(),
            availability: Availability::default(),
            stats: UserStats::default(),
            reputation_score: 0.0,
            trust_level: TrustLevel::default(),
        }
    }
}

/// Priority set by the task owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Whether a helper can still be matched to the task.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

/// A task record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Offered budget in credits.
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub estimated_duration_hours: Option<f64>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub owner: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether `user` posted this task.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner.as_ref() == Some(user)
    }
}

/// How pressing a task is, derived from its priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Urgent,
}

impl Urgency {
    /// Urgency mapped to [0.0, 1.0].
    pub fn weight(&self) -> f64 {
        match self {
            Self::Low => 0.0,
            Self::Medium => 1.0 / 3.0,
            Self::High => 2.0 / 3.0,
            Self::Urgent => 1.0,
        }
    }
}

impl From<TaskPriority> for Urgency {
    fn from(priority: TaskPriority) -> Self {
        match priority {
            TaskPriority::Low => Self::Low,
            TaskPriority::Medium => Self::Medium,
            TaskPriority::High => Self::High,
            TaskPriority::Urgent => Self::Urgent,
        }
    }
}

/// Rough size of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Derive complexity from skill count and estimated duration.
    ///
    /// Up to one skill and under 2h is simple; more than three skills or
    /// over 8h is complex; everything else is moderate.
    pub fn estimate(skill_count: usize, duration_hours: Option<f64>) -> Self {
        let hours = duration_hours.filter(|h| h.is_finite()).unwrap_or(0.0);
        if skill_count > 3 || hours > 8.0 {
            Self::Complex
        } else if skill_count <= 1 && hours < 2.0 {
            Self::Simple
        } else {
            Self::Moderate
        }
    }
}

/// One skill a task asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredSkill {
    pub name: String,
    /// A missing mandatory skill caps the compatibility score.
    #[serde(default)]
    pub mandatory: bool,
    /// Relative weight inside the skill match ratio.
    #[serde(default = "default_skill_weight")]
    pub weight: f64,
}

fn default_skill_weight() -> f64 {
    1.0
}

impl RequiredSkill {
    /// An optional requirement of weight 1.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mandatory: false,
            weight: 1.0,
        }
    }

    /// A mandatory requirement of weight 1.
    pub fn mandatory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mandatory: true,
            weight: 1.0,
        }
    }
}

/// Read-only projection of a [`Task`] used by the scorer.
///
/// Recomputed from the task record whenever matching runs; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMatchingProfile {
    pub task_id: TaskId,
    pub title: String,
    pub category: String,
    pub required_skills: Vec<RequiredSkill>,
    pub budget: f64,
    pub duration_hours: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub location: Option<Coordinates>,
    pub urgency: Urgency,
    pub complexity: Complexity,
    #[serde(default)]
    pub owner: Option<UserId>,
}

impl From<&Task> for TaskMatchingProfile {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            category: task.category.clone(),
            required_skills: task
                .required_skills
                .iter()
                .map(RequiredSkill::optional)
                .collect(),
            budget: task.budget,
            duration_hours: task.estimated_duration_hours,
            deadline: task.deadline,
            location: task.location,
            urgency: task.priority.into(),
            complexity: Complexity::estimate(
                task.required_skills.len(),
                task.estimated_duration_hours,
            ),
            owner: task.owner.clone(),
        }
    }
}
