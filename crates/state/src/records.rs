//! Persisted records that are not part of the scoring core.

use chrono::{DateTime, Utc};
use helpix_matching::MatchResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entries kept per user; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 50;

/// Ranked results of one matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub results: Vec<MatchResult>,
}

/// What a user can do with a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    View,
    Accept,
    Dismiss,
}

impl RecommendationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Accept => "accept",
            Self::Dismiss => "dismiss",
        }
    }
}

impl fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "accept" => Ok(Self::Accept),
            "dismiss" => Ok(Self::Dismiss),
            other => Err(format!("unknown action: {other}")),
        }
    }
}
