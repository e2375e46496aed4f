//! Comparison of a user's skills against a task's requirements.
//!
//! A requirement is satisfied by an exact match on the normalised name
//! (trimmed, whitespace collapsed, Unicode-lowercased). There is no partial
//! credit: near misses are reported as [`SkillSuggestion`]s via trigram
//! similarity so the UI can explain them, but they never count toward the
//! ratio.

use crate::profile::{RequiredSkill, UserSkill};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trigram::similarity;

/// Minimum trigram similarity for a near-miss suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.5;

/// An owned skill whose name is close to a missing requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSuggestion {
    /// The requirement that was not satisfied.
    pub required: String,
    /// The user's skill with the closest name.
    pub owned: String,
    /// Similarity score (0.0 - 1.0).
    pub similarity: f64,
}

/// Outcome of comparing a skill set to a requirement list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillComparison {
    /// Satisfied weight over total weight, in [0.0, 1.0].
    pub ratio: f64,
    /// Requirements the user satisfies, as named by the task.
    pub satisfied: Vec<String>,
    /// Requirements the user lacks, as named by the task.
    pub missing: Vec<String>,
    /// Missing requirements flagged mandatory.
    pub missing_mandatory: Vec<String>,
    /// Near misses among the missing requirements.
    pub suggestions: Vec<SkillSuggestion>,
}

impl SkillComparison {
    /// Whether at least one mandatory requirement is missing.
    pub fn lacks_mandatory(&self) -> bool {
        !self.missing_mandatory.is_empty()
    }
}

/// Normalise a skill or category label for comparison.
pub fn normalize_skill_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether two labels are equal after normalisation.
pub(crate) fn same_label(a: &str, b: &str) -> bool {
    normalize_skill_name(a) == normalize_skill_name(b)
}

/// Compare `owned` skills against `required` skills.
///
/// A user without skills has ratio 0.0 whatever the task asks. Otherwise an
/// empty requirement list is trivially satisfied (ratio 1.0). Requirements
/// with a non-finite or non-positive weight count with weight 1. Duplicate
/// requirements (same normalised name) are only counted once.
pub fn compare_skills(owned: &[UserSkill], required: &[RequiredSkill]) -> SkillComparison {
    let owned_by_name: HashMap<String, &UserSkill> = owned
        .iter()
        .map(|s| (normalize_skill_name(&s.name), s))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    let mut seen = Vec::with_capacity(required.len());
    let mut comparison = SkillComparison::default();
    let mut total_weight = 0.0;
    let mut satisfied_weight = 0.0;

    for req in required {
        let key = normalize_skill_name(&req.name);
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key.clone());

        let weight = if req.weight.is_finite() && req.weight > 0.0 {
            req.weight
        } else {
            1.0
        };
        total_weight += weight;

        if owned_by_name.contains_key(&key) {
            satisfied_weight += weight;
            comparison.satisfied.push(req.name.clone());
        } else {
            comparison.missing.push(req.name.clone());
            if req.mandatory {
                comparison.missing_mandatory.push(req.name.clone());
            }
            if let Some(suggestion) = closest_owned(&key, &req.name, owned) {
                comparison.suggestions.push(suggestion);
            }
        }
    }

    comparison.ratio = if total_weight > 0.0 {
        (satisfied_weight / total_weight).clamp(0.0, 1.0)
    } else if owned_by_name.is_empty() {
        0.0
    } else {
        1.0
    };
    comparison
}

/// The owned skill most similar to `key`, if above [`SUGGESTION_THRESHOLD`].
fn closest_owned(key: &str, required: &str, owned: &[UserSkill]) -> Option<SkillSuggestion> {
    owned
        .iter()
        .map(|s| {
            let score = f64::from(similarity(key, &normalize_skill_name(&s.name)));
            (s, score)
        })
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, score)| SkillSuggestion {
            required: required.to_string(),
            owned: s.name.clone(),
            similarity: score,
        })
}
