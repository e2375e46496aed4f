//! Top-N ranking of candidates for a user or a task.

use super::{MatchResult, Scorer};
use crate::profile::{TaskMatchingProfile, UserProfile};
use std::cmp::Ordering;

/// Something that can be matched against a list of candidates of the opposite kind.
///
/// Implemented for [`UserProfile`] (best tasks for a user) and
/// [`TaskMatchingProfile`] (best users for a task).
pub trait MatchSubject {
    /// The opposite side of the match.
    type Candidate;

    /// Score `candidate` against `self`.
    fn score_against<S: Scorer + ?Sized>(&self, scorer: &S, candidate: &Self::Candidate)
        -> MatchResult;

    /// Identifier of the candidate in `result`, used to break score ties.
    fn candidate_key(result: &MatchResult) -> &str;
}

impl MatchSubject for UserProfile {
    type Candidate = TaskMatchingProfile;

    fn score_against<S: Scorer + ?Sized>(
        &self,
        scorer: &S,
        candidate: &TaskMatchingProfile,
    ) -> MatchResult {
        scorer.score(self, candidate)
    }

    fn candidate_key(result: &MatchResult) -> &str {
        &result.task_id.0
    }
}

impl MatchSubject for TaskMatchingProfile {
    type Candidate = UserProfile;

    fn score_against<S: Scorer + ?Sized>(&self, scorer: &S, candidate: &UserProfile) -> MatchResult {
        scorer.score(candidate, self)
    }

    fn candidate_key(result: &MatchResult) -> &str {
        &result.user_id.0
    }
}

/// Score every candidate and return the best `limit`, highest score first.
///
/// Ties are broken by candidate id ascending, so the output is fully
/// deterministic. Nothing is filtered: the result has exactly
/// `min(limit, candidates.len())` entries.
pub fn find_best_matches<T, S>(
    scorer: &S,
    subject: &T,
    candidates: &[T::Candidate],
    limit: usize,
) -> Vec<MatchResult>
where
    T: MatchSubject,
    S: Scorer + ?Sized,
{
    if limit == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<MatchResult> = candidates
        .iter()
        .map(|c| subject.score_against(scorer, c))
        .collect();

    results.sort_by(|a, b| rank_order::<T>(a, b));
    results.truncate(limit);
    results
}

/// Descending score, then ascending candidate id.
pub(crate) fn rank_order<T: MatchSubject>(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| T::candidate_key(a).cmp(T::candidate_key(b)))
}
