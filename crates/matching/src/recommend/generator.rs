//! Turn scored matches into expiring recommendations.

use super::scorer::explain;
use super::{find_best_matches, MatchResult, Recommendation, Scorer};
use crate::profile::{Task, TaskId, TaskMatchingProfile, UserProfile};
use crate::settings::MatchingSettings;
use crate::skills::same_label;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// One recommendation run: the emitted recommendations and the match
/// results they were built from, in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationRun {
    pub results: Vec<MatchResult>,
    pub recommendations: Vec<Recommendation>,
}

/// Generate recommendations for `user` from `pool`.
///
/// The profile is first resolved against `settings` (see
/// [`MatchingSettings::apply_to`]). Tasks that are closed, owned by the user
/// or in an excluded category are skipped. Survivors are ranked, those under
/// `settings.min_compatibility_score` dropped, and at most
/// `settings.max_daily_recommendations` returned, each expiring
/// `settings.recommendation_ttl()` after `now` (see [`MatchingSettings::expiry_from`]).
///
/// Every emitted score is exactly the scorer's output for the resolved
/// profile and the task's projection at this call.
pub fn generate_recommendations<S: Scorer + ?Sized>(
    scorer: &S,
    user: &UserProfile,
    pool: &[Task],
    settings: &MatchingSettings,
    now: DateTime<Utc>,
) -> Vec<Recommendation> {
    run_recommendations(scorer, user, pool, settings, now).recommendations
}

/// Same as [`generate_recommendations`], also returning the match results.
pub fn run_recommendations<S: Scorer + ?Sized>(
    scorer: &S,
    user: &UserProfile,
    pool: &[Task],
    settings: &MatchingSettings,
    now: DateTime<Utc>,
) -> RecommendationRun {
    if pool.is_empty() || settings.max_daily_recommendations == 0 {
        return RecommendationRun::default();
    }

    let snapshot = settings.apply_to(user);
    let candidates: Vec<TaskMatchingProfile> = pool
        .iter()
        .filter(|t| t.status.is_actionable())
        .filter(|t| !t.is_owned_by(&snapshot.id))
        .filter(|t| !settings.excludes(&t.category))
        .map(TaskMatchingProfile::from)
        .collect();
    let by_id: HashMap<&TaskId, &TaskMatchingProfile> =
        candidates.iter().map(|c| (&c.task_id, c)).collect();

    let ranked = find_best_matches(scorer, &snapshot, &candidates, candidates.len());
    let threshold = settings.min_compatibility_score;
    let expires_at = settings.expiry_from(now);

    let mut run = RecommendationRun::default();
    for result in ranked
        .into_iter()
        .filter(|r| r.score >= threshold)
        .take(settings.max_daily_recommendations)
    {
        let Some(task) = by_id.get(&result.task_id) else {
            continue;
        };
        run.recommendations
            .push(build(&snapshot, task, &result, now, expires_at));
        run.results.push(result);
    }

    tracing::debug!(
        target: "helpix::matching",
        user = %user.id,
        pool = pool.len(),
        candidates = candidates.len(),
        emitted = run.recommendations.len(),
        threshold,
        "generated recommendations"
    );

    run
}

fn build(
    user: &UserProfile,
    task: &TaskMatchingProfile,
    result: &MatchResult,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Recommendation {
    let auto_accept_eligible = auto_accept_eligible(user, task, result.distance_km);
    Recommendation {
        id: Uuid::new_v4(),
        user_id: result.user_id.clone(),
        task_id: result.task_id.clone(),
        task_title: task.title.clone(),
        category: task.category.clone(),
        score: result.score,
        breakdown: result.breakdown,
        distance_km: result.distance_km,
        explanation: explain(result),
        details: result.details.clone(),
        created_at: now,
        expires_at,
        viewed: false,
        accepted: false,
        dismissed: false,
        auto_accept_eligible,
    }
}

/// Category listed in the user's auto-accept categories and task inside the
/// auto-accept radius. Both rules must be configured.
fn auto_accept_eligible(
    user: &UserProfile,
    task: &TaskMatchingProfile,
    distance_km: Option<f64>,
) -> bool {
    let availability = &user.availability;
    let (Some(radius), Some(distance)) = (availability.auto_accept_radius_km, distance_km) else {
        return false;
    };
    distance <= radius
        && availability
            .auto_accept_categories
            .iter()
            .any(|c| same_label(c, &task.category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;
    use crate::profile::{AvailabilityStatus, TaskPriority, TaskStatus, UserId, UserSkill};
    use crate::recommend::CompatibilityScorer;
    use crate::Scorer as _;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap()
    }

    fn helper() -> UserProfile {
        let mut u = UserProfile::new("u");
        u.location = Some(Coordinates::new(48.8566, 2.3522));
        u.skills = vec![UserSkill::named("Jardinage")];
        u.availability.is_available = true;
        u.availability.status = AvailabilityStatus::Available;
        u
    }

    fn task(id: &str, skill: &str, lat: f64, lon: f64) -> Task {
        Task {
            id: TaskId::from(id),
            title: format!("task {id}"),
            description: String::new(),
            category: "jardinage".into(),
            required_skills: vec![skill.to_string()],
            budget: 45.0,
            estimated_duration_hours: None,
            deadline: None,
            location: Some(Coordinates::new(lat, lon)),
            priority: TaskPriority::Medium,
            status: TaskStatus::Open,
            owner: None,
            created_at: None,
        }
    }

    fn settings() -> MatchingSettings {
        MatchingSettings::for_user(UserId::from("u"))
    }

    #[test]
    fn test_empty_pool_is_empty() {
        let recs =
            generate_recommendations(&CompatibilityScorer::new(), &helper(), &[], &settings(), now());
        assert!(recs.is_empty());
    }

    #[test]
    fn test_nearby_task_is_recommended_with_expiry() {
        let pool = vec![task("near", "Jardinage", 48.8570, 2.3530)];
        let recs =
            generate_recommendations(&CompatibilityScorer::new(), &helper(), &pool, &settings(), now());
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.task_id, TaskId::from("near"));
        assert_eq!(rec.expires_at, now() + Duration::hours(24));
        assert!(!rec.explanation.is_empty());
        assert!(rec.score >= settings().min_compatibility_score);
    }

    #[test]
    fn test_oversized_stored_ttl_uses_default_expiry() {
        let pool = vec![task("near", "Jardinage", 48.8570, 2.3530)];
        let mut s = settings();
        s.recommendation_ttl_hours = i64::MAX / 2;
        let recs = generate_recommendations(&CompatibilityScorer::new(), &helper(), &pool, &s, now());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].expires_at, now() + Duration::hours(24));
    }

    #[test]
    fn test_score_matches_scorer_output() {
        let scorer = CompatibilityScorer::new();
        let user = helper();
        let pool = vec![task("near", "Jardinage", 48.8570, 2.3530)];
        let s = settings();
        let recs = generate_recommendations(&scorer, &user, &pool, &s, now());
        let direct = scorer.score(&s.apply_to(&user), &TaskMatchingProfile::from(&pool[0]));
        assert_eq!(recs[0].score, direct.score);
        assert_eq!(recs[0].breakdown, direct.breakdown);
    }

    #[test]
    fn test_threshold_filters_weak_matches() {
        let pool = vec![
            task("good", "Jardinage", 48.8570, 2.3530),
            task("weak", "Plomberie", 45.7640, 4.8357),
        ];
        let recs =
            generate_recommendations(&CompatibilityScorer::new(), &helper(), &pool, &settings(), now());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].task_id, TaskId::from("good"));
    }

    #[test]
    fn test_cap_and_ordering() {
        let pool: Vec<Task> = (0..5)
            .map(|i| task(&format!("t{i}"), "Jardinage", 48.8566 + 0.005 * i as f64, 2.3522))
            .collect();
        let mut s = settings();
        s.max_daily_recommendations = 3;
        let recs = generate_recommendations(&CompatibilityScorer::new(), &helper(), &pool, &s, now());
        let ids: Vec<_> = recs.iter().map(|r| r.task_id.0.as_str()).collect();
        assert_eq!(ids, vec!["t0", "t1", "t2"]);
    }

    #[test]
    fn test_skips_closed_owned_and_excluded() {
        let mut closed = task("closed", "Jardinage", 48.8570, 2.3530);
        closed.status = TaskStatus::Completed;
        let mut own = task("own", "Jardinage", 48.8570, 2.3530);
        own.owner = Some(UserId::from("u"));
        let mut excluded = task("excluded", "Jardinage", 48.8570, 2.3530);
        excluded.category = "Courses".into();
        let mut s = settings();
        s.excluded_categories = vec!["courses".into()];

        let recs = generate_recommendations(
            &CompatibilityScorer::new(),
            &helper(),
            &[closed, own, excluded],
            &s,
            now(),
        );
        assert!(recs.is_empty());
    }

    #[test]
    fn test_run_pairs_results_with_recommendations() {
        let pool = vec![
            task("a", "Jardinage", 48.8570, 2.3530),
            task("b", "Jardinage", 48.8600, 2.3530),
        ];
        let run = run_recommendations(&CompatibilityScorer::new(), &helper(), &pool, &settings(), now());
        assert_eq!(run.results.len(), run.recommendations.len());
        for (result, rec) in run.results.iter().zip(&run.recommendations) {
            assert_eq!(result.task_id, rec.task_id);
            assert_eq!(result.score, rec.score);
        }
    }

    #[test]
    fn test_auto_accept_eligibility() {
        let mut user = helper();
        user.availability.auto_accept_radius_km = Some(1.0);
        user.availability.auto_accept_categories = vec!["Jardinage".into()];
        let pool = vec![
            task("near", "Jardinage", 48.8570, 2.3530),
            task("mid", "Jardinage", 48.8900, 2.3522),
        ];
        let recs = generate_recommendations(&CompatibilityScorer::new(), &user, &pool, &settings(), now());
        let near = recs.iter().find(|r| r.task_id.0 == "near").unwrap();
        let mid = recs.iter().find(|r| r.task_id.0 == "mid").unwrap();
        assert!(near.auto_accept_eligible);
        assert!(!mid.auto_accept_eligible);
    }
}
