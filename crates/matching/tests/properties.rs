//! Property-based checks of the scoring core.

use helpix_matching::{
    compare_skills, distance_km, find_best_matches, generate_proximity_alerts,
    generate_recommendations, CompatibilityScorer, Coordinates, MatchingSettings, RequiredSkill,
    Task, TaskMatchingProfile, TrustLevel, UserId, UserProfile, UserSkill,
};
use helpix_test_utils::{fixed_now, helper, open_task, PARIS};
use proptest::prelude::*;
use std::collections::HashSet;

const VOCAB: &[&str] = &[
    "Jardinage",
    "Bricolage",
    "Plomberie",
    "Cuisine",
    "Permis B",
    "Informatique",
];

fn lat() -> impl Strategy<Value = f64> {
    -90.0f64..=90.0
}

fn lon() -> impl Strategy<Value = f64> {
    -180.0f64..=180.0
}

fn skill_names() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(VOCAB), 0..5)
}

/// Points within roughly 30 km of Paris, sometimes missing.
fn near_paris() -> impl Strategy<Value = Option<Coordinates>> {
    prop::option::weighted(
        0.9,
        (-0.3f64..0.3, -0.3f64..0.3).prop_map(|(dl, dn)| Coordinates::new(PARIS.lat + dl, PARIS.lon + dn)),
    )
}

fn trust() -> impl Strategy<Value = TrustLevel> {
    prop::sample::select(vec![
        TrustLevel::New,
        TrustLevel::Basic,
        TrustLevel::Trusted,
        TrustLevel::Verified,
        TrustLevel::Ambassador,
    ])
}

prop_compose! {
    fn arb_user()(
        location in near_paris(),
        skills in skill_names(),
        available in any::<bool>(),
        radius in 0.0f64..50.0,
        min_budget in prop::option::of(0.0f64..200.0),
        completion in 0.0f64..=1.0,
        rating in 0.0f64..=5.0,
        reliability in 0.0f64..=1.0,
        reputation in 0.0f64..=100.0,
        trust in trust(),
    ) -> UserProfile {
        let mut user = helper("u", location, &skills);
        user.availability.is_available = available;
        user.preferences.max_distance_km = radius;
        user.preferences.min_budget = min_budget;
        user.stats.completion_rate = completion;
        user.stats.average_rating = rating;
        user.stats.reliability_score = reliability;
        user.reputation_score = reputation;
        user.trust_level = trust;
        user
    }
}

prop_compose! {
    fn arb_task(id: String)(
        location in near_paris(),
        skills in skill_names(),
        budget in 0.0f64..300.0,
        hours in prop::option::of(0.0f64..12.0),
    ) -> Task {
        let mut task = open_task(&id, location, &skills);
        task.budget = budget;
        task.estimated_duration_hours = hours;
        task
    }
}

fn arb_pool(max: usize) -> impl Strategy<Value = Vec<Task>> {
    (0..=max).prop_flat_map(|n| {
        (0..n)
            .map(|i| arb_task(format!("t{i:02}")))
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in lat(), b in lon(), c in lat(), d in lon()) {
        let there = distance_km(a, b, c, d);
        let back = distance_km(c, d, a, b);
        prop_assert!((there - back).abs() < 1e-9);
        prop_assert!(there >= 0.0);
    }

    #[test]
    fn distance_to_self_is_zero(a in lat(), b in lon()) {
        prop_assert_eq!(distance_km(a, b, a, b), 0.0);
    }

    #[test]
    fn score_stays_in_unit_interval(user in arb_user(), task in arb_task("t".into())) {
        let result = helpix_matching::score_compatibility(&user, &TaskMatchingProfile::from(&task));
        prop_assert!((0.0..=1.0).contains(&result.score), "score {}", result.score);
        prop_assert!((0.0..=1.0).contains(&result.skill_match));
    }

    #[test]
    fn adding_an_owned_requirement_never_lowers_skill_match(
        owned in skill_names(),
        required in skill_names(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!owned.is_empty());
        let skills: Vec<UserSkill> = owned.iter().map(|s| UserSkill::named(*s)).collect();
        let mut reqs: Vec<RequiredSkill> = required.iter().map(|s| RequiredSkill::optional(*s)).collect();
        let before = compare_skills(&skills, &reqs).ratio;
        reqs.push(RequiredSkill::optional(*pick.get(&owned)));
        let after = compare_skills(&skills, &reqs).ratio;
        prop_assert!(after >= before - 1e-12, "{} -> {}", before, after);
    }

    #[test]
    fn losing_a_skill_never_raises_skill_match(
        owned in skill_names(),
        required in skill_names(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!owned.is_empty());
        let reqs: Vec<RequiredSkill> = required.iter().map(|s| RequiredSkill::optional(*s)).collect();
        let mut skills: Vec<UserSkill> = owned.iter().map(|s| UserSkill::named(*s)).collect();
        let before = compare_skills(&skills, &reqs).ratio;
        skills.remove(pick.index(skills.len()));
        let after = compare_skills(&skills, &reqs).ratio;
        prop_assert!(after <= before + 1e-12, "{} -> {}", before, after);
    }

    #[test]
    fn best_matches_are_sorted_subset_of_expected_size(
        user in arb_user(),
        pool in arb_pool(8),
        limit in 0usize..12,
    ) {
        let candidates: Vec<TaskMatchingProfile> = pool.iter().map(TaskMatchingProfile::from).collect();
        let results = find_best_matches(&CompatibilityScorer::new(), &user, &candidates, limit);

        prop_assert_eq!(results.len(), limit.min(candidates.len()));
        prop_assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        let ids: HashSet<_> = candidates.iter().map(|c| c.task_id.clone()).collect();
        prop_assert!(results.iter().all(|r| ids.contains(&r.task_id)));
    }

    #[test]
    fn recommendations_respect_threshold_and_cap(
        user in arb_user(),
        pool in arb_pool(8),
        threshold in 0.0f64..=1.0,
        cap in 0usize..6,
    ) {
        let mut settings = MatchingSettings::for_user(UserId::from("u"));
        settings.min_compatibility_score = threshold;
        settings.max_daily_recommendations = cap;
        let recs = generate_recommendations(&CompatibilityScorer::new(), &user, &pool, &settings, fixed_now());

        prop_assert!(recs.len() <= cap);
        prop_assert!(recs.iter().all(|r| r.score >= threshold));
        prop_assert!(recs.iter().all(|r| r.expires_at > r.created_at));
    }

    #[test]
    fn proximity_alerts_are_exactly_the_tasks_in_radius(
        user in arb_user(),
        pool in arb_pool(8),
        radius in 0.0f64..40.0,
    ) {
        let alerts = generate_proximity_alerts(&user, &pool, radius, fixed_now());
        match user.location {
            None => prop_assert!(alerts.is_empty()),
            Some(origin) => {
                let expected = pool
                    .iter()
                    .filter(|t| t.location.is_some_and(|l| origin.distance_to(&l) <= radius))
                    .count();
                prop_assert_eq!(alerts.len(), expected);
                prop_assert!(alerts.iter().all(|a| a.distance_km <= radius));
                prop_assert!(alerts.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
            }
        }
    }
}

#[test]
fn empty_inputs_produce_empty_outputs() {
    let settings = MatchingSettings::for_user(UserId::from("u"));
    let user = helper("u", Some(PARIS), &["Jardinage"]);
    assert!(generate_recommendations(&CompatibilityScorer::new(), &user, &[], &settings, fixed_now()).is_empty());

    let nowhere = helper("u", None, &["Jardinage"]);
    let pool = vec![open_task("t", Some(PARIS), &["Jardinage"])];
    assert!(generate_proximity_alerts(&nowhere, &pool, 10.0, fixed_now()).is_empty());

    let none: &[UserProfile] = &[];
    let task = TaskMatchingProfile::from(&pool[0]);
    assert!(find_best_matches(&CompatibilityScorer::new(), &task, none, 5).is_empty());
}
