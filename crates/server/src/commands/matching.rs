//! Handlers for `score`, `match`, `helpers` and `history`.

use super::output::{breakdown_text, history_text, match_line, render};
use crate::cli::OutputFormat;
use anyhow::{bail, Result};
use chrono::Utc;
use helpix_matching::{summarize_matches, MatchResult, TaskId, UserId};
use helpix_scheduler::MatchingService;

pub(crate) async fn handle_score_command(
    service: &MatchingService,
    user: &str,
    task: &str,
    format: OutputFormat,
) -> Result<String> {
    let result = service
        .score_pair(&UserId::from(user), &TaskId::from(task))
        .await?;
    render(format, &result, breakdown_text)
}

pub(crate) async fn handle_match_command(
    service: &MatchingService,
    user: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<String> {
    let results = service
        .best_tasks_for_user(&UserId::from(user), limit, Utc::now())
        .await?;
    render(format, results.as_slice(), |results| {
        ranked_text(results, |r| r.task_id.to_string())
    })
}

pub(crate) async fn handle_helpers_command(
    service: &MatchingService,
    task: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<String> {
    let results = service
        .best_helpers_for_task(&TaskId::from(task), limit)
        .await?;
    render(format, results.as_slice(), |results| {
        ranked_text(results, |r| r.user_id.to_string())
    })
}

/// Past matching runs for `user`, newest first.
pub(crate) async fn handle_history_command(
    service: &MatchingService,
    user: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<String> {
    let user = UserId::from(user);
    let store = service.store();
    if store.user(&user).await?.is_none() {
        bail!("unknown user: {user}");
    }
    let entries = store.history(&user, limit).await?;
    render(format, entries.as_slice(), history_text)
}

fn ranked_text(results: &[MatchResult], subject: impl Fn(&MatchResult) -> String) -> String {
    let has_location = results.iter().any(|r| r.distance_km.is_some());
    let has_skills = results.iter().any(|r| r.skill_match > 0.0);
    let mut lines = vec![summarize_matches(results.len(), has_location, has_skills)];
    lines.extend(results.iter().map(|r| match_line(r, &subject(r))));
    lines.join("\n")
}
