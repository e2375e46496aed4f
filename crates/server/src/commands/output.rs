//! Text and JSON rendering shared by the read commands.

use crate::cli::OutputFormat;
use anyhow::Result;
use helpix_matching::{
    generate_explanation, MatchResult, MatchingSettings, ProximityAlert, Recommendation,
};
use helpix_state::HistoryEntry;
use serde::Serialize;
use std::fmt::Write as _;

/// Pretty JSON, or whatever `text` makes of the value.
pub(crate) fn render<T, F>(format: OutputFormat, value: &T, text: F) -> Result<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(text(value)),
    }
}

fn distance_label(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(d) => format!("{d:.1} km"),
        None => "distance unknown".to_string(),
    }
}

/// One ranked line plus its explanation; `subject` is the other side of the pair.
pub(crate) fn match_line(result: &MatchResult, subject: &str) -> String {
    format!(
        "{subject:<20} {:.2}  skills {:>3.0}%  {}\n    {}",
        result.score,
        result.skill_match * 100.0,
        distance_label(result.distance_km),
        generate_explanation(&result.details)
    )
}

/// Full per-factor breakdown for `helpix score`.
pub(crate) fn breakdown_text(result: &MatchResult) -> String {
    let b = &result.breakdown;
    let mut out = format!(
        "{} -> {}: {:.2}\n",
        result.user_id, result.task_id, result.score
    );
    for (name, value) in [
        ("skills", b.skills),
        ("distance", b.distance),
        ("budget", b.budget),
        ("availability", b.availability),
        ("reliability", b.reliability),
        ("category", b.category),
    ] {
        let _ = writeln!(out, "  {name:<13}{value:.3}");
    }
    let _ = writeln!(out, "  {:<13}{}", "location", distance_label(result.distance_km));
    if !result.missing_skills.is_empty() {
        let _ = writeln!(out, "  {:<13}{}", "missing", result.missing_skills.join(", "));
    }
    out.push_str(&generate_explanation(&result.details));
    out
}

pub(crate) fn recommendation_line(rec: &Recommendation) -> String {
    let mut flags = Vec::new();
    if rec.viewed {
        flags.push("viewed");
    }
    if rec.accepted {
        flags.push("accepted");
    }
    if rec.dismissed {
        flags.push("dismissed");
    }
    if rec.auto_accept_eligible {
        flags.push("auto-accept");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    format!(
        "{}  {} ({})  {:.2}  expires {}{flags}\n    {}",
        rec.id,
        rec.task_title,
        rec.category,
        rec.score,
        rec.expires_at.format("%Y-%m-%d %H:%M"),
        rec.explanation
    )
}

pub(crate) fn recommendations_text(recs: &[Recommendation]) -> String {
    if recs.is_empty() {
        return "No recommendations.".to_string();
    }
    recs.iter()
        .map(recommendation_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn alert_line(alert: &ProximityAlert) -> String {
    let viewed = if alert.viewed { " [viewed]" } else { "" };
    format!(
        "{}  {} ({})  {:.2} km{viewed}",
        alert.id, alert.task_title, alert.category, alert.distance_km
    )
}

pub(crate) fn alerts_text(alerts: &[ProximityAlert]) -> String {
    if alerts.is_empty() {
        return "No tasks nearby.".to_string();
    }
    alerts.iter().map(alert_line).collect::<Vec<_>>().join("\n")
}

/// One block per run, newest first: timestamp, count and the ranked tasks.
pub(crate) fn history_text(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No matching history.".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let ranked = entry
                .results
                .iter()
                .map(|r| format!("{} {:.2}", r.task_id, r.score))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{}  {} matches\n    {ranked}",
                entry.recorded_at.format("%Y-%m-%d %H:%M"),
                entry.results.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

pub(crate) fn settings_text(s: &MatchingSettings) -> String {
    [
        format!("user                       {}", s.user_id),
        format!("auto_matching_enabled      {}", s.auto_matching_enabled),
        format!("max_distance_km            {}", s.max_distance_km),
        format!("min_compatibility_score    {}", s.min_compatibility_score),
        format!("max_daily_recommendations  {}", s.max_daily_recommendations),
        format!("recommendation_ttl_hours   {}", s.recommendation_ttl_hours),
        format!("preferred_categories       {}", list(&s.preferred_categories)),
        format!("excluded_categories        {}", list(&s.excluded_categories)),
        format!("notify_new_recommendations {}", s.notify_new_recommendations),
        format!("notify_proximity           {}", s.notify_proximity),
    ]
    .join("\n")
}
