//! Handler for the `settings` command.

use super::output::{render, settings_text};
use crate::cli::OutputFormat;
use anyhow::{bail, Result};
use helpix_matching::{SettingsOverrides, UserId, MAX_RECOMMENDATION_TTL_HOURS};
use helpix_scheduler::MatchingService;

/// Show the effective settings, or overlay `update` first when it sets anything.
pub(crate) async fn handle_settings_command(
    service: &MatchingService,
    user: &str,
    update: SettingsOverrides,
    format: OutputFormat,
) -> Result<String> {
    let user = UserId::from(user);
    let settings = if update.is_empty() {
        if service.store().user(&user).await?.is_none() {
            bail!("unknown user: {user}");
        }
        service.settings_for(&user).await?
    } else {
        validate(&update)?;
        let settings = service.update_settings(&user, update).await?;
        tracing::info!(target: "helpix::server", user = %user, "updated matching settings");
        settings
    };
    render(format, &settings, settings_text)
}

fn validate(update: &SettingsOverrides) -> Result<()> {
    if let Some(km) = update.max_distance_km {
        if !km.is_finite() || km < 0.0 {
            bail!("--max-distance must be a non-negative number of kilometres");
        }
    }
    if let Some(score) = update.min_compatibility_score {
        if !(0.0..=1.0).contains(&score) {
            bail!("--min-score must be between 0 and 1");
        }
    }
    if let Some(hours) = update.recommendation_ttl_hours {
        if !(1..=MAX_RECOMMENDATION_TTL_HOURS).contains(&hours) {
            bail!("--ttl-hours must be between 1 and {MAX_RECOMMENDATION_TTL_HOURS}");
        }
    }
    Ok(())
}
