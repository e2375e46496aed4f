//! Entry point wiring: logging, config, store and command dispatch.

use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_act_command, handle_alerts_command, handle_helpers_command, handle_history_command,
    handle_inbox_command, handle_match_command, handle_recommend_command, handle_score_command,
    handle_serve_command, handle_settings_command,
};
use crate::config::{load_config, Config};
use anyhow::{Context, Result};
use clap::Parser;
use helpix_matching::SettingsOverrides;
use helpix_scheduler::MatchingService;
use helpix_state::{env_diag, JsonFileStore, LogNotifier};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// The main entry point for the `helpix` application.
pub fn run() -> Result<()> {
    // RUST_LOG wins; HELPIX_DIAGNOSE=1 turns on debug output for helpix crates.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if env_diag() { "helpix=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?.unwrap_or_default();

    let rt = Runtime::new()?;
    if let Some(output) = rt.block_on(execute(cli, config))? {
        println!("{output}");
    }
    Ok(())
}

/// Run one parsed command. Returns the rendered output of read commands.
pub(crate) async fn execute(cli: Cli, config: Config) -> Result<Option<String>> {
    let store_path = config.store_path(cli.store.as_deref())?;
    let store = JsonFileStore::open(store_path.clone())
        .with_context(|| format!("failed to open store {}", store_path.display()))?;
    tracing::debug!(target: "helpix::server", store = %store_path.display(), "opened store");

    let service = MatchingService::new(Arc::new(store), Arc::new(LogNotifier))
        .with_defaults(config.matching.clone());
    let format = cli.format;

    let output = match cli.command {
        Commands::Score { user, task } => {
            handle_score_command(&service, &user, &task, format).await?
        }
        Commands::Match { user, limit } => {
            handle_match_command(&service, &user, limit, format).await?
        }
        Commands::Helpers { task, limit } => {
            handle_helpers_command(&service, &task, limit, format).await?
        }
        Commands::Recommend { user, persist } => {
            handle_recommend_command(&service, &user, persist, format).await?
        }
        Commands::Alerts {
            user,
            radius,
            persist,
        } => handle_alerts_command(&service, &user, radius, persist, format).await?,
        Commands::Inbox { user } => handle_inbox_command(&service, &user, format).await?,
        Commands::History { user, limit } => {
            handle_history_command(&service, &user, limit, format).await?
        }
        Commands::Act {
            recommendation,
            action,
        } => handle_act_command(&service, recommendation, action, format).await?,
        Commands::Settings {
            user,
            max_distance,
            min_score,
            max_daily,
            ttl_hours,
            auto_matching,
            notify,
            excluded,
        } => {
            let update = SettingsOverrides {
                auto_matching_enabled: auto_matching,
                max_distance_km: max_distance,
                min_compatibility_score: min_score,
                max_daily_recommendations: max_daily,
                recommendation_ttl_hours: ttl_hours,
                excluded_categories: (!excluded.is_empty()).then_some(excluded),
                notify_new_recommendations: notify,
                notify_proximity: notify,
                ..SettingsOverrides::default()
            };
            handle_settings_command(&service, &user, update, format).await?
        }
        Commands::Serve { no_initial_sweep } => {
            let mut schedule = config.scheduler.to_schedule()?;
            if no_initial_sweep {
                schedule.run_on_start = false;
            }
            handle_serve_command(Arc::new(service), schedule).await?;
            return Ok(None);
        }
    };
    Ok(Some(output))
}
