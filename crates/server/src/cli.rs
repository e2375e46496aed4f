use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use helpix_state::RecommendationAction;
use std::path::PathBuf;
use uuid::Uuid;

/// Output format for read commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Command-line interface for the `helpix` application.
#[derive(Debug, Parser)]
#[command(
    name = "helpix",
    version,
    about = "Helper/task matching, recommendations and proximity alerts"
)]
pub struct Cli {
    /// Store file (overrides `HELPIX_STORE` and the `[store]` config section).
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,
    /// Config file (default: `~/.helpix/config.toml`, or `HELPIX_CONFIG`).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Output format: text or json.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `helpix` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scores one user against one task and prints the breakdown.
    Score {
        #[arg(long, value_name = "USER")]
        user: String,
        #[arg(long, value_name = "TASK")]
        task: String,
    },
    /// Lists the best open tasks for a user.
    Match {
        #[arg(long, value_name = "USER")]
        user: String,
        /// Maximum number of tasks shown.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Lists the best helpers for a task.
    Helpers {
        #[arg(long, value_name = "TASK")]
        task: String,
        /// Maximum number of helpers shown.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generates recommendations for a user.
    Recommend {
        #[arg(long, value_name = "USER")]
        user: String,
        /// Store the recommendations and notify the user.
        #[arg(long, default_value_t = false)]
        persist: bool,
    },
    /// Lists open tasks near a user.
    Alerts {
        #[arg(long, value_name = "USER")]
        user: String,
        /// Radius in kilometres (default: the user's max distance setting).
        #[arg(long, value_name = "KM")]
        radius: Option<f64>,
        /// Store the alerts and notify the user.
        #[arg(long, default_value_t = false)]
        persist: bool,
    },
    /// Shows a user's live recommendations and stored proximity alerts.
    Inbox {
        #[arg(long, value_name = "USER")]
        user: String,
    },
    /// Lists a user's past matching runs, newest first.
    History {
        #[arg(long, value_name = "USER")]
        user: String,
        /// Maximum number of runs shown.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Views, accepts or dismisses a stored recommendation.
    Act {
        #[arg(long, value_name = "ID")]
        recommendation: Uuid,
        /// One of `view`, `accept`, `dismiss`.
        #[arg(long)]
        action: RecommendationAction,
    },
    /// Shows a user's matching settings, or updates them when flags are given.
    Settings {
        #[arg(long, value_name = "USER")]
        user: String,
        #[arg(long, value_name = "KM")]
        max_distance: Option<f64>,
        /// Minimum compatibility score (0-1).
        #[arg(long, value_name = "SCORE")]
        min_score: Option<f64>,
        #[arg(long, value_name = "N")]
        max_daily: Option<usize>,
        /// Recommendation lifetime in hours (1 to 8760).
        #[arg(long, value_name = "HOURS")]
        ttl_hours: Option<i64>,
        /// Enables or disables scheduled matching for the user.
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        auto_matching: Option<bool>,
        /// Enables or disables both notification kinds.
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        notify: Option<bool>,
        /// Category never recommended to the user (repeatable).
        #[arg(long = "exclude", value_name = "CATEGORY")]
        excluded: Vec<String>,
    },
    /// Runs the periodic matching scheduler until Ctrl-C.
    Serve {
        /// Skips the sweep that normally runs at startup.
        #[arg(long, default_value_t = false)]
        no_initial_sweep: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "helpix", "match", "--user", "ana", "--limit", "3", "--format", "json", "--store",
            "/tmp/s.json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Commands::Match { user, limit } => {
                assert_eq!(user, "ana");
                assert_eq!(limit, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parses_act_arguments() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "helpix",
            "act",
            "--recommendation",
            id.to_string().as_str(),
            "--action",
            "dismiss",
        ])
        .unwrap();
        match cli.command {
            Commands::Act {
                recommendation,
                action,
            } => {
                assert_eq!(recommendation, id);
                assert_eq!(action, RecommendationAction::Dismiss);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_action() {
        let id = Uuid::new_v4().to_string();
        let err = Cli::try_parse_from([
            "helpix",
            "act",
            "--recommendation",
            id.as_str(),
            "--action",
            "archive",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_settings_bool_flags_take_values() {
        let cli = Cli::try_parse_from([
            "helpix",
            "settings",
            "--user",
            "ana",
            "--auto-matching",
            "false",
            "--exclude",
            "menage",
            "--exclude",
            "demenagement",
        ])
        .unwrap();
        match cli.command {
            Commands::Settings {
                auto_matching,
                excluded,
                notify,
                ..
            } => {
                assert_eq!(auto_matching, Some(false));
                assert_eq!(notify, None);
                assert_eq!(excluded, vec!["menage", "demenagement"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
