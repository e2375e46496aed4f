//! Configuration file support for helpix.
//!
//! Loads settings from `~/.helpix/config.toml` (or `HELPIX_CONFIG`) with the
//! following precedence: CLI arguments > environment variables > config file
//! > built-in defaults.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.helpix/config.toml
//!
//! [store]
//! path = "/var/lib/helpix/store.json"
//!
//! [scheduler]
//! recommendation_interval_secs = 3600
//! proximity_interval_secs = 1800
//! queue_capacity = 256
//! max_attempts = 3
//! retry_backoff_ms = 500
//! run_on_start = true
//!
//! # Site-wide defaults under every user's own settings
//! [matching]
//! max_distance_km = 10.0
//! min_compatibility_score = 0.4
//! max_daily_recommendations = 10
//! recommendation_ttl_hours = 24
//! ```

use helpix_matching::{SettingsOverrides, MAX_RECOMMENDATION_TTL_HOURS};
use helpix_scheduler::ScheduleConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Site defaults layered between the built-in defaults and each user's row.
    #[serde(default)]
    pub matching: SettingsOverrides,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

/// `[scheduler]` section; unset keys keep the [`ScheduleConfig`] defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub recommendation_interval_secs: Option<u64>,
    pub proximity_interval_secs: Option<u64>,
    pub queue_capacity: Option<usize>,
    pub max_attempts: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub run_on_start: Option<bool>,
}

impl SchedulerConfig {
    pub fn to_schedule(&self) -> Result<ScheduleConfig, ConfigError> {
        let mut schedule = ScheduleConfig::default();
        if let Some(secs) = self.recommendation_interval_secs {
            schedule.recommendation_interval =
                Duration::from_secs(positive("recommendation_interval_secs", secs)?);
        }
        if let Some(secs) = self.proximity_interval_secs {
            schedule.proximity_interval =
                Duration::from_secs(positive("proximity_interval_secs", secs)?);
        }
        if let Some(capacity) = self.queue_capacity {
            schedule.queue_capacity = positive("queue_capacity", capacity as u64)? as usize;
        }
        if let Some(attempts) = self.max_attempts {
            schedule.max_attempts = positive("max_attempts", u64::from(attempts))? as u32;
        }
        if let Some(ms) = self.retry_backoff_ms {
            schedule.retry_backoff = Duration::from_millis(ms);
        }
        if let Some(run) = self.run_on_start {
            schedule.run_on_start = run;
        }
        Ok(schedule)
    }
}

fn positive(field: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive { field });
    }
    Ok(value)
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl Config {
    /// Reject values the matching core would otherwise silently ignore.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.to_schedule()?;
        if let Some(km) = self.matching.max_distance_km {
            within("matching.max_distance_km", km, 0.0, f64::MAX)?;
        }
        if let Some(score) = self.matching.min_compatibility_score {
            within("matching.min_compatibility_score", score, 0.0, 1.0)?;
        }
        if let Some(hours) = self.matching.recommendation_ttl_hours {
            if hours <= 0 {
                return Err(ConfigError::NotPositive {
                    field: "matching.recommendation_ttl_hours",
                });
            }
            within(
                "matching.recommendation_ttl_hours",
                hours as f64,
                1.0,
                MAX_RECOMMENDATION_TTL_HOURS as f64,
            )?;
        }
        Ok(())
    }

    /// Store file: CLI flag, then `HELPIX_STORE`, then `[store] path`, then
    /// `~/.helpix/store.json`.
    pub fn store_path(&self, cli: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(path) = cli {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = helpix_state::store_path_from_env() {
            return Ok(path);
        }
        if let Some(path) = &self.store.path {
            return Ok(path.clone());
        }
        helpix_state::default_store_path()
    }
}

/// Loads the configuration file if it exists.
///
/// An explicit `path` must exist. Without one, `HELPIX_CONFIG` or
/// `~/.helpix/config.toml` is used and a missing file yields `Ok(None)`.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match helpix_state::config_path() {
            Some(p) => (p, false),
            None => return Ok(None),
        },
    };

    if !required && !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    config.validate()?;

    tracing::debug!(
        target: "helpix::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.store.path.is_none());
        assert!(config.matching.is_empty());
        assert_eq!(
            config.scheduler.to_schedule().unwrap(),
            ScheduleConfig::default()
        );
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [store]
            path = "/srv/helpix/store.json"

            [scheduler]
            recommendation_interval_secs = 600
            proximity_interval_secs = 120
            queue_capacity = 16
            max_attempts = 5
            retry_backoff_ms = 250
            run_on_start = false

            [matching]
            max_distance_km = 5.0
            min_compatibility_score = 0.6
            excluded_categories = ["demenagement"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(
            config.store.path.as_deref(),
            Some(Path::new("/srv/helpix/store.json"))
        );

        let schedule = config.scheduler.to_schedule().unwrap();
        assert_eq!(schedule.recommendation_interval, Duration::from_secs(600));
        assert_eq!(schedule.proximity_interval, Duration::from_secs(120));
        assert_eq!(schedule.queue_capacity, 16);
        assert_eq!(schedule.max_attempts, 5);
        assert_eq!(schedule.retry_backoff, Duration::from_millis(250));
        assert!(!schedule.run_on_start);

        assert_eq!(config.matching.max_distance_km, Some(5.0));
        assert_eq!(config.matching.min_compatibility_score, Some(0.6));
        assert_eq!(
            config.matching.excluded_categories,
            Some(vec!["demenagement".to_string()])
        );
        assert_eq!(config.matching.max_daily_recommendations, None);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config: Config = toml::from_str("[scheduler]\nproximity_interval_secs = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotPositive {
                field: "proximity_interval_secs"
            }
        ));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let config: Config =
            toml::from_str("[matching]\nmin_compatibility_score = 1.5").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_compatibility_score"));
    }

    #[test]
    fn ttl_beyond_a_year_is_rejected() {
        let config: Config =
            toml::from_str("[matching]\nrecommendation_ttl_hours = 4611686018427387903").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "matching.recommendation_ttl_hours",
                ..
            }
        ));

        let config: Config = toml::from_str("[matching]\nrecommendation_ttl_hours = 8760").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scheduler\nqueue_capacity = ").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    #[serial]
    fn default_location_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let _home = helpix_test_utils::set_env_var("HELPIX_HOME", dir.path().to_str());
        let _cfg = helpix_test_utils::set_env_var("HELPIX_CONFIG", None);
        assert!(load_config(None).unwrap().is_none());
    }

    #[test]
    #[serial]
    fn store_path_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let _home = helpix_test_utils::set_env_var("HELPIX_HOME", dir.path().to_str());
        let mut config = Config::default();

        let _env = helpix_test_utils::set_env_var("HELPIX_STORE", None);
        assert_eq!(
            config.store_path(None).unwrap(),
            dir.path().join(".helpix").join("store.json")
        );

        config.store.path = Some(PathBuf::from("/from/config.json"));
        assert_eq!(
            config.store_path(None).unwrap(),
            PathBuf::from("/from/config.json")
        );

        let _env = helpix_test_utils::set_env_var("HELPIX_STORE", Some("/from/env.json"));
        assert_eq!(
            config.store_path(None).unwrap(),
            PathBuf::from("/from/env.json")
        );

        assert_eq!(
            config
                .store_path(Some(Path::new("/from/cli.json")))
                .unwrap(),
            PathBuf::from("/from/cli.json")
        );
    }
}
