//! Shared test utilities for helpix crates.
//!
//! This crate provides common fixtures (profiles, tasks, temp homes) and
//! env-var guards used across the helpix workspace.

use chrono::{DateTime, TimeZone, Utc};
use helpix_matching::{
    AvailabilityStatus, Coordinates, Task, TaskId, TaskPriority, TaskStatus, UserId, UserProfile,
    UserSkill,
};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Paris, Hôtel de Ville.
pub const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);
/// A few dozen metres from [`PARIS`].
pub const PARIS_NEARBY: Coordinates = Coordinates::new(48.8570, 2.3530);
/// Lyon, about 392 km from [`PARIS`].
pub const LYON: Coordinates = Coordinates::new(45.7640, 4.8357);

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = helpix_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is "value" until _guard drops
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    match value {
        Some(val) => std::env::set_var(key, val),
        None => std::env::remove_var(key),
    }
    EnvVarGuard { key, previous }
}

/// Fixed instant used by time-sensitive tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// An available helper at `location` with the given skill names.
pub fn helper(id: &str, location: Option<Coordinates>, skills: &[&str]) -> UserProfile {
    let mut user = UserProfile::new(id);
    user.display_name = id.to_string();
    user.location = location;
    user.skills = skills.iter().map(|s| UserSkill::named(*s)).collect();
    user.availability.is_available = true;
    user.availability.status = AvailabilityStatus::Available;
    user
}

/// An open, medium-priority task with budget 45 at `location`.
pub fn open_task(id: &str, location: Option<Coordinates>, skills: &[&str]) -> Task {
    Task {
        id: TaskId::from(id),
        title: format!("Task {id}"),
        description: String::new(),
        category: "jardinage".to_string(),
        required_skills: skills.iter().map(|s| s.to_string()).collect(),
        budget: 45.0,
        estimated_duration_hours: Some(2.0),
        deadline: None,
        location,
        priority: TaskPriority::Medium,
        status: TaskStatus::Open,
        owner: None,
        created_at: None,
    }
}

/// Same as [`open_task`] but posted by `owner`.
pub fn owned_task(id: &str, owner: &str, location: Option<Coordinates>, skills: &[&str]) -> Task {
    let mut task = open_task(id, location, skills);
    task.owner = Some(UserId::from(owner));
    task
}

/// A temporary `HELPIX_HOME` with the standard layout.
///
/// The tempdir is removed when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// `$HELPIX_HOME/.helpix`
    pub helpix_dir: PathBuf,
    /// Default JSON store location inside the fixture.
    pub store_path: PathBuf,
    /// Default config file location inside the fixture.
    pub config_path: PathBuf,
}

impl TestFixture {
    /// Create the fixture and its `.helpix` directory.
    ///
    /// Does NOT set any env var; use [`TestFixture::home_guard`] for that.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let helpix_dir = tempdir.path().join(".helpix");
        std::fs::create_dir_all(&helpix_dir)?;
        Ok(Self {
            store_path: helpix_dir.join("store.json"),
            config_path: helpix_dir.join("config.toml"),
            helpix_dir,
            tempdir,
        })
    }

    /// Path to use as `HELPIX_HOME`.
    pub fn home_path(&self) -> &Path {
        self.tempdir.path()
    }

    /// Point `HELPIX_HOME` at this fixture until the guard drops.
    pub fn home_guard(&self) -> EnvVarGuard {
        set_env_var("HELPIX_HOME", Some(&self.home_path().to_string_lossy()))
    }

    /// Write `contents` to the fixture's config file.
    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        std::fs::write(&self.config_path, contents)?;
        Ok(self.config_path.clone())
    }
}
