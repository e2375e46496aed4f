use anyhow::Result;
use std::path::PathBuf;

/// Returns the user's home directory.
///
/// `HELPIX_HOME` wins over `HOME`, which wins over the platform lookup.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(home) = non_empty_var("HELPIX_HOME") {
        return Ok(PathBuf::from(home));
    }
    #[cfg(unix)]
    if let Some(home) = non_empty_var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// `~/.helpix`
pub fn helpix_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".helpix"))
}

/// Store file path from `HELPIX_STORE`, if set.
pub fn store_path_from_env() -> Option<PathBuf> {
    non_empty_var("HELPIX_STORE").map(PathBuf::from)
}

/// Default on-disk store location.
pub fn default_store_path() -> Result<PathBuf> {
    Ok(helpix_dir()?.join("store.json"))
}

/// Config file path: `HELPIX_CONFIG` or `~/.helpix/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(custom) = non_empty_var("HELPIX_CONFIG") {
        return Some(PathBuf::from(custom));
    }
    helpix_dir().ok().map(|d| d.join("config.toml"))
}

/// Checks if `HELPIX_DIAGNOSE` environment variable is set to true.
pub fn env_diag() -> bool {
    std::env::var("HELPIX_DIAGNOSE")
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set(key: &str, value: Option<&str>) -> Option<String> {
        let previous = std::env::var(key).ok();
        match value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
        previous
    }

    #[test]
    #[serial]
    fn test_helpix_home_overrides_home() {
        let prev = set("HELPIX_HOME", Some("/tmp/helpix-home"));
        assert_eq!(home_dir().unwrap(), PathBuf::from("/tmp/helpix-home"));
        assert_eq!(
            default_store_path().unwrap(),
            PathBuf::from("/tmp/helpix-home/.helpix/store.json")
        );
        set("HELPIX_HOME", prev.as_deref());
    }

    #[test]
    #[serial]
    fn test_config_path_override() {
        let prev = set("HELPIX_CONFIG", Some("/etc/helpix.toml"));
        assert_eq!(config_path(), Some(PathBuf::from("/etc/helpix.toml")));
        set("HELPIX_CONFIG", prev.as_deref());
    }

    #[test]
    #[serial]
    fn test_blank_store_var_is_ignored() {
        let prev = set("HELPIX_STORE", Some("  "));
        assert_eq!(store_path_from_env(), None);
        set("HELPIX_STORE", prev.as_deref());
    }

    #[test]
    #[serial]
    fn test_env_diag_flags() {
        let prev = set("HELPIX_DIAGNOSE", Some("TRUE"));
        assert!(env_diag());
        set("HELPIX_DIAGNOSE", Some("0"));
        assert!(!env_diag());
        set("HELPIX_DIAGNOSE", prev.as_deref());
    }
}
