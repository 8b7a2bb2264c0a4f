use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::markup::Writer;

/// Default comment marker for content and settings files.
pub const DEFAULT_COMMENT_MARKER: &str = "#";

/// Converter configuration loaded from environment variables.
/// Every variable is optional; unset variables fall back to the defaults below.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory `<writer>.cvsettings` files are resolved against.
    pub settings_dir: PathBuf,
    /// Comment marker for section-format files. `None` disables comment stripping.
    pub comment_marker: Option<String>,
    pub default_writer: Writer,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            settings_dir: PathBuf::from("."),
            comment_marker: Some(DEFAULT_COMMENT_MARKER.to_string()),
            default_writer: Writer::Html,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            settings_dir: optional_env("CVIFIER_SETTINGS_DIR")?
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_dir),
            comment_marker: match optional_env("CVIFIER_COMMENT_MARKER")? {
                Some(marker) if marker.is_empty() => None,
                Some(marker) => Some(marker),
                None => defaults.comment_marker,
            },
            default_writer: optional_env("CVIFIER_WRITER")?
                .map(|name| Writer::from_name(&name))
                .unwrap_or(defaults.default_writer),
        })
    }
}

fn optional_env(key: &str) -> Result<Option<String>> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => {
            Err(e).with_context(|| format!("Environment variable '{key}' is not valid unicode"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const ENV_KEYS: [&str; 3] = [
        "CVIFIER_SETTINGS_DIR",
        "CVIFIER_COMMENT_MARKER",
        "CVIFIER_WRITER",
    ];

    // Environment variables are process-wide; tests touching them take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Runs `f` with the cvifier variables set to `vars` (all others unset),
    /// restoring the previous values afterwards.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved: Vec<(&str, Option<String>)> =
            ENV_KEYS.iter().map(|key| (*key, std::env::var(key).ok())).collect();

        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        let result = f();

        for (key, value) in saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
        result
    }

    #[test]
    fn test_default_config_uses_working_directory() {
        let config = Config::default();
        assert_eq!(config.settings_dir, PathBuf::from("."));
        assert_eq!(config.comment_marker.as_deref(), Some("#"));
        assert_eq!(config.default_writer, Writer::Html);
    }

    #[test]
    fn test_optional_env_missing_is_none() {
        let value = optional_env("CVIFIER_TEST_SURELY_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_from_env_without_variables_uses_defaults() {
        let config = with_env(&[], || Config::from_env().unwrap());
        assert_eq!(config.settings_dir, PathBuf::from("."));
        assert_eq!(config.comment_marker.as_deref(), Some(DEFAULT_COMMENT_MARKER));
        assert_eq!(config.default_writer, Writer::Html);
    }

    #[test]
    fn test_from_env_settings_dir() {
        let config = with_env(&[("CVIFIER_SETTINGS_DIR", "/etc/cvifier")], || {
            Config::from_env().unwrap()
        });
        assert_eq!(config.settings_dir, PathBuf::from("/etc/cvifier"));
    }

    #[test]
    fn test_from_env_empty_comment_marker_disables_comments() {
        let config = with_env(&[("CVIFIER_COMMENT_MARKER", "")], || Config::from_env().unwrap());
        assert!(config.comment_marker.is_none());
    }

    #[test]
    fn test_from_env_custom_comment_marker() {
        let config = with_env(&[("CVIFIER_COMMENT_MARKER", "%")], || Config::from_env().unwrap());
        assert_eq!(config.comment_marker.as_deref(), Some("%"));
    }

    #[test]
    fn test_from_env_writer_is_case_insensitive() {
        let config = with_env(&[("CVIFIER_WRITER", "LaTeX")], || Config::from_env().unwrap());
        assert_eq!(config.default_writer, Writer::Latex);
    }
}
