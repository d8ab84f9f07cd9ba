//! Configuration loading and defaults for idle-watchd.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for idle-watchd.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Idle seconds up to (and including) which the session counts as
    /// active (default: 4).
    pub warn_after_seconds: u64,

    /// Idle seconds after which the session expires (default: 20).
    pub expire_after_seconds: u64,

    /// Destination appended to the logout command (default: "/logout").
    pub logout_destination: String,

    /// Logout command and its leading arguments.
    /// If unset, expiry is logged but nothing is executed.
    pub logout_command: Option<Vec<String>>,

    /// Path to the activity socket.
    /// If unset, uses $IDLE_WATCHD_SOCKET or $XDG_RUNTIME_DIR/idle-watchd.sock.
    pub activity_socket: Option<PathBuf>,

    /// Dry run mode: log the logout command instead of executing it.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warn_after_seconds: 4,
            expire_after_seconds: 20,
            logout_destination: "/logout".to_string(),
            logout_command: None,
            activity_socket: None,
            dry_run: false,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, or return defaults if not found.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load(p);
        }

        // Try default config path
        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("idle-watchd").join("config.toml");
            if default_path.exists() {
                return Self::load(&default_path);
            }
        }

        Ok(Self::default())
    }

    /// Reject threshold and command combinations the daemon cannot act on.
    fn validate(&self) -> Result<()> {
        if self.warn_after_seconds >= self.expire_after_seconds {
            anyhow::bail!(
                "warn_after_seconds ({}) must be less than expire_after_seconds ({})",
                self.warn_after_seconds,
                self.expire_after_seconds
            );
        }

        if let Some(ref command) = self.logout_command
            && command.is_empty()
        {
            anyhow::bail!("logout_command must name a program when set");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.warn_after_seconds, 4);
        assert_eq!(config.expire_after_seconds, 20);
        assert_eq!(config.logout_destination, "/logout");
        assert!(config.logout_command.is_none());
        assert!(config.activity_socket.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            warn_after_seconds = 30
            expire_after_seconds = 120
            logout_destination = "https://example.com/logout"
            logout_command = ["xdg-open"]
            activity_socket = "/run/user/1000/activity.sock"
            dry_run = true
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.warn_after_seconds, 30);
        assert_eq!(config.expire_after_seconds, 120);
        assert_eq!(config.logout_destination, "https://example.com/logout");
        assert_eq!(config.logout_command, Some(vec!["xdg-open".to_string()]));
        assert_eq!(
            config.activity_socket,
            Some(PathBuf::from("/run/user/1000/activity.sock"))
        );
        assert!(config.dry_run);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("expire_after_seconds = 60").unwrap();
        assert_eq!(config.warn_after_seconds, 4);
        assert_eq!(config.expire_after_seconds, 60);
        assert_eq!(config.logout_destination, "/logout");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "warn_after_seconds = 10").unwrap();
        writeln!(file, "expire_after_seconds = 40").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.warn_after_seconds, 10);
        assert_eq!(config.expire_after_seconds, 40);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/config.toml")).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        // No explicit path and (in all likelihood) no config installed in
        // the test environment; either way this must not error.
        let config = Config::load_or_default(None);
        assert!(config.is_ok());
    }

    #[test]
    fn test_validate_threshold_ordering() {
        let config = Config {
            warn_after_seconds: 20,
            expire_after_seconds: 20,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            warn_after_seconds: 30,
            expire_after_seconds: 20,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_logout_command() {
        let config = Config {
            logout_command: Some(vec![]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_thresholds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "warn_after_seconds = 120").unwrap();
        writeln!(file, "expire_after_seconds = 20").unwrap();

        assert!(Config::load(file.path()).is_err());
    }
}
