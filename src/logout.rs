//! Logout action invocation.
//!
//! Builds and spawns the configured logout command when the session
//! expires.

use crate::config::Config;
use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Executes the configured logout command.
#[derive(Debug)]
pub struct LogoutAction {
    /// Command and leading arguments, as configured. Empty when no command
    /// is configured.
    command: Vec<String>,

    /// Destination appended as the final argument.
    destination: String,

    /// Dry run mode.
    dry_run: bool,
}

impl LogoutAction {
    /// Create a logout action from config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            command: config.logout_command.clone().unwrap_or_default(),
            destination: config.logout_destination.clone(),
            dry_run: config.dry_run,
        }
    }

    /// Trigger the logout action.
    ///
    /// With no command configured the expiry is only logged. Failures are
    /// reported to the caller; they are never fatal to the watchdog.
    pub async fn trigger(&self) -> Result<()> {
        let Some((program, args)) = self.command_line() else {
            info!(
                "Session expired; no logout command configured (destination: {})",
                self.destination
            );
            return Ok(());
        };

        if self.dry_run {
            info!("[DRY RUN] Would execute: {} {}", program, args.join(" "));
            return Ok(());
        }

        debug!("Executing logout command: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn logout command")?
            .wait_with_output()
            .await
            .context("Failed to wait for logout command")?;

        if output.status.success() {
            info!("Logout command completed");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                "Logout command failed (exit code {:?}): {}",
                output.status.code(),
                stderr.trim()
            );
            anyhow::bail!("Logout command exited with code {:?}", output.status.code())
        }
    }

    /// Build the program and its full argument list: the configured
    /// arguments with the destination appended.
    fn command_line(&self) -> Option<(&str, Vec<String>)> {
        let (program, leading) = self.command.split_first()?;

        let mut args: Vec<String> = leading.to_vec();
        args.push(self.destination.clone());

        Some((program.as_str(), args))
    }
}
