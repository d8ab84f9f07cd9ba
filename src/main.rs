//! idle-watchd - User-inactivity watchdog daemon.
//!
//! Counts seconds since the last user-activity signal, warns while a
//! session approaches expiry, and triggers a logout action once it has been
//! idle for too long.

mod config;
mod domain;
mod logout;
mod session;
mod signal;
mod tracker;

use crate::config::Config;
use crate::logout::LogoutAction;
use crate::session::{SessionPolicy, SessionVerdict};
use crate::signal::{ActivitySource, SocketSource};
use crate::tracker::IdleTracker;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// User-inactivity watchdog daemon.
///
/// Listens for user-activity signals and enforces session expiry after
/// sustained inactivity.
#[derive(Parser, Debug)]
#[command(name = "idle-watchd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable dry-run mode (don't actually execute the logout command).
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print received activity signals to stdout.
    #[arg(long)]
    print_signals: bool,

    /// Run in oneshot mode: connect, print a few signals, then exit.
    #[arg(long)]
    oneshot: bool,

    /// Number of signals to capture in oneshot mode.
    #[arg(long, default_value = "5")]
    oneshot_count: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level)?;

    info!("idle-watchd v{} starting", env!("CARGO_PKG_VERSION"));

    // Load config
    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;

    if args.dry_run {
        config.dry_run = true;
    }

    // Check environment
    let socket_resolvable = config.activity_socket.is_some()
        || env::var("IDLE_WATCHD_SOCKET").is_ok()
        || env::var("XDG_RUNTIME_DIR").is_ok();
    if !socket_resolvable {
        error!("No activity socket available.");
        for diag in SocketSource::get_diagnostics() {
            error!("  {}", diag);
        }
        error!("");
        error!("Set activity_socket in the config file, or IDLE_WATCHD_SOCKET,");
        error!("or run inside a session that provides XDG_RUNTIME_DIR.");
        anyhow::bail!("Activity socket not available");
    }

    // Show diagnostics
    for diag in SocketSource::get_diagnostics() {
        debug!("{}", diag);
    }

    info!(
        "Configuration loaded (warn after {}s, expire after {}s, dry_run={})",
        config.warn_after_seconds, config.expire_after_seconds, config.dry_run
    );

    // Oneshot mode
    if args.oneshot {
        return run_oneshot(&config, args.oneshot_count, args.print_signals).await;
    }

    // Normal daemon mode
    run_daemon(config, args.print_signals).await
}

/// Initialize logging with the specified level.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(format!("idle_watchd={}", level))
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    Ok(())
}

/// Run in oneshot mode: capture a few signals and exit.
async fn run_oneshot(config: &Config, count: usize, print_signals: bool) -> Result<()> {
    info!("Running in oneshot mode, capturing {} signals", count);

    let mut source = SocketSource::connect(config.activity_socket.as_deref()).await?;

    // Capture signals
    let mut captured = 0;
    while captured < count {
        match tokio::time::timeout(Duration::from_secs(30), source.next_signal()).await {
            Ok(Ok(signal)) => {
                captured += 1;
                if print_signals {
                    println!(
                        "[{}] | kind={} detail={:?}",
                        captured,
                        signal.kind.as_str(),
                        signal.detail
                    );
                } else {
                    info!(
                        "Signal {}/{}: kind={}, detail={:?}",
                        captured,
                        count,
                        signal.kind.as_str(),
                        signal.detail
                    );
                }
            }
            Ok(Err(e)) => {
                error!("Activity signal error: {}", e);
                break;
            }
            Err(_) => {
                warn!("Timeout waiting for activity signals");
                break;
            }
        }
    }

    info!("Oneshot mode complete, captured {} signals", captured);
    Ok(())
}

/// Run the daemon event loop.
async fn run_daemon(config: Config, print_signals: bool) -> Result<()> {
    // Initialize components
    let policy = SessionPolicy::from_config(&config);
    let logout = LogoutAction::from_config(&config);

    // The subscription is taken before the first reset so the startup zero
    // is observed.
    let tracker = IdleTracker::new();
    let mut ticks = tracker.subscribe();

    let mut source = SocketSource::connect(config.activity_socket.as_deref()).await?;

    // Daemon startup counts as activity, same as a session load signal.
    tracker.reset().await;

    info!("Daemon started, watching for activity signals...");

    loop {
        tokio::select! {
            // Handle activity signals
            signal = source.next_signal() => {
                match signal {
                    Ok(signal) => {
                        if print_signals {
                            println!(
                                "[SIGNAL] | kind={} detail={:?}",
                                signal.kind.as_str(),
                                signal.detail
                            );
                        }
                        debug!("Activity: {}", signal.kind.as_str());
                        tracker.reset().await;
                    }
                    Err(e) => {
                        // The source reconnects on its own; an error here
                        // means even that gave up.
                        error!("Activity signal error: {}", e);
                        return Err(e.into());
                    }
                }
            }

            // React to each published idle-seconds value
            tick = ticks.recv() => {
                match tick {
                    Ok(idle_seconds) => {
                        if handle_tick(&policy, &logout, idle_seconds).await {
                            info!("Session expired, exiting");
                            return Ok(());
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Tick stream lagged; skipped {} values", missed);
                    }
                    Err(RecvError::Closed) => {
                        error!("Tick stream closed unexpectedly");
                        return Ok(());
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt, shutting down");
                return Ok(());
            }
        }
    }
}

/// React to one published idle-seconds value.
///
/// Returns true once the session has expired and the daemon should stop.
async fn handle_tick(policy: &SessionPolicy, logout: &LogoutAction, idle_seconds: u64) -> bool {
    match policy.evaluate(idle_seconds) {
        SessionVerdict::Fine => {
            debug!("Idle {}s: everything is fine", idle_seconds);
            false
        }
        SessionVerdict::Warn(seconds) => {
            info!("{}", SessionPolicy::warning_message(seconds));
            false
        }
        SessionVerdict::Expired(seconds) => {
            warn!("Session idle for {}s, triggering logout", seconds);
            if let Err(e) = logout.trigger().await {
                error!("Logout action failed: {}", e);
            }
            true
        }
    }
}
