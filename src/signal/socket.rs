//! Unix-socket activity signal backend.
//!
//! Connects to a local stream socket on which a front end (compositor
//! helper, browser native host, terminal wrapper) reports user activity as
//! newline-delimited signal lines.

use super::{ActivitySignal, ActivitySource, SignalError};
use crate::domain::ActivityKind;
use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;
use tracing::{info, trace, warn};

/// Environment variable overriding the socket path.
const SOCKET_ENV_VAR: &str = "IDLE_WATCHD_SOCKET";

/// Default socket file name under `$XDG_RUNTIME_DIR`.
const SOCKET_FILE_NAME: &str = "idle-watchd.sock";

/// Unix-socket activity source implementation.
pub struct SocketSource {
    reader: Option<BufReader<UnixStream>>,
    socket_path: PathBuf,
    backoff: Duration,
}

impl SocketSource {
    /// Connect to the activity socket.
    ///
    /// The path comes from `configured` if given, otherwise from
    /// `IDLE_WATCHD_SOCKET`, otherwise `$XDG_RUNTIME_DIR/idle-watchd.sock`.
    pub async fn connect(configured: Option<&Path>) -> Result<Self, SignalError> {
        let socket_path = resolve_socket_path(configured)?;
        info!("Connecting to activity socket: {}", socket_path.display());

        let stream = UnixStream::connect(&socket_path)
            .await
            .map_err(|e| SignalError::ConnectionFailed(e.to_string()))?;

        info!("Connected to activity socket");

        Ok(Self {
            reader: Some(BufReader::new(stream)),
            socket_path,
            backoff: Duration::from_millis(250),
        })
    }

    /// Get diagnostic information about the socket environment.
    pub fn get_diagnostics() -> Vec<String> {
        let mut diags = Vec::new();

        match env::var(SOCKET_ENV_VAR) {
            Ok(v) => diags.push(format!("{SOCKET_ENV_VAR}={v}")),
            Err(_) => diags.push(format!("{SOCKET_ENV_VAR}: NOT SET")),
        }

        match env::var("XDG_RUNTIME_DIR") {
            Ok(v) => diags.push(format!("XDG_RUNTIME_DIR={v}")),
            Err(_) => diags.push("XDG_RUNTIME_DIR: NOT SET".to_string()),
        }

        if let Ok(path) = resolve_socket_path(None) {
            diags.push(format!("Activity socket: {} (exists)", path.display()));
        } else {
            diags.push("Activity socket: NOT FOUND".to_string());
        }

        diags
    }

    /// Attempt to reconnect to the activity socket.
    async fn reconnect(&mut self) -> Result<(), SignalError> {
        const MAX_BACKOFF: Duration = Duration::from_secs(5);

        warn!(
            "Activity socket connection lost. Retrying in {:?}...",
            self.backoff
        );

        tokio::time::sleep(self.backoff).await;

        // Exponential backoff with cap
        self.backoff = std::cmp::min(self.backoff * 2, MAX_BACKOFF);

        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| SignalError::ConnectionFailed(e.to_string()))?;

        info!("Reconnected to activity socket");
        self.reader = Some(BufReader::new(stream));
        self.backoff = Duration::from_millis(250); // Reset backoff on success

        Ok(())
    }
}

#[async_trait]
impl ActivitySource for SocketSource {
    async fn next_signal(&mut self) -> Result<ActivitySignal, SignalError> {
        loop {
            let reader = match &mut self.reader {
                Some(r) => r,
                None => {
                    self.reconnect().await?;
                    continue;
                }
            };

            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    // EOF - socket closed
                    warn!("Activity stream ended (EOF)");
                    self.reader = None;
                    self.reconnect().await?;
                    continue;
                }
                Ok(_) => {
                    trace!("Received line: {}", line.trim());

                    if let Some(signal) = parse_signal_line(&line) {
                        return Ok(signal);
                    }
                    // Not a qualifying signal, read next line
                }
                Err(e) => {
                    warn!("Read error: {}", e);
                    self.reader = None;
                    self.reconnect().await?;
                    continue;
                }
            }
        }
    }
}

/// Resolve the activity socket path.
fn resolve_socket_path(configured: Option<&Path>) -> Result<PathBuf, SignalError> {
    let socket_path = if let Some(path) = configured {
        path.to_path_buf()
    } else if let Ok(path) = env::var(SOCKET_ENV_VAR) {
        PathBuf::from(path)
    } else {
        let xdg_runtime_dir = env::var("XDG_RUNTIME_DIR")
            .map_err(|_| SignalError::EnvVarNotSet("XDG_RUNTIME_DIR".to_string()))?;

        PathBuf::from(&xdg_runtime_dir).join(SOCKET_FILE_NAME)
    };

    if !socket_path.exists() {
        return Err(SignalError::SocketNotFound(format!(
            "{}",
            socket_path.display()
        )));
    }

    Ok(socket_path)
}

/// Parse a single line from the activity stream.
///
/// Format: KIND>>DETAIL\n. The detail is optional; a bare KIND line is also
/// accepted. Unknown kinds are ignored.
fn parse_signal_line(line: &str) -> Option<ActivitySignal> {
    let line = line.trim_end();

    let (name, detail) = match line.split_once(">>") {
        Some((name, detail)) if detail.is_empty() => (name, None),
        Some((name, detail)) => (name, Some(detail.to_string())),
        None => (line, None),
    };

    let Some(kind) = ActivityKind::from_name(name) else {
        trace!("Ignoring non-activity line: {}", line);
        return None;
    };

    Some(ActivitySignal::new(kind, detail))
}
