//! Activity signal sources.
//!
//! This module provides a generic abstraction for receiving user-activity
//! signals from whatever front end observes the user.

mod socket;

use async_trait::async_trait;
pub use socket::SocketSource;
use thiserror::Error;

use crate::domain::ActivityKind;

/// Source-agnostic activity signal.
///
/// Only the occurrence matters to the watchdog; any payload is carried for
/// logging and never interpreted.
#[derive(Debug, Clone)]
pub struct ActivitySignal {
    /// What kind of interaction occurred.
    pub kind: ActivityKind,

    /// Optional free-form payload.
    pub detail: Option<String>,
}

impl ActivitySignal {
    /// Create a new activity signal.
    pub fn new(kind: ActivityKind, detail: Option<String>) -> Self {
        Self { kind, detail }
    }
}

/// Trait for activity signal sources.
#[async_trait]
pub trait ActivitySource: Send {
    /// Get the next activity signal.
    ///
    /// This method blocks until a qualifying signal arrives or an error
    /// happens. Implementations should handle reconnection internally.
    async fn next_signal(&mut self) -> Result<ActivitySignal, SignalError>;
}

/// Errors that can occur while reading activity signals.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Socket connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Socket path not found: {0}")]
    SocketNotFound(String),
}
