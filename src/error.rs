//! Error types for the command & control core.
//!
//! Protocol outcomes (validation failures, lock conflicts, execution failures)
//! are never errors: they travel as [`CommandResponse`](crate::models::CommandResponse)
//! values. `CommandError` covers what is left: the caller's patience running out,
//! queries for ids nobody tracks, and a transport that went away.

use std::time::Duration;

use thiserror::Error;

use crate::models::RunId;
use crate::state_machine::TransitionError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Timed out after {timeout_ms}ms waiting for {operation}")]
    Timeout { operation: String, timeout_ms: u64 },
    #[error("No command tracked for run id {0}")]
    UnknownRunId(RunId),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Component not found: {0}")]
    ComponentNotFound(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid lifecycle transition: {0}")]
    InvalidTransition(#[from] TransitionError),
}

impl CommandError {
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        CommandError::Timeout {
            operation: operation.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        CommandError::Transport(reason.into())
    }

    /// Check whether this error is the caller's own timeout budget running out
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Timeout { .. })
    }
}

impl From<config::ConfigError> for CommandError {
    fn from(error: config::ConfigError) -> Self {
        CommandError::Configuration(error.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CommandError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        CommandError::Transport("mailbox closed".to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for CommandError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        CommandError::Transport("reply channel dropped before responding".to_string())
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
