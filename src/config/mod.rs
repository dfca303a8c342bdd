//! # Command Service Configuration
//!
//! Runtime tuning for the command & control core: caller-side timeouts, tracker
//! retention, actor mailbox sizes, location polling and logging.
//!
//! ## Architecture
//!
//! - **Defaults everywhere**: every field has a built-in default, so an empty
//!   file (or no file at all) yields a working configuration
//! - **Layered sources**: defaults, then an optional file, then `CMDCTL_*`
//!   environment variables (see [`loader::ConfigLoader`])
//! - **Explicit Validation**: zero timeouts and zero-capacity mailboxes are
//!   rejected up front rather than failing later inside an actor
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cmdctl_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load(None)?;
//! let timeout = config.command.default_timeout();
//! # Ok(())
//! # }
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_COMPLETION_TIMEOUT_MS, DEFAULT_MAILBOX_SIZE,
    DEFAULT_RESOLVE_POLL_INTERVAL_MS, DEFAULT_TRACKER_PURGE_INTERVAL_MS,
    DEFAULT_TRACKER_RETENTION_MS,
};
use crate::error::{CommandError, Result};

pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandServiceConfig {
    /// Caller-side command timeouts
    pub command: CommandConfig,

    /// Response tracker retention
    pub tracker: TrackerConfig,

    /// Actor mailbox capacities
    pub channels: ChannelConfig,

    /// Location service behavior
    pub location: LocationConfig,

    /// Structured logging
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandConfig {
    pub default_timeout_ms: u64,
    /// Budget for the query-final half of `complete`
    pub completion_timeout_ms: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            completion_timeout_ms: DEFAULT_COMPLETION_TIMEOUT_MS,
        }
    }
}

impl CommandConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// How long terminal records remain queryable
    pub retention_ms: u64,
    pub purge_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            retention_ms: DEFAULT_TRACKER_RETENTION_MS,
            purge_interval_ms: DEFAULT_TRACKER_PURGE_INTERVAL_MS,
        }
    }
}

impl TrackerConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_millis(self.retention_ms)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_millis(self.purge_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub component_mailbox_size: usize,
    pub tracker_mailbox_size: usize,
    pub pubsub_mailbox_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            component_mailbox_size: DEFAULT_MAILBOX_SIZE,
            tracker_mailbox_size: DEFAULT_MAILBOX_SIZE,
            pubsub_mailbox_size: DEFAULT_MAILBOX_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationConfig {
    pub resolve_poll_interval_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            resolve_poll_interval_ms: DEFAULT_RESOLVE_POLL_INTERVAL_MS,
        }
    }
}

impl LocationConfig {
    pub fn resolve_poll_interval(&self) -> Duration {
        Duration::from_millis(self.resolve_poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CommandServiceConfig {
    /// Reject values that would make an actor or a waiting caller misbehave
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, u64); 5] = [
            ("command.default_timeout_ms", self.command.default_timeout_ms),
            (
                "command.completion_timeout_ms",
                self.command.completion_timeout_ms,
            ),
            ("tracker.retention_ms", self.tracker.retention_ms),
            ("tracker.purge_interval_ms", self.tracker.purge_interval_ms),
            (
                "location.resolve_poll_interval_ms",
                self.location.resolve_poll_interval_ms,
            ),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(CommandError::Configuration(format!(
                    "{field} must be greater than zero"
                )));
            }
        }

        let mailboxes = [
            (
                "channels.component_mailbox_size",
                self.channels.component_mailbox_size,
            ),
            (
                "channels.tracker_mailbox_size",
                self.channels.tracker_mailbox_size,
            ),
            (
                "channels.pubsub_mailbox_size",
                self.channels.pubsub_mailbox_size,
            ),
        ];
        for (field, value) in mailboxes {
            if value == 0 {
                return Err(CommandError::Configuration(format!(
                    "{field} must be greater than zero"
                )));
            }
        }

        Ok(())
    }
}
