//! # Structured Logging Module
//!
//! Console logging for command lifecycles, either human-readable or as JSON
//! lines. `RUST_LOG` wins over the configured level when it is set.

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::models::RunId;
use crate::state_machine::CommandState;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
///
/// Safe to call repeatedly and alongside a subscriber installed elsewhere
/// (tests, embedding applications): later calls are no-ops.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = build_filter(&config.level);

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        // try_init: an existing global subscriber is not an error
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            level = %config.level,
            json = config.json,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log one step of a command's lifecycle with a uniform set of fields
pub fn log_command_operation(
    operation: &str,
    component: &str,
    run_id: RunId,
    state: Option<CommandState>,
    details: Option<&str>,
) {
    tracing::debug!(
        operation = %operation,
        component = %component,
        run_id = %run_id,
        state = ?state,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "COMMAND_OPERATION"
    );
}

/// Log a lock protocol event
pub fn log_lock_operation(operation: &str, component: &str, owner: &str, outcome: &str) {
    tracing::info!(
        operation = %operation,
        component = %component,
        owner = %owner,
        outcome = %outcome,
        timestamp = %Utc::now().to_rfc3339(),
        "LOCK_OPERATION"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init_structured_logging(&config);
        init_structured_logging(&LoggingConfig {
            level: "debug".to_string(),
            json: true,
        });
        log_command_operation("submit", "test-hcd", RunId::new(), Some(CommandState::Started), None);
    }

    #[test]
    fn test_bad_level_falls_back() {
        // Must not panic on garbage directives
        let _ = build_filter("not a [valid directive");
    }
}
