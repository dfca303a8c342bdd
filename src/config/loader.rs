//! Configuration Loader
//!
//! Layers built-in defaults, an optional configuration file (any format the
//! `config` crate understands by extension) and `CMDCTL_*` environment
//! variables, then validates the result.
//!
//! Environment keys use `__` between sections:
//! `CMDCTL_COMMAND__DEFAULT_TIMEOUT_MS=2000`.

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use tracing::debug;

use super::CommandServiceConfig;
use crate::error::Result;

pub const ENV_PREFIX: &str = "CMDCTL";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults, `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> Result<CommandServiceConfig> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment map
    ///
    /// Useful for testing without modifying global environment variables.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<CommandServiceConfig> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading command service configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: CommandServiceConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            default_timeout_ms = config.command.default_timeout_ms,
            retention_ms = config.tracker.retention_ms,
            "Command service configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_without_sources_yields_defaults() {
        let config = ConfigLoader::load_with_env(None, Some(HashMap::new())).unwrap();
        assert_eq!(config, CommandServiceConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[command]\ndefault_timeout_ms = 750\n\n[tracker]\nretention_ms = 1000\n\n[logging]\njson = true"
        )
        .unwrap();

        let config = ConfigLoader::load_with_env(Some(file.path()), Some(HashMap::new())).unwrap();
        assert_eq!(config.command.default_timeout_ms, 750);
        assert_eq!(config.tracker.retention_ms, 1000);
        assert!(config.logging.json);
        assert_eq!(config.tracker.purge_interval_ms, 10_000);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[command]\ndefault_timeout_ms = 750").unwrap();

        let env = HashMap::from([(
            "CMDCTL_COMMAND__DEFAULT_TIMEOUT_MS".to_string(),
            "2000".to_string(),
        )]);
        let config = ConfigLoader::load_with_env(Some(file.path()), Some(env)).unwrap();
        assert_eq!(config.command.default_timeout_ms, 2000);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let env = HashMap::from([(
            "CMDCTL_CHANNELS__TRACKER_MAILBOX_SIZE".to_string(),
            "0".to_string(),
        )]);
        assert!(ConfigLoader::load_with_env(None, Some(env)).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = Path::new("/nonexistent/cmdctl.toml");
        assert!(ConfigLoader::load_with_env(Some(path), Some(HashMap::new())).is_err());
    }
}
