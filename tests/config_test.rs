//! Configuration files driving a running system

mod common;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use common::*;
use cmdctl_core::config::ConfigLoader;
use cmdctl_core::error::CommandError;
use cmdctl_core::models::CommandResponse;
use cmdctl_core::system_context::SystemContext;
use cmdctl_core::test_helpers::{commands, spawn_sample_hcd};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/cmdctl.toml");
    let config = ConfigLoader::load_with_env(Some(&path), Some(Default::default())).unwrap();
    assert_eq!(config.command.default_timeout(), Duration::from_secs(5));
}

#[test]
fn test_missing_file_is_a_configuration_error() {
    let result = ConfigLoader::load_with_env(
        Some(Path::new("/nonexistent/cmdctl.toml")),
        Some(Default::default()),
    );
    assert!(matches!(result, Err(CommandError::Configuration(_))));
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config("[command]\ndefault_timeout_ms = 750\n");
    let env = [(
        "CMDCTL_COMMAND__DEFAULT_TIMEOUT_MS".to_string(),
        "1250".to_string(),
    )]
    .into_iter()
    .collect();

    let config = ConfigLoader::load_with_env(Some(file.path()), Some(env)).unwrap();

    assert_eq!(config.command.default_timeout_ms, 1250);
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let file = write_config("[channels]\ntracker_mailbox_size = 0\n");
    let result = ConfigLoader::load_with_env(Some(file.path()), Some(Default::default()));
    assert!(matches!(result, Err(CommandError::Configuration(_))));
}

#[tokio::test]
async fn test_system_uses_file_timeouts() {
    let file = write_config("[command]\ndefault_timeout_ms = 750\ncompletion_timeout_ms = 900\n");
    let system = SystemContext::from_config_file(Some(file.path())).unwrap();
    let (component, _) = spawn_sample_hcd(&system, HCD_NAME, HCD_PREFIX).await.unwrap();

    let service = system.command_service(component);

    assert_eq!(service.default_timeout(), Duration::from_millis(750));
}

#[tokio::test]
async fn test_finished_commands_are_purged_after_retention() {
    let file = write_config("[tracker]\nretention_ms = 50\npurge_interval_ms = 20\n");
    let config = ConfigLoader::load_with_env(Some(file.path()), Some(Default::default())).unwrap();
    let ts = TestSystem::start_with(config).await;

    let command = setup(commands::IMMEDIATE);
    let run_id = command.run_id();
    let response = ts.service.submit(command, TIMEOUT).await.unwrap();
    assert_eq!(response, CommandResponse::completed(run_id));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        ts.service.query(run_id, TIMEOUT).await,
        Err(CommandError::UnknownRunId(run_id))
    );
}
