//! # Command & Control Demo
//!
//! Starts a sample HCD in-process and drives it through the command service:
//! submit and wait, locking, and oneway-and-match.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmdctl_core::logging::init_structured_logging;
use cmdctl_core::matcher::DemandMatcher;
use cmdctl_core::models::{ComponentId, ComponentType, ControlCommand, DemandState};
use cmdctl_core::params::ParameterSetType;
use cmdctl_core::service::CommandService;
use cmdctl_core::system_context::SystemContext;
use cmdctl_core::test_helpers::{commands, encoder_key, spawn_sample_hcd, TEST_STATE_NAME};
use tracing::info;

const CLIENT_PREFIX: &str = "wfos.prog.cloudcover";
const HCD_PREFIX: &str = "wfos.blue.filter";
const HCD_NAME: &str = "filter";

#[derive(Parser)]
#[command(name = "cmdctl-demo")]
#[command(about = "Drive a sample component through the command protocol")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit one command by name and wait for its final response
    Submit {
        #[arg(default_value = commands::MEDIUM_RUNNING)]
        name: String,
    },
    /// Lock the component, show a foreign command being refused, then unlock
    Lock {
        #[arg(long, default_value_t = 5_000)]
        duration_ms: u64,
    },
    /// Send a oneway command and wait for the published state to match
    Match {
        #[arg(long, default_value_t = 100)]
        encoder: i32,
    },
    /// Run every scenario in turn
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let system = SystemContext::from_config_file(cli.config.as_deref())
        .context("failed to load configuration")?;
    init_structured_logging(&system.config().logging);
    info!(system_id = %system.system_id, "Command demo starting");

    let (component, _) = spawn_sample_hcd(&system, HCD_NAME, HCD_PREFIX).await?;
    let service = system
        .resolve_command_service(
            &ComponentId::new(HCD_NAME, ComponentType::Hcd),
            Duration::from_secs(1),
        )
        .await?;

    match cli.command.unwrap_or(Commands::All) {
        Commands::Submit { name } => submit_and_wait(&service, &name).await?,
        Commands::Lock { duration_ms } => {
            lock_scenario(&service, Duration::from_millis(duration_ms)).await?;
        }
        Commands::Match { encoder } => match_scenario(&service, encoder).await?,
        Commands::All => {
            submit_and_wait(&service, commands::IMMEDIATE).await?;
            submit_and_wait(&service, commands::MEDIUM_RUNNING).await?;
            submit_and_wait(&service, commands::FAILURE_AFTER_VALIDATION).await?;
            lock_scenario(&service, Duration::from_secs(5)).await?;
            match_scenario(&service, 100).await?;
        }
    }

    component.shutdown().await?;
    info!("Command demo finished");
    Ok(())
}

async fn submit_and_wait(service: &CommandService, name: &str) -> Result<()> {
    let command = ControlCommand::setup(CLIENT_PREFIX, name, None);
    let run_id = command.run_id();
    let timeout = service.default_timeout();

    let first = service.submit(command, timeout).await?;
    info!(run_id = %run_id, response = %first, "Submitted");
    if !first.is_terminal() {
        let last = service.query_final(run_id, timeout).await?;
        info!(run_id = %run_id, response = %last, "Finished");
    }
    Ok(())
}

async fn lock_scenario(service: &CommandService, duration: Duration) -> Result<()> {
    let timeout = service.default_timeout();

    let locked = service.lock(CLIENT_PREFIX, duration, timeout).await?;
    info!(owner = CLIENT_PREFIX, outcome = %locked, "Lock requested");

    let foreign = ControlCommand::setup("tcs.mobie.blue", commands::IMMEDIATE, None);
    let refused = service.submit(foreign, timeout).await?;
    info!(response = %refused, "Foreign command while locked");

    let released = service.unlock(CLIENT_PREFIX, timeout).await?;
    info!(owner = CLIENT_PREFIX, outcome = %released, "Unlock requested");
    Ok(())
}

async fn match_scenario(service: &CommandService, encoder: i32) -> Result<()> {
    let timeout = service.default_timeout();
    let command =
        ControlCommand::setup(CLIENT_PREFIX, commands::MATCHER, None).add(encoder_key().set([encoder]));
    let demand = DemandState::new(HCD_PREFIX, TEST_STATE_NAME).add(encoder_key().set([encoder]));
    let matcher = Arc::new(DemandMatcher::new(demand, false, timeout));

    let response = service.oneway_and_match(command, matcher, timeout).await?;
    info!(encoder, response = %response, "Oneway and match");
    Ok(())
}
