#![allow(clippy::doc_markdown)] // Allow technical terms like HCD, queryFinal in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Command & Control Core
//!
//! Asynchronous command protocol between client programs and target
//! components (assemblies and HCDs) in a distributed instrument control
//! system.
//!
//! ## Overview
//!
//! A client sends a [`ControlCommand`](models::ControlCommand) to a target
//! and gets back a [`CommandResponse`](models::CommandResponse). Tracked
//! commands move through a small lifecycle (`Started`, then one of the
//! terminal outcomes) that the target records per run id, so clients can
//! query it, wait for it, or subscribe to it. Targets can be locked by one
//! owner at a time, publish their current state to subscribers, and be
//! driven as a group through the [`CommandDistributor`](distributor::CommandDistributor).
//!
//! ## Architecture
//!
//! Every component is a set of tokio actors, each owning its state behind a
//! bounded mailbox:
//!
//! - the supervisor, which enforces the lock and calls the component's
//!   [`ComponentHandlers`](component::ComponentHandlers)
//! - the [`tracker`], holding the lifecycle record of each run id
//! - the [`pubsub`] actor, fanning out current state
//!
//! Clients talk to components only through a
//! [`CommandService`](service::CommandService) built from a
//! [`ComponentRef`](component::ComponentRef) found via the [`location`]
//! service.
//!
//! ## Module Organization
//!
//! - [`models`] - commands, responses, identities and state variables
//! - [`params`] - typed parameters and parameter sets
//! - [`state_machine`] - command lifecycle transitions
//! - [`tracker`] - per-run-id response tracking
//! - [`lock`] - component locking
//! - [`pubsub`] - current-state publication
//! - [`matcher`] - waiting for a published state to satisfy a demand
//! - [`component`] - the component runtime
//! - [`service`] - the client-side command service
//! - [`distributor`] - fan-out across several targets
//! - [`config`] - configuration management
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use cmdctl_core::config::CommandServiceConfig;
//! use cmdctl_core::models::ControlCommand;
//! use cmdctl_core::system_context::SystemContext;
//! use cmdctl_core::test_helpers::{commands, spawn_sample_hcd};
//!
//! # async fn example() -> cmdctl_core::Result<()> {
//! let system = SystemContext::new(CommandServiceConfig::default())?;
//! let (component, _) = spawn_sample_hcd(&system, "filter", "wfos.blue.filter").await?;
//! let service = system.command_service(component);
//!
//! let command = ControlCommand::setup("wfos.prog.cloudcover", commands::SHORT_RUNNING, None);
//! let response = service.complete(command, Duration::from_secs(5)).await?;
//! assert!(response.is_completed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod component;
pub mod config;
pub mod constants;
pub mod distributor;
pub mod error;
pub mod location;
pub mod lock;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod params;
pub mod pubsub;
pub mod service;
pub mod state_machine;
pub mod system_context;
pub mod test_helpers;
pub mod tracker;

pub use component::{ComponentContext, ComponentHandlers, ComponentInfo, ComponentRef};
pub use config::{CommandServiceConfig, ConfigLoader};
pub use distributor::{CommandDistributor, CommandTarget};
pub use error::{CommandError, Result};
pub use location::{LocalLocationService, LocationService};
pub use lock::LockingResponse;
pub use matcher::{DemandMatcher, MatchMode, MatcherResponse, PresenceMatcher, StateMatcher};
pub use models::{
    CommandIssue, CommandResponse, ComponentId, ComponentType, ControlCommand, CurrentState,
    DemandState, Prefix, RunId, StateName,
};
pub use service::CommandService;
pub use state_machine::CommandState;
pub use system_context::SystemContext;
