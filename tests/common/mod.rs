//! Shared setup for the integration tests
//!
//! Every test gets its own `SystemContext`, so components and their
//! registrations never leak between tests.

#![allow(dead_code)]

pub mod strategies;

use std::sync::Arc;
use std::time::Duration;

use cmdctl_core::component::ComponentRef;
use cmdctl_core::config::CommandServiceConfig;
use cmdctl_core::models::ControlCommand;
use cmdctl_core::service::CommandService;
use cmdctl_core::system_context::SystemContext;
use cmdctl_core::test_helpers::{spawn_sample_hcd, SampleComponentHandlers};

pub const TIMEOUT: Duration = Duration::from_secs(5);
pub const CLIENT_PREFIX: &str = "wfos.prog.cloudcover";
pub const OTHER_PREFIX: &str = "tcs.mobie.blue";
pub const HCD_PREFIX: &str = "wfos.blue.filter";
pub const HCD_NAME: &str = "filter";

pub struct TestSystem {
    pub system: Arc<SystemContext>,
    pub component: ComponentRef,
    pub handlers: Arc<SampleComponentHandlers>,
    pub service: CommandService,
}

impl TestSystem {
    pub async fn start() -> Self {
        Self::start_with(CommandServiceConfig::default()).await
    }

    pub async fn start_with(config: CommandServiceConfig) -> Self {
        let system = SystemContext::new(config).expect("valid test configuration");
        let (component, handlers) = spawn_sample_hcd(&system, HCD_NAME, HCD_PREFIX)
            .await
            .expect("sample HCD should start");
        let service = system.command_service(component.clone());
        Self {
            system,
            component,
            handlers,
            service,
        }
    }

    /// Start another sample HCD in the same system
    pub async fn spawn_hcd(&self, name: &str) -> (CommandService, Arc<SampleComponentHandlers>) {
        let (component, handlers) = spawn_sample_hcd(&self.system, name, HCD_PREFIX)
            .await
            .expect("sample HCD should start");
        (self.system.command_service(component), handlers)
    }
}

pub fn setup(name: &str) -> ControlCommand {
    ControlCommand::setup(CLIENT_PREFIX, name, None)
}

pub fn setup_from(source: &str, name: &str) -> ControlCommand {
    ControlCommand::setup(source, name, None)
}
