//! A component whose behavior is selected by command name
//!
//! Every command is validated, announced on the pub-sub channel, and then
//! handled according to the names in [`commands`]. Anything else is rejected
//! as unsupported.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::component::{ComponentContext, ComponentHandlers, ComponentInfo, ComponentRef};
use crate::error::{CommandError, Result};
use crate::models::{
    CommandIssue, CommandKind, CommandResponse, ComponentId, ComponentType, ControlCommand,
    CurrentState, RunId, ValidateCommandResponse,
};
use crate::params::{int_key, string_key, Key, ParameterSet, ParameterSetType};
use crate::system_context::SystemContext;

pub mod commands {
    pub const IMMEDIATE: &str = "immediate";
    pub const IMMEDIATE_RESULT: &str = "immediateResult";
    pub const INVALID: &str = "invalid";
    pub const ACCEPTED: &str = "accepted";
    pub const SHORT_RUNNING: &str = "shortRunning";
    pub const MEDIUM_RUNNING: &str = "mediumRunning";
    pub const LONG_RUNNING: &str = "longRunning";
    pub const MATCHER: &str = "matcher";
    pub const FAILURE_AFTER_VALIDATION: &str = "failureAfterValidation";
    pub const FAILURE: &str = "failure";
    /// Validation holds the component for [`super::SLOW_VALIDATION_DURATION`]
    pub const SLOW_VALIDATION: &str = "slowValidation";
    /// Passes validation, then `on_submit` answers `Invalid`
    pub const INVALID_AFTER_VALIDATION: &str = "invalidAfterValidation";

    pub const ALL: [&str; 12] = [
        IMMEDIATE,
        IMMEDIATE_RESULT,
        INVALID,
        ACCEPTED,
        SHORT_RUNNING,
        MEDIUM_RUNNING,
        LONG_RUNNING,
        MATCHER,
        FAILURE_AFTER_VALIDATION,
        FAILURE,
        SLOW_VALIDATION,
        INVALID_AFTER_VALIDATION,
    ];
}

pub const SHORT_RUNNING_DURATION: Duration = Duration::from_millis(100);
pub const MEDIUM_RUNNING_DURATION: Duration = Duration::from_millis(300);
pub const LONG_RUNNING_DURATION: Duration = Duration::from_millis(500);
pub const SLOW_VALIDATION_DURATION: Duration = Duration::from_millis(200);

/// State published on every validation and submission, and by `matcher`
pub const TEST_STATE_NAME: &str = "testStateName";
/// State carrying the parameters of each accepted setup or observe
pub const TEST_STATE_SETUP: &str = "testStateSetup";

pub const INVALID_REASON: &str = "Testing: Received failure, will return Invalid.";
pub const FAILURE_REASON: &str = "Testing: Received failure, will return Error.";

pub mod choices {
    pub const COMMAND_VALIDATION: &str = "command_validation";
    pub const SUBMIT_COMMAND: &str = "submit_command";
    pub const ONEWAY_COMMAND: &str = "oneway_command";
    pub const SETUP_CONFIG: &str = "setup_config";
    pub const OBSERVE_CONFIG: &str = "observe_config";
}

pub fn choice_key() -> Key<String> {
    string_key("choiceKey")
}

pub fn encoder_key() -> Key<i32> {
    int_key("encoder")
}

/// Value placed in the result of `immediateResult`
pub const IMMEDIATE_RESULT_ENCODER: i32 = 20;

#[derive(Debug, Default)]
pub struct SampleComponentHandlers {
    validations: AtomicUsize,
    oneways: AtomicUsize,
    fail_initialize: bool,
    shut_down: AtomicBool,
}

impl SampleComponentHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers whose `initialize` fails
    pub fn failing() -> Self {
        Self {
            fail_initialize: true,
            ..Self::default()
        }
    }

    /// Number of commands that reached validation
    pub fn validation_count(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }

    /// Number of oneway commands executed after validation
    pub fn oneway_count(&self) -> usize {
        self.oneways.load(Ordering::SeqCst)
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    async fn announce(ctx: &ComponentContext, choice: &str) {
        let state = CurrentState::new(ctx.prefix().clone(), TEST_STATE_NAME)
            .add(choice_key().set([choice.to_string()]));
        if let Err(e) = ctx.publish_current_state(state).await {
            debug!(component = %ctx.component_id(), error = %e, "Could not publish announcement");
        }
    }

    async fn publish_config(ctx: &ComponentContext, command: &ControlCommand) {
        let choice = match command.kind() {
            CommandKind::Setup => choices::SETUP_CONFIG,
            CommandKind::Observe => choices::OBSERVE_CONFIG,
        };
        let state = CurrentState::new(ctx.prefix().clone(), TEST_STATE_SETUP)
            .add(choice_key().set([choice.to_string()]))
            .madd(command.params().iter().cloned());
        let _ = ctx.publish_current_state(state).await;
    }

    /// Publish the command's own parameters under [`TEST_STATE_NAME`]
    async fn publish_demand(ctx: &ComponentContext, command: &ControlCommand) {
        let state = CurrentState::new(ctx.prefix().clone(), TEST_STATE_NAME)
            .madd(command.params().iter().cloned());
        let _ = ctx.publish_current_state(state).await;
    }

    fn finish_later(ctx: &ComponentContext, after: Duration, response: CommandResponse) {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Err(e) = ctx.update_command(response).await {
                debug!(component = %ctx.component_id(), error = %e, "Could not report completion");
            }
        });
    }
}

#[async_trait]
impl ComponentHandlers for SampleComponentHandlers {
    async fn initialize(&self, ctx: &ComponentContext) -> Result<()> {
        if self.fail_initialize {
            return Err(CommandError::Configuration(format!(
                "{} refused to initialize",
                ctx.component_id()
            )));
        }
        Ok(())
    }

    async fn validate_command(
        &self,
        ctx: &ComponentContext,
        command: &ControlCommand,
    ) -> ValidateCommandResponse {
        self.validations.fetch_add(1, Ordering::SeqCst);
        Self::announce(ctx, choices::COMMAND_VALIDATION).await;

        let name = command.command_name().as_str();
        if name == commands::SLOW_VALIDATION {
            tokio::time::sleep(SLOW_VALIDATION_DURATION).await;
        }
        if name == commands::INVALID {
            ValidateCommandResponse::Invalid(CommandIssue::Other(INVALID_REASON.to_string()))
        } else if commands::ALL.contains(&name) {
            ValidateCommandResponse::Accepted
        } else {
            ValidateCommandResponse::Invalid(CommandIssue::UnsupportedCommand(name.to_string()))
        }
    }

    async fn on_submit(&self, ctx: &ComponentContext, command: ControlCommand) -> CommandResponse {
        Self::announce(ctx, choices::SUBMIT_COMMAND).await;
        Self::publish_config(ctx, &command).await;

        let run_id: RunId = command.run_id();
        let name = command.command_name().clone();
        match name.as_str() {
            commands::IMMEDIATE | commands::ACCEPTED | commands::SLOW_VALIDATION => {
                CommandResponse::completed(run_id)
            }
            commands::INVALID_AFTER_VALIDATION => CommandResponse::Invalid {
                run_id,
                issue: CommandIssue::Other(INVALID_REASON.to_string()),
            },
            commands::IMMEDIATE_RESULT => {
                let result: ParameterSet =
                    [encoder_key().set([IMMEDIATE_RESULT_ENCODER])].into_iter().collect();
                CommandResponse::completed_with_result(run_id, result)
            }
            commands::SHORT_RUNNING => {
                Self::finish_later(ctx, SHORT_RUNNING_DURATION, CommandResponse::completed(run_id));
                CommandResponse::Started { run_id }
            }
            commands::MEDIUM_RUNNING => {
                Self::finish_later(ctx, MEDIUM_RUNNING_DURATION, CommandResponse::completed(run_id));
                CommandResponse::Started { run_id }
            }
            commands::LONG_RUNNING => {
                Self::finish_later(ctx, LONG_RUNNING_DURATION, CommandResponse::completed(run_id));
                CommandResponse::Started { run_id }
            }
            commands::MATCHER => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(SHORT_RUNNING_DURATION).await;
                    Self::publish_demand(&ctx, &command).await;
                    let _ = ctx.update_command(CommandResponse::completed(run_id)).await;
                });
                CommandResponse::Started { run_id }
            }
            commands::FAILURE_AFTER_VALIDATION => {
                Self::finish_later(
                    ctx,
                    SHORT_RUNNING_DURATION,
                    CommandResponse::error(run_id, FAILURE_REASON),
                );
                CommandResponse::Started { run_id }
            }
            commands::FAILURE => CommandResponse::error(run_id, FAILURE_REASON),
            other => CommandResponse::error(run_id, format!("no handler for {other}")),
        }
    }

    async fn on_oneway(&self, ctx: &ComponentContext, command: ControlCommand) {
        self.oneways.fetch_add(1, Ordering::SeqCst);
        Self::announce(ctx, choices::ONEWAY_COMMAND).await;
        if command.command_name().as_str() == commands::MATCHER {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(SHORT_RUNNING_DURATION).await;
                Self::publish_demand(&ctx, &command).await;
            });
        }
    }

    async fn on_shutdown(&self, _ctx: &ComponentContext) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

/// Identity for a sample HCD published under `prefix`
pub fn sample_hcd_info(name: &str, prefix: &str) -> ComponentInfo {
    ComponentInfo::new(ComponentId::new(name, ComponentType::Hcd), prefix)
}

/// Spawn a [`SampleComponentHandlers`] HCD and keep a handle on its handlers
pub async fn spawn_sample_hcd(
    system: &SystemContext,
    name: &str,
    prefix: &str,
) -> Result<(ComponentRef, Arc<SampleComponentHandlers>)> {
    let handlers = Arc::new(SampleComponentHandlers::new());
    let component = system
        .spawn_component(sample_hcd_info(name, prefix), handlers.clone())
        .await?;
    Ok((component, handlers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandServiceConfig;

    #[tokio::test]
    async fn test_unknown_command_is_unsupported() {
        let system = SystemContext::new(CommandServiceConfig::default()).unwrap();
        let (component, handlers) = spawn_sample_hcd(&system, "sample", "wfos.blue.filter")
            .await
            .unwrap();
        let service = system.command_service(component);

        let command = ControlCommand::setup("wfos.prog.cloudcover", "spin", None);
        let response = service
            .submit(command.clone(), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(
            response,
            CommandResponse::Invalid {
                run_id: command.run_id(),
                issue: CommandIssue::UnsupportedCommand("spin".to_string()),
            }
        );
        assert_eq!(handlers.validation_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_initialize_does_not_register() {
        let system = SystemContext::new(CommandServiceConfig::default()).unwrap();
        let id = ComponentId::new("broken", ComponentType::Hcd);
        let result = system
            .spawn_component(
                ComponentInfo::new(id.clone(), "wfos.blue.filter"),
                Arc::new(SampleComponentHandlers::failing()),
            )
            .await;

        assert!(matches!(result, Err(CommandError::Configuration(_))));
        assert!(system.location().find(&id).await.is_none());
    }
}
