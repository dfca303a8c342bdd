use async_trait::async_trait;

use super::context::ComponentContext;
use crate::error::Result;
use crate::models::{CommandResponse, ControlCommand, ValidateCommandResponse};

/// Behavior of a target component
///
/// The supervisor calls these one at a time from its mailbox loop, so a hook
/// that awaits holds up every other message to the component. Long-running
/// work belongs in a spawned task that reports back through
/// [`ComponentContext::update_command`].
#[async_trait]
pub trait ComponentHandlers: Send + Sync + 'static {
    /// Called once before the component starts accepting commands
    async fn initialize(&self, _ctx: &ComponentContext) -> Result<()> {
        Ok(())
    }

    /// Decide whether `command` can be executed
    ///
    /// Only commands that passed the lock check get here.
    async fn validate_command(
        &self,
        ctx: &ComponentContext,
        command: &ControlCommand,
    ) -> ValidateCommandResponse;

    /// Begin executing a validated, tracked command
    ///
    /// Return a terminal response for work that finishes immediately, or
    /// `Started` (an `Accepted` is read as `Started`) and report the outcome
    /// later via the context. The command has already been accepted, so an
    /// `Invalid` or `Locked` returned here is recorded as `Error`.
    async fn on_submit(&self, ctx: &ComponentContext, command: ControlCommand) -> CommandResponse;

    /// Execute a validated oneway command; its outcome is not tracked
    async fn on_oneway(&self, _ctx: &ComponentContext, _command: ControlCommand) {}

    async fn on_shutdown(&self, _ctx: &ComponentContext) {}
}
