use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CommandResponse, ControlCommand, RunId};
use crate::service::CommandService;

/// Something the distributor can submit to and wait on
#[async_trait]
pub trait CommandTarget: Send + Sync {
    /// Name used in aggregate error messages
    fn target_name(&self) -> String;

    async fn submit(&self, command: ControlCommand, timeout: Duration) -> Result<CommandResponse>;

    async fn query_final(&self, run_id: RunId, timeout: Duration) -> Result<CommandResponse>;
}

#[async_trait]
impl CommandTarget for CommandService {
    fn target_name(&self) -> String {
        self.component_id().to_string()
    }

    async fn submit(&self, command: ControlCommand, timeout: Duration) -> Result<CommandResponse> {
        CommandService::submit(self, command, timeout).await
    }

    async fn query_final(&self, run_id: RunId, timeout: Duration) -> Result<CommandResponse> {
        CommandService::query_final(self, run_id, timeout).await
    }
}
