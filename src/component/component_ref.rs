use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::context::ComponentInfo;
use super::supervisor::ComponentMessage;
use crate::error::Result;
use crate::lock::LockingResponse;
use crate::models::{CommandResponse, ComponentId, ControlCommand, Prefix};
use crate::pubsub::CurrentStatePublisher;
use crate::tracker::TrackerHandle;

/// Address of a running component
///
/// What the location service hands out. These calls have no deadline of
/// their own; [`CommandService`](crate::service::CommandService) adds them.
#[derive(Debug, Clone)]
pub struct ComponentRef {
    info: Arc<ComponentInfo>,
    mailbox: mpsc::Sender<ComponentMessage>,
    tracker: TrackerHandle,
    publisher: CurrentStatePublisher,
}

impl ComponentRef {
    pub(crate) fn new(
        info: Arc<ComponentInfo>,
        mailbox: mpsc::Sender<ComponentMessage>,
        tracker: TrackerHandle,
        publisher: CurrentStatePublisher,
    ) -> Self {
        Self {
            info,
            mailbox,
            tracker,
            publisher,
        }
    }

    pub fn info(&self) -> &ComponentInfo {
        &self.info
    }

    pub fn component_id(&self) -> &ComponentId {
        &self.info.component_id
    }

    pub fn tracker(&self) -> &TrackerHandle {
        &self.tracker
    }

    pub fn publisher(&self) -> &CurrentStatePublisher {
        &self.publisher
    }

    pub fn is_alive(&self) -> bool {
        !self.mailbox.is_closed()
    }

    pub async fn submit(&self, command: ControlCommand) -> Result<CommandResponse> {
        let (resp, rx) = oneshot::channel();
        self.mailbox
            .send(ComponentMessage::Submit { command, resp })
            .await?;
        rx.await?
    }

    pub async fn oneway(&self, command: ControlCommand) -> Result<CommandResponse> {
        let (resp, rx) = oneshot::channel();
        self.mailbox
            .send(ComponentMessage::Oneway { command, resp })
            .await?;
        rx.await?
    }

    /// Send a lock request; the outcome and any later `LockExpired` arrive on `reply_to`
    pub async fn lock(
        &self,
        owner: Prefix,
        reply_to: mpsc::UnboundedSender<LockingResponse>,
        duration: Duration,
    ) -> Result<()> {
        self.mailbox
            .send(ComponentMessage::Lock {
                owner,
                reply_to,
                duration,
            })
            .await?;
        Ok(())
    }

    pub async fn unlock(
        &self,
        owner: Prefix,
        reply_to: mpsc::UnboundedSender<LockingResponse>,
    ) -> Result<()> {
        self.mailbox
            .send(ComponentMessage::Unlock { owner, reply_to })
            .await?;
        Ok(())
    }

    /// Stop the component and its tracker and pub-sub actors
    pub async fn shutdown(&self) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        self.mailbox
            .send(ComponentMessage::Shutdown { resp })
            .await?;
        rx.await?
    }
}
