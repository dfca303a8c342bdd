use std::sync::Arc;

use crate::error::Result;
use crate::models::{CommandResponse, ComponentId, CurrentState, Prefix};
use crate::pubsub::CurrentStatePublisher;
use crate::tracker::TrackerHandle;

/// Identity of a running component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    pub component_id: ComponentId,
    /// Prefix the component publishes its current state under
    pub prefix: Prefix,
}

impl ComponentInfo {
    pub fn new(component_id: ComponentId, prefix: impl Into<Prefix>) -> Self {
        Self {
            component_id,
            prefix: prefix.into(),
        }
    }
}

/// Handle given to [`ComponentHandlers`](super::ComponentHandlers)
///
/// Cheap to clone and safe to move into spawned work.
#[derive(Debug, Clone)]
pub struct ComponentContext {
    info: Arc<ComponentInfo>,
    tracker: TrackerHandle,
    publisher: CurrentStatePublisher,
}

impl ComponentContext {
    pub(crate) fn new(
        info: Arc<ComponentInfo>,
        tracker: TrackerHandle,
        publisher: CurrentStatePublisher,
    ) -> Self {
        Self {
            info,
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

    pub fn prefix(&self) -> &Prefix {
        &self.info.prefix
    }

    /// Record a later lifecycle response for a tracked command
    ///
    /// Updates that would move a command backwards are ignored by the tracker.
    pub async fn update_command(&self, response: CommandResponse) -> Result<()> {
        self.tracker.update_command(response).await
    }

    pub async fn publish_current_state(&self, state: CurrentState) -> Result<()> {
        self.publisher.publish(state).await
    }
}
