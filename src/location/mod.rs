//! # Location Service
//!
//! Maps a [`ComponentId`] to the [`ComponentRef`] used to reach it.
//! [`LocalLocationService`] is the in-process implementation; anything that
//! can hand out component refs may implement [`LocationService`].

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::component::ComponentRef;
use crate::error::{CommandError, Result};
use crate::models::ComponentId;

#[async_trait]
pub trait LocationService: Debug + Send + Sync {
    /// Publish `component` under its id, replacing any earlier registration
    async fn register(&self, component: ComponentRef) -> Result<()>;

    async fn unregister(&self, component_id: &ComponentId) -> Result<()>;

    /// Current registration, if any
    async fn find(&self, component_id: &ComponentId) -> Option<ComponentRef>;

    /// Wait up to `within` for `component_id` to be registered
    async fn resolve(&self, component_id: &ComponentId, within: Duration) -> Result<ComponentRef>;

    async fn list(&self) -> Vec<ComponentId>;
}

/// In-process registry backed by a concurrent map
#[derive(Debug)]
pub struct LocalLocationService {
    entries: DashMap<ComponentId, ComponentRef>,
    poll_interval: Duration,
}

impl LocalLocationService {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            poll_interval,
        }
    }
}

#[async_trait]
impl LocationService for LocalLocationService {
    async fn register(&self, component: ComponentRef) -> Result<()> {
        let id = component.component_id().clone();
        if self.entries.insert(id.clone(), component).is_some() {
            debug!(component = %id, "Replaced existing registration");
        }
        info!(component = %id, "Component registered");
        Ok(())
    }

    async fn unregister(&self, component_id: &ComponentId) -> Result<()> {
        if self.entries.remove(component_id).is_some() {
            info!(component = %component_id, "Component unregistered");
        }
        Ok(())
    }

    async fn find(&self, component_id: &ComponentId) -> Option<ComponentRef> {
        self.entries
            .get(component_id)
            .map(|entry| entry.value().clone())
    }

    async fn resolve(&self, component_id: &ComponentId, within: Duration) -> Result<ComponentRef> {
        let deadline = Instant::now() + within;
        loop {
            if let Some(component) = self.find(component_id).await {
                return Ok(component);
            }
            if Instant::now() >= deadline {
                return Err(CommandError::ComponentNotFound(component_id.to_string()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn list(&self) -> Vec<ComponentId> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}
