use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::component::supervisor::ComponentSupervisor;
use crate::component::{ComponentContext, ComponentHandlers, ComponentInfo, ComponentRef};
use crate::config::{CommandServiceConfig, ConfigLoader};
use crate::error::Result;
use crate::location::{LocalLocationService, LocationService};
use crate::models::ComponentId;
use crate::pubsub::PubSubActor;
use crate::service::CommandService;
use crate::tracker::TrackerActor;

/// Shared dependencies for every component and client in a process
///
/// Passed explicitly to whatever needs it; nothing here is global.
pub struct SystemContext {
    /// System instance ID
    pub system_id: Uuid,

    config: Arc<CommandServiceConfig>,

    location: Arc<dyn LocationService>,
}

impl std::fmt::Debug for SystemContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContext")
            .field("system_id", &self.system_id)
            .field("config", &self.config)
            .field("location", &"Arc<dyn LocationService>")
            .finish()
    }
}

impl SystemContext {
    /// Context with an in-process location service
    pub fn new(config: CommandServiceConfig) -> Result<Arc<Self>> {
        let location = Arc::new(LocalLocationService::new(
            config.location.resolve_poll_interval(),
        ));
        Self::with_location(config, location)
    }

    pub fn with_location(
        config: CommandServiceConfig,
        location: Arc<dyn LocationService>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let system_id = Uuid::new_v4();
        info!(system_id = %system_id, "Initializing SystemContext");
        Ok(Arc::new(Self {
            system_id,
            config: Arc::new(config),
            location,
        }))
    }

    /// Load configuration (see [`ConfigLoader`]) and build a context from it
    pub fn from_config_file(path: Option<&Path>) -> Result<Arc<Self>> {
        Self::new(ConfigLoader::load(path)?)
    }

    pub fn config(&self) -> &CommandServiceConfig {
        &self.config
    }

    pub fn location(&self) -> &Arc<dyn LocationService> {
        &self.location
    }

    /// Start a component and register it with the location service
    ///
    /// Runs the handlers' `initialize` before the component accepts any
    /// message. If it fails, the tracker and pub-sub actors are stopped and
    /// the error is returned.
    pub async fn spawn_component(
        &self,
        info: ComponentInfo,
        handlers: Arc<dyn ComponentHandlers>,
    ) -> Result<ComponentRef> {
        let channels = &self.config.channels;
        let name = info.component_id.to_string();
        let info = Arc::new(info);

        let (tracker, _) =
            TrackerActor::spawn(name.clone(), &self.config.tracker, channels.tracker_mailbox_size);
        let (publisher, _) = PubSubActor::spawn(name.clone(), channels.pubsub_mailbox_size);
        let ctx = ComponentContext::new(info.clone(), tracker.clone(), publisher.clone());

        if let Err(e) = handlers.initialize(&ctx).await {
            warn!(component = %name, error = %e, "Component failed to initialize");
            let _ = tracker.shutdown().await;
            let _ = publisher.shutdown().await;
            return Err(e);
        }

        let (mailbox, _) = ComponentSupervisor::spawn(
            ctx,
            handlers,
            self.location.clone(),
            tracker.clone(),
            publisher.clone(),
            channels.component_mailbox_size,
        );
        let component = ComponentRef::new(info, mailbox, tracker, publisher);
        self.location.register(component.clone()).await?;

        info!(component = %name, "Component started");
        Ok(component)
    }

    /// Command service for an already resolved component
    pub fn command_service(&self, component: ComponentRef) -> CommandService {
        CommandService::new(component, &self.config)
    }

    /// Resolve `component_id` and wrap it in a command service
    pub async fn resolve_command_service(
        &self,
        component_id: &ComponentId,
        within: Duration,
    ) -> Result<CommandService> {
        let component = self.location.resolve(component_id, within).await?;
        Ok(self.command_service(component))
    }
}
