use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::component::ComponentRef;
use crate::config::CommandServiceConfig;
use crate::error::{CommandError, Result};
use crate::location::LocationService;
use crate::lock::LockingResponse;
use crate::matcher::{Matcher, MatcherResponse, StateMatcher};
use crate::models::{CommandResponse, ComponentId, ControlCommand, CurrentState, Prefix, RunId, StateName};
use crate::pubsub::{CurrentStateStream, CurrentStateSubscription};

/// Bound `operation` by the caller's `timeout`
///
/// Running out of time is reported as [`CommandError::Timeout`]; it never
/// cancels work already under way on the target.
async fn within<T>(
    operation: &str,
    timeout: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| CommandError::timeout(operation, timeout))?
}

/// Client-side facade for commanding one component
///
/// Protocol outcomes (invalid, locked, failed) come back as
/// [`CommandResponse`] values. `Err` means the caller's timeout ran out, the
/// run id is unknown, or the component is gone.
#[derive(Debug, Clone)]
pub struct CommandService {
    component: ComponentRef,
    default_timeout: Duration,
    completion_timeout: Duration,
}

impl CommandService {
    pub fn new(component: ComponentRef, config: &CommandServiceConfig) -> Self {
        Self {
            component,
            default_timeout: config.command.default_timeout(),
            completion_timeout: config.command.completion_timeout(),
        }
    }

    /// Resolve `component_id` through `location` and build a service for it
    pub async fn from_location(
        location: &Arc<dyn LocationService>,
        component_id: &ComponentId,
        within_duration: Duration,
        config: &CommandServiceConfig,
    ) -> Result<Self> {
        let component = location.resolve(component_id, within_duration).await?;
        Ok(Self::new(component, config))
    }

    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    pub fn component_id(&self) -> &ComponentId {
        self.component.component_id()
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Submit a tracked command and return its first response past validation
    ///
    /// One of `Invalid`, `Locked`, `Started`, `Completed` or `Error`.
    #[instrument(skip(self, command), fields(component = %self.component_id(), run_id = %command.run_id()))]
    pub async fn submit(&self, command: ControlCommand, timeout: Duration) -> Result<CommandResponse> {
        within("submit", timeout, self.component.submit(command)).await
    }

    /// Send an untracked command
    ///
    /// One of `Accepted`, `Invalid` or `Locked`.
    #[instrument(skip(self, command), fields(component = %self.component_id(), run_id = %command.run_id()))]
    pub async fn oneway(&self, command: ControlCommand, timeout: Duration) -> Result<CommandResponse> {
        within("oneway", timeout, self.component.oneway(command)).await
    }

    /// Send a oneway command and wait for the published state to match
    ///
    /// The matcher subscribes before the command is sent. Its outcome only
    /// counts if the command was `Accepted`; otherwise the matcher is stopped
    /// and the rejection comes back as `Error`.
    pub async fn oneway_and_match(
        &self,
        command: ControlCommand,
        state_matcher: Arc<dyn StateMatcher>,
        timeout: Duration,
    ) -> Result<CommandResponse> {
        let run_id = command.run_id();
        let matcher = Matcher::new(self.component.publisher().clone(), state_matcher);
        let pending = within("oneway_and_match", timeout, matcher.start()).await?;

        // Dropping `pending` on the error path stops the matcher
        let response = self.oneway(command, timeout).await?;

        match response {
            CommandResponse::Accepted { .. } => {
                let outcome = pending.await;
                debug!(run_id = %run_id, outcome = %outcome, "Oneway match finished");
                Ok(match outcome {
                    MatcherResponse::MatchCompleted => CommandResponse::completed(run_id),
                    MatcherResponse::MatchTimedOut => {
                        CommandResponse::error(run_id, "timed out waiting for a matching state")
                    }
                    MatcherResponse::MatchFailed(reason) => {
                        CommandResponse::error(run_id, format!("match failed: {reason}"))
                    }
                })
            }
            other => {
                pending.stop();
                Ok(CommandResponse::error(
                    run_id,
                    format!("command was not accepted: {}", other.describe()),
                ))
            }
        }
    }

    /// Latest known response for `run_id`
    pub async fn query(&self, run_id: RunId, timeout: Duration) -> Result<CommandResponse> {
        within("query", timeout, self.component.tracker().query(run_id)).await
    }

    /// Wait for the terminal response of `run_id`
    pub async fn query_final(&self, run_id: RunId, timeout: Duration) -> Result<CommandResponse> {
        within(
            "query_final",
            timeout,
            self.component.tracker().query_final(run_id),
        )
        .await
    }

    /// `submit`, then wait for the terminal response if it is not one already
    ///
    /// `timeout` bounds the submit; the wait uses the configured completion
    /// timeout.
    pub async fn complete(&self, command: ControlCommand, timeout: Duration) -> Result<CommandResponse> {
        let response = self.submit(command, timeout).await?;
        if response.is_terminal() {
            return Ok(response);
        }
        self.query_final(response.run_id(), self.completion_timeout)
            .await
    }

    /// Every response for `run_id` from now until it is terminal
    pub async fn subscribe_responses(
        &self,
        run_id: RunId,
        timeout: Duration,
    ) -> Result<mpsc::UnboundedReceiver<CommandResponse>> {
        within(
            "subscribe",
            timeout,
            self.component.tracker().subscribe(run_id),
        )
        .await
    }

    /// Feed every current state the component publishes to `observer`
    pub async fn subscribe_current_state<F>(&self, observer: F) -> Result<CurrentStateSubscription>
    where
        F: FnMut(CurrentState) + Send + 'static,
    {
        let stream = self.current_state_stream(None).await?;
        Ok(CurrentStateSubscription::spawn(stream, observer))
    }

    /// Like [`subscribe_current_state`](Self::subscribe_current_state), restricted to `names`
    pub async fn subscribe_only_current_state<F>(
        &self,
        names: impl IntoIterator<Item = StateName>,
        observer: F,
    ) -> Result<CurrentStateSubscription>
    where
        F: FnMut(CurrentState) + Send + 'static,
    {
        let stream = self
            .current_state_stream(Some(names.into_iter().collect()))
            .await?;
        Ok(CurrentStateSubscription::spawn(stream, observer))
    }

    /// Pull-style subscription, optionally filtered by state name
    pub async fn current_state_stream(
        &self,
        names: Option<std::collections::HashSet<StateName>>,
    ) -> Result<CurrentStateStream> {
        within(
            "subscribe_current_state",
            self.default_timeout,
            self.component.publisher().subscribe_filtered(names),
        )
        .await
    }

    /// Lock the component for `owner` and return the immediate reply
    pub async fn lock(
        &self,
        owner: impl Into<Prefix>,
        duration: Duration,
        timeout: Duration,
    ) -> Result<LockingResponse> {
        let (response, _) = self.lock_and_watch(owner, duration, timeout).await?;
        Ok(response)
    }

    /// Lock, keeping the reply channel open to hear a later `LockExpired`
    pub async fn lock_and_watch(
        &self,
        owner: impl Into<Prefix>,
        duration: Duration,
        timeout: Duration,
    ) -> Result<(LockingResponse, mpsc::UnboundedReceiver<LockingResponse>)> {
        let (reply_to, mut replies) = mpsc::unbounded_channel();
        let owner = owner.into();
        let response = within("lock", timeout, async {
            self.component.lock(owner, reply_to, duration).await?;
            replies
                .recv()
                .await
                .ok_or_else(|| CommandError::transport("lock reply channel closed"))
        })
        .await?;
        Ok((response, replies))
    }

    pub async fn unlock(&self, owner: impl Into<Prefix>, timeout: Duration) -> Result<LockingResponse> {
        let (reply_to, mut replies) = mpsc::unbounded_channel();
        let owner = owner.into();
        within("unlock", timeout, async {
            self.component.unlock(owner, reply_to).await?;
            replies
                .recv()
                .await
                .ok_or_else(|| CommandError::transport("unlock reply channel closed"))
        })
        .await
    }
}
