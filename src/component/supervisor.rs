//! # Component Supervisor
//!
//! The mailbox loop at the front of every component. It owns the lock state,
//! gates commands through it, runs validation and execution hooks, and seeds
//! the response tracker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::context::ComponentContext;
use super::handlers::ComponentHandlers;
use crate::constants::operations;
use crate::error::Result;
use crate::location::LocationService;
use crate::lock::{LockManager, LockingResponse};
use crate::logging::{log_command_operation, log_lock_operation};
use crate::models::{CommandResponse, ControlCommand, Prefix};
use crate::pubsub::CurrentStatePublisher;
use crate::tracker::TrackerHandle;

type CommandResponder<T> = oneshot::Sender<Result<T>>;

/// Messages accepted by a component
#[derive(Debug)]
pub enum ComponentMessage {
    /// Tracked command; replies with the first response past validation
    Submit {
        command: ControlCommand,
        resp: CommandResponder<CommandResponse>,
    },
    /// Untracked command; replies `Accepted` before executing
    Oneway {
        command: ControlCommand,
        resp: CommandResponder<CommandResponse>,
    },
    Lock {
        owner: Prefix,
        reply_to: mpsc::UnboundedSender<LockingResponse>,
        duration: Duration,
    },
    Unlock {
        owner: Prefix,
        reply_to: mpsc::UnboundedSender<LockingResponse>,
    },
    /// Internal: the lease with this generation ran out
    LockTimedOut { generation: u64 },
    Shutdown { resp: CommandResponder<()> },
}

pub(crate) struct ComponentSupervisor {
    ctx: ComponentContext,
    handlers: Arc<dyn ComponentHandlers>,
    location: Arc<dyn LocationService>,
    tracker: TrackerHandle,
    publisher: CurrentStatePublisher,
    receiver: mpsc::Receiver<ComponentMessage>,
    self_sender: mpsc::WeakSender<ComponentMessage>,
    lock: LockManager,
    lock_owner_reply: Option<mpsc::UnboundedSender<LockingResponse>>,
    lock_timer: Option<JoinHandle<()>>,
}

impl ComponentSupervisor {
    pub(crate) fn spawn(
        ctx: ComponentContext,
        handlers: Arc<dyn ComponentHandlers>,
        location: Arc<dyn LocationService>,
        tracker: TrackerHandle,
        publisher: CurrentStatePublisher,
        mailbox_size: usize,
    ) -> (mpsc::Sender<ComponentMessage>, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(mailbox_size);
        let supervisor = Self {
            ctx,
            handlers,
            location,
            tracker,
            publisher,
            receiver,
            self_sender: sender.downgrade(),
            lock: LockManager::new(),
            lock_owner_reply: None,
            lock_timer: None,
        };
        let join = tokio::spawn(supervisor.run());
        (sender, join)
    }

    fn name(&self) -> String {
        self.ctx.component_id().to_string()
    }

    async fn run(mut self) {
        info!(component = %self.ctx.component_id(), "Component supervisor started");

        while let Some(message) = self.receiver.recv().await {
            if !self.handle_message(message).await {
                break;
            }
        }

        if let Some(timer) = self.lock_timer.take() {
            timer.abort();
        }
        info!(component = %self.ctx.component_id(), "Component supervisor stopped");
    }

    async fn handle_message(&mut self, message: ComponentMessage) -> bool {
        match message {
            ComponentMessage::Submit { command, resp } => {
                let response = self.handle_submit(command).await;
                let _ = resp.send(Ok(response));
                true
            }
            ComponentMessage::Oneway { command, resp } => {
                self.handle_oneway(command, resp).await;
                true
            }
            ComponentMessage::Lock {
                owner,
                reply_to,
                duration,
            } => {
                self.handle_lock(owner, reply_to, duration);
                true
            }
            ComponentMessage::Unlock { owner, reply_to } => {
                self.handle_unlock(owner, reply_to);
                true
            }
            ComponentMessage::LockTimedOut { generation } => {
                self.handle_lock_timeout(generation);
                true
            }
            ComponentMessage::Shutdown { resp } => {
                self.handle_shutdown().await;
                let _ = resp.send(Ok(()));
                false
            }
        }
    }

    async fn handle_submit(&mut self, command: ControlCommand) -> CommandResponse {
        let run_id = command.run_id();
        let component = self.name();

        if !self.admits(&command) {
            let locked = CommandResponse::Locked { run_id };
            log_command_operation(operations::SUBMIT, &component, run_id, Some(locked.state()), Some("rejected by lock"));
            self.track(locked.clone()).await;
            return locked;
        }

        let validation = self.handlers.validate_command(&self.ctx, &command).await;
        let initial = validation.into_response(run_id);
        log_command_operation(operations::VALIDATE, &component, run_id, Some(initial.state()), None);
        self.track(initial.clone()).await;
        if initial.is_negative() {
            return initial;
        }

        let response = match self.handlers.on_submit(&self.ctx, command).await {
            CommandResponse::Accepted { .. } => CommandResponse::Started { run_id },
            late @ (CommandResponse::Invalid { .. } | CommandResponse::Locked { .. }) => {
                warn!(component = %component, run_id = %run_id, response = %late, "Rejection returned after validation");
                CommandResponse::error(
                    run_id,
                    format!("command failed after validation: {}", late.describe()),
                )
            }
            other => other.with_run_id(run_id),
        };

        match self.tracker.update_command(response.clone()).await {
            Ok(()) => response,
            Err(e) => {
                // The handler may already have settled the command through its context
                debug!(component = %component, run_id = %run_id, error = %e, "Command response not recorded");
                self.tracker.query(run_id).await.unwrap_or(response)
            }
        }
    }

    /// Lock gate for `command`, applying a lapsed lease first
    fn admits(&mut self, command: &ControlCommand) -> bool {
        let now = Instant::now().into_std();
        self.expire_lapsed_lock(now);
        self.lock.admits(command.source(), now)
    }

    fn expire_lapsed_lock(&mut self, now: std::time::Instant) {
        if let Some(owner) = self.lock.expire_if_due(now) {
            self.lease_expired(&owner);
        }
    }

    fn lease_expired(&mut self, owner: &Prefix) {
        if let Some(timer) = self.lock_timer.take() {
            timer.abort();
        }
        if let Some(reply_to) = self.lock_owner_reply.take() {
            let _ = reply_to.send(LockingResponse::LockExpired);
        }
        log_lock_operation("expire", &self.name(), owner.as_str(), &LockingResponse::LockExpired.to_string());
    }

    async fn track(&self, response: CommandResponse) {
        let run_id = response.run_id();
        if let Err(e) = self.tracker.add_command(response).await {
            error!(component = %self.ctx.component_id(), run_id = %run_id, error = %e, "Failed to track command");
        }
    }

    async fn handle_oneway(
        &mut self,
        command: ControlCommand,
        resp: CommandResponder<CommandResponse>,
    ) {
        let run_id = command.run_id();
        let component = self.name();

        if !self.admits(&command) {
            log_command_operation(operations::ONEWAY, &component, run_id, None, Some("rejected by lock"));
            let _ = resp.send(Ok(CommandResponse::Locked { run_id }));
            return;
        }

        let response = self
            .handlers
            .validate_command(&self.ctx, &command)
            .await
            .into_response(run_id);
        log_command_operation(operations::ONEWAY, &component, run_id, Some(response.state()), None);
        let accepted = !response.is_negative();
        let _ = resp.send(Ok(response));

        if accepted {
            self.handlers.on_oneway(&self.ctx, command).await;
        }
    }

    fn handle_lock(
        &mut self,
        owner: Prefix,
        reply_to: mpsc::UnboundedSender<LockingResponse>,
        duration: Duration,
    ) {
        let now = Instant::now().into_std();
        self.expire_lapsed_lock(now);
        let (response, generation) = self.lock.lock(&owner, duration, now);
        log_lock_operation(operations::LOCK, &self.name(), owner.as_str(), &response.to_string());

        if let Some(generation) = generation {
            if let Some(previous) = self.lock_timer.take() {
                previous.abort();
            }
            let weak = self.self_sender.clone();
            self.lock_timer = Some(tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                if let Some(sender) = weak.upgrade() {
                    let _ = sender
                        .send(ComponentMessage::LockTimedOut { generation })
                        .await;
                }
            }));
            self.lock_owner_reply = Some(reply_to.clone());
        }

        let _ = reply_to.send(response);
    }

    fn handle_unlock(&mut self, owner: Prefix, reply_to: mpsc::UnboundedSender<LockingResponse>) {
        let now = Instant::now().into_std();
        self.expire_lapsed_lock(now);
        let response = self.lock.unlock(&owner, now);
        log_lock_operation(operations::UNLOCK, &self.name(), owner.as_str(), &response.to_string());

        if response == LockingResponse::LockReleased {
            if let Some(timer) = self.lock_timer.take() {
                timer.abort();
            }
            self.lock_owner_reply = None;
        }
        let _ = reply_to.send(response);
    }

    fn handle_lock_timeout(&mut self, generation: u64) {
        let Some(owner) = self.lock.expire(generation) else {
            debug!(component = %self.ctx.component_id(), generation = generation, "Ignoring stale lock timer");
            return;
        };
        self.lease_expired(&owner);
    }

    async fn handle_shutdown(&mut self) {
        info!(component = %self.ctx.component_id(), "Shutting down component");

        self.handlers.on_shutdown(&self.ctx).await;

        if let Err(e) = self.location.unregister(self.ctx.component_id()).await {
            warn!(component = %self.ctx.component_id(), error = %e, "Failed to unregister component");
        }
        if let Err(e) = self.tracker.shutdown().await {
            warn!(component = %self.ctx.component_id(), error = %e, "Tracker did not shut down cleanly");
        }
        if let Err(e) = self.publisher.shutdown().await {
            warn!(component = %self.ctx.component_id(), error = %e, "Pub-sub did not shut down cleanly");
        }
    }
}
