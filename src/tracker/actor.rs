//! Mailbox loop that owns a component's [`CommandResponseTracker`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::response_tracker::{CommandResponseTracker, ResponseSubscriber};
use crate::config::TrackerConfig;
use crate::constants::operations;
use crate::error::{CommandError, Result};
use crate::logging::log_command_operation;
use crate::models::{CommandResponse, RunId};

type CommandResponder<T> = oneshot::Sender<Result<T>>;

/// Messages accepted by the tracker actor
#[derive(Debug)]
pub enum TrackerCommand {
    /// Start tracking a command with its first response
    AddCommand { response: CommandResponse },
    /// Record a later lifecycle transition
    UpdateCommand { response: CommandResponse },
    Query {
        run_id: RunId,
        resp: CommandResponder<CommandResponse>,
    },
    /// Reply once the run id reaches a terminal response
    QueryFinal {
        run_id: RunId,
        resp: CommandResponder<CommandResponse>,
    },
    Subscribe {
        run_id: RunId,
        subscriber: ResponseSubscriber,
        resp: CommandResponder<()>,
    },
    Shutdown { resp: CommandResponder<()> },
}

/// Cloneable client side of a tracker actor
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    sender: mpsc::Sender<TrackerCommand>,
}

impl TrackerHandle {
    pub async fn add_command(&self, response: CommandResponse) -> Result<()> {
        self.sender
            .send(TrackerCommand::AddCommand { response })
            .await?;
        Ok(())
    }

    pub async fn update_command(&self, response: CommandResponse) -> Result<()> {
        self.sender
            .send(TrackerCommand::UpdateCommand { response })
            .await?;
        Ok(())
    }

    pub async fn query(&self, run_id: RunId) -> Result<CommandResponse> {
        let (resp, rx) = oneshot::channel();
        self.sender
            .send(TrackerCommand::Query { run_id, resp })
            .await?;
        rx.await?
    }

    /// Wait for the terminal response with no deadline of its own
    ///
    /// Callers bound the wait; see `CommandService::query_final`.
    pub async fn query_final(&self, run_id: RunId) -> Result<CommandResponse> {
        let (resp, rx) = oneshot::channel();
        self.sender
            .send(TrackerCommand::QueryFinal { run_id, resp })
            .await?;
        rx.await?
    }

    /// Stream of responses for `run_id`, starting with the current one
    pub async fn subscribe(&self, run_id: RunId) -> Result<mpsc::UnboundedReceiver<CommandResponse>> {
        let (subscriber, stream) = mpsc::unbounded_channel();
        let (resp, rx) = oneshot::channel();
        self.sender
            .send(TrackerCommand::Subscribe {
                run_id,
                subscriber,
                resp,
            })
            .await?;
        rx.await??;
        Ok(stream)
    }

    pub async fn shutdown(&self) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        self.sender.send(TrackerCommand::Shutdown { resp }).await?;
        rx.await?
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Tracker actor state: the tracker itself plus its retention settings
pub struct TrackerActor {
    component: String,
    tracker: CommandResponseTracker,
    receiver: mpsc::Receiver<TrackerCommand>,
    retention: Duration,
    purge_interval: Duration,
}

impl TrackerActor {
    /// Spawn a tracker actor for `component` and return its handle
    pub fn spawn(
        component: impl Into<String>,
        config: &TrackerConfig,
        mailbox_size: usize,
    ) -> (TrackerHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(mailbox_size);
        let actor = Self {
            component: component.into(),
            tracker: CommandResponseTracker::new(),
            receiver,
            retention: config.retention(),
            purge_interval: config.purge_interval(),
        };
        let join = tokio::spawn(actor.run());
        (TrackerHandle { sender }, join)
    }

    async fn run(mut self) {
        debug!(component = %self.component, "Command response tracker started");

        let mut purge = tokio::time::interval_at(
            Instant::now() + self.purge_interval,
            self.purge_interval,
        );
        purge.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.receiver.recv() => {
                    match command {
                        Some(cmd) => {
                            if !self.handle_command(cmd) {
                                break;
                            }
                        }
                        None => {
                            debug!(component = %self.component, "Tracker mailbox closed");
                            break;
                        }
                    }
                }
                _ = purge.tick() => {
                    self.tracker.purge_expired(Instant::now().into_std(), self.retention);
                }
            }
        }

        info!(
            component = %self.component,
            remaining = self.tracker.len(),
            "Command response tracker stopped"
        );
    }

    fn handle_command(&mut self, command: TrackerCommand) -> bool {
        let now = Instant::now().into_std();
        match command {
            TrackerCommand::AddCommand { response } => {
                let run_id = response.run_id();
                match self.tracker.add_command(response, now) {
                    Ok(state) => {
                        log_command_operation(
                            operations::SUBMIT,
                            &self.component,
                            run_id,
                            Some(state),
                            None,
                        );
                    }
                    Err(e) => {
                        warn!(component = %self.component, run_id = %run_id, error = %e, "Failed to track command");
                    }
                }
                true
            }
            TrackerCommand::UpdateCommand { response } => {
                let run_id = response.run_id();
                match self.tracker.update_command(response, now) {
                    Ok(state) => {
                        log_command_operation(
                            operations::UPDATE,
                            &self.component,
                            run_id,
                            Some(state),
                            None,
                        );
                    }
                    Err(CommandError::InvalidTransition(e)) => {
                        // Late or duplicate updates are expected once a command has settled
                        debug!(component = %self.component, run_id = %run_id, error = %e, "Ignoring out-of-order update");
                    }
                    Err(e) => {
                        warn!(component = %self.component, run_id = %run_id, error = %e, "Failed to update command");
                    }
                }
                true
            }
            TrackerCommand::Query { run_id, resp } => {
                let _ = resp.send(self.tracker.query(&run_id));
                true
            }
            TrackerCommand::QueryFinal { run_id, resp } => {
                self.tracker.query_final(&run_id, resp);
                true
            }
            TrackerCommand::Subscribe {
                run_id,
                subscriber,
                resp,
            } => {
                let _ = resp.send(self.tracker.subscribe(&run_id, subscriber));
                true
            }
            TrackerCommand::Shutdown { resp } => {
                info!(component = %self.component, "Shutting down command response tracker");
                let _ = resp.send(Ok(()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_tracker() -> TrackerHandle {
        TrackerActor::spawn("test-hcd", &TrackerConfig::default(), 16).0
    }

    #[tokio::test]
    async fn test_add_then_query() {
        let tracker = spawn_tracker();
        let run_id = RunId::new();
        tracker
            .add_command(CommandResponse::Accepted { run_id })
            .await
            .unwrap();
        tracker
            .update_command(CommandResponse::Started { run_id })
            .await
            .unwrap();
        assert_eq!(
            tracker.query(run_id).await.unwrap(),
            CommandResponse::Started { run_id }
        );
    }

    #[tokio::test]
    async fn test_query_unknown_is_error() {
        let tracker = spawn_tracker();
        let run_id = RunId::new();
        assert_eq!(
            tracker.query(run_id).await.unwrap_err(),
            CommandError::UnknownRunId(run_id)
        );
        assert!(tracker.subscribe(run_id).await.is_err());
    }

    #[tokio::test]
    async fn test_query_final_resolves_on_later_update() {
        let tracker = spawn_tracker();
        let run_id = RunId::new();
        tracker
            .add_command(CommandResponse::Accepted { run_id })
            .await
            .unwrap();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.query_final(run_id).await })
        };
        tracker
            .update_command(CommandResponse::completed(run_id))
            .await
            .unwrap();

        assert_eq!(
            waiter.await.unwrap().unwrap(),
            CommandResponse::completed(run_id)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retention_sweep_purges_terminal_records() {
        let config = TrackerConfig {
            retention_ms: 100,
            purge_interval_ms: 50,
        };
        let (tracker, _join) = TrackerActor::spawn("test-hcd", &config, 16);
        let run_id = RunId::new();
        tracker
            .add_command(CommandResponse::Locked { run_id })
            .await
            .unwrap();
        assert!(tracker.query(run_id).await.is_ok());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(
            tracker.query(run_id).await.unwrap_err(),
            CommandError::UnknownRunId(run_id)
        );
    }

    #[tokio::test]
    async fn test_shutdown_closes_mailbox() {
        let (tracker, join) = TrackerActor::spawn("test-hcd", &TrackerConfig::default(), 16);
        tracker.shutdown().await.unwrap();
        join.await.unwrap();
        assert!(matches!(
            tracker.query(RunId::new()).await,
            Err(CommandError::Transport(_))
        ));
    }
}
