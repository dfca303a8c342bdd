use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use super::subscription::CurrentStateStream;
use crate::error::Result;
use crate::models::{CurrentState, StateName};

type CommandResponder<T> = oneshot::Sender<Result<T>>;

pub type SubscriberId = u64;

/// Messages accepted by the pub-sub actor
#[derive(Debug)]
pub enum PubSubCommand {
    Subscribe {
        /// `None` receives every publication
        filter: Option<HashSet<StateName>>,
        subscriber: mpsc::UnboundedSender<CurrentState>,
        resp: CommandResponder<SubscriberId>,
    },
    Unsubscribe {
        id: SubscriberId,
        resp: CommandResponder<()>,
    },
    Publish { state: CurrentState },
    Shutdown { resp: CommandResponder<()> },
}

#[derive(Debug)]
struct Subscriber {
    filter: Option<HashSet<StateName>>,
    sender: mpsc::UnboundedSender<CurrentState>,
}

impl Subscriber {
    fn wants(&self, state: &CurrentState) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |names| names.contains(state.state_name()))
    }
}

/// Cloneable handle to a component's current-state fan-out
///
/// Publications from one handle reach every subscriber in the order they were
/// published.
#[derive(Debug, Clone)]
pub struct CurrentStatePublisher {
    sender: mpsc::Sender<PubSubCommand>,
}

impl CurrentStatePublisher {
    pub async fn publish(&self, state: CurrentState) -> Result<()> {
        self.sender.send(PubSubCommand::Publish { state }).await?;
        Ok(())
    }

    /// Subscribe to every publication
    pub async fn subscribe(&self) -> Result<CurrentStateStream> {
        self.subscribe_filtered(None).await
    }

    /// Subscribe to publications whose state name is in `names`
    pub async fn subscribe_only(
        &self,
        names: impl IntoIterator<Item = StateName>,
    ) -> Result<CurrentStateStream> {
        self.subscribe_filtered(Some(names.into_iter().collect()))
            .await
    }

    /// Returns once the subscription is registered; nothing published after
    /// that point is missed.
    pub async fn subscribe_filtered(
        &self,
        filter: Option<HashSet<StateName>>,
    ) -> Result<CurrentStateStream> {
        let (subscriber, receiver) = mpsc::unbounded_channel();
        let (resp, rx) = oneshot::channel();
        self.sender
            .send(PubSubCommand::Subscribe {
                filter,
                subscriber,
                resp,
            })
            .await?;
        let id = rx.await??;
        Ok(CurrentStateStream::new(id, receiver, self.clone()))
    }

    /// Stop deliveries to `id`; returns after the actor has acknowledged
    pub async fn unsubscribe(&self, id: SubscriberId) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        self.sender
            .send(PubSubCommand::Unsubscribe { id, resp })
            .await?;
        rx.await?
    }

    pub async fn shutdown(&self) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        self.sender.send(PubSubCommand::Shutdown { resp }).await?;
        rx.await?
    }
}

/// Actor owning the subscriber table for one component
pub struct PubSubActor {
    component: String,
    receiver: mpsc::Receiver<PubSubCommand>,
    subscribers: HashMap<SubscriberId, Subscriber>,
    next_id: SubscriberId,
}

impl PubSubActor {
    pub fn spawn(
        component: impl Into<String>,
        mailbox_size: usize,
    ) -> (CurrentStatePublisher, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(mailbox_size);
        let actor = Self {
            component: component.into(),
            receiver,
            subscribers: HashMap::new(),
            next_id: 0,
        };
        let join = tokio::spawn(actor.run());
        (CurrentStatePublisher { sender }, join)
    }

    async fn run(mut self) {
        debug!(component = %self.component, "Current state pub-sub started");

        while let Some(command) = self.receiver.recv().await {
            if !self.handle_command(command) {
                break;
            }
        }

        info!(
            component = %self.component,
            subscribers = self.subscribers.len(),
            "Current state pub-sub stopped"
        );
    }

    fn handle_command(&mut self, command: PubSubCommand) -> bool {
        match command {
            PubSubCommand::Subscribe {
                filter,
                subscriber,
                resp,
            } => {
                self.next_id += 1;
                let id = self.next_id;
                debug!(
                    component = %self.component,
                    subscriber_id = id,
                    filtered = filter.is_some(),
                    "Current state subscriber added"
                );
                self.subscribers.insert(
                    id,
                    Subscriber {
                        filter,
                        sender: subscriber,
                    },
                );
                let _ = resp.send(Ok(id));
                true
            }
            PubSubCommand::Unsubscribe { id, resp } => {
                if self.subscribers.remove(&id).is_some() {
                    debug!(component = %self.component, subscriber_id = id, "Current state subscriber removed");
                }
                let _ = resp.send(Ok(()));
                true
            }
            PubSubCommand::Publish { state } => {
                self.publish(state);
                true
            }
            PubSubCommand::Shutdown { resp } => {
                info!(component = %self.component, "Shutting down current state pub-sub");
                self.subscribers.clear();
                let _ = resp.send(Ok(()));
                false
            }
        }
    }

    fn publish(&mut self, state: CurrentState) {
        trace!(
            component = %self.component,
            prefix = %state.prefix(),
            state_name = %state.state_name(),
            "Publishing current state"
        );
        // Dropped subscribers are pruned on any publication, wanted or not
        self.subscribers.retain(|_, subscriber| {
            if subscriber.sender.is_closed() {
                return false;
            }
            !subscriber.wants(&state) || subscriber.sender.send(state.clone()).is_ok()
        });
    }
}
