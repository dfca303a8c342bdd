use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::publisher::{CurrentStatePublisher, SubscriberId};
use crate::error::Result;
use crate::models::CurrentState;

/// Pull-style subscription to a component's current state
///
/// Dropping the stream is enough to stop deliveries; the publisher forgets it
/// on its next publication.
#[derive(Debug)]
pub struct CurrentStateStream {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<CurrentState>,
    publisher: CurrentStatePublisher,
}

impl CurrentStateStream {
    pub(crate) fn new(
        id: SubscriberId,
        receiver: mpsc::UnboundedReceiver<CurrentState>,
        publisher: CurrentStatePublisher,
    ) -> Self {
        Self {
            id,
            receiver,
            publisher,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next publication, or `None` once unsubscribed and drained
    pub async fn recv(&mut self) -> Option<CurrentState> {
        self.receiver.recv().await
    }

    /// Stop deliveries; publications already queued can still be received
    pub async fn unsubscribe(&self) -> Result<()> {
        self.publisher.unsubscribe(self.id).await
    }
}

/// Push-style subscription that feeds every publication to an observer
///
/// Returned by `CommandService::subscribe_current_state`.
#[derive(Debug)]
pub struct CurrentStateSubscription {
    id: SubscriberId,
    publisher: CurrentStatePublisher,
    forwarder: Option<JoinHandle<()>>,
}

impl CurrentStateSubscription {
    pub(crate) fn spawn<F>(mut stream: CurrentStateStream, mut observer: F) -> Self
    where
        F: FnMut(CurrentState) + Send + 'static,
    {
        let id = stream.id();
        let publisher = stream.publisher.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(state) = stream.recv().await {
                observer(state);
            }
        });
        Self {
            id,
            publisher,
            forwarder: Some(forwarder),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Stop deliveries to the observer
    ///
    /// Once this returns the observer will not be called again: the
    /// unsubscribe is acknowledged first, then whatever was still in flight is
    /// drained before the forwarding task exits.
    pub async fn unsubscribe(mut self) -> Result<()> {
        let outcome = self.publisher.unsubscribe(self.id).await;
        if let Some(forwarder) = self.forwarder.take() {
            if outcome.is_err() {
                // Publisher already gone; its senders are dropped with it
                forwarder.abort();
            }
            let _ = forwarder.await;
        }
        debug!(subscriber_id = self.id, "Current state observer unsubscribed");
        outcome
    }
}

impl Drop for CurrentStateSubscription {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}
