use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use super::state_matcher::StateMatcher;
use super::MatcherResponse;
use crate::constants::MATCHER_CANCELLED;
use crate::error::Result;
use crate::pubsub::CurrentStatePublisher;

/// One-shot wait for a component's current state to satisfy a [`StateMatcher`]
#[derive(Debug, Clone)]
pub struct Matcher {
    publisher: CurrentStatePublisher,
    state_matcher: Arc<dyn StateMatcher>,
}

impl Matcher {
    pub fn new(publisher: CurrentStatePublisher, state_matcher: Arc<dyn StateMatcher>) -> Self {
        Self {
            publisher,
            state_matcher,
        }
    }

    /// Subscribe and begin matching
    ///
    /// The subscription is registered before this returns, so a state
    /// published afterwards is always seen.
    pub async fn start(self) -> Result<PendingMatch> {
        let mut stream = self
            .publisher
            .subscribe_only([self.state_matcher.state_name().clone()])
            .await?;
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let state_matcher = self.state_matcher;

        tokio::spawn(async move {
            let deadline = tokio::time::sleep(state_matcher.timeout());
            tokio::pin!(deadline);
            let mut stop_open = true;

            let outcome = loop {
                tokio::select! {
                    biased;
                    stopped = &mut stop_rx, if stop_open => {
                        match stopped {
                            Ok(()) => break MatcherResponse::MatchFailed(MATCHER_CANCELLED.to_string()),
                            // Handle dropped without stopping; keep matching
                            Err(_) => stop_open = false,
                        }
                    }
                    next = stream.recv() => {
                        match next {
                            Some(state) if state_matcher.check(&state) => break MatcherResponse::MatchCompleted,
                            Some(_) => {}
                            None => break MatcherResponse::MatchFailed("current state stream closed".to_string()),
                        }
                    }
                    _ = &mut deadline => break MatcherResponse::MatchTimedOut,
                }
            };

            let _ = stream.unsubscribe().await;
            debug!(
                prefix = %state_matcher.prefix(),
                state_name = %state_matcher.state_name(),
                outcome = %outcome,
                "Matcher resolved"
            );
            let _ = outcome_tx.send(outcome);
        });

        Ok(PendingMatch {
            stop: Mutex::new(Some(stop_tx)),
            outcome: outcome_rx,
        })
    }
}

/// A started matcher; await it for the outcome
#[derive(Debug)]
pub struct PendingMatch {
    stop: Mutex<Option<oneshot::Sender<()>>>,
    outcome: oneshot::Receiver<MatcherResponse>,
}

impl PendingMatch {
    /// Cancel the match
    ///
    /// If it has not resolved yet it resolves `MatchFailed("cancelled")`.
    /// Stopping again, or after resolution, does nothing.
    pub fn stop(&self) {
        if let Some(stop) = self.stop.lock().take() {
            let _ = stop.send(());
        }
    }
}

impl Future for PendingMatch {
    type Output = MatcherResponse;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.outcome).poll(cx).map(|outcome| {
            outcome.unwrap_or_else(|_| {
                MatcherResponse::MatchFailed("matcher ended without an outcome".to_string())
            })
        })
    }
}

impl Drop for PendingMatch {
    fn drop(&mut self) {
        self.stop();
    }
}
