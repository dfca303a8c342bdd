use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{CommandError, Result};
use crate::models::{CommandResponse, RunId};
use crate::state_machine::{CommandEvent, CommandState, CommandStateMachine};

pub type FinalResponder = oneshot::Sender<Result<CommandResponse>>;
pub type ResponseSubscriber = mpsc::UnboundedSender<CommandResponse>;

#[derive(Debug)]
struct TrackedCommand {
    machine: CommandStateMachine,
    latest: CommandResponse,
    subscribers: Vec<ResponseSubscriber>,
    final_waiters: Vec<FinalResponder>,
    terminal_at: Option<Instant>,
}

impl TrackedCommand {
    fn notify_subscribers(&mut self) {
        let latest = &self.latest;
        self.subscribers.retain(|tx| tx.send(latest.clone()).is_ok());
    }

    fn settle(&mut self, now: Instant) {
        self.terminal_at = Some(now);
        for waiter in self.final_waiters.drain(..) {
            // Waiters whose caller already gave up are simply dropped
            let _ = waiter.send(Ok(self.latest.clone()));
        }
        // Dropping the senders ends every subscriber stream
        self.subscribers.clear();
    }
}

/// Per-runId lifecycle records for one component
///
/// Plain data structure; the tracker actor owns it and serializes every call.
/// Each record's state machine guarantees that once a response has been
/// observed, nothing earlier in the lifecycle replaces it.
#[derive(Debug, Default)]
pub struct CommandResponseTracker {
    records: HashMap<RunId, TrackedCommand>,
}

impl CommandResponseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, run_id: &RunId) -> bool {
        self.records.contains_key(run_id)
    }

    /// Start tracking with the first response a command produced
    ///
    /// A record already present under the same run id is replaced; its
    /// waiters and subscribers are released with the old record.
    pub fn add_command(&mut self, initial: CommandResponse, now: Instant) -> Result<CommandState> {
        let run_id = initial.run_id();
        let mut machine = CommandStateMachine::new(run_id);
        let state = machine.transition(CommandEvent::from(&initial))?;

        if self.records.contains_key(&run_id) {
            warn!(run_id = %run_id, "Replacing tracked command with a new lifecycle");
        }

        let mut record = TrackedCommand {
            machine,
            latest: initial,
            subscribers: Vec::new(),
            final_waiters: Vec::new(),
            terminal_at: None,
        };
        if state.is_terminal() {
            record.settle(now);
        }
        self.records.insert(run_id, record);
        Ok(state)
    }

    /// Record a later response, rejecting anything that would move backwards
    pub fn update_command(
        &mut self,
        response: CommandResponse,
        now: Instant,
    ) -> Result<CommandState> {
        let run_id = response.run_id();
        let record = self
            .records
            .get_mut(&run_id)
            .ok_or(CommandError::UnknownRunId(run_id))?;

        let state = record.machine.transition(CommandEvent::from(&response))?;
        record.latest = response;
        record.notify_subscribers();
        if state.is_terminal() {
            record.settle(now);
        }
        Ok(state)
    }

    pub fn query(&self, run_id: &RunId) -> Result<CommandResponse> {
        self.records
            .get(run_id)
            .map(|record| record.latest.clone())
            .ok_or(CommandError::UnknownRunId(*run_id))
    }

    /// Answer `responder` with the terminal response, now or once it arrives
    pub fn query_final(&mut self, run_id: &RunId, responder: FinalResponder) {
        match self.records.get_mut(run_id) {
            None => {
                let _ = responder.send(Err(CommandError::UnknownRunId(*run_id)));
            }
            Some(record) if record.machine.is_terminal() => {
                let _ = responder.send(Ok(record.latest.clone()));
            }
            Some(record) => record.final_waiters.push(responder),
        }
    }

    /// Attach `subscriber` to a run id's response stream
    ///
    /// The current response is delivered immediately. The stream ends after
    /// the terminal response.
    pub fn subscribe(&mut self, run_id: &RunId, subscriber: ResponseSubscriber) -> Result<()> {
        let record = self
            .records
            .get_mut(run_id)
            .ok_or(CommandError::UnknownRunId(*run_id))?;

        if subscriber.send(record.latest.clone()).is_err() {
            return Ok(());
        }
        if !record.machine.is_terminal() {
            record.subscribers.push(subscriber);
        }
        Ok(())
    }

    /// Drop terminal records older than `retention`; returns how many were removed
    ///
    /// Also forgets waiters and subscribers of live records whose callers
    /// have gone away.
    pub fn purge_expired(&mut self, now: Instant, retention: Duration) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| match record.terminal_at {
            Some(at) => now.saturating_duration_since(at) < retention,
            None => {
                record.final_waiters.retain(|w| !w.is_closed());
                record.subscribers.retain(|s| !s.is_closed());
                true
            }
        });
        let purged = before - self.records.len();
        if purged > 0 {
            debug!(purged = purged, remaining = self.records.len(), "Purged terminal command records");
        }
        purged
    }

    #[cfg(test)]
    fn waiter_count(&self, run_id: &RunId) -> usize {
        self.records
            .get(run_id)
            .map(|r| r.final_waiters.len())
            .unwrap_or(0)
    }
}
