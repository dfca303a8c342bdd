use tracing::debug;

use crate::models::RunId;

use super::errors::{TransitionError, TransitionResult};
use super::events::CommandEvent;
use super::states::CommandState;

/// Lifecycle state machine for a single tracked command
///
/// ```text
/// Pending ──accept──→ Accepted ──start──→ Started ──complete──→ Completed
///    │                   │  │                 └──────fail────→ Error
///    ├──reject──→ Invalid │  └──complete/fail──→ Completed/Error
///    └──lock_out─→ Locked
/// ```
#[derive(Debug, Clone)]
pub struct CommandStateMachine {
    run_id: RunId,
    current: CommandState,
}

impl CommandStateMachine {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current: CommandState::Pending,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn current_state(&self) -> CommandState {
        self.current
    }

    /// Compute the state `event` leads to from `from`, without mutating anything
    pub fn next_state(from: CommandState, event: CommandEvent) -> TransitionResult<CommandState> {
        if from.is_terminal() {
            return Err(TransitionError::AlreadyTerminal { from, event });
        }

        let allowed = match from {
            CommandState::Pending => matches!(
                event,
                CommandEvent::Accept | CommandEvent::Reject | CommandEvent::LockOut
            ),
            CommandState::Accepted => matches!(
                event,
                CommandEvent::Start | CommandEvent::Complete | CommandEvent::Fail
            ),
            CommandState::Started => {
                matches!(event, CommandEvent::Complete | CommandEvent::Fail)
            }
            CommandState::Completed
            | CommandState::Invalid
            | CommandState::Error
            | CommandState::Locked => false,
        };

        if allowed {
            Ok(event.target_state())
        } else {
            Err(TransitionError::NotAllowed { from, event })
        }
    }

    /// Apply `event`, leaving the machine untouched when the transition is rejected
    pub fn transition(&mut self, event: CommandEvent) -> TransitionResult<CommandState> {
        let next = Self::next_state(self.current, event)?;
        debug!(
            run_id = %self.run_id,
            from = %self.current,
            to = %next,
            event = event.event_type(),
            "Command lifecycle transition"
        );
        self.current = next;
        Ok(next)
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }
}
