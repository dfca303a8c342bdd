use thiserror::Error;

use super::events::CommandEvent;
use super::states::CommandState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot apply '{}' to a command already in terminal state {from}", .event.event_type())]
    AlreadyTerminal {
        from: CommandState,
        event: CommandEvent,
    },
    #[error("Transition {from} -> {} via '{}' is not allowed", .event.target_state(), .event.event_type())]
    NotAllowed {
        from: CommandState,
        event: CommandEvent,
    },
}

pub type TransitionResult<T> = Result<T, TransitionError>;
