use crate::models::CommandResponse;

use super::states::CommandState;

/// Events that can trigger command lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEvent {
    /// Validation passed
    Accept,
    /// Execution began
    Start,
    /// Execution finished successfully
    Complete,
    /// Validation rejected the command
    Reject,
    /// Execution failed
    Fail,
    /// Lock admission refused the sender
    LockOut,
}

impl CommandEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Reject => "reject",
            Self::Fail => "fail",
            Self::LockOut => "lock_out",
        }
    }

    /// State reached when this event is applied
    pub fn target_state(&self) -> CommandState {
        match self {
            Self::Accept => CommandState::Accepted,
            Self::Start => CommandState::Started,
            Self::Complete => CommandState::Completed,
            Self::Reject => CommandState::Invalid,
            Self::Fail => CommandState::Error,
            Self::LockOut => CommandState::Locked,
        }
    }

    /// Check if this event represents a terminal transition
    pub fn is_terminal(&self) -> bool {
        self.target_state().is_terminal()
    }
}

impl From<&CommandResponse> for CommandEvent {
    fn from(response: &CommandResponse) -> Self {
        match response {
            CommandResponse::Accepted { .. } => Self::Accept,
            CommandResponse::Started { .. } => Self::Start,
            CommandResponse::Completed { .. } => Self::Complete,
            CommandResponse::Invalid { .. } => Self::Reject,
            CommandResponse::Error { .. } => Self::Fail,
            CommandResponse::Locked { .. } => Self::LockOut,
        }
    }
}
