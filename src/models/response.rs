use std::fmt;

use serde::{Deserialize, Serialize};

use super::identity::RunId;
use crate::params::ParameterSet;
use crate::state_machine::CommandState;

/// Reason a command was rejected during validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "issue", content = "reason", rename_all = "snake_case")]
pub enum CommandIssue {
    #[error("Missing key: {0}")]
    MissingKey(String),
    #[error("Wrong prefix: {0}")]
    WrongPrefix(String),
    #[error("Wrong parameter type: {0}")]
    WrongParameterType(String),
    #[error("Wrong units: {0}")]
    WrongUnits(String),
    #[error("Wrong number of parameters: {0}")]
    WrongNumberOfParameters(String),
    #[error("Assembly busy: {0}")]
    AssemblyBusy(String),
    #[error("Unresolved locations: {0}")]
    UnresolvedLocations(String),
    #[error("Parameter value out of range: {0}")]
    ParameterValueOutOfRange(String),
    #[error("Wrong internal state: {0}")]
    WrongInternalState(String),
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),
    #[error("Required service unavailable: {0}")]
    RequiredServiceUnavailable(String),
    #[error("{0}")]
    Other(String),
}

/// Every response a command can produce over its lifecycle
///
/// `Accepted` and `Started` are intermediate; the other four are terminal.
/// Which variants a given operation can return is documented on the operation:
/// `submit` never yields `Accepted`, `oneway` never yields `Started` or
/// `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResponse {
    Accepted {
        run_id: RunId,
    },
    Started {
        run_id: RunId,
    },
    Completed {
        run_id: RunId,
        result: Option<ParameterSet>,
    },
    Invalid {
        run_id: RunId,
        issue: CommandIssue,
    },
    Error {
        run_id: RunId,
        message: String,
    },
    Locked {
        run_id: RunId,
    },
}

impl CommandResponse {
    pub fn completed(run_id: RunId) -> Self {
        Self::Completed {
            run_id,
            result: None,
        }
    }

    pub fn completed_with_result(run_id: RunId, result: ParameterSet) -> Self {
        Self::Completed {
            run_id,
            result: Some(result),
        }
    }

    pub fn error(run_id: RunId, message: impl Into<String>) -> Self {
        Self::Error {
            run_id,
            message: message.into(),
        }
    }

    pub fn run_id(&self) -> RunId {
        match self {
            Self::Accepted { run_id }
            | Self::Started { run_id }
            | Self::Completed { run_id, .. }
            | Self::Invalid { run_id, .. }
            | Self::Error { run_id, .. }
            | Self::Locked { run_id } => *run_id,
        }
    }

    /// Lifecycle state this response corresponds to
    pub fn state(&self) -> CommandState {
        match self {
            Self::Accepted { .. } => CommandState::Accepted,
            Self::Started { .. } => CommandState::Started,
            Self::Completed { .. } => CommandState::Completed,
            Self::Invalid { .. } => CommandState::Invalid,
            Self::Error { .. } => CommandState::Error,
            Self::Locked { .. } => CommandState::Locked,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn is_completed_with_result(&self) -> bool {
        matches!(self, Self::Completed { result: Some(_), .. })
    }

    /// Negative outcomes: rejected, locked out or failed
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Self::Invalid { .. } | Self::Locked { .. } | Self::Error { .. }
        )
    }

    /// Same response re-keyed to another run id
    pub fn with_run_id(self, run_id: RunId) -> Self {
        match self {
            Self::Accepted { .. } => Self::Accepted { run_id },
            Self::Started { .. } => Self::Started { run_id },
            Self::Completed { result, .. } => Self::Completed { run_id, result },
            Self::Invalid { issue, .. } => Self::Invalid { run_id, issue },
            Self::Error { message, .. } => Self::Error { run_id, message },
            Self::Locked { .. } => Self::Locked { run_id },
        }
    }

    /// Short human-readable description used in aggregate error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Accepted { .. } => "accepted".to_string(),
            Self::Started { .. } => "started".to_string(),
            Self::Completed { .. } => "completed".to_string(),
            Self::Invalid { issue, .. } => format!("invalid ({issue})"),
            Self::Error { message, .. } => format!("error ({message})"),
            Self::Locked { .. } => "locked".to_string(),
        }
    }
}

impl fmt::Display for CommandResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.describe(), self.run_id())
    }
}

/// Outcome of a component's validation hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateCommandResponse {
    Accepted,
    Invalid(CommandIssue),
}

impl ValidateCommandResponse {
    pub fn into_response(self, run_id: RunId) -> CommandResponse {
        match self {
            Self::Accepted => CommandResponse::Accepted { run_id },
            Self::Invalid(issue) => CommandResponse::Invalid { run_id, issue },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::int_key;

    #[test]
    fn test_terminal_classification() {
        let run_id = RunId::new();
        assert!(!CommandResponse::Accepted { run_id }.is_terminal());
        assert!(!CommandResponse::Started { run_id }.is_terminal());
        assert!(CommandResponse::completed(run_id).is_terminal());
        assert!(CommandResponse::error(run_id, "boom").is_terminal());
        assert!(CommandResponse::Locked { run_id }.is_terminal());
        assert!(CommandResponse::Invalid {
            run_id,
            issue: CommandIssue::Other("bad".to_string())
        }
        .is_terminal());
    }

    #[test]
    fn test_completed_with_result() {
        let run_id = RunId::new();
        let result = [int_key("encoder").set([22])].into_iter().collect();
        let response = CommandResponse::completed_with_result(run_id, result);
        assert!(response.is_completed());
        assert!(response.is_completed_with_result());
        assert!(!CommandResponse::completed(run_id).is_completed_with_result());
    }

    #[test]
    fn test_with_run_id_preserves_payload() {
        let original = CommandResponse::error(RunId::new(), "failed");
        let rekeyed_id = RunId::new();
        let rekeyed = original.with_run_id(rekeyed_id);
        assert_eq!(rekeyed, CommandResponse::error(rekeyed_id, "failed"));
    }

    #[test]
    fn test_validate_response_conversion() {
        let run_id = RunId::new();
        let invalid = ValidateCommandResponse::Invalid(CommandIssue::MissingKey("encoder".into()));
        assert_eq!(
            invalid.into_response(run_id),
            CommandResponse::Invalid {
                run_id,
                issue: CommandIssue::MissingKey("encoder".into())
            }
        );
        assert_eq!(
            ValidateCommandResponse::Accepted.into_response(run_id),
            CommandResponse::Accepted { run_id }
        );
    }

    #[test]
    fn test_response_serde_tagging() {
        let run_id = RunId::new();
        let json = serde_json::to_value(CommandResponse::Locked { run_id }).unwrap();
        assert_eq!(json["type"], "locked");
    }
}
