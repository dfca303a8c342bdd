use serde::{Deserialize, Serialize};
use std::fmt;

/// Command lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommandState {
    /// Received for tracking, validation not yet run
    #[default]
    Pending,
    /// Validation passed
    Accepted,
    /// Execution running asynchronously on the target
    Started,
    /// Execution finished successfully
    Completed,
    /// Validation rejected the command
    Invalid,
    /// Execution failed
    Error,
    /// Target locked by another owner, validation never ran
    Locked,
}

impl CommandState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Invalid | Self::Error | Self::Locked
        )
    }

    /// Check if this is an active state (command is being processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Accepted | Self::Started)
    }

    /// Position along the lifecycle; terminal states share the highest rank
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Started => 2,
            Self::Completed | Self::Invalid | Self::Error | Self::Locked => 3,
        }
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Started => write!(f, "started"),
            Self::Completed => write!(f, "completed"),
            Self::Invalid => write!(f, "invalid"),
            Self::Error => write!(f, "error"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

impl std::str::FromStr for CommandState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "invalid" => Ok(Self::Invalid),
            "error" => Ok(Self::Error),
            "locked" => Ok(Self::Locked),
            _ => Err(format!("Invalid command state: {s}")),
        }
    }
}
