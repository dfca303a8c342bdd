//! # Command & State Models
//!
//! Immutable records exchanged between components: commands, the responses
//! they produce, and the current/demand state variables used for matching.

pub mod command;
pub mod identity;
pub mod response;
pub mod state;

pub use command::{CommandKind, CommandName, ControlCommand};
pub use identity::{ComponentId, ComponentType, ObsId, Prefix, RunId};
pub use response::{CommandIssue, CommandResponse, ValidateCommandResponse};
pub use state::{CurrentState, DemandState, StateName};
