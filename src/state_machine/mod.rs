// Command lifecycle state machine
//
// Encodes which response may follow which for a single run id. The response
// tracker consults it before recording any update so that a query can never
// observe a response earlier in the lifecycle than one already delivered.

pub mod command_state_machine;
pub mod errors;
pub mod events;
pub mod states;

// Re-export main types for convenient access
pub use command_state_machine::CommandStateMachine;
pub use errors::{TransitionError, TransitionResult};
pub use events::CommandEvent;
pub use states::CommandState;
