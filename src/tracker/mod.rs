//! # Command Response Tracker
//!
//! One lifecycle record per run id, owned by the target component. The pure
//! [`CommandResponseTracker`] holds the records; [`TrackerActor`] serializes
//! access to it behind a mailbox and runs the retention sweep.

pub mod actor;
pub mod response_tracker;

pub use actor::{TrackerActor, TrackerCommand, TrackerHandle};
pub use response_tracker::{CommandResponseTracker, FinalResponder, ResponseSubscriber};
