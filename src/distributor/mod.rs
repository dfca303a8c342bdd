//! # Command Distributor
//!
//! Submits commands to several independent targets and combines their
//! responses into one. The distributor never fails fast: it waits for every
//! target before answering.

pub mod command_distributor;
pub mod target;

pub use command_distributor::{
    aggregate_completion, aggregate_validation, CommandDistributor, TargetResponse,
};
pub use target::CommandTarget;
