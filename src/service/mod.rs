//! # Command Service
//!
//! The client-facing operations: submit, oneway, onewayAndMatch, query,
//! queryFinal, complete, subscriptions and locking. Every call is bounded by a
//! caller-supplied timeout.

pub mod command_service;

pub use command_service::CommandService;
