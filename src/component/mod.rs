//! # Component Runtime
//!
//! A component is three actors behind one [`ComponentRef`]:
//!
//! - the supervisor, which owns the lock and calls the [`ComponentHandlers`]
//! - the command response tracker
//! - the current-state pub-sub
//!
//! Components are started with
//! [`SystemContext::spawn_component`](crate::system_context::SystemContext::spawn_component).

pub mod component_ref;
pub mod context;
pub mod handlers;
pub mod supervisor;

pub use component_ref::ComponentRef;
pub use context::{ComponentContext, ComponentInfo};
pub use handlers::ComponentHandlers;
pub use supervisor::ComponentMessage;
