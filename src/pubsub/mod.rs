//! # Current-State Pub-Sub
//!
//! Each component fans its `CurrentState` publications out to any number of
//! subscribers, optionally filtered by state name. One actor per component
//! owns the subscriber table so publication order is preserved per
//! subscriber.

pub mod publisher;
pub mod subscription;

pub use publisher::{CurrentStatePublisher, PubSubActor, PubSubCommand, SubscriberId};
pub use subscription::{CurrentStateStream, CurrentStateSubscription};
