use proptest::prelude::*;
use proptest::strategy::Just;
use cmdctl_core::params::{int_key, Parameter};
use cmdctl_core::state_machine::CommandEvent;

/// Strategy for generating parameter key names
pub fn key_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,15}"
}

/// Strategy for generating int parameters over a small key space so collisions happen
pub fn int_param_strategy() -> impl Strategy<Value = Parameter> {
    (
        prop_oneof![Just("encoder"), Just("filter"), Just("focus"), Just("slit")],
        prop::collection::vec(any::<i32>(), 0..6),
    )
        .prop_map(|(name, values)| int_key(name).set(values))
}

/// Strategy for generating batches of parameters with repeated keys
pub fn param_batch_strategy() -> impl Strategy<Value = Vec<Parameter>> {
    prop::collection::vec(int_param_strategy(), 0..12)
}

/// Strategy for generating lifecycle events in arbitrary order
pub fn command_event_strategy() -> impl Strategy<Value = CommandEvent> {
    prop_oneof![
        Just(CommandEvent::Accept),
        Just(CommandEvent::Start),
        Just(CommandEvent::Complete),
        Just(CommandEvent::Reject),
        Just(CommandEvent::Fail),
        Just(CommandEvent::LockOut),
    ]
}

pub fn command_events_strategy() -> impl Strategy<Value = Vec<CommandEvent>> {
    prop::collection::vec(command_event_strategy(), 0..10)
}
