//! # Parameters
//!
//! Typed key/value records carried inside commands, current states and demand
//! states. A [`Key<T>`] fixes the value type at compile time; the stored
//! [`Parameter`] keeps a runtime type tag so sets stay heterogeneous.

pub mod key;
pub mod parameter;
pub mod parameter_set;
pub mod units;

pub use key::{
    boolean_key, char_key, double_key, int_key, long_key, string_key, timestamp_key, Key, KeyType,
    ParamType,
};
pub use parameter::{ParamValue, Parameter};
pub use parameter_set::{ParameterSet, ParameterSetType};
pub use units::Units;
