use std::fmt;

use serde::{Deserialize, Serialize};

use super::identity::Prefix;
use crate::params::{ParameterSet, ParameterSetType};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateName(String);

impl StateName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Snapshot a component publishes about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    prefix: Prefix,
    state_name: StateName,
    params: ParameterSet,
}

impl CurrentState {
    pub fn new(prefix: impl Into<Prefix>, state_name: impl Into<StateName>) -> Self {
        Self {
            prefix: prefix.into(),
            state_name: state_name.into(),
            params: ParameterSet::new(),
        }
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn state_name(&self) -> &StateName {
        &self.state_name
    }
}

impl ParameterSetType for CurrentState {
    fn params(&self) -> &ParameterSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }
}

/// Configuration a caller wants a component's current state to reach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandState {
    prefix: Prefix,
    state_name: StateName,
    params: ParameterSet,
}

impl DemandState {
    pub fn new(prefix: impl Into<Prefix>, state_name: impl Into<StateName>) -> Self {
        Self {
            prefix: prefix.into(),
            state_name: state_name.into(),
            params: ParameterSet::new(),
        }
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn state_name(&self) -> &StateName {
        &self.state_name
    }
}

impl ParameterSetType for DemandState {
    fn params(&self) -> &ParameterSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }
}
