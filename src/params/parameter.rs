use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::key::{KeyType, ParamType};
use super::units::Units;

/// A single stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Char(char),
    String(String),
    Timestamp(DateTime<Utc>),
}

/// Named, typed, ordered sequence of values with units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    key_name: String,
    key_type: KeyType,
    values: Vec<ParamValue>,
    units: Units,
}

impl Parameter {
    pub(crate) fn new(
        key_name: String,
        key_type: KeyType,
        values: Vec<ParamValue>,
        units: Units,
    ) -> Self {
        Self {
            key_name,
            key_type,
            values,
            units,
        }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    pub fn head(&self) -> Option<&ParamValue> {
        self.values.first()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extract the values as `T`, or `None` if the type tag does not match
    pub fn values_as<T: ParamType>(&self) -> Option<Vec<T>> {
        if self.key_type != T::KEY_TYPE {
            return None;
        }
        self.values.iter().map(T::from_value).collect()
    }

    /// Identity of a parameter within a set: name plus type tag
    pub fn same_key(&self, other: &Parameter) -> bool {
        self.key_name == other.key_name && self.key_type == other.key_type
    }

    pub(crate) fn matches_key(&self, name: &str, key_type: KeyType) -> bool {
        self.key_name == name && self.key_type == key_type
    }

    /// True when every value in `self` also appears in `other`
    pub fn values_subset_of(&self, other: &Parameter) -> bool {
        self.values.iter().all(|v| other.values.contains(v))
    }
}
