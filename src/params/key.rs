use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parameter::{ParamValue, Parameter};
use super::units::Units;

/// Type tag carried by every parameter key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    Int,
    Long,
    Double,
    Boolean,
    Char,
    String,
    Timestamp,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Double => write!(f, "double"),
            Self::Boolean => write!(f, "boolean"),
            Self::Char => write!(f, "char"),
            Self::String => write!(f, "string"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Rust types that can be stored in a parameter
pub trait ParamType: Clone + Send + Sync + 'static {
    const KEY_TYPE: KeyType;

    fn into_value(self) -> ParamValue;

    fn from_value(value: &ParamValue) -> Option<Self>;
}

macro_rules! param_type {
    ($ty:ty, $key_type:ident, $variant:ident) => {
        impl ParamType for $ty {
            const KEY_TYPE: KeyType = KeyType::$key_type;

            fn into_value(self) -> ParamValue {
                ParamValue::$variant(self)
            }

            fn from_value(value: &ParamValue) -> Option<Self> {
                match value {
                    ParamValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

param_type!(i32, Int, Int);
param_type!(i64, Long, Long);
param_type!(f64, Double, Double);
param_type!(bool, Boolean, Boolean);
param_type!(char, Char, Char);
param_type!(String, String, String);
param_type!(DateTime<Utc>, Timestamp, Timestamp);

/// Strongly typed parameter key
///
/// The type parameter pins the values a key accepts, so
/// `Key::<i32>::new("encoder").set([22, 23])` can never produce a parameter
/// whose values disagree with its type tag.
pub struct Key<T: ParamType> {
    name: String,
    _marker: PhantomData<T>,
}

impl<T: ParamType> Key<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_type(&self) -> KeyType {
        T::KEY_TYPE
    }

    /// Build a parameter holding `values` in order, without units
    pub fn set(&self, values: impl IntoIterator<Item = T>) -> Parameter {
        Parameter::new(
            self.name.clone(),
            T::KEY_TYPE,
            values.into_iter().map(ParamType::into_value).collect(),
            Units::NoUnits,
        )
    }
}

impl<T: ParamType> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<T: ParamType> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("key_type", &T::KEY_TYPE)
            .finish()
    }
}

pub fn int_key(name: impl Into<String>) -> Key<i32> {
    Key::new(name)
}

pub fn long_key(name: impl Into<String>) -> Key<i64> {
    Key::new(name)
}

pub fn double_key(name: impl Into<String>) -> Key<f64> {
    Key::new(name)
}

pub fn boolean_key(name: impl Into<String>) -> Key<bool> {
    Key::new(name)
}

pub fn char_key(name: impl Into<String>) -> Key<char> {
    Key::new(name)
}

pub fn string_key(name: impl Into<String>) -> Key<String> {
    Key::new(name)
}

pub fn timestamp_key(name: impl Into<String>) -> Key<DateTime<Utc>> {
    Key::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_tags_values_with_key_type() {
        let param = int_key("encoder").set([22, 23]);
        assert_eq!(param.key_name(), "encoder");
        assert_eq!(param.key_type(), KeyType::Int);
        assert_eq!(param.values(), &[ParamValue::Int(22), ParamValue::Int(23)]);
        assert_eq!(param.units(), Units::NoUnits);
    }

    #[test]
    fn test_value_extraction_respects_type() {
        assert_eq!(i32::from_value(&ParamValue::Int(7)), Some(7));
        assert_eq!(i32::from_value(&ParamValue::Long(7)), None);
        assert_eq!(
            String::from_value(&ParamValue::String("a".to_string())),
            Some("a".to_string())
        );
    }

    #[test]
    fn test_key_type_display() {
        assert_eq!(KeyType::Timestamp.to_string(), "timestamp");
        assert_eq!(boolean_key("flag").key_type(), KeyType::Boolean);
    }
}
