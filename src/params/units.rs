use std::fmt;

use serde::{Deserialize, Serialize};

/// Units attached to a parameter's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    NoUnits,
    Meter,
    Millimeter,
    Micrometer,
    Degree,
    Arcsec,
    Second,
    Millisecond,
    Kelvin,
    Encoder,
    Count,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUnits => write!(f, "none"),
            Self::Meter => write!(f, "m"),
            Self::Millimeter => write!(f, "mm"),
            Self::Micrometer => write!(f, "um"),
            Self::Degree => write!(f, "deg"),
            Self::Arcsec => write!(f, "arcsec"),
            Self::Second => write!(f, "s"),
            Self::Millisecond => write!(f, "ms"),
            Self::Kelvin => write!(f, "K"),
            Self::Encoder => write!(f, "enc"),
            Self::Count => write!(f, "ct"),
        }
    }
}
