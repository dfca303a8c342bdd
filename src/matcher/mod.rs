//! # Matcher
//!
//! Waits for a component's published current state to satisfy a demand.
//! A matcher resolves exactly once: on a match, on timeout, or when stopped.

pub mod engine;
pub mod state_matcher;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use engine::{Matcher, PendingMatch};
pub use state_matcher::{DemandMatcher, MatchMode, PresenceMatcher, StateMatcher};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "reason", rename_all = "snake_case")]
pub enum MatcherResponse {
    MatchCompleted,
    MatchFailed(String),
    MatchTimedOut,
}

impl MatcherResponse {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::MatchCompleted)
    }
}

impl fmt::Display for MatcherResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchCompleted => write!(f, "match_completed"),
            Self::MatchFailed(reason) => write!(f, "match_failed: {reason}"),
            Self::MatchTimedOut => write!(f, "match_timed_out"),
        }
    }
}
