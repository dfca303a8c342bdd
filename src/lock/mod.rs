//! # Component Locking
//!
//! A target can be locked by one owner prefix at a time. While locked, only
//! commands from the owner reach validation; everything else is answered with
//! `Locked` straight away.

pub mod lock_manager;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use lock_manager::{LockManager, LockState};

/// Reply delivered to a lock or unlock requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "reason", rename_all = "snake_case")]
pub enum LockingResponse {
    LockAcquired,
    AlreadyLocked,
    LockReleased,
    LockAlreadyReleased,
    /// Unlock attempted by someone other than the current owner
    ReleaseFailed(String),
    /// Sent unprompted to the owner when the lease runs out
    LockExpired,
}

impl LockingResponse {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::LockAcquired | Self::LockReleased | Self::LockAlreadyReleased
        )
    }
}

impl fmt::Display for LockingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockAcquired => write!(f, "lock_acquired"),
            Self::AlreadyLocked => write!(f, "already_locked"),
            Self::LockReleased => write!(f, "lock_released"),
            Self::LockAlreadyReleased => write!(f, "lock_already_released"),
            Self::ReleaseFailed(reason) => write!(f, "release_failed: {reason}"),
            Self::LockExpired => write!(f, "lock_expired"),
        }
    }
}
