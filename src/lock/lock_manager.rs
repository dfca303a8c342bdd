use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::LockingResponse;
use crate::models::Prefix;

/// Deadline used when `now + duration` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Lock held by a target component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    LockedBy {
        owner: Prefix,
        expires_at: Instant,
        /// Bumped on every acquisition so a stale expiry timer can be told apart
        generation: u64,
    },
}

/// Per-component gate deciding which senders may reach validation
///
/// Owned by the component supervisor and only touched from its mailbox loop.
/// Expiry is driven by the supervisor's timer messages. The supervisor also
/// calls [`LockManager::expire_if_due`] before every lock decision so a timer
/// stuck behind a slow message cannot keep a stale lease alive.
#[derive(Debug)]
pub struct LockManager {
    state: LockState,
    next_generation: u64,
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            state: LockState::Unlocked,
            next_generation: 0,
        }
    }

    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn owner(&self) -> Option<&Prefix> {
        match &self.state {
            LockState::LockedBy { owner, .. } => Some(owner),
            LockState::Unlocked => None,
        }
    }

    pub fn is_locked(&self, now: Instant) -> bool {
        match &self.state {
            LockState::LockedBy { expires_at, .. } => *expires_at > now,
            LockState::Unlocked => false,
        }
    }

    /// Acquire or renew the lock for `owner`
    ///
    /// On success returns the generation of the new lease together with the
    /// response so the caller can arm an expiry timer for it.
    pub fn lock(
        &mut self,
        owner: &Prefix,
        duration: Duration,
        now: Instant,
    ) -> (LockingResponse, Option<u64>) {
        self.expire_if_due(now);

        if let LockState::LockedBy {
            owner: current, ..
        } = &self.state
        {
            if current != owner {
                debug!(owner = %owner, holder = %current, "Lock request rejected");
                return (LockingResponse::AlreadyLocked, None);
            }
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.state = LockState::LockedBy {
            owner: owner.clone(),
            expires_at: deadline(now, duration),
            generation,
        };
        info!(
            owner = %owner,
            duration_ms = duration.as_millis() as u64,
            generation = generation,
            "Lock acquired"
        );
        (LockingResponse::LockAcquired, Some(generation))
    }

    pub fn unlock(&mut self, owner: &Prefix, now: Instant) -> LockingResponse {
        self.expire_if_due(now);

        match &self.state {
            LockState::Unlocked => LockingResponse::LockAlreadyReleased,
            LockState::LockedBy { owner: current, .. } if current == owner => {
                info!(owner = %owner, "Lock released");
                self.state = LockState::Unlocked;
                LockingResponse::LockReleased
            }
            LockState::LockedBy { owner: current, .. } => {
                let reason = format!("lock is held by {current}, not {owner}");
                debug!(owner = %owner, holder = %current, "Unlock rejected");
                LockingResponse::ReleaseFailed(reason)
            }
        }
    }

    /// Whether a command from `source` may proceed to validation
    pub fn admits(&mut self, source: &Prefix, now: Instant) -> bool {
        self.expire_if_due(now);
        match &self.state {
            LockState::Unlocked => true,
            LockState::LockedBy { owner, .. } => owner == source,
        }
    }

    /// Handle an expiry timer for lease `generation`
    ///
    /// Returns the former owner when the timer belonged to the current lease.
    /// Timers from leases that were since renewed or released are ignored.
    pub fn expire(&mut self, generation: u64) -> Option<Prefix> {
        match &self.state {
            LockState::LockedBy {
                generation: current,
                ..
            } if *current == generation => {}
            _ => return None,
        }

        match std::mem::replace(&mut self.state, LockState::Unlocked) {
            LockState::LockedBy { owner, .. } => {
                info!(owner = %owner, generation = generation, "Lock expired");
                Some(owner)
            }
            LockState::Unlocked => None,
        }
    }

    /// Drop the lease if its deadline has passed, returning the former owner
    pub fn expire_if_due(&mut self, now: Instant) -> Option<Prefix> {
        match &self.state {
            LockState::LockedBy { expires_at, .. } if *expires_at <= now => {}
            _ => return None,
        }

        match std::mem::replace(&mut self.state, LockState::Unlocked) {
            LockState::LockedBy {
                owner, generation, ..
            } => {
                info!(owner = %owner, generation = generation, "Lock expired past its deadline");
                Some(owner)
            }
            LockState::Unlocked => None,
        }
    }
}

/// `now + duration`, saturating to a far-future deadline on overflow
fn deadline(now: Instant, duration: Duration) -> Instant {
    now.checked_add(duration)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
