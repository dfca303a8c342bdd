//! # System Constants
//!
//! Default timing and sizing values shared by the configuration defaults and the
//! component runtime, plus the names used in lifecycle log events.

/// Default caller-side timeout for command round trips
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5_000;

/// Timeout used by `complete` for the query-final half of the composition
pub const DEFAULT_COMPLETION_TIMEOUT_MS: u64 = 5_000;

/// How long a terminal record stays queryable after its final response
pub const DEFAULT_TRACKER_RETENTION_MS: u64 = 60_000;

/// Interval between tracker retention sweeps
pub const DEFAULT_TRACKER_PURGE_INTERVAL_MS: u64 = 10_000;

/// Default bounded mailbox capacity for every actor
pub const DEFAULT_MAILBOX_SIZE: usize = 256;

/// Poll interval used by the local location service while resolving
pub const DEFAULT_RESOLVE_POLL_INTERVAL_MS: u64 = 10;

/// Reason recorded when a matcher is stopped before resolving
pub const MATCHER_CANCELLED: &str = "cancelled";

/// Lifecycle operation names used in structured log events
pub mod operations {
    pub const SUBMIT: &str = "submit";
    pub const ONEWAY: &str = "oneway";
    pub const VALIDATE: &str = "validate";
    pub const UPDATE: &str = "update";
    pub const LOCK: &str = "lock";
    pub const UNLOCK: &str = "unlock";
    pub const QUERY: &str = "query";
    pub const QUERY_FINAL: &str = "query_final";
}
