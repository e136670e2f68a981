//! Timelock Queue
//!
//! A replay-protected scheduler for approved actions. Transactions are
//! queued under their content hash with an execution eta, become executable
//! once the eta passes, go stale after the grace period and are consumed
//! exactly once.
//!
//! The timelock knows nothing about proposals. Its own delay and admin can
//! only be changed through its execute path, so every change to the
//! governance machinery passes through the same delay as ordinary actions.

pub mod calls;
pub mod config;
pub mod error;
pub mod origin;
pub mod queue;

pub use calls::TimelockCall;
pub use config::TimelockConfig;
pub use error::{ErrorKind, Result, TimelockError};
pub use origin::{CallOrigin, Dispatch};
pub use queue::{Timelock, TimelockEvent, Transaction};

/// Window after eta during which a transaction may still execute (14 days)
pub const GRACE_PERIOD: u64 = 14 * 86_400;

/// Lower bound on the queue delay (2 days)
pub const MINIMUM_DELAY: u64 = 2 * 86_400;

/// Upper bound on the queue delay (30 days)
pub const MAXIMUM_DELAY: u64 = 30 * 86_400;

/// Delay used when none is configured (7 days)
pub const DEFAULT_DELAY: u64 = 7 * 86_400;
