//! Timelock error types

use gov_crypto::{Address, TxHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a rejection, stable across error variants so that
/// callers can tell "try again later" from "this will never work".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Wrong caller for a privileged action
    Authorization,
    /// Malformed input or out-of-bounds parameter
    Validation,
    /// Operation attempted in the wrong lifecycle status
    State,
    /// Too early or too late
    Timing,
    /// The downstream call failed
    Execution,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelockError {
    #[error("Caller {caller} is not the timelock admin")]
    NotAdmin { caller: Address },

    #[error("Call must originate from the timelock's own execute path")]
    NotSelfDispatch,

    #[error("Caller {caller} is not the pending admin")]
    NotPendingAdmin { caller: Address },

    #[error("Delay {delay}s outside allowed range [{min}, {max}]")]
    DelayOutOfBounds { delay: u64, min: u64, max: u64 },

    #[error("Eta {eta} must satisfy delay; earliest allowed is {earliest}")]
    EtaTooEarly { eta: u64, earliest: u64 },

    #[error("Transaction {0} is not queued")]
    NotQueued(TxHash),

    #[error("Transaction {hash} is locked until {eta}")]
    Locked { hash: TxHash, eta: u64 },

    #[error("Transaction {hash} went stale at {deadline}")]
    Stale { hash: TxHash, deadline: u64 },

    #[error("Transaction execution reverted: {0}")]
    ExecutionReverted(String),
}

impl TimelockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAdmin { .. } | Self::NotSelfDispatch | Self::NotPendingAdmin { .. } => {
                ErrorKind::Authorization
            }
            Self::DelayOutOfBounds { .. } => ErrorKind::Validation,
            Self::NotQueued(_) => ErrorKind::State,
            Self::EtaTooEarly { .. } | Self::Locked { .. } | Self::Stale { .. } => {
                ErrorKind::Timing
            }
            Self::ExecutionReverted(_) => ErrorKind::Execution,
        }
    }
}

pub type Result<T> = std::result::Result<T, TimelockError>;
