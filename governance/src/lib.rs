//! Token governance engine
//!
//! Token holders propose changes, vote with snapshotted weight, and approved
//! actions pass through a mandatory timelock before they execute exactly
//! once. The crate holds the proposal state machine, the vote tally, the
//! threshold calculator and the authority registry; the queue itself lives in
//! `gov-timelock`.

pub mod calls;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod governor;
pub mod ledger;
pub mod proposal;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod tally;
pub mod target;
pub mod threshold;
pub mod types;

pub use calls::GovernorCall;
pub use clock::Clock;
pub use config::GovernorConfig;
pub use error::{GovernanceError, Result};
pub use events::GovernanceEvent;
pub use governor::Governor;
pub use ledger::{Ledger, SharedLedger};
pub use proposal::{Proposal, ProposalState};
pub use registry::AuthorityRegistry;
pub use snapshot::{Checkpoint, CheckpointToken, SnapshotOracle};
pub use store::{PersistedState, StoreError};
pub use tally::{Receipt, Tally};
pub use target::{CallTarget, ParameterRegistry};
pub use threshold::ThresholdParams;
pub use types::{Action, ProposalRequest, Support};

pub use gov_timelock::{ErrorKind, TimelockConfig};
