//! Governance error types

use gov_crypto::{Address, CryptoError, TxHash};
use gov_timelock::{ErrorKind, TimelockError};
use thiserror::Error;

use crate::proposal::ProposalState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Caller {caller} is not the admin")]
    NotAdmin { caller: Address },

    #[error("Caller {caller} is not the pending admin")]
    NotPendingAdmin { caller: Address },

    #[error("Caller {caller} is neither the admin nor the whitelist guardian")]
    NotAdminOrWhitelistGuardian { caller: Address },

    #[error("Caller {caller} is not the veto guardian")]
    NotVetoGuardian { caller: Address },

    #[error("Caller {caller} may not cancel proposal {proposal_id}")]
    CancelNotPermitted { caller: Address, proposal_id: u64 },

    #[error("Proposer {proposer} holds {votes} votes, threshold is {threshold}")]
    BelowThreshold {
        proposer: Address,
        votes: u128,
        threshold: u128,
    },

    #[error("Invalid ballot signature for voter {voter}")]
    InvalidSignature { voter: Address },

    #[error("Proposal must contain at least one action")]
    NoActions,

    #[error(
        "Action arrays differ in length: {targets} targets, {values} values, {signatures} signatures, {calldatas} calldatas"
    )]
    ActionArityMismatch {
        targets: usize,
        values: usize,
        signatures: usize,
        calldatas: usize,
    },

    #[error("Too many actions: {count}, maximum is {max}")]
    TooManyActions { count: usize, max: usize },

    #[error("Invalid vote support value {0}")]
    InvalidSupport(u8),

    #[error("Parameter {name} = {value} outside [{min}, {max}]")]
    ParameterOutOfBounds {
        name: &'static str,
        value: u128,
        min: u128,
        max: u128,
    },

    #[error("Malformed call: {0}")]
    Calldata(#[from] CryptoError),

    #[error("Token accounting error: {0}")]
    Token(String),

    #[error("Unknown proposal {0}")]
    UnknownProposal(u64),

    #[error("Proposal {proposal_id} is {actual}, expected {expected}")]
    InvalidState {
        proposal_id: u64,
        actual: ProposalState,
        expected: &'static str,
    },

    #[error("Proposal {proposal_id} expired at {deadline}")]
    Expired { proposal_id: u64, deadline: u64 },

    #[error("Voter {voter} already voted on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: u64, voter: Address },

    #[error("Proposer {proposer} already has live proposal {proposal_id} ({state})")]
    LiveProposalExists {
        proposer: Address,
        proposal_id: u64,
        state: ProposalState,
    },

    #[error("Proposal {proposal_id} action {hash} is already queued")]
    DuplicateQueuedAction { proposal_id: u64, hash: TxHash },

    #[error("Governor already initiated")]
    AlreadyInitiated,

    #[error("Governor has not been initiated")]
    NotInitiated,

    #[error("Timelock: {0}")]
    Timelock(#[from] TimelockError),
}

impl GovernanceError {
    /// Classification used by off-chain tooling to decide whether to retry
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAdmin { .. }
            | Self::NotPendingAdmin { .. }
            | Self::NotAdminOrWhitelistGuardian { .. }
            | Self::NotVetoGuardian { .. }
            | Self::CancelNotPermitted { .. }
            | Self::BelowThreshold { .. }
            | Self::InvalidSignature { .. } => ErrorKind::Authorization,

            Self::NoActions
            | Self::ActionArityMismatch { .. }
            | Self::TooManyActions { .. }
            | Self::InvalidSupport(_)
            | Self::ParameterOutOfBounds { .. }
            | Self::Calldata(_)
            | Self::Token(_) => ErrorKind::Validation,

            Self::UnknownProposal(_)
            | Self::InvalidState { .. }
            | Self::AlreadyVoted { .. }
            | Self::LiveProposalExists { .. }
            | Self::DuplicateQueuedAction { .. }
            | Self::AlreadyInitiated
            | Self::NotInitiated => ErrorKind::State,

            Self::Expired { .. } => ErrorKind::Timing,

            Self::Timelock(inner) => inner.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
