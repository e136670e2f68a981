//! Notifications emitted by the governor

use gov_crypto::Address;
use gov_timelock::TimelockEvent;
use serde::{Deserialize, Serialize};

use crate::types::{Action, Support};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated {
        id: u64,
        proposer: Address,
        actions: Vec<Action>,
        start_tick: u64,
        end_tick: u64,
        proposal_threshold: u128,
        quorum_votes: u128,
        high_risk: bool,
        description: String,
    },
    VoteCast {
        voter: Address,
        proposal_id: u64,
        support: Support,
        votes: u128,
        reason: Option<String>,
    },
    ProposalQueued {
        id: u64,
        eta: u64,
    },
    ProposalExecuted {
        id: u64,
    },
    ProposalCanceled {
        id: u64,
        canceled_by: Address,
    },
    ProposalVetoed {
        id: u64,
    },
    /// Numeric parameter change
    ParameterSet {
        name: String,
        old: u128,
        new: u128,
    },
    RiskFlagSet {
        category: Address,
        old: bool,
        new: bool,
    },
    WhitelistGuardianSet {
        old: Address,
        new: Address,
    },
    VetoGuardianSet {
        old: Address,
        new: Address,
    },
    WhitelistAccountExpirationSet {
        account: Address,
        expiration: u64,
    },
    NewPendingAdmin {
        old: Address,
        new: Address,
    },
    NewAdmin {
        old: Address,
        new: Address,
    },
    Timelock(TimelockEvent),
}

impl GovernanceEvent {
    /// Proposal the event concerns, if any
    pub fn proposal_id(&self) -> Option<u64> {
        match self {
            GovernanceEvent::ProposalCreated { id, .. }
            | GovernanceEvent::ProposalQueued { id, .. }
            | GovernanceEvent::ProposalExecuted { id }
            | GovernanceEvent::ProposalCanceled { id, .. }
            | GovernanceEvent::ProposalVetoed { id } => Some(*id),
            GovernanceEvent::VoteCast { proposal_id, .. } => Some(*proposal_id),
            _ => None,
        }
    }
}
