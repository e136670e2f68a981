//! Proposal records and their derived status

use gov_crypto::Address;
use gov_timelock::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::clock::Clock;
use crate::error::{GovernanceError, Result};
use crate::tally::{receipt_or_empty, Receipt, Tally};
use crate::types::{Action, Support};

/// Status of a proposal. Never stored; always derived from the record and
/// the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Vetoed,
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub proposer: Address,
    pub actions: Vec<Action>,
    pub description: String,
    pub start_tick: u64,
    pub end_tick: u64,
    /// Zero until queued
    pub eta: u64,
    pub tally: Tally,
    pub canceled: bool,
    pub vetoed: bool,
    pub executed: bool,
    /// Snapshotted at creation
    pub proposal_threshold: u128,
    /// Snapshotted at creation
    pub quorum_votes: u128,
    pub high_risk: bool,
    pub receipts: BTreeMap<Address, Receipt>,
}

impl Proposal {
    /// First matching rule wins.
    pub fn state(&self, clock: &Clock, grace_period: u64) -> ProposalState {
        if self.vetoed {
            ProposalState::Vetoed
        } else if self.canceled {
            ProposalState::Canceled
        } else if clock.tick <= self.start_tick {
            ProposalState::Pending
        } else if clock.tick <= self.end_tick {
            ProposalState::Active
        } else if self.tally.is_defeated(self.quorum_votes) {
            ProposalState::Defeated
        } else if self.eta == 0 {
            ProposalState::Succeeded
        } else if clock.time >= self.eta.saturating_add(grace_period) {
            ProposalState::Expired
        } else if self.executed {
            ProposalState::Executed
        } else {
            ProposalState::Queued
        }
    }

    /// Whether any terminal flag is set
    pub fn is_finalized(&self) -> bool {
        self.canceled || self.vetoed || self.executed
    }

    /// Timelock transactions for the stored eta, in action order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.actions
            .iter()
            .map(|action| action.transaction(self.eta))
            .collect()
    }

    pub fn receipt(&self, voter: &Address) -> Receipt {
        receipt_or_empty(&self.receipts, voter)
    }

    /// Write-once: a second vote by the same voter is rejected whatever its
    /// support value
    pub fn record_vote(&mut self, voter: &Address, support: Support, weight: u128) -> Result<Receipt> {
        if self.receipts.contains_key(voter) {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id: self.id,
                voter: *voter,
            });
        }

        let receipt = Receipt {
            has_voted: true,
            support,
            votes: weight,
        };
        self.tally.add(support, weight);
        self.receipts.insert(*voter, receipt);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: u64 = 100;

    fn proposal() -> Proposal {
        Proposal {
            id: 1,
            proposer: Address::from_label("proposer"),
            actions: vec![Action::new(Address::from_label("t"), 0, "", vec![])],
            description: String::new(),
            start_tick: 10,
            end_tick: 20,
            eta: 0,
            tally: Tally::default(),
            canceled: false,
            vetoed: false,
            executed: false,
            proposal_threshold: 100,
            quorum_votes: 50,
            high_risk: false,
            receipts: BTreeMap::new(),
        }
    }

    #[test]
    fn test_voting_window_bounds() {
        let p = proposal();
        assert_eq!(p.state(&Clock::new(10, 0), GRACE), ProposalState::Pending);
        assert_eq!(p.state(&Clock::new(11, 0), GRACE), ProposalState::Active);
        assert_eq!(p.state(&Clock::new(20, 0), GRACE), ProposalState::Active);
        // Nobody voted: quorum not met
        assert_eq!(p.state(&Clock::new(21, 0), GRACE), ProposalState::Defeated);
    }

    #[test]
    fn test_post_vote_progression() {
        let mut p = proposal();
        p.tally.for_votes = 60;
        let after = Clock::new(21, 1_000);
        assert_eq!(p.state(&after, GRACE), ProposalState::Succeeded);

        p.eta = 1_050;
        assert_eq!(p.state(&after, GRACE), ProposalState::Queued);
        assert_eq!(p.state(&Clock::new(21, 1_149), GRACE), ProposalState::Queued);
        assert_eq!(p.state(&Clock::new(21, 1_150), GRACE), ProposalState::Expired);

        p.executed = true;
        assert_eq!(p.state(&after, GRACE), ProposalState::Executed);
    }

    #[test]
    fn test_precedence_of_flags() {
        let mut p = proposal();
        p.canceled = true;
        assert_eq!(p.state(&Clock::new(15, 0), GRACE), ProposalState::Canceled);
        p.vetoed = true;
        assert_eq!(p.state(&Clock::new(15, 0), GRACE), ProposalState::Vetoed);
    }

    #[test]
    fn test_state_is_idempotent() {
        let mut p = proposal();
        p.tally.for_votes = 60;
        p.eta = 500;
        let clock = Clock::new(25, 520);
        assert_eq!(p.state(&clock, GRACE), p.state(&clock, GRACE));
    }

    #[test]
    fn test_record_vote_once() {
        let mut p = proposal();
        let voter = Address::from_label("voter");
        let receipt = p.record_vote(&voter, Support::For, 40).unwrap();
        assert!(receipt.has_voted);
        assert_eq!(p.tally.for_votes, 40);

        let err = p.record_vote(&voter, Support::Against, 40).unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyVoted { .. }));
        assert_eq!(p.tally.against_votes, 0);
        assert_eq!(p.receipt(&voter).support, Support::For);
    }
}
