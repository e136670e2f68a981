//! Vote Tally

use gov_crypto::Address;
use serde::{Deserialize, Serialize};

use crate::types::Support;

/// A voter's write-once record on one proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: Support,
    pub votes: u128,
}

impl Receipt {
    /// Receipt reported for an account that has not voted
    pub fn empty() -> Self {
        Self {
            has_voted: false,
            support: Support::Against,
            votes: 0,
        }
    }
}

/// Weighted totals per support category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
}

impl Tally {
    pub fn add(&mut self, support: Support, weight: u128) {
        let bucket = match support {
            Support::For => &mut self.for_votes,
            Support::Against => &mut self.against_votes,
            Support::Abstain => &mut self.abstain_votes,
        };
        *bucket = bucket.saturating_add(weight);
    }

    /// Defeated once voting closes: no majority for, or for+against below
    /// quorum. Abstentions count toward neither.
    pub fn is_defeated(&self, quorum_votes: u128) -> bool {
        self.for_votes <= self.against_votes
            || self.for_votes.saturating_add(self.against_votes) < quorum_votes
    }
}

/// The lesser of the voter's weight when voting opened and now. Weight
/// acquired after a proposal is known never counts, and weight sold off
/// before voting stops counting.
pub fn pessimistic_weight(at_start: u128, at_cast: u128) -> u128 {
    at_start.min(at_cast)
}

/// Receipt lookup helper used by the read surface
pub fn receipt_or_empty(
    receipts: &std::collections::BTreeMap<Address, Receipt>,
    voter: &Address,
) -> Receipt {
    receipts.get(voter).copied().unwrap_or_else(Receipt::empty)
}
