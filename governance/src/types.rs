//! Proposal actions and vote support values

use gov_crypto::Address;
use gov_timelock::Transaction;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GovernanceError, Result};

/// One call a proposal will make once executed. The payload is opaque to the
/// engine; it only routes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub target: Address,
    pub value: u128,
    /// Function signature such as `setParameter(bytes32,uint256)`; empty for
    /// raw calldata
    pub signature: String,
    #[serde(with = "gov_crypto::serde_hex")]
    pub calldata: Vec<u8>,
}

impl Action {
    pub fn new(target: Address, value: u128, signature: impl Into<String>, calldata: Vec<u8>) -> Self {
        Self {
            target,
            value,
            signature: signature.into(),
            calldata,
        }
    }

    /// The timelock transaction this action becomes when queued for `eta`.
    /// Queue, cancel and execute all derive their keys from this.
    pub fn transaction(&self, eta: u64) -> Transaction {
        Transaction {
            target: self.target,
            value: self.value,
            signature: self.signature.clone(),
            data: self.calldata.clone(),
            eta,
        }
    }
}

/// Parallel action arrays as submitted by a proposer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub targets: Vec<Address>,
    pub values: Vec<u128>,
    pub signatures: Vec<String>,
    pub calldatas: Vec<Vec<u8>>,
    pub description: String,
}

impl ProposalRequest {
    pub fn from_actions(actions: Vec<Action>, description: impl Into<String>) -> Self {
        let mut request = ProposalRequest {
            description: description.into(),
            ..Default::default()
        };
        for action in actions {
            request.targets.push(action.target);
            request.values.push(action.value);
            request.signatures.push(action.signature);
            request.calldatas.push(action.calldata);
        }
        request
    }

    /// Zip the arrays into actions, rejecting mismatched, empty or oversized
    /// submissions
    pub fn into_actions(self, max_operations: usize) -> Result<(Vec<Action>, String)> {
        let count = self.targets.len();
        if self.values.len() != count
            || self.signatures.len() != count
            || self.calldatas.len() != count
        {
            return Err(GovernanceError::ActionArityMismatch {
                targets: count,
                values: self.values.len(),
                signatures: self.signatures.len(),
                calldatas: self.calldatas.len(),
            });
        }
        if count == 0 {
            return Err(GovernanceError::NoActions);
        }
        if count > max_operations {
            return Err(GovernanceError::TooManyActions {
                count,
                max: max_operations,
            });
        }

        let actions = self
            .targets
            .into_iter()
            .zip(self.values)
            .zip(self.signatures)
            .zip(self.calldatas)
            .map(|(((target, value), signature), calldata)| Action {
                target,
                value,
                signature,
                calldata,
            })
            .collect();
        Ok((actions, self.description))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Support {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl TryFrom<u8> for Support {
    type Error = GovernanceError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Support::Against),
            1 => Ok(Support::For),
            2 => Ok(Support::Abstain),
            other => Err(GovernanceError::InvalidSupport(other)),
        }
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Support::Against => "against",
            Support::For => "for",
            Support::Abstain => "abstain",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(n: u8) -> Action {
        Action::new(Address::from_label("target"), n as u128, "f(uint256)", vec![n])
    }

    #[test]
    fn test_request_round_trips_actions() {
        let actions = vec![action(1), action(2)];
        let request = ProposalRequest::from_actions(actions.clone(), "two");
        let (zipped, description) = request.into_actions(10).unwrap();
        assert_eq!(zipped, actions);
        assert_eq!(description, "two");
    }

    #[test]
    fn test_request_validation() {
        let mut request = ProposalRequest::from_actions(vec![action(1)], "");
        request.values.push(5);
        assert!(matches!(
            request.into_actions(10),
            Err(GovernanceError::ActionArityMismatch { .. })
        ));

        assert_eq!(
            ProposalRequest::default().into_actions(10),
            Err(GovernanceError::NoActions)
        );

        let request = ProposalRequest::from_actions(vec![action(1), action(2), action(3)], "");
        assert_eq!(
            request.into_actions(2),
            Err(GovernanceError::TooManyActions { count: 3, max: 2 })
        );
    }

    #[test]
    fn test_support_values() {
        assert_eq!(Support::try_from(0).unwrap(), Support::Against);
        assert_eq!(Support::try_from(1).unwrap(), Support::For);
        assert_eq!(Support::try_from(2).unwrap(), Support::Abstain);
        assert_eq!(Support::try_from(3), Err(GovernanceError::InvalidSupport(3)));
        assert_eq!(Support::For as u8, 1);
    }

    #[test]
    fn test_transaction_carries_eta() {
        let tx = action(4).transaction(99);
        assert_eq!(tx.eta, 99);
        assert_eq!(tx.data, vec![4]);
    }
}
