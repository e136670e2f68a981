//! Administrative calls understood by the governor
//!
//! These reach the governor as ordinary proposal actions targeting its own
//! address. Once the timelock is admin, that is the only route.

use gov_crypto::abi::{encode, split_selector, Decoder, Token};
use gov_crypto::{selector, Address, CryptoError};
use serde::{Deserialize, Serialize};

use crate::types::Action;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernorCall {
    SetVotingDelay(u64),
    SetVotingPeriod(u64),
    SetProposalThresholdPct(u32),
    SetQuorumPct(u32),
    SetHighRiskQuorumPct(u32),
    SetRiskFlag(Address, bool),
    SetWhitelistGuardian(Address),
    SetVetoGuardian(Address),
    SetWhitelistAccountExpiration(Address, u64),
    SetPendingAdmin(Address),
    AcceptAdmin,
}

const SIGNATURES: [&str; 11] = [
    "setVotingDelay(uint256)",
    "setVotingPeriod(uint256)",
    "setProposalThresholdPct(uint256)",
    "setQuorumPct(uint256)",
    "setHighRiskQuorumPct(uint256)",
    "setRiskFlag(address,bool)",
    "setWhitelistGuardian(address)",
    "setVetoGuardian(address)",
    "setWhitelistAccountExpiration(address,uint256)",
    "setPendingAdmin(address)",
    "acceptAdmin()",
];

impl GovernorCall {
    fn index(&self) -> usize {
        match self {
            GovernorCall::SetVotingDelay(_) => 0,
            GovernorCall::SetVotingPeriod(_) => 1,
            GovernorCall::SetProposalThresholdPct(_) => 2,
            GovernorCall::SetQuorumPct(_) => 3,
            GovernorCall::SetHighRiskQuorumPct(_) => 4,
            GovernorCall::SetRiskFlag(..) => 5,
            GovernorCall::SetWhitelistGuardian(_) => 6,
            GovernorCall::SetVetoGuardian(_) => 7,
            GovernorCall::SetWhitelistAccountExpiration(..) => 8,
            GovernorCall::SetPendingAdmin(_) => 9,
            GovernorCall::AcceptAdmin => 10,
        }
    }

    pub fn signature(&self) -> &'static str {
        SIGNATURES[self.index()]
    }

    /// Argument bytes, without the selector
    pub fn calldata(&self) -> Vec<u8> {
        let tokens = match self {
            GovernorCall::SetVotingDelay(v) | GovernorCall::SetVotingPeriod(v) => {
                vec![Token::Uint(*v as u128)]
            }
            GovernorCall::SetProposalThresholdPct(p)
            | GovernorCall::SetQuorumPct(p)
            | GovernorCall::SetHighRiskQuorumPct(p) => vec![Token::Uint(*p as u128)],
            GovernorCall::SetRiskFlag(category, flag) => {
                vec![Token::Address(*category), Token::Bool(*flag)]
            }
            GovernorCall::SetWhitelistGuardian(a)
            | GovernorCall::SetVetoGuardian(a)
            | GovernorCall::SetPendingAdmin(a) => vec![Token::Address(*a)],
            GovernorCall::SetWhitelistAccountExpiration(account, expiration) => {
                vec![Token::Address(*account), Token::Uint(*expiration as u128)]
            }
            GovernorCall::AcceptAdmin => Vec::new(),
        };
        encode(&tokens)
    }

    /// The proposal action that performs this call on the governor at
    /// `governor`
    pub fn action(&self, governor: Address) -> Action {
        Action::new(governor, 0, self.signature(), self.calldata())
    }

    /// Decode a selector-prefixed payload
    pub fn decode(payload: &[u8]) -> Result<Self, CryptoError> {
        let (sel, args) = split_selector(payload)?;
        let index = SIGNATURES
            .iter()
            .position(|sig| selector(sig) == sel)
            .ok_or_else(|| {
                CryptoError::MalformedCalldata(format!(
                    "unknown governor function 0x{}",
                    hex::encode(sel)
                ))
            })?;

        let mut d = Decoder::new(args);
        let call = match index {
            0 => GovernorCall::SetVotingDelay(d.u64()?),
            1 => GovernorCall::SetVotingPeriod(d.u64()?),
            2 => GovernorCall::SetProposalThresholdPct(d.u32()?),
            3 => GovernorCall::SetQuorumPct(d.u32()?),
            4 => GovernorCall::SetHighRiskQuorumPct(d.u32()?),
            5 => GovernorCall::SetRiskFlag(d.address()?, d.bool()?),
            6 => GovernorCall::SetWhitelistGuardian(d.address()?),
            7 => GovernorCall::SetVetoGuardian(d.address()?),
            8 => GovernorCall::SetWhitelistAccountExpiration(d.address()?, d.u64()?),
            9 => GovernorCall::SetPendingAdmin(d.address()?),
            _ => GovernorCall::AcceptAdmin,
        };
        d.finish()?;
        Ok(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_crypto::call_payload;

    #[test]
    fn test_every_call_decodes_back() {
        let who = Address::from_label("who");
        let calls = [
            GovernorCall::SetVotingDelay(10),
            GovernorCall::SetVotingPeriod(6_000),
            GovernorCall::SetProposalThresholdPct(500),
            GovernorCall::SetQuorumPct(1_000),
            GovernorCall::SetHighRiskQuorumPct(5_000),
            GovernorCall::SetRiskFlag(who, true),
            GovernorCall::SetWhitelistGuardian(who),
            GovernorCall::SetVetoGuardian(who),
            GovernorCall::SetWhitelistAccountExpiration(who, 99),
            GovernorCall::SetPendingAdmin(who),
            GovernorCall::AcceptAdmin,
        ];
        for call in calls {
            let payload = call_payload(call.signature(), &call.calldata());
            assert_eq!(GovernorCall::decode(&payload).unwrap(), call);
        }
    }

    #[test]
    fn test_rejects_trailing_and_unknown() {
        let mut payload = call_payload("acceptAdmin()", &[]);
        payload.push(0);
        assert!(GovernorCall::decode(&payload).is_err());
        assert!(GovernorCall::decode(&call_payload("mint(uint256)", &[0u8; 32])).is_err());
    }

    #[test]
    fn test_action_targets_governor() {
        let governor = Address::from_label("governor");
        let action = GovernorCall::SetQuorumPct(3_000).action(governor);
        assert_eq!(action.target, governor);
        assert_eq!(action.signature, "setQuorumPct(uint256)");
        assert_eq!(action.calldata.len(), 32);
    }
}
