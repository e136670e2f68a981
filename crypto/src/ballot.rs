//! Domain-separated ballot digests
//!
//! A ballot signature commits to the governance instance name, the chain id
//! and the instance address, so it cannot be replayed elsewhere.

use crate::abi::{encode, Token};
use crate::address::Address;
use crate::hash::keccak256;

pub const DOMAIN_TYPE: &str = "EIP712Domain(string name,uint256 chainId,address verifyingContract)";
pub const BALLOT_TYPE: &str = "Ballot(uint256 proposalId,uint8 support)";

pub fn domain_separator(name: &str, chain_id: u64, verifying_contract: &Address) -> [u8; 32] {
    keccak256(&encode(&[
        Token::Bytes32(keccak256(DOMAIN_TYPE.as_bytes())),
        Token::Bytes32(keccak256(name.as_bytes())),
        Token::Uint(chain_id as u128),
        Token::Address(*verifying_contract),
    ]))
}

/// Digest a voter signs to cast `support` on `proposal_id`
pub fn ballot_digest(domain: &[u8; 32], proposal_id: u64, support: u8) -> [u8; 32] {
    let struct_hash = keccak256(&encode(&[
        Token::Bytes32(keccak256(BALLOT_TYPE.as_bytes())),
        Token::Uint(proposal_id as u128),
        Token::Uint(support as u128),
    ]));

    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(&[0x19, 0x01]);
    buf.extend_from_slice(domain);
    buf.extend_from_slice(&struct_hash);
    keccak256(&buf)
}
