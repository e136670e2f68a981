//! Governance Cryptography
//!
//! Hashing, identities, call encoding and ballot signatures shared by the
//! timelock and the governance engine.

pub mod abi;
pub mod address;
pub mod ballot;
pub mod hash;
pub mod keys;
pub mod serde_hex;

use thiserror::Error;

pub use abi::{Decoder, Token, WORD_SIZE};
pub use address::Address;
pub use ballot::{ballot_digest, domain_separator};
pub use hash::{call_payload, keccak256, selector, sha256_hex, tx_hash, TxHash};
pub use keys::KeyPair;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Malformed calldata: {0}")]
    MalformedCalldata(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
