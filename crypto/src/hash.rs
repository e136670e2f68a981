//! Hashing and call payload derivation
//!
//! `tx_hash` is the one and only key derivation for queued timelock
//! transactions. The timelock and the proposal engine both call it with the
//! same ordered tuple, so queue, cancel and execute always agree on the key.

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::address::Address;

/// Content hash identifying a queued timelock transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash(0x{}..)", hex::encode(&self.0[..6]))
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_hex()
    }
}

impl TryFrom<String> for TxHash {
    type Error = crate::CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let stripped = value.strip_prefix("0x").unwrap_or(&value);
        let bytes =
            hex::decode(stripped).map_err(|e| crate::CryptoError::InvalidHex(e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| crate::CryptoError::InvalidHex(format!("expected 32 bytes: {}", value)))?;
        Ok(Self(array))
    }
}

/// Keccak-256 digest
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 digest as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// First four bytes of the keccak digest of a function signature such as
/// `setDelay(uint256)`
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Build the bytes delivered to a call target.
///
/// An empty signature passes `data` through untouched; otherwise the
/// signature's selector is prepended.
pub fn call_payload(signature: &str, data: &[u8]) -> Vec<u8> {
    if signature.is_empty() {
        return data.to_vec();
    }
    let mut payload = Vec::with_capacity(4 + data.len());
    payload.extend_from_slice(&selector(signature));
    payload.extend_from_slice(data);
    payload
}

/// Key of a queued transaction.
///
/// Variable-length fields carry a length prefix, so two different tuples can
/// never serialize to the same byte string.
pub fn tx_hash(target: &Address, value: u128, signature: &str, data: &[u8], eta: u64) -> TxHash {
    let mut buf = Vec::with_capacity(32 + 16 + 8 + signature.len() + 8 + data.len() + 8);
    buf.extend_from_slice(target.as_bytes());
    buf.extend_from_slice(&value.to_be_bytes());
    buf.extend_from_slice(&(signature.len() as u64).to_be_bytes());
    buf.extend_from_slice(signature.as_bytes());
    buf.extend_from_slice(&(data.len() as u64).to_be_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(&eta.to_be_bytes());
    TxHash(keccak256(&buf))
}
