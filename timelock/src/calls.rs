//! Self-administration calls understood by the timelock

use gov_crypto::abi::{encode, split_selector, Decoder, Token};
use gov_crypto::{selector, Address, CryptoError};

/// A call a queued transaction may make against the timelock itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelockCall {
    SetDelay(u64),
    SetPendingAdmin(Address),
}

impl TimelockCall {
    pub const SET_DELAY: &'static str = "setDelay(uint256)";
    pub const SET_PENDING_ADMIN: &'static str = "setPendingAdmin(address)";

    pub fn signature(&self) -> &'static str {
        match self {
            TimelockCall::SetDelay(_) => Self::SET_DELAY,
            TimelockCall::SetPendingAdmin(_) => Self::SET_PENDING_ADMIN,
        }
    }

    /// Argument bytes, without the selector
    pub fn calldata(&self) -> Vec<u8> {
        match self {
            TimelockCall::SetDelay(delay) => encode(&[Token::Uint(*delay as u128)]),
            TimelockCall::SetPendingAdmin(admin) => encode(&[Token::Address(*admin)]),
        }
    }

    /// Decode a selector-prefixed payload
    pub fn decode(payload: &[u8]) -> Result<Self, CryptoError> {
        let (sel, args) = split_selector(payload)?;
        let mut decoder = Decoder::new(args);

        let call = if sel == selector(Self::SET_DELAY) {
            TimelockCall::SetDelay(decoder.u64()?)
        } else if sel == selector(Self::SET_PENDING_ADMIN) {
            TimelockCall::SetPendingAdmin(decoder.address()?)
        } else {
            return Err(CryptoError::MalformedCalldata(format!(
                "unknown timelock function 0x{}",
                hex::encode(sel)
            )));
        };

        decoder.finish()?;
        Ok(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_crypto::call_payload;

    #[test]
    fn test_decode_encoded_calls() {
        let admin = Address::from_label("next-admin");
        for call in [TimelockCall::SetDelay(3 * 86_400), TimelockCall::SetPendingAdmin(admin)] {
            let payload = call_payload(call.signature(), &call.calldata());
            assert_eq!(TimelockCall::decode(&payload).unwrap(), call);
        }
    }

    #[test]
    fn test_unknown_selector() {
        let payload = call_payload("drain()", &[]);
        assert!(TimelockCall::decode(&payload).is_err());
    }
}
