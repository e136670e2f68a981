//! Fixed-width argument encoding for call payloads
//!
//! Every argument occupies one 32-byte big-endian word, which is all the
//! governance and timelock administrative functions need.

use crate::address::Address;
use crate::{CryptoError, Result};

pub const WORD_SIZE: usize = 32;

/// A single encodable argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(u128),
    Address(Address),
    Bool(bool),
    Bytes32([u8; 32]),
}

impl Token {
    fn to_word(&self) -> [u8; WORD_SIZE] {
        let mut word = [0u8; WORD_SIZE];
        match self {
            Token::Uint(value) => word[16..].copy_from_slice(&value.to_be_bytes()),
            Token::Address(address) => word.copy_from_slice(address.as_bytes()),
            Token::Bool(flag) => word[31] = u8::from(*flag),
            Token::Bytes32(bytes) => word.copy_from_slice(bytes),
        }
        word
    }
}

/// Concatenate the words of each token
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.len() * WORD_SIZE);
    for token in tokens {
        out.extend_from_slice(&token.to_word());
    }
    out
}

/// Split a payload into its 4-byte selector and argument bytes
pub fn split_selector(payload: &[u8]) -> Result<([u8; 4], &[u8])> {
    if payload.len() < 4 {
        return Err(CryptoError::MalformedCalldata(format!(
            "payload of {} bytes has no selector",
            payload.len()
        )));
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&payload[..4]);
    Ok((selector, &payload[4..]))
}

/// Sequential reader over encoded words
pub struct Decoder<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn word(&mut self) -> Result<&'a [u8]> {
        let end = self.offset + WORD_SIZE;
        if end > self.data.len() {
            return Err(CryptoError::MalformedCalldata(format!(
                "expected word at offset {}, only {} bytes",
                self.offset,
                self.data.len()
            )));
        }
        let word = &self.data[self.offset..end];
        self.offset = end;
        Ok(word)
    }

    pub fn uint(&mut self) -> Result<u128> {
        let word = self.word()?;
        if word[..16].iter().any(|b| *b != 0) {
            return Err(CryptoError::MalformedCalldata(
                "integer does not fit in 128 bits".to_string(),
            ));
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&word[16..]);
        Ok(u128::from_be_bytes(bytes))
    }

    pub fn u64(&mut self) -> Result<u64> {
        let value = self.uint()?;
        u64::try_from(value).map_err(|_| {
            CryptoError::MalformedCalldata(format!("integer {} does not fit in 64 bits", value))
        })
    }

    pub fn u32(&mut self) -> Result<u32> {
        let value = self.uint()?;
        u32::try_from(value).map_err(|_| {
            CryptoError::MalformedCalldata(format!("integer {} does not fit in 32 bits", value))
        })
    }

    pub fn address(&mut self) -> Result<Address> {
        let word = self.word()?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(word);
        Ok(Address(bytes))
    }

    pub fn bool(&mut self) -> Result<bool> {
        match self.uint()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CryptoError::MalformedCalldata(format!(
                "invalid bool word {}",
                other
            ))),
        }
    }

    pub fn bytes32(&mut self) -> Result<[u8; 32]> {
        let word = self.word()?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(word);
        Ok(bytes)
    }

    /// Reject trailing bytes once all expected arguments were read
    pub fn finish(self) -> Result<()> {
        if self.offset != self.data.len() {
            return Err(CryptoError::MalformedCalldata(format!(
                "{} trailing bytes",
                self.data.len() - self.offset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_arguments() {
        let who = Address::from_label("guardian");
        let data = encode(&[Token::Address(who), Token::Uint(42), Token::Bool(true)]);
        assert_eq!(data.len(), 3 * WORD_SIZE);

        let mut decoder = Decoder::new(&data);
        assert_eq!(decoder.address().unwrap(), who);
        assert_eq!(decoder.u64().unwrap(), 42);
        assert!(decoder.bool().unwrap());
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_short_and_trailing_input_rejected() {
        let data = encode(&[Token::Uint(1)]);
        let mut decoder = Decoder::new(&data[..31]);
        assert!(decoder.uint().is_err());

        let mut padded = data.clone();
        padded.push(0);
        let mut decoder = Decoder::new(&padded);
        decoder.uint().unwrap();
        assert!(decoder.finish().is_err());
    }

    #[test]
    fn test_narrowing_checks() {
        let data = encode(&[Token::Uint(u64::MAX as u128 + 1)]);
        assert!(Decoder::new(&data).u64().is_err());

        let data = encode(&[Token::Uint(2)]);
        assert!(Decoder::new(&data).bool().is_err());
    }

    #[test]
    fn test_split_selector() {
        assert!(split_selector(&[1, 2, 3]).is_err());
        let (selector, rest) = split_selector(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(selector, [1, 2, 3, 4]);
        assert_eq!(rest, &[5]);
    }
}
