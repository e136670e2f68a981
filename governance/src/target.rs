//! Destination systems reached by executed proposals

use gov_crypto::abi::{encode, split_selector, Decoder, Token};
use gov_crypto::{selector, Address};
use gov_timelock::CallOrigin;
use log::info;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{GovernanceError, Result};
use crate::types::Action;

/// A system the timelock can call into.
///
/// Targets are cloned with the rest of the world for every transaction, so a
/// failed operation also discards whatever a target did before it failed.
pub trait CallTarget: Send + fmt::Debug {
    /// Handle a payload. `Err` carries the revert reason.
    fn call(&mut self, origin: CallOrigin, value: u128, payload: &[u8]) -> std::result::Result<Vec<u8>, String>;

    fn box_clone(&self) -> Box<dyn CallTarget>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn CallTarget> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Protocol configuration store owned by the timelock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRegistry {
    owner: Address,
    parameters: BTreeMap<String, u128>,
    received_value: u128,
}

impl ParameterRegistry {
    pub const SET_PARAMETER: &'static str = "setParameter(bytes32,uint256)";

    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            ..Default::default()
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn parameter(&self, key: &str) -> Option<u128> {
        self.parameters.get(key).copied()
    }

    pub fn parameters(&self) -> &BTreeMap<String, u128> {
        &self.parameters
    }

    /// Total value forwarded by executed calls
    pub fn received_value(&self) -> u128 {
        self.received_value
    }

    /// Build the action setting `key` to `value`. Keys are at most 32 bytes.
    pub fn set_parameter_action(target: Address, key: &str, value: u128) -> Result<Action> {
        let bytes = key.as_bytes();
        if bytes.is_empty() || bytes.len() > 32 {
            return Err(GovernanceError::Calldata(
                gov_crypto::CryptoError::MalformedCalldata(format!(
                    "parameter key must be 1 to 32 bytes, got {}",
                    bytes.len()
                )),
            ));
        }
        let mut word = [0u8; 32];
        word[..bytes.len()].copy_from_slice(bytes);
        let calldata = encode(&[Token::Bytes32(word), Token::Uint(value)]);
        Ok(Action::new(target, 0, Self::SET_PARAMETER, calldata))
    }

    fn decode_set(args: &[u8]) -> std::result::Result<(String, u128), String> {
        let mut decoder = Decoder::new(args);
        let word = decoder.bytes32().map_err(|e| e.to_string())?;
        let value = decoder.uint().map_err(|e| e.to_string())?;
        decoder.finish().map_err(|e| e.to_string())?;

        let len = word.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let key = String::from_utf8(word[..len].to_vec())
            .map_err(|_| "parameter key is not utf-8".to_string())?;
        if key.is_empty() {
            return Err("empty parameter key".to_string());
        }
        Ok((key, value))
    }
}

impl CallTarget for ParameterRegistry {
    fn call(&mut self, origin: CallOrigin, value: u128, payload: &[u8]) -> std::result::Result<Vec<u8>, String> {
        if origin.sender() != self.owner {
            return Err(format!("caller {} is not the owner", origin.sender().short()));
        }
        let (sel, args) = split_selector(payload).map_err(|e| e.to_string())?;
        if sel != selector(Self::SET_PARAMETER) {
            return Err(format!("unknown function 0x{}", hex::encode(sel)));
        }

        let (key, new_value) = Self::decode_set(args)?;
        let old = self.parameters.insert(key.clone(), new_value).unwrap_or(0);
        self.received_value = self.received_value.saturating_add(value);
        info!("parameter {} changed from {} to {}", key, old, new_value);
        Ok(encode(&[Token::Uint(old)]))
    }

    fn box_clone(&self) -> Box<dyn CallTarget> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_sets_parameter() {
        let owner = Address::from_label("timelock");
        let target = Address::from_label("registry");
        let mut registry = ParameterRegistry::new(owner);

        let action = ParameterRegistry::set_parameter_action(target, "fee_bps", 30).unwrap();
        let payload = gov_crypto::call_payload(&action.signature, &action.calldata);

        registry
            .call(CallOrigin::TimelockDispatch(owner), 5, &payload)
            .unwrap();
        assert_eq!(registry.parameter("fee_bps"), Some(30));
        assert_eq!(registry.received_value(), 5);
    }

    #[test]
    fn test_rejects_strangers_and_garbage() {
        let owner = Address::from_label("timelock");
        let mut registry = ParameterRegistry::new(owner);
        let action =
            ParameterRegistry::set_parameter_action(Address::ZERO, "fee_bps", 30).unwrap();
        let payload = gov_crypto::call_payload(&action.signature, &action.calldata);

        assert!(registry
            .call(CallOrigin::Account(Address::from_label("eve")), 0, &payload)
            .is_err());
        assert!(registry
            .call(CallOrigin::Account(owner), 0, &gov_crypto::call_payload("burn()", &[]))
            .is_err());
        assert!(registry.parameters().is_empty());
    }

    #[test]
    fn test_key_length_is_bounded() {
        let long = "k".repeat(33);
        assert!(ParameterRegistry::set_parameter_action(Address::ZERO, &long, 1).is_err());
        assert!(ParameterRegistry::set_parameter_action(Address::ZERO, "", 1).is_err());
    }
}
