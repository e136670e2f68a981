//! Call origins and the dispatch seam to destination systems

use gov_crypto::Address;
use serde::{Deserialize, Serialize};

/// Who is making a call, tagged with the execution context it arrives through.
///
/// `TimelockDispatch` is only ever constructed by the timelock while executing
/// a queued transaction. Functions that must be delay-gated check for it
/// explicitly instead of trusting the caller identity alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOrigin {
    /// A direct call by an account
    Account(Address),
    /// A call made by the named timelock from inside its execute path
    TimelockDispatch(Address),
}

impl CallOrigin {
    /// Identity the callee sees as the caller
    pub fn sender(&self) -> Address {
        match self {
            CallOrigin::Account(address) | CallOrigin::TimelockDispatch(address) => *address,
        }
    }

    pub fn is_dispatch_of(&self, timelock: &Address) -> bool {
        matches!(self, CallOrigin::TimelockDispatch(address) if address == timelock)
    }
}

/// Delivers an executed transaction's payload to its target.
///
/// Errors carry the callee's revert reason.
pub trait Dispatch {
    fn dispatch(
        &mut self,
        origin: CallOrigin,
        target: &Address,
        value: u128,
        payload: &[u8],
    ) -> std::result::Result<Vec<u8>, String>;
}
