//! Authority Registry
//!
//! Holds the privileged identities and the per-category risk flags. Once the
//! admin role belongs to the timelock, every mutation here except
//! `accept_admin` can only arrive through an executed proposal.
//!
//! A risk category is a destination address: a proposal is high-risk when any
//! of its actions targets an address flagged here.

use gov_crypto::Address;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{GovernanceError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityRegistry {
    admin: Address,
    pending_admin: Address,
    whitelist_guardian: Address,
    veto_guardian: Address,
    whitelist_expirations: BTreeMap<Address, u64>,
    risk_flags: BTreeMap<Address, bool>,
}

impl AuthorityRegistry {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            pending_admin: Address::ZERO,
            whitelist_guardian: Address::ZERO,
            veto_guardian: Address::ZERO,
            whitelist_expirations: BTreeMap::new(),
            risk_flags: BTreeMap::new(),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn pending_admin(&self) -> Address {
        self.pending_admin
    }

    pub fn whitelist_guardian(&self) -> Address {
        self.whitelist_guardian
    }

    pub fn veto_guardian(&self) -> Address {
        self.veto_guardian
    }

    pub fn whitelist_expiration(&self, account: &Address) -> u64 {
        self.whitelist_expirations.get(account).copied().unwrap_or(0)
    }

    pub fn is_whitelisted(&self, account: &Address, now: u64) -> bool {
        self.whitelist_expiration(account) > now
    }

    pub fn is_high_risk(&self, category: &Address) -> bool {
        self.risk_flags.get(category).copied().unwrap_or(false)
    }

    pub fn high_risk_categories(&self) -> impl Iterator<Item = &Address> {
        self.risk_flags
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(category, _)| category)
    }

    pub fn require_admin(&self, caller: &Address) -> Result<()> {
        if *caller != self.admin {
            warn!("rejected admin call from {}", caller.short());
            return Err(GovernanceError::NotAdmin { caller: *caller });
        }
        Ok(())
    }

    pub fn is_whitelist_guardian(&self, caller: &Address) -> bool {
        !self.whitelist_guardian.is_zero() && *caller == self.whitelist_guardian
    }

    pub fn is_veto_guardian(&self, caller: &Address) -> bool {
        !self.veto_guardian.is_zero() && *caller == self.veto_guardian
    }

    /// First half of the admin handover. Returns the previous pending admin.
    pub fn set_pending_admin(&mut self, caller: &Address, pending_admin: Address) -> Result<Address> {
        self.require_admin(caller)?;
        Ok(std::mem::replace(&mut self.pending_admin, pending_admin))
    }

    /// Second half of the handover. The empty identity can never accept.
    /// Returns the previous admin.
    pub fn accept_admin(&mut self, caller: &Address) -> Result<Address> {
        if caller.is_zero() || *caller != self.pending_admin {
            return Err(GovernanceError::NotPendingAdmin { caller: *caller });
        }
        let old_admin = std::mem::replace(&mut self.admin, *caller);
        self.pending_admin = Address::ZERO;
        Ok(old_admin)
    }

    pub fn set_whitelist_guardian(&mut self, caller: &Address, guardian: Address) -> Result<Address> {
        self.require_admin(caller)?;
        Ok(std::mem::replace(&mut self.whitelist_guardian, guardian))
    }

    pub fn set_veto_guardian(&mut self, caller: &Address, guardian: Address) -> Result<Address> {
        self.require_admin(caller)?;
        Ok(std::mem::replace(&mut self.veto_guardian, guardian))
    }

    /// Admin or whitelist guardian may change whitelist expirations
    pub fn set_whitelist_account_expiration(
        &mut self,
        caller: &Address,
        account: Address,
        expiration: u64,
    ) -> Result<()> {
        if *caller != self.admin && !self.is_whitelist_guardian(caller) {
            warn!("rejected whitelist change from {}", caller.short());
            return Err(GovernanceError::NotAdminOrWhitelistGuardian { caller: *caller });
        }
        if expiration == 0 {
            self.whitelist_expirations.remove(&account);
        } else {
            self.whitelist_expirations.insert(account, expiration);
        }
        Ok(())
    }

    /// Returns the previous flag
    pub fn set_risk_flag(&mut self, caller: &Address, category: Address, high_risk: bool) -> Result<bool> {
        self.require_admin(caller)?;
        let previous = if high_risk {
            self.risk_flags.insert(category, true)
        } else {
            self.risk_flags.remove(&category)
        };
        Ok(previous.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (AuthorityRegistry, Address) {
        let admin = Address::from_label("admin");
        (AuthorityRegistry::new(admin), admin)
    }

    #[test]
    fn test_two_phase_admin_transfer() {
        let (mut registry, admin) = registry();
        let next = Address::from_label("next");

        assert!(registry.set_pending_admin(&next, next).is_err());
        registry.set_pending_admin(&admin, next).unwrap();
        assert_eq!(registry.admin(), admin);

        assert!(registry.accept_admin(&admin).is_err());
        assert_eq!(registry.accept_admin(&next).unwrap(), admin);
        assert_eq!(registry.admin(), next);
        assert!(registry.pending_admin().is_zero());
    }

    #[test]
    fn test_zero_identity_never_accepts() {
        let (mut registry, admin) = registry();
        registry.set_pending_admin(&admin, Address::ZERO).unwrap();
        assert_eq!(
            registry.accept_admin(&Address::ZERO),
            Err(GovernanceError::NotPendingAdmin { caller: Address::ZERO })
        );
    }

    #[test]
    fn test_whitelist_expiry_is_strict() {
        let (mut registry, admin) = registry();
        let account = Address::from_label("whale");
        registry
            .set_whitelist_account_expiration(&admin, account, 1_000)
            .unwrap();
        assert!(registry.is_whitelisted(&account, 999));
        assert!(!registry.is_whitelisted(&account, 1_000));
    }

    #[test]
    fn test_whitelist_guardian_may_set_expiration() {
        let (mut registry, admin) = registry();
        let guardian = Address::from_label("wl-guardian");
        let account = Address::from_label("whale");
        let stranger = Address::from_label("stranger");

        assert!(matches!(
            registry.set_whitelist_account_expiration(&guardian, account, 5),
            Err(GovernanceError::NotAdminOrWhitelistGuardian { .. })
        ));
        registry.set_whitelist_guardian(&admin, guardian).unwrap();
        registry
            .set_whitelist_account_expiration(&guardian, account, 5)
            .unwrap();
        assert_eq!(registry.whitelist_expiration(&account), 5);
        assert!(registry
            .set_whitelist_account_expiration(&stranger, account, 9)
            .is_err());
    }

    #[test]
    fn test_risk_flags() {
        let (mut registry, admin) = registry();
        let module = Address::from_label("oracle-module");
        assert!(!registry.is_high_risk(&module));
        assert!(!registry.set_risk_flag(&admin, module, true).unwrap());
        assert!(registry.is_high_risk(&module));
        assert_eq!(registry.high_risk_categories().count(), 1);
        assert!(registry.set_risk_flag(&admin, module, false).unwrap());
        assert!(!registry.is_high_risk(&module));
        assert!(registry.set_risk_flag(&module, module, true).is_err());
    }
}
