//! Snapshot Oracle
//!
//! The governor never reads live balances. It asks for an account's voting
//! power and the total supply as of a tick, which the token answers from
//! checkpoints written as balances change.

use gov_crypto::Address;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{GovernanceError, Result};

/// Historical voting power lookups
pub trait SnapshotOracle {
    fn voting_power_at(&self, account: &Address, tick: u64) -> u128;
    fn total_supply_at(&self, tick: u64) -> u128;
}

/// Value recorded from `from_tick` onward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub from_tick: u64,
    pub value: u128,
}

fn value_at(checkpoints: &[Checkpoint], tick: u64) -> u128 {
    let idx = checkpoints.partition_point(|c| c.from_tick <= tick);
    if idx == 0 {
        0
    } else {
        checkpoints[idx - 1].value
    }
}

fn latest(checkpoints: &[Checkpoint]) -> u128 {
    checkpoints.last().map(|c| c.value).unwrap_or(0)
}

fn write(checkpoints: &mut Vec<Checkpoint>, tick: u64, value: u128) {
    match checkpoints.last_mut() {
        Some(last) if last.from_tick == tick => last.value = value,
        _ => checkpoints.push(Checkpoint {
            from_tick: tick,
            value,
        }),
    }
}

/// Checkpointed balance token. Balance is voting power; there is no
/// delegation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointToken {
    balances: BTreeMap<Address, Vec<Checkpoint>>,
    supply: Vec<Checkpoint>,
    last_tick: u64,
}

impl CheckpointToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).map(|c| latest(c)).unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        latest(&self.supply)
    }

    /// History is append-only
    fn check_tick(&self, tick: u64) -> Result<()> {
        if tick < self.last_tick {
            return Err(GovernanceError::Token(format!(
                "checkpoint at tick {} precedes latest tick {}",
                tick, self.last_tick
            )));
        }
        Ok(())
    }

    fn set_balance(&mut self, account: &Address, tick: u64, value: u128) {
        let checkpoints = self.balances.entry(*account).or_default();
        write(checkpoints, tick, value);
    }

    pub fn mint(&mut self, to: &Address, amount: u128, tick: u64) -> Result<()> {
        self.check_tick(tick)?;
        let supply = self
            .total_supply()
            .checked_add(amount)
            .ok_or_else(|| GovernanceError::Token("total supply overflow".to_string()))?;

        let balance = self.balance_of(to) + amount;
        self.set_balance(to, tick, balance);
        write(&mut self.supply, tick, supply);
        self.last_tick = tick;
        debug!("minted {} to {} at tick {}", amount, to.short(), tick);
        Ok(())
    }

    pub fn burn(&mut self, from: &Address, amount: u128, tick: u64) -> Result<()> {
        self.check_tick(tick)?;
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(GovernanceError::Token(format!(
                "cannot burn {} from {}, balance {}",
                amount,
                from.short(),
                balance
            )));
        }

        let supply = self.total_supply() - amount;
        self.set_balance(from, tick, balance - amount);
        write(&mut self.supply, tick, supply);
        self.last_tick = tick;
        Ok(())
    }

    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128, tick: u64) -> Result<()> {
        self.check_tick(tick)?;
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(GovernanceError::Token(format!(
                "cannot transfer {} from {}, balance {}",
                amount,
                from.short(),
                from_balance
            )));
        }
        if from == to {
            self.last_tick = tick;
            return Ok(());
        }

        let to_balance = self.balance_of(to);
        self.set_balance(from, tick, from_balance - amount);
        self.set_balance(to, tick, to_balance + amount);
        self.last_tick = tick;
        debug!(
            "transferred {} from {} to {} at tick {}",
            amount,
            from.short(),
            to.short(),
            tick
        );
        Ok(())
    }
}

impl SnapshotOracle for CheckpointToken {
    fn voting_power_at(&self, account: &Address, tick: u64) -> u128 {
        self.balances
            .get(account)
            .map(|c| value_at(c, tick))
            .unwrap_or(0)
    }

    fn total_supply_at(&self, tick: u64) -> u128 {
        value_at(&self.supply, tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_lookups() {
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let mut token = CheckpointToken::new();

        token.mint(&alice, 1_000, 5).unwrap();
        token.transfer(&alice, &bob, 400, 10).unwrap();
        token.mint(&bob, 100, 10).unwrap();

        assert_eq!(token.voting_power_at(&alice, 4), 0);
        assert_eq!(token.voting_power_at(&alice, 5), 1_000);
        assert_eq!(token.voting_power_at(&alice, 9), 1_000);
        assert_eq!(token.voting_power_at(&alice, 10), 600);
        assert_eq!(token.voting_power_at(&bob, 10), 500);
        assert_eq!(token.total_supply_at(9), 1_000);
        assert_eq!(token.total_supply_at(100), 1_100);
    }

    #[test]
    fn test_same_tick_writes_collapse() {
        let alice = Address::from_label("alice");
        let mut token = CheckpointToken::new();
        token.mint(&alice, 1, 3).unwrap();
        token.mint(&alice, 2, 3).unwrap();
        assert_eq!(token.balances[&alice].len(), 1);
        assert_eq!(token.voting_power_at(&alice, 3), 3);
    }

    #[test]
    fn test_rejects_rewriting_history() {
        let alice = Address::from_label("alice");
        let mut token = CheckpointToken::new();
        token.mint(&alice, 10, 8).unwrap();
        assert!(matches!(token.mint(&alice, 10, 7), Err(GovernanceError::Token(_))));
    }

    #[test]
    fn test_insufficient_balance() {
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let mut token = CheckpointToken::new();
        token.mint(&alice, 10, 1).unwrap();
        assert!(token.transfer(&alice, &bob, 11, 2).is_err());
        assert!(token.burn(&bob, 1, 2).is_err());
        token.burn(&alice, 10, 2).unwrap();
        assert_eq!(token.total_supply(), 0);
        assert_eq!(token.total_supply_at(1), 10);
    }
}
