//! The queued-transaction set and its lifecycle

use gov_crypto::{call_payload, tx_hash, Address, TxHash};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::calls::TimelockCall;
use crate::config::{check_delay, TimelockConfig};
use crate::error::{Result, TimelockError};
use crate::origin::{CallOrigin, Dispatch};
use crate::GRACE_PERIOD;

/// A scheduled call. Its hash is the queue key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub target: Address,
    pub value: u128,
    pub signature: String,
    #[serde(with = "gov_crypto::serde_hex")]
    pub data: Vec<u8>,
    pub eta: u64,
}

impl Transaction {
    pub fn hash(&self) -> TxHash {
        tx_hash(&self.target, self.value, &self.signature, &self.data, self.eta)
    }

    pub fn payload(&self) -> Vec<u8> {
        call_payload(&self.signature, &self.data)
    }
}

/// Notifications emitted by the timelock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockEvent {
    NewAdmin { admin: Address },
    NewPendingAdmin { pending_admin: Address },
    NewDelay { delay: u64 },
    QueueTransaction { hash: TxHash, transaction: Transaction },
    CancelTransaction { hash: TxHash, transaction: Transaction },
    ExecuteTransaction { hash: TxHash, transaction: Transaction },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timelock {
    address: Address,
    admin: Address,
    pending_admin: Address,
    delay: u64,
    /// Set once the first admin handover has happened; afterwards admin
    /// changes go through the execute path only
    admin_initialized: bool,
    queued: BTreeSet<TxHash>,
    #[serde(skip)]
    events: Vec<TimelockEvent>,
}

impl Timelock {
    /// Create a timelock living at `address`, administered by `admin`
    pub fn new(address: Address, admin: Address, delay: u64) -> Result<Self> {
        check_delay(delay)?;
        Ok(Self {
            address,
            admin,
            pending_admin: Address::ZERO,
            delay,
            admin_initialized: false,
            queued: BTreeSet::new(),
            events: Vec::new(),
        })
    }

    pub fn with_config(address: Address, admin: Address, config: &TimelockConfig) -> Result<Self> {
        Self::new(address, admin, config.delay)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn pending_admin(&self) -> Address {
        self.pending_admin
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    pub fn admin_initialized(&self) -> bool {
        self.admin_initialized
    }

    pub fn is_queued(&self, hash: &TxHash) -> bool {
        self.queued.contains(hash)
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<TimelockEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_admin(&self, caller: &Address) -> Result<()> {
        if *caller != self.admin {
            warn!(
                "timelock {}: rejected call from non-admin {}",
                self.address.short(),
                caller.short()
            );
            return Err(TimelockError::NotAdmin { caller: *caller });
        }
        Ok(())
    }

    /// Schedule `tx`. Re-queueing a present hash is accepted; preventing
    /// duplicate submissions is the caller's job.
    pub fn queue_transaction(&mut self, caller: &Address, tx: &Transaction, now: u64) -> Result<TxHash> {
        self.require_admin(caller)?;

        let earliest = now.saturating_add(self.delay);
        if tx.eta < earliest {
            return Err(TimelockError::EtaTooEarly {
                eta: tx.eta,
                earliest,
            });
        }

        let hash = tx.hash();
        self.queued.insert(hash);
        debug!("timelock queued {} (eta {})", hash, tx.eta);
        self.events.push(TimelockEvent::QueueTransaction {
            hash,
            transaction: tx.clone(),
        });
        Ok(hash)
    }

    /// Remove `tx` from the queue. Absent transactions are a no-op.
    pub fn cancel_transaction(&mut self, caller: &Address, tx: &Transaction) -> Result<TxHash> {
        self.require_admin(caller)?;

        let hash = tx.hash();
        if self.queued.remove(&hash) {
            debug!("timelock canceled {}", hash);
        }
        self.events.push(TimelockEvent::CancelTransaction {
            hash,
            transaction: tx.clone(),
        });
        Ok(hash)
    }

    /// Consume and perform a queued transaction.
    ///
    /// The hash is removed before the call goes out, so a re-entrant attempt
    /// to execute the same transaction finds it absent. If the call fails the
    /// hash is restored and nothing else has changed.
    pub fn execute_transaction(
        &mut self,
        caller: &Address,
        tx: &Transaction,
        now: u64,
        dispatcher: &mut dyn Dispatch,
    ) -> Result<Vec<u8>> {
        self.require_admin(caller)?;

        let hash = tx.hash();
        if !self.queued.contains(&hash) {
            return Err(TimelockError::NotQueued(hash));
        }
        if now < tx.eta {
            return Err(TimelockError::Locked { hash, eta: tx.eta });
        }
        let deadline = tx.eta.saturating_add(GRACE_PERIOD);
        if now > deadline {
            return Err(TimelockError::Stale { hash, deadline });
        }

        self.queued.remove(&hash);

        let payload = tx.payload();
        let outcome = if tx.target == self.address {
            self.handle_self_call(&payload)
        } else {
            dispatcher
                .dispatch(
                    CallOrigin::TimelockDispatch(self.address),
                    &tx.target,
                    tx.value,
                    &payload,
                )
                .map_err(TimelockError::ExecutionReverted)
        };

        match outcome {
            Ok(returned) => {
                info!("timelock executed {} against {}", hash, tx.target.short());
                self.events.push(TimelockEvent::ExecuteTransaction {
                    hash,
                    transaction: tx.clone(),
                });
                Ok(returned)
            }
            Err(e) => {
                warn!("timelock execution of {} reverted: {}", hash, e);
                self.queued.insert(hash);
                Err(e)
            }
        }
    }

    fn handle_self_call(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let call = TimelockCall::decode(payload)
            .map_err(|e| TimelockError::ExecutionReverted(e.to_string()))?;
        let origin = CallOrigin::TimelockDispatch(self.address);

        let applied = match call {
            TimelockCall::SetDelay(delay) => self.set_delay(origin, delay),
            TimelockCall::SetPendingAdmin(admin) => self.set_pending_admin(origin, admin),
        };
        applied
            .map(|_| Vec::new())
            .map_err(|e| TimelockError::ExecutionReverted(e.to_string()))
    }

    /// Change the queue delay. Only reachable through the execute path.
    pub fn set_delay(&mut self, origin: CallOrigin, delay: u64) -> Result<()> {
        if !origin.is_dispatch_of(&self.address) {
            return Err(TimelockError::NotSelfDispatch);
        }
        check_delay(delay)?;

        self.delay = delay;
        info!("timelock {} delay set to {}s", self.address.short(), delay);
        self.events.push(TimelockEvent::NewDelay { delay });
        Ok(())
    }

    /// Offer the admin role to `pending_admin`.
    ///
    /// The very first offer may come directly from the current admin (the
    /// bootstrap handover); every later offer must come through the execute
    /// path.
    pub fn set_pending_admin(&mut self, origin: CallOrigin, pending_admin: Address) -> Result<()> {
        if self.admin_initialized {
            if !origin.is_dispatch_of(&self.address) {
                return Err(TimelockError::NotSelfDispatch);
            }
        } else {
            self.require_admin(&origin.sender())?;
            self.admin_initialized = true;
        }

        self.pending_admin = pending_admin;
        info!(
            "timelock {} pending admin set to {}",
            self.address.short(),
            pending_admin.short()
        );
        self.events.push(TimelockEvent::NewPendingAdmin { pending_admin });
        Ok(())
    }

    /// Complete an admin handover. Only the pending admin may accept.
    pub fn accept_admin(&mut self, caller: &Address) -> Result<()> {
        if self.pending_admin.is_zero() || *caller != self.pending_admin {
            return Err(TimelockError::NotPendingAdmin { caller: *caller });
        }

        self.admin = *caller;
        self.pending_admin = Address::ZERO;
        info!("timelock {} admin is now {}", self.address.short(), caller.short());
        self.events.push(TimelockEvent::NewAdmin { admin: *caller });
        self.events.push(TimelockEvent::NewPendingAdmin {
            pending_admin: Address::ZERO,
        });
        Ok(())
    }
}
