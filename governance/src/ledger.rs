//! Serializing ledger
//!
//! Every top-level operation runs against a copy of the world and is
//! committed only if it succeeds. A rejected operation leaves no trace: not in
//! the governor, not in the timelock queue and not inside any destination
//! target it reached before failing.

use gov_crypto::Address;
use gov_timelock::{CallOrigin, Dispatch, Timelock, TimelockCall, TimelockConfig};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::calls::GovernorCall;
use crate::clock::Clock;
use crate::config::GovernorConfig;
use crate::error::Result;
use crate::events::GovernanceEvent;
use crate::governor::Governor;
use crate::proposal::ProposalState;
use crate::snapshot::SnapshotOracle;
use crate::store::PersistedState;
use crate::target::CallTarget;
use crate::types::ProposalRequest;

#[derive(Debug, Clone)]
struct World {
    governor: Governor,
    timelock: Timelock,
    targets: BTreeMap<Address, Box<dyn CallTarget>>,
    events: Vec<GovernanceEvent>,
}

impl World {
    fn collect_events(&mut self) {
        let governor_events = self.governor.drain_events();
        let timelock_events = self.timelock.drain_events();
        self.events.extend(governor_events);
        self.events
            .extend(timelock_events.into_iter().map(GovernanceEvent::Timelock));
    }
}

/// Delivers payloads to registered targets. Addresses with nothing
/// registered accept any call and return nothing.
struct Targets<'a>(&'a mut BTreeMap<Address, Box<dyn CallTarget>>);

impl Dispatch for Targets<'_> {
    fn dispatch(
        &mut self,
        origin: CallOrigin,
        target: &Address,
        value: u128,
        payload: &[u8],
    ) -> std::result::Result<Vec<u8>, String> {
        match self.0.get_mut(target) {
            Some(callee) => callee.call(origin, value, payload),
            None => {
                debug!("no target registered at {}, call accepted", target.short());
                Ok(Vec::new())
            }
        }
    }
}

pub struct Ledger<O> {
    clock: Clock,
    oracle: O,
    world: World,
}

impl<O: SnapshotOracle> Ledger<O> {
    /// Deploy a governor and its timelock, derived from the governor name,
    /// and hand the timelock's admin role to the governor. The deployer
    /// remains the governor's admin.
    pub fn bootstrap(
        deployer: Address,
        governor_config: &GovernorConfig,
        timelock_config: &TimelockConfig,
        oracle: O,
        clock: Clock,
    ) -> Result<Self> {
        let governor_address = Address::from_label(&format!("{}/governor", governor_config.name));
        let timelock_address = Address::from_label(&format!("{}/timelock", governor_config.name));

        let mut timelock = Timelock::with_config(timelock_address, deployer, timelock_config)?;
        let mut governor = Governor::new(governor_address, timelock_address, deployer, governor_config)?;
        timelock.set_pending_admin(CallOrigin::Account(deployer), governor_address)?;
        governor.initiate(&deployer, &mut timelock)?;

        let mut world = World {
            governor,
            timelock,
            targets: BTreeMap::new(),
            events: Vec::new(),
        };
        world.collect_events();
        info!(
            "bootstrapped governor {} with timelock {}",
            governor_address.short(),
            timelock_address.short()
        );

        Ok(Self { clock, oracle, world })
    }

    /// Rebuild a ledger from persisted state. Destination targets are not
    /// persisted and must be registered again.
    pub fn restore(state: PersistedState, oracle: O) -> Self {
        Self {
            clock: state.clock,
            oracle,
            world: World {
                governor: state.governor,
                timelock: state.timelock,
                targets: BTreeMap::new(),
                events: state.events,
            },
        }
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            clock: self.clock,
            governor: self.world.governor.clone(),
            timelock: self.world.timelock.clone(),
            events: self.world.events.clone(),
        }
    }

    fn transact<T>(&mut self, op: impl FnOnce(&mut World, &Clock, &O) -> Result<T>) -> Result<T> {
        let mut draft = self.world.clone();
        match op(&mut draft, &self.clock, &self.oracle) {
            Ok(value) => {
                draft.collect_events();
                self.world = draft;
                Ok(value)
            }
            Err(e) => {
                debug!("operation rolled back: {}", e);
                Err(e)
            }
        }
    }

    pub fn propose(&mut self, proposer: &Address, request: ProposalRequest) -> Result<u64> {
        self.transact(|world, clock, oracle| world.governor.propose(proposer, request, clock, oracle))
    }

    pub fn cast_vote(&mut self, voter: &Address, id: u64, support: u8) -> Result<u128> {
        self.transact(|world, clock, oracle| {
            world.governor.cast_vote(voter, id, support, clock, oracle)
        })
    }

    pub fn cast_vote_with_reason(
        &mut self,
        voter: &Address,
        id: u64,
        support: u8,
        reason: &str,
    ) -> Result<u128> {
        self.transact(|world, clock, oracle| {
            world
                .governor
                .cast_vote_with_reason(voter, id, support, reason, clock, oracle)
        })
    }

    pub fn cast_vote_by_sig(&mut self, id: u64, support: u8, signer: &Address, signature: &[u8]) -> Result<u128> {
        self.transact(|world, clock, oracle| {
            world
                .governor
                .cast_vote_by_sig(id, support, signer, signature, clock, oracle)
        })
    }

    pub fn queue(&mut self, id: u64) -> Result<u64> {
        self.transact(|world, clock, oracle| {
            world.governor.queue(id, clock, oracle, &mut world.timelock)
        })
    }

    pub fn execute(&mut self, id: u64) -> Result<()> {
        self.transact(|world, clock, oracle| {
            let mut targets = Targets(&mut world.targets);
            world
                .governor
                .execute(id, clock, oracle, &mut world.timelock, &mut targets)
        })
    }

    pub fn cancel(&mut self, caller: &Address, id: u64) -> Result<()> {
        self.transact(|world, clock, oracle| {
            world
                .governor
                .cancel(caller, id, clock, oracle, &mut world.timelock)
        })
    }

    pub fn veto(&mut self, caller: &Address, id: u64) -> Result<()> {
        self.transact(|world, clock, _| world.governor.veto(caller, id, clock, &mut world.timelock))
    }

    /// Direct administrative call on the governor
    pub fn call_governor(&mut self, caller: &Address, call: GovernorCall) -> Result<()> {
        self.transact(|world, _, _| world.governor.apply(CallOrigin::Account(*caller), call))
    }

    /// Direct administrative call on the timelock
    pub fn call_timelock(&mut self, caller: &Address, call: TimelockCall) -> Result<()> {
        self.transact(|world, _, _| {
            let origin = CallOrigin::Account(*caller);
            match call {
                TimelockCall::SetDelay(delay) => world.timelock.set_delay(origin, delay)?,
                TimelockCall::SetPendingAdmin(admin) => {
                    world.timelock.set_pending_admin(origin, admin)?
                }
            }
            Ok(())
        })
    }

    pub fn accept_timelock_admin(&mut self, caller: &Address) -> Result<()> {
        self.transact(|world, _, _| Ok(world.timelock.accept_admin(caller)?))
    }

    pub fn state(&self, id: u64) -> Result<ProposalState> {
        self.world.governor.state(id, &self.clock)
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn governor(&self) -> &Governor {
        &self.world.governor
    }

    pub fn timelock(&self) -> &Timelock {
        &self.world.timelock
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn advance_ticks(&mut self, ticks: u64) {
        self.clock.advance_ticks(ticks);
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.clock.advance_time(seconds);
    }

    pub fn register_target(&mut self, address: Address, target: Box<dyn CallTarget>) {
        debug!("registered target {}", address.short());
        self.world.targets.insert(address, target);
    }

    /// Typed view of a registered target
    pub fn target<T: 'static>(&self, address: &Address) -> Option<&T> {
        self.world
            .targets
            .get(address)
            .and_then(|target| target.as_any().downcast_ref::<T>())
    }

    pub fn events(&self) -> &[GovernanceEvent] {
        &self.world.events
    }

    pub fn take_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.world.events)
    }
}

/// Ledger shared between threads. Callers are admitted one at a time.
pub struct SharedLedger<O> {
    inner: Arc<Mutex<Ledger<O>>>,
}

impl<O> Clone for SharedLedger<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: SnapshotOracle> SharedLedger<O> {
    pub fn new(ledger: Ledger<O>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut Ledger<O>) -> T) -> T {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::CheckpointToken;
    use crate::target::ParameterRegistry;
    use crate::types::Action;

    fn ledger() -> (Ledger<CheckpointToken>, Address) {
        let deployer = Address::from_label("deployer");
        let mut token = CheckpointToken::new();
        token.mint(&deployer, 1_000, 0).unwrap();
        let ledger = Ledger::bootstrap(
            deployer,
            &GovernorConfig::default(),
            &TimelockConfig::default(),
            token,
            Clock::new(1, 0),
        )
        .unwrap();
        (ledger, deployer)
    }

    #[test]
    fn test_bootstrap_hands_timelock_to_governor() {
        let (ledger, deployer) = ledger();
        assert_eq!(ledger.timelock().admin(), ledger.governor().address());
        assert_eq!(ledger.governor().registry().admin(), deployer);
        assert!(ledger.governor().is_initiated());
        assert!(ledger
            .events()
            .iter()
            .any(|e| matches!(e, GovernanceEvent::Timelock(gov_timelock::TimelockEvent::NewAdmin { .. }))));
    }

    #[test]
    fn test_failed_operation_leaves_no_trace() {
        let (mut ledger, deployer) = ledger();
        let before = ledger.events().len();
        assert!(ledger
            .call_governor(&deployer, GovernorCall::SetQuorumPct(1))
            .is_err());
        assert_eq!(ledger.events().len(), before);
        assert_eq!(ledger.governor().thresholds().quorum_pct(), 2_000);
    }

    #[test]
    fn test_target_lookup() {
        let (mut ledger, _) = ledger();
        let address = Address::from_label("params");
        let owner = ledger.timelock().address();
        ledger.register_target(address, Box::new(ParameterRegistry::new(owner)));

        let registry = ledger.target::<ParameterRegistry>(&address).unwrap();
        assert_eq!(registry.owner(), owner);
        assert!(ledger.target::<ParameterRegistry>(&Address::ZERO).is_none());
    }

    #[test]
    fn test_propose_through_ledger_emits_event() {
        let (mut ledger, deployer) = ledger();
        let request = ProposalRequest::from_actions(
            vec![Action::new(Address::from_label("x"), 0, "", vec![])],
            "noop",
        );
        let id = ledger.propose(&deployer, request).unwrap();
        assert_eq!(ledger.state(id).unwrap(), ProposalState::Pending);
        assert_eq!(ledger.take_events().last().and_then(|e| e.proposal_id()), Some(id));
        assert!(ledger.events().is_empty());
    }
}
