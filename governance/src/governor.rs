//! Proposal State Machine
//!
//! The governor owns every proposal record and decides each transition
//! against the clock, the snapshot oracle and the authority registry.
//! Approved actions are handed to the timelock, which it administers.
//!
//! Methods here mutate in place. A multi-action execute that fails halfway
//! leaves the proposal Queued, but the earlier actions have run and their
//! timelock entries are spent; wrap calls in a
//! [`Ledger`](crate::ledger::Ledger) for all-or-nothing semantics.

use gov_crypto::{ballot_digest, domain_separator, Address, KeyPair};
use gov_timelock::{CallOrigin, Dispatch, Timelock, Transaction, GRACE_PERIOD};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::calls::GovernorCall;
use crate::clock::Clock;
use crate::config::{check_bounds, GovernorConfig};
use crate::constants::*;
use crate::error::{GovernanceError, Result};
use crate::events::GovernanceEvent;
use crate::proposal::{Proposal, ProposalState};
use crate::registry::AuthorityRegistry;
use crate::snapshot::SnapshotOracle;
use crate::tally::{pessimistic_weight, Receipt, Tally};
use crate::threshold::ThresholdParams;
use crate::types::{Action, ProposalRequest, Support};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Governor {
    address: Address,
    timelock: Address,
    name: String,
    chain_id: u64,
    voting_delay: u64,
    voting_period: u64,
    max_operations: usize,
    thresholds: ThresholdParams,
    registry: AuthorityRegistry,
    proposals: BTreeMap<u64, Proposal>,
    latest_proposal_ids: BTreeMap<Address, u64>,
    proposal_count: u64,
    initiated: bool,
    #[serde(skip)]
    events: Vec<GovernanceEvent>,
}

impl Governor {
    /// Create a governor at `address` that will administer `timelock`.
    /// `admin` holds the registry's admin role until it hands it over.
    pub fn new(address: Address, timelock: Address, admin: Address, config: &GovernorConfig) -> Result<Self> {
        config.validate()?;
        let thresholds = ThresholdParams::new(
            config.proposal_threshold_pct,
            config.quorum_pct,
            config.high_risk_quorum_pct,
        )?;

        Ok(Self {
            address,
            timelock,
            name: config.name.clone(),
            chain_id: config.chain_id,
            voting_delay: config.voting_delay,
            voting_period: config.voting_period,
            max_operations: config.max_operations,
            thresholds,
            registry: AuthorityRegistry::new(admin),
            proposals: BTreeMap::new(),
            latest_proposal_ids: BTreeMap::new(),
            proposal_count: 0,
            initiated: false,
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn timelock(&self) -> Address {
        self.timelock
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn voting_delay(&self) -> u64 {
        self.voting_delay
    }

    pub fn voting_period(&self) -> u64 {
        self.voting_period
    }

    pub fn max_operations(&self) -> usize {
        self.max_operations
    }

    pub fn thresholds(&self) -> &ThresholdParams {
        &self.thresholds
    }

    pub fn registry(&self) -> &AuthorityRegistry {
        &self.registry
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    pub fn is_initiated(&self) -> bool {
        self.initiated
    }

    /// The effective configuration, reflecting any changes made since
    /// creation
    pub fn config(&self) -> GovernorConfig {
        GovernorConfig {
            name: self.name.clone(),
            chain_id: self.chain_id,
            voting_delay: self.voting_delay,
            voting_period: self.voting_period,
            proposal_threshold_pct: self.thresholds.proposal_threshold_pct(),
            quorum_pct: self.thresholds.quorum_pct(),
            high_risk_quorum_pct: self.thresholds.high_risk_quorum_pct(),
            max_operations: self.max_operations,
        }
    }

    /// Signing domain for ballots cast by signature
    pub fn domain_separator(&self) -> [u8; 32] {
        domain_separator(&self.name, self.chain_id, &self.address)
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GovernanceEvent) {
        self.events.push(event);
    }

    // ---- read surface ----

    pub fn proposal(&self, id: u64) -> Result<&Proposal> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::UnknownProposal(id))
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn state(&self, id: u64, clock: &Clock) -> Result<ProposalState> {
        Ok(self.proposal(id)?.state(clock, GRACE_PERIOD))
    }

    pub fn actions(&self, id: u64) -> Result<&[Action]> {
        Ok(&self.proposal(id)?.actions)
    }

    pub fn receipt(&self, id: u64, voter: &Address) -> Result<Receipt> {
        Ok(self.proposal(id)?.receipt(voter))
    }

    pub fn latest_proposal_id(&self, proposer: &Address) -> Option<u64> {
        self.latest_proposal_ids.get(proposer).copied()
    }

    pub fn is_whitelisted(&self, account: &Address, clock: &Clock) -> bool {
        self.registry.is_whitelisted(account, clock.time)
    }

    /// Threshold a new proposal would snapshot right now
    pub fn proposal_threshold_votes(&self, clock: &Clock, oracle: &dyn SnapshotOracle) -> u128 {
        self.thresholds
            .proposal_threshold_votes(oracle.total_supply_at(clock.tick))
    }

    pub fn quorum_votes(&self, clock: &Clock, oracle: &dyn SnapshotOracle) -> u128 {
        self.thresholds.quorum_votes(oracle.total_supply_at(clock.tick))
    }

    pub fn high_risk_quorum_votes(&self, clock: &Clock, oracle: &dyn SnapshotOracle) -> u128 {
        self.thresholds
            .high_risk_quorum_votes(oracle.total_supply_at(clock.tick))
    }

    // ---- lifecycle ----

    /// Accept the timelock's admin role. Admin only, once, before any
    /// proposal exists.
    pub fn initiate(&mut self, caller: &Address, timelock: &mut Timelock) -> Result<()> {
        self.registry.require_admin(caller)?;
        if self.initiated || self.proposal_count != 0 {
            return Err(GovernanceError::AlreadyInitiated);
        }

        timelock.accept_admin(&self.address)?;
        self.initiated = true;
        info!(
            "governor {} initiated as admin of timelock {}",
            self.address.short(),
            self.timelock.short()
        );
        Ok(())
    }

    pub fn propose(
        &mut self,
        proposer: &Address,
        request: ProposalRequest,
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
    ) -> Result<u64> {
        if !self.initiated {
            return Err(GovernanceError::NotInitiated);
        }
        let (actions, description) = request.into_actions(self.max_operations)?;

        let supply = oracle.total_supply_at(clock.tick);
        let threshold = self.thresholds.proposal_threshold_votes(supply);
        let votes = oracle.voting_power_at(proposer, clock.tick);
        if votes < threshold && !self.registry.is_whitelisted(proposer, clock.time) {
            return Err(GovernanceError::BelowThreshold {
                proposer: *proposer,
                votes,
                threshold,
            });
        }

        if let Some(latest) = self.latest_proposal_id(proposer) {
            let state = self.state(latest, clock)?;
            if matches!(state, ProposalState::Pending | ProposalState::Active) {
                return Err(GovernanceError::LiveProposalExists {
                    proposer: *proposer,
                    proposal_id: latest,
                    state,
                });
            }
        }

        let high_risk = actions
            .iter()
            .any(|action| self.registry.is_high_risk(&action.target));
        let quorum_votes = self.thresholds.quorum_for(supply, high_risk);

        let id = self.proposal_count + 1;
        let start_tick = clock.tick.saturating_add(self.voting_delay);
        let end_tick = start_tick.saturating_add(self.voting_period);

        let proposal = Proposal {
            id,
            proposer: *proposer,
            actions: actions.clone(),
            description: description.clone(),
            start_tick,
            end_tick,
            eta: 0,
            tally: Tally::default(),
            canceled: false,
            vetoed: false,
            executed: false,
            proposal_threshold: threshold,
            quorum_votes,
            high_risk,
            receipts: BTreeMap::new(),
        };
        self.proposals.insert(id, proposal);
        self.proposal_count = id;
        self.latest_proposal_ids.insert(*proposer, id);

        info!(
            "proposal {} created by {} ({} actions, voting ticks {}..={}, quorum {})",
            id,
            proposer.short(),
            actions.len(),
            start_tick + 1,
            end_tick,
            quorum_votes
        );
        self.emit(GovernanceEvent::ProposalCreated {
            id,
            proposer: *proposer,
            actions,
            start_tick,
            end_tick,
            proposal_threshold: threshold,
            quorum_votes,
            high_risk,
            description,
        });
        Ok(id)
    }

    pub fn cast_vote(
        &mut self,
        voter: &Address,
        id: u64,
        support: u8,
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
    ) -> Result<u128> {
        self.record_vote(voter, id, support, None, clock, oracle)
    }

    pub fn cast_vote_with_reason(
        &mut self,
        voter: &Address,
        id: u64,
        support: u8,
        reason: impl Into<String>,
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
    ) -> Result<u128> {
        self.record_vote(voter, id, support, Some(reason.into()), clock, oracle)
    }

    /// Vote on behalf of `signer`, who signed the ballot digest for this
    /// governor's domain
    pub fn cast_vote_by_sig(
        &mut self,
        id: u64,
        support: u8,
        signer: &Address,
        signature: &[u8],
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
    ) -> Result<u128> {
        let digest = ballot_digest(&self.domain_separator(), id, support);
        if KeyPair::verify(signer, &digest, signature).is_err() {
            warn!("rejected ballot signature for {}", signer.short());
            return Err(GovernanceError::InvalidSignature { voter: *signer });
        }
        self.record_vote(signer, id, support, None, clock, oracle)
    }

    fn record_vote(
        &mut self,
        voter: &Address,
        id: u64,
        support: u8,
        reason: Option<String>,
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
    ) -> Result<u128> {
        let state = self.state(id, clock)?;
        if state != ProposalState::Active {
            return Err(GovernanceError::InvalidState {
                proposal_id: id,
                actual: state,
                expected: "Active",
            });
        }

        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))?;
        if proposal.receipts.contains_key(voter) {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id: id,
                voter: *voter,
            });
        }
        let support = Support::try_from(support)?;

        let weight = pessimistic_weight(
            oracle.voting_power_at(voter, proposal.start_tick),
            oracle.voting_power_at(voter, clock.tick),
        );
        proposal.record_vote(voter, support, weight)?;

        debug!(
            "{} voted {} on proposal {} with weight {}",
            voter.short(),
            support,
            id,
            weight
        );
        self.emit(GovernanceEvent::VoteCast {
            voter: *voter,
            proposal_id: id,
            support,
            votes: weight,
            reason,
        });
        Ok(weight)
    }

    /// Proposer still holds the threshold snapshotted at creation, or is
    /// whitelisted
    fn check_standing(&self, proposal: &Proposal, clock: &Clock, oracle: &dyn SnapshotOracle) -> Result<()> {
        if self.registry.is_whitelisted(&proposal.proposer, clock.time) {
            return Ok(());
        }
        let votes = oracle.voting_power_at(&proposal.proposer, clock.tick);
        if votes < proposal.proposal_threshold {
            return Err(GovernanceError::BelowThreshold {
                proposer: proposal.proposer,
                votes,
                threshold: proposal.proposal_threshold,
            });
        }
        Ok(())
    }

    fn require_state(&self, id: u64, clock: &Clock, expected: ProposalState, label: &'static str) -> Result<()> {
        let actual = self.state(id, clock)?;
        if actual != expected {
            return Err(GovernanceError::InvalidState {
                proposal_id: id,
                actual,
                expected: label,
            });
        }
        Ok(())
    }

    /// Submit every action to the timelock with `eta = now + delay`.
    /// Returns the eta.
    pub fn queue(
        &mut self,
        id: u64,
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
        timelock: &mut Timelock,
    ) -> Result<u64> {
        self.require_state(id, clock, ProposalState::Succeeded, "Succeeded")?;
        let proposal = self.proposal(id)?;
        self.check_standing(proposal, clock, oracle)?;

        let eta = clock.time.saturating_add(timelock.delay());
        let transactions: Vec<Transaction> = proposal
            .actions
            .iter()
            .map(|action| action.transaction(eta))
            .collect();

        // Any collision aborts before anything is queued
        let mut seen = BTreeSet::new();
        for tx in &transactions {
            let hash = tx.hash();
            if timelock.is_queued(&hash) || !seen.insert(hash) {
                return Err(GovernanceError::DuplicateQueuedAction {
                    proposal_id: id,
                    hash,
                });
            }
        }

        for tx in &transactions {
            timelock.queue_transaction(&self.address, tx, clock.time)?;
        }

        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.eta = eta;
        }
        info!("proposal {} queued, eta {}", id, eta);
        self.emit(GovernanceEvent::ProposalQueued { id, eta });
        Ok(eta)
    }

    /// Run every queued action through the timelock, in order. The proposal
    /// is marked executed only once all of them succeed.
    pub fn execute(
        &mut self,
        id: u64,
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
        timelock: &mut Timelock,
        targets: &mut dyn Dispatch,
    ) -> Result<()> {
        let proposal = self.proposal(id)?;
        if !proposal.executed && proposal.state(clock, GRACE_PERIOD) == ProposalState::Expired {
            return Err(GovernanceError::Expired {
                proposal_id: id,
                deadline: proposal.eta.saturating_add(GRACE_PERIOD),
            });
        }
        self.require_state(id, clock, ProposalState::Queued, "Queued")?;
        let proposal = self.proposal(id)?;
        self.check_standing(proposal, clock, oracle)?;
        let transactions = proposal.transactions();

        let address = self.address;
        for tx in &transactions {
            let mut router = Router {
                governor: &mut *self,
                targets: &mut *targets,
            };
            timelock.execute_transaction(&address, tx, clock.time, &mut router)?;
        }

        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.executed = true;
        }

        info!("proposal {} executed", id);
        self.emit(GovernanceEvent::ProposalExecuted { id });
        Ok(())
    }

    /// Whether `caller` may cancel `proposal` right now.
    ///
    /// | proposer    | caller    | allowed when           |
    /// |-------------|-----------|------------------------|
    /// | any         | proposer  | always                 |
    /// | whitelisted | guardian  | proposer below threshold |
    /// | whitelisted | other     | never                  |
    /// | ordinary    | other     | proposer below threshold |
    fn may_cancel(&self, caller: &Address, proposal: &Proposal, clock: &Clock, oracle: &dyn SnapshotOracle) -> bool {
        if *caller == proposal.proposer {
            return true;
        }
        let below = oracle.voting_power_at(&proposal.proposer, clock.tick) < proposal.proposal_threshold;
        if self.registry.is_whitelisted(&proposal.proposer, clock.time) {
            below && self.registry.is_whitelist_guardian(caller)
        } else {
            below
        }
    }

    fn require_not_finalized(&self, id: u64, clock: &Clock) -> Result<&Proposal> {
        let proposal = self.proposal(id)?;
        if proposal.is_finalized() {
            return Err(GovernanceError::InvalidState {
                proposal_id: id,
                actual: proposal.state(clock, GRACE_PERIOD),
                expected: "not executed, canceled or vetoed",
            });
        }
        Ok(proposal)
    }

    fn withdraw_from_timelock(&self, proposal: &Proposal, timelock: &mut Timelock) -> Result<()> {
        if proposal.eta == 0 {
            return Ok(());
        }
        for tx in proposal.transactions() {
            timelock.cancel_transaction(&self.address, &tx)?;
        }
        Ok(())
    }

    pub fn cancel(
        &mut self,
        caller: &Address,
        id: u64,
        clock: &Clock,
        oracle: &dyn SnapshotOracle,
        timelock: &mut Timelock,
    ) -> Result<()> {
        let proposal = self.require_not_finalized(id, clock)?;
        if !self.may_cancel(caller, proposal, clock, oracle) {
            warn!("{} may not cancel proposal {}", caller.short(), id);
            return Err(GovernanceError::CancelNotPermitted {
                caller: *caller,
                proposal_id: id,
            });
        }
        self.withdraw_from_timelock(proposal, timelock)?;

        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.canceled = true;
        }
        info!("proposal {} canceled by {}", id, caller.short());
        self.emit(GovernanceEvent::ProposalCanceled {
            id,
            canceled_by: *caller,
        });
        Ok(())
    }

    /// Veto guardian override, valid in any non-final status
    pub fn veto(&mut self, caller: &Address, id: u64, clock: &Clock, timelock: &mut Timelock) -> Result<()> {
        if !self.registry.is_veto_guardian(caller) {
            warn!("{} is not the veto guardian", caller.short());
            return Err(GovernanceError::NotVetoGuardian { caller: *caller });
        }
        let proposal = self.require_not_finalized(id, clock)?;
        self.withdraw_from_timelock(proposal, timelock)?;

        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.vetoed = true;
        }
        info!("proposal {} vetoed", id);
        self.emit(GovernanceEvent::ProposalVetoed { id });
        Ok(())
    }

    // ---- administration ----

    /// Entry point for payloads addressed to the governor, typically from
    /// the timelock executing a proposal action
    pub fn handle_call(&mut self, origin: CallOrigin, payload: &[u8]) -> Result<()> {
        let call = GovernorCall::decode(payload)?;
        self.apply(origin, call)
    }

    /// Caller identity for administrative calls. Once the registry admin is
    /// the timelock, a direct call claiming the timelock's identity is
    /// refused: only its execute path speaks for it.
    fn authenticate(&self, origin: CallOrigin) -> Result<Address> {
        if let CallOrigin::Account(account) = origin {
            if account == self.timelock {
                warn!("direct call impersonating timelock {}", account.short());
                return Err(GovernanceError::NotAdmin { caller: account });
            }
        }
        Ok(origin.sender())
    }

    fn set_parameter(&mut self, name: &str, old: u128, new: u128) {
        info!("governor {} changed from {} to {}", name, old, new);
        self.emit(GovernanceEvent::ParameterSet {
            name: name.to_string(),
            old,
            new,
        });
    }

    pub fn apply(&mut self, origin: CallOrigin, call: GovernorCall) -> Result<()> {
        let caller = self.authenticate(origin)?;

        match call {
            GovernorCall::SetVotingDelay(delay) => {
                self.registry.require_admin(&caller)?;
                check_bounds(
                    "voting_delay",
                    delay as u128,
                    MIN_VOTING_DELAY as u128,
                    MAX_VOTING_DELAY as u128,
                )?;
                let old = std::mem::replace(&mut self.voting_delay, delay);
                self.set_parameter("voting_delay", old as u128, delay as u128);
            }
            GovernorCall::SetVotingPeriod(period) => {
                self.registry.require_admin(&caller)?;
                check_bounds(
                    "voting_period",
                    period as u128,
                    MIN_VOTING_PERIOD as u128,
                    MAX_VOTING_PERIOD as u128,
                )?;
                let old = std::mem::replace(&mut self.voting_period, period);
                self.set_parameter("voting_period", old as u128, period as u128);
            }
            GovernorCall::SetProposalThresholdPct(pct) => {
                self.registry.require_admin(&caller)?;
                let old = self.thresholds.set_proposal_threshold_pct(pct)?;
                self.set_parameter("proposal_threshold_pct", old as u128, pct as u128);
            }
            GovernorCall::SetQuorumPct(pct) => {
                self.registry.require_admin(&caller)?;
                let old = self.thresholds.set_quorum_pct(pct)?;
                self.set_parameter("quorum_pct", old as u128, pct as u128);
            }
            GovernorCall::SetHighRiskQuorumPct(pct) => {
                self.registry.require_admin(&caller)?;
                let old = self.thresholds.set_high_risk_quorum_pct(pct)?;
                self.set_parameter("high_risk_quorum_pct", old as u128, pct as u128);
            }
            GovernorCall::SetRiskFlag(category, high_risk) => {
                let old = self.registry.set_risk_flag(&caller, category, high_risk)?;
                info!("category {} high risk: {}", category.short(), high_risk);
                self.emit(GovernanceEvent::RiskFlagSet {
                    category,
                    old,
                    new: high_risk,
                });
            }
            GovernorCall::SetWhitelistGuardian(guardian) => {
                let old = self.registry.set_whitelist_guardian(&caller, guardian)?;
                info!("whitelist guardian is now {}", guardian.short());
                self.emit(GovernanceEvent::WhitelistGuardianSet { old, new: guardian });
            }
            GovernorCall::SetVetoGuardian(guardian) => {
                let old = self.registry.set_veto_guardian(&caller, guardian)?;
                info!("veto guardian is now {}", guardian.short());
                self.emit(GovernanceEvent::VetoGuardianSet { old, new: guardian });
            }
            GovernorCall::SetWhitelistAccountExpiration(account, expiration) => {
                self.registry
                    .set_whitelist_account_expiration(&caller, account, expiration)?;
                info!("{} whitelisted until {}", account.short(), expiration);
                self.emit(GovernanceEvent::WhitelistAccountExpirationSet { account, expiration });
            }
            GovernorCall::SetPendingAdmin(pending) => {
                let old = self.registry.set_pending_admin(&caller, pending)?;
                info!("governor pending admin is now {}", pending.short());
                self.emit(GovernanceEvent::NewPendingAdmin { old, new: pending });
            }
            GovernorCall::AcceptAdmin => {
                let old = self.registry.accept_admin(&caller)?;
                info!("governor admin is now {}", caller.short());
                self.emit(GovernanceEvent::NewAdmin { old, new: caller });
                self.emit(GovernanceEvent::NewPendingAdmin {
                    old: caller,
                    new: Address::ZERO,
                });
            }
        }
        Ok(())
    }
}

/// Dispatcher used while executing: payloads addressed to the governor
/// itself are applied here, everything else goes to the destination systems
struct Router<'a> {
    governor: &'a mut Governor,
    targets: &'a mut dyn Dispatch,
}

impl Dispatch for Router<'_> {
    fn dispatch(
        &mut self,
        origin: CallOrigin,
        target: &Address,
        value: u128,
        payload: &[u8],
    ) -> std::result::Result<Vec<u8>, String> {
        if *target == self.governor.address {
            self.governor
                .handle_call(origin, payload)
                .map(|_| Vec::new())
                .map_err(|e| e.to_string())
        } else {
            self.targets.dispatch(origin, target, value, payload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::CheckpointToken;
    use gov_timelock::{ErrorKind, DEFAULT_DELAY};

    struct Sink;

    impl Dispatch for Sink {
        fn dispatch(
            &mut self,
            _origin: CallOrigin,
            _target: &Address,
            _value: u128,
            _payload: &[u8],
        ) -> std::result::Result<Vec<u8>, String> {
            Ok(Vec::new())
        }
    }

    struct Fixture {
        governor: Governor,
        timelock: Timelock,
        token: CheckpointToken,
        admin: Address,
        proposer: Address,
        voter: Address,
    }

    fn fixture() -> Fixture {
        let admin = Address::from_label("admin");
        let proposer = Address::from_label("proposer");
        let voter = Address::from_label("voter");
        let governor_address = Address::from_label("governor");
        let timelock_address = Address::from_label("timelock");

        let mut timelock = Timelock::new(timelock_address, admin, DEFAULT_DELAY).unwrap();
        timelock
            .set_pending_admin(CallOrigin::Account(admin), governor_address)
            .unwrap();
        let mut governor =
            Governor::new(governor_address, timelock_address, admin, &GovernorConfig::default())
                .unwrap();
        governor.initiate(&admin, &mut timelock).unwrap();

        let mut token = CheckpointToken::new();
        token.mint(&proposer, 150, 0).unwrap();
        token.mint(&voter, 850, 0).unwrap();

        Fixture {
            governor,
            timelock,
            token,
            admin,
            proposer,
            voter,
        }
    }

    fn request() -> ProposalRequest {
        ProposalRequest::from_actions(
            vec![Action::new(Address::from_label("target"), 0, "poke()", vec![])],
            "poke the target",
        )
    }

    #[test]
    fn test_initiate_only_once() {
        let mut f = fixture();
        assert!(f.governor.is_initiated());
        assert_eq!(f.timelock.admin(), f.governor.address());
        assert_eq!(
            f.governor.initiate(&f.admin, &mut f.timelock),
            Err(GovernanceError::AlreadyInitiated)
        );
    }

    #[test]
    fn test_propose_requires_initiation() {
        let admin = Address::from_label("admin");
        let mut governor = Governor::new(
            Address::from_label("g"),
            Address::from_label("t"),
            admin,
            &GovernorConfig::default(),
        )
        .unwrap();
        let token = CheckpointToken::new();
        assert_eq!(
            governor.propose(&admin, request(), &Clock::new(1, 0), &token),
            Err(GovernanceError::NotInitiated)
        );
    }

    #[test]
    fn test_happy_path_in_place() {
        let mut f = fixture();
        let mut clock = Clock::new(1, 1_000);
        let id = f
            .governor
            .propose(&f.proposer, request(), &clock, &f.token)
            .unwrap();
        assert_eq!(f.governor.state(id, &clock).unwrap(), ProposalState::Pending);

        clock.advance_ticks(2);
        let weight = f
            .governor
            .cast_vote_with_reason(&f.voter, id, 1, "ship it", &clock, &f.token)
            .unwrap();
        assert_eq!(weight, 850);

        clock.advance_ticks(DEFAULT_VOTING_PERIOD);
        let eta = f
            .governor
            .queue(id, &clock, &f.token, &mut f.timelock)
            .unwrap();
        assert_eq!(eta, 1_000 + DEFAULT_DELAY);

        clock.time = eta;
        f.governor
            .execute(id, &clock, &f.token, &mut f.timelock, &mut Sink)
            .unwrap();
        assert_eq!(f.governor.state(id, &clock).unwrap(), ProposalState::Executed);
        assert_eq!(f.timelock.queued_count(), 0);
    }

    /// Rejects calls to one target, accepts everything else
    struct FailAt(Address);

    impl Dispatch for FailAt {
        fn dispatch(
            &mut self,
            _origin: CallOrigin,
            target: &Address,
            _value: u128,
            _payload: &[u8],
        ) -> std::result::Result<Vec<u8>, String> {
            if *target == self.0 {
                Err("rejected".to_string())
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn test_failed_action_leaves_proposal_unexecuted() {
        let mut f = fixture();
        let mut clock = Clock::new(1, 1_000);
        let broken = Address::from_label("broken");
        let request = ProposalRequest::from_actions(
            vec![
                Action::new(Address::from_label("target"), 0, "poke()", vec![]),
                Action::new(broken, 0, "poke()", vec![]),
            ],
            "second action fails",
        );
        let id = f.governor.propose(&f.proposer, request, &clock, &f.token).unwrap();
        clock.advance_ticks(2);
        f.governor.cast_vote(&f.voter, id, 1, &clock, &f.token).unwrap();
        clock.advance_ticks(DEFAULT_VOTING_PERIOD);
        let eta = f.governor.queue(id, &clock, &f.token, &mut f.timelock).unwrap();

        clock.time = eta;
        let err = f
            .governor
            .execute(id, &clock, &f.token, &mut f.timelock, &mut FailAt(broken))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(!f.governor.proposal(id).unwrap().executed);
        assert_eq!(f.governor.state(id, &clock).unwrap(), ProposalState::Queued);
    }

    #[test]
    fn test_execute_after_grace_is_timing_error() {
        let mut f = fixture();
        let mut clock = Clock::new(1, 1_000);
        let id = f.governor.propose(&f.proposer, request(), &clock, &f.token).unwrap();
        clock.advance_ticks(2);
        f.governor.cast_vote(&f.voter, id, 1, &clock, &f.token).unwrap();
        clock.advance_ticks(DEFAULT_VOTING_PERIOD);
        let eta = f.governor.queue(id, &clock, &f.token, &mut f.timelock).unwrap();

        clock.time = eta + GRACE_PERIOD;
        let err = f
            .governor
            .execute(id, &clock, &f.token, &mut f.timelock, &mut Sink)
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::Expired {
                proposal_id: id,
                deadline: eta + GRACE_PERIOD,
            }
        );
        assert_eq!(err.kind(), ErrorKind::Timing);
    }

    #[test]
    fn test_one_live_proposal_per_proposer() {
        let mut f = fixture();
        let clock = Clock::new(1, 0);
        let id = f
            .governor
            .propose(&f.proposer, request(), &clock, &f.token)
            .unwrap();
        assert_eq!(
            f.governor.propose(&f.proposer, request(), &clock, &f.token),
            Err(GovernanceError::LiveProposalExists {
                proposer: f.proposer,
                proposal_id: id,
                state: ProposalState::Pending,
            })
        );
    }

    #[test]
    fn test_vote_checks_order() {
        let mut f = fixture();
        let mut clock = Clock::new(1, 0);
        let id = f
            .governor
            .propose(&f.proposer, request(), &clock, &f.token)
            .unwrap();

        assert!(matches!(
            f.governor.cast_vote(&f.voter, id, 1, &clock, &f.token),
            Err(GovernanceError::InvalidState { .. })
        ));

        clock.advance_ticks(2);
        f.governor.cast_vote(&f.voter, id, 0, &clock, &f.token).unwrap();
        // Already voted wins over the bad support value
        assert!(matches!(
            f.governor.cast_vote(&f.voter, id, 9, &clock, &f.token),
            Err(GovernanceError::AlreadyVoted { .. })
        ));
        assert_eq!(
            f.governor.cast_vote(&f.proposer, id, 9, &clock, &f.token),
            Err(GovernanceError::InvalidSupport(9))
        );
    }

    #[test]
    fn test_admin_setters_bounded() {
        let mut f = fixture();
        let origin = CallOrigin::Account(f.admin);
        f.governor
            .apply(origin, GovernorCall::SetVotingDelay(5))
            .unwrap();
        assert_eq!(f.governor.voting_delay(), 5);
        assert!(matches!(
            f.governor.apply(origin, GovernorCall::SetVotingPeriod(1)),
            Err(GovernanceError::ParameterOutOfBounds { .. })
        ));
        assert!(matches!(
            f.governor
                .apply(CallOrigin::Account(f.voter), GovernorCall::SetQuorumPct(3_000)),
            Err(GovernanceError::NotAdmin { .. })
        ));
        assert_eq!(f.governor.config().voting_delay, 5);
    }

    #[test]
    fn test_timelock_identity_needs_execute_path() {
        let mut f = fixture();
        let timelock = f.governor.timelock();
        f.governor
            .apply(CallOrigin::Account(f.admin), GovernorCall::SetPendingAdmin(timelock))
            .unwrap();

        assert!(f
            .governor
            .apply(CallOrigin::Account(timelock), GovernorCall::AcceptAdmin)
            .is_err());
        f.governor
            .apply(CallOrigin::TimelockDispatch(timelock), GovernorCall::AcceptAdmin)
            .unwrap();
        assert_eq!(f.governor.registry().admin(), timelock);
    }
}
