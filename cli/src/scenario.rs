//! Scripted governance runs
//!
//! A scenario deploys a governor and timelock over a checkpointed token,
//! registers a parameter registry owned by the timelock, and replays its
//! steps in order. A rejected step is recorded with its error class and the
//! run carries on; only setup problems abort.

use chrono::{DateTime, Utc};
use gov_crypto::Address;
use gov_timelock::GRACE_PERIOD;
use governance::{
    CheckpointToken, Clock, ErrorKind, GovernanceError, GovernorCall, Ledger, ParameterRegistry,
    ProposalRequest, ProposalState, Support,
};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::{account, ConfigError, Scenario, Step};

/// Label of the parameter registry every scenario deploys
pub const PARAMS_LABEL: &str = "params";

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Setup failed: {0}")]
    Setup(#[from] GovernanceError),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: String,
    pub ok: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalSummary {
    pub id: u64,
    pub proposer: String,
    pub description: String,
    pub state: ProposalState,
    pub for_votes: u128,
    pub against_votes: u128,
    pub abstain_votes: u128,
    pub quorum_votes: u128,
    pub high_risk: bool,
    pub eta: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_utc: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub governor: String,
    pub timelock: String,
    pub clock: Clock,
    pub timelock_delay: u64,
    pub steps: Vec<StepOutcome>,
    pub proposals: Vec<ProposalSummary>,
    pub parameters: BTreeMap<String, u128>,
    pub events: usize,
}

impl Report {
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|step| !step.ok).count()
    }
}

pub struct Simulation {
    ledger: Ledger<CheckpointToken>,
    deployer: Address,
    params: Address,
    /// Reverse lookup so reports show the names used in the scenario file
    names: BTreeMap<Address, String>,
}

impl Simulation {
    pub fn setup(scenario: &Scenario) -> Result<Self, ScenarioError> {
        scenario.engine.validate()?;
        let mut names = BTreeMap::new();
        let deployer = account(&scenario.deployer)?;
        names.insert(deployer, scenario.deployer.clone());

        let mut token = CheckpointToken::new();
        for (name, amount) in &scenario.token.balances {
            let holder = account(name)?;
            token.mint(&holder, u128::from(*amount), scenario.clock.tick)?;
            names.insert(holder, name.clone());
        }

        let mut ledger = Ledger::bootstrap(
            deployer,
            &scenario.engine.governor,
            &scenario.engine.timelock,
            token,
            scenario.clock,
        )?;

        let params = Address::from_label(PARAMS_LABEL);
        let owner = ledger.timelock().address();
        ledger.register_target(params, Box::new(ParameterRegistry::new(owner)));
        names.insert(params, PARAMS_LABEL.to_string());
        names.insert(ledger.governor().address(), "governor".to_string());
        names.insert(owner, "timelock".to_string());

        if let Some(guardian) = &scenario.roles.whitelist_guardian {
            let guardian_address = account(guardian)?;
            ledger.call_governor(&deployer, GovernorCall::SetWhitelistGuardian(guardian_address))?;
            names.insert(guardian_address, guardian.clone());
        }
        if let Some(guardian) = &scenario.roles.veto_guardian {
            let guardian_address = account(guardian)?;
            ledger.call_governor(&deployer, GovernorCall::SetVetoGuardian(guardian_address))?;
            names.insert(guardian_address, guardian.clone());
        }

        Ok(Self {
            ledger,
            deployer,
            params,
            names,
        })
    }

    pub fn ledger(&self) -> &Ledger<CheckpointToken> {
        &self.ledger
    }

    /// Replay every step and summarize the final state
    pub fn run(&mut self, steps: &[Step]) -> Report {
        let mut outcomes = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            let action = step_name(step).to_string();
            let outcome = match self.apply(step) {
                Ok(detail) => {
                    debug!("step {} ({}) ok: {}", index + 1, action, detail);
                    StepOutcome {
                        index: index + 1,
                        action,
                        ok: true,
                        detail,
                        error_kind: None,
                    }
                }
                Err(StepError::Governance(err)) => {
                    info!("step {} ({}) rejected: {}", index + 1, action, err);
                    StepOutcome {
                        index: index + 1,
                        action,
                        ok: false,
                        detail: err.to_string(),
                        error_kind: Some(err.kind()),
                    }
                }
                Err(StepError::Input(message)) => StepOutcome {
                    index: index + 1,
                    action,
                    ok: false,
                    detail: message,
                    error_kind: Some(ErrorKind::Validation),
                },
            };
            outcomes.push(outcome);
        }
        self.report(outcomes)
    }

    fn name(&self, address: &Address) -> String {
        self.names
            .get(address)
            .cloned()
            .unwrap_or_else(|| address.short())
    }

    fn resolve(&mut self, name: &str) -> Result<Address, StepError> {
        let address = account(name).map_err(|err| StepError::Input(err.to_string()))?;
        self.names.entry(address).or_insert_with(|| name.to_string());
        Ok(address)
    }

    fn apply(&mut self, step: &Step) -> Result<String, StepError> {
        match step {
            Step::Propose {
                proposer,
                description,
                parameters,
            } => {
                let proposer = self.resolve(proposer)?;
                let actions = parameters
                    .iter()
                    .map(|(key, value)| {
                        ParameterRegistry::set_parameter_action(self.params, key, u128::from(*value))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let id = self
                    .ledger
                    .propose(&proposer, ProposalRequest::from_actions(actions, description.clone()))?;
                Ok(format!("created proposal {id}"))
            }
            Step::Vote {
                voter,
                proposal,
                support,
                reason,
            } => {
                let voter = self.resolve(voter)?;
                let support = parse_support(support)?;
                let weight = match reason {
                    Some(reason) => {
                        self.ledger
                            .cast_vote_with_reason(&voter, *proposal, support as u8, reason)?
                    }
                    None => self.ledger.cast_vote(&voter, *proposal, support as u8)?,
                };
                Ok(format!("{weight} votes {support} on proposal {proposal}"))
            }
            Step::Advance { ticks, seconds } => {
                self.ledger.advance_ticks(*ticks);
                self.ledger.advance_time(*seconds);
                let clock = self.ledger.clock();
                Ok(format!("now at tick {} time {}", clock.tick, clock.time))
            }
            Step::Queue { proposal } => {
                let eta = self.ledger.queue(*proposal)?;
                Ok(match format_time(eta) {
                    Some(utc) => format!("queued proposal {proposal}, eta {eta} ({utc})"),
                    None => format!("queued proposal {proposal}, eta {eta}"),
                })
            }
            Step::Execute { proposal } => {
                self.ledger.execute(*proposal)?;
                Ok(format!("executed proposal {proposal}"))
            }
            Step::Cancel { caller, proposal } => {
                let caller = self.resolve(caller)?;
                self.ledger.cancel(&caller, *proposal)?;
                Ok(format!("canceled proposal {proposal}"))
            }
            Step::Veto { caller, proposal } => {
                let caller = self.resolve(caller)?;
                self.ledger.veto(&caller, *proposal)?;
                Ok(format!("vetoed proposal {proposal}"))
            }
            Step::Whitelist { account, seconds } => {
                let target = self.resolve(account)?;
                let expiration = self.ledger.clock().time.saturating_add(*seconds);
                let deployer = self.deployer;
                self.ledger.call_governor(
                    &deployer,
                    GovernorCall::SetWhitelistAccountExpiration(target, expiration),
                )?;
                Ok(format!("whitelisted {account} until {expiration}"))
            }
        }
    }

    fn report(&self, steps: Vec<StepOutcome>) -> Report {
        let governor = self.ledger.governor();
        let clock = self.ledger.clock();
        let proposals = governor
            .proposals()
            .map(|proposal| ProposalSummary {
                id: proposal.id,
                proposer: self.name(&proposal.proposer),
                description: proposal.description.clone(),
                state: proposal.state(&clock, GRACE_PERIOD),
                for_votes: proposal.tally.for_votes,
                against_votes: proposal.tally.against_votes,
                abstain_votes: proposal.tally.abstain_votes,
                quorum_votes: proposal.quorum_votes,
                high_risk: proposal.high_risk,
                eta: proposal.eta,
                eta_utc: if proposal.eta == 0 {
                    None
                } else {
                    format_time(proposal.eta)
                },
            })
            .collect();
        let parameters = self
            .ledger
            .target::<ParameterRegistry>(&self.params)
            .map(|registry| registry.parameters().clone())
            .unwrap_or_default();

        Report {
            governor: self.name(&governor.address()),
            timelock: self.name(&self.ledger.timelock().address()),
            clock,
            timelock_delay: self.ledger.timelock().delay(),
            steps,
            proposals,
            parameters,
            events: self.ledger.events().len(),
        }
    }
}

/// Why a single step was rejected
enum StepError {
    Governance(GovernanceError),
    Input(String),
}

impl From<GovernanceError> for StepError {
    fn from(err: GovernanceError) -> Self {
        StepError::Governance(err)
    }
}

fn step_name(step: &Step) -> &'static str {
    match step {
        Step::Propose { .. } => "propose",
        Step::Vote { .. } => "vote",
        Step::Advance { .. } => "advance",
        Step::Queue { .. } => "queue",
        Step::Execute { .. } => "execute",
        Step::Cancel { .. } => "cancel",
        Step::Veto { .. } => "veto",
        Step::Whitelist { .. } => "whitelist",
    }
}

/// `for`, `against`, `abstain` or the numeric code
fn parse_support(value: &str) -> Result<Support, StepError> {
    match value.to_ascii_lowercase().as_str() {
        "for" | "yes" => Ok(Support::For),
        "against" | "no" => Ok(Support::Against),
        "abstain" => Ok(Support::Abstain),
        other => {
            let code: u8 = other
                .parse()
                .map_err(|_| StepError::Input(format!("Unknown vote support {value:?}")))?;
            Ok(Support::try_from(code)?)
        }
    }
}

fn format_time(seconds: u64) -> Option<String> {
    let seconds = i64::try_from(seconds).ok()?;
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Parse, set up and run a scenario in one go
pub fn simulate(text: &str, origin: &str) -> Result<(Report, Simulation), ScenarioError> {
    let scenario = Scenario::parse(text, origin)?;
    let mut simulation = Simulation::setup(&scenario)?;
    let report = simulation.run(&scenario.steps);
    info!(
        "scenario {} finished: {} steps, {} rejected",
        origin,
        report.steps.len(),
        report.failed_steps()
    );
    Ok((report, simulation))
}
