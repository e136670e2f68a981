#![allow(dead_code)]

use gov_crypto::Address;
use governance::*;

pub const START_TIME: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;

pub fn addr(label: &str) -> Address {
    Address::from_label(label)
}

pub struct Harness {
    pub ledger: Ledger<CheckpointToken>,
    pub deployer: Address,
    /// Parameter registry owned by the timelock
    pub params: Address,
}

pub fn setup(balances: &[(&str, u128)]) -> Harness {
    setup_with(GovernorConfig::default(), balances)
}

pub fn setup_with(config: GovernorConfig, balances: &[(&str, u128)]) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut token = CheckpointToken::new();
    for (label, amount) in balances {
        token.mint(&addr(label), *amount, 0).unwrap();
    }

    let deployer = addr("deployer");
    let mut ledger = Ledger::bootstrap(
        deployer,
        &config,
        &TimelockConfig::default(),
        token,
        Clock::new(1, START_TIME),
    )
    .unwrap();

    let params = addr("params");
    let owner = ledger.timelock().address();
    ledger.register_target(params, Box::new(ParameterRegistry::new(owner)));

    Harness {
        ledger,
        deployer,
        params,
    }
}

impl Harness {
    pub fn set_param(&self, key: &str, value: u128) -> Action {
        ParameterRegistry::set_parameter_action(self.params, key, value).unwrap()
    }

    pub fn propose(&mut self, proposer: &str, actions: Vec<Action>) -> Result<u64> {
        self.ledger
            .propose(&addr(proposer), ProposalRequest::from_actions(actions, "test proposal"))
    }

    /// Move into the voting window of a proposal created at the current tick
    pub fn open_voting(&mut self) {
        let delay = self.ledger.governor().voting_delay();
        self.ledger.advance_ticks(delay + 1);
    }

    /// Move past the end of the voting window opened by `open_voting`
    pub fn close_voting(&mut self) {
        let period = self.ledger.governor().voting_period();
        self.ledger.advance_ticks(period);
    }

    pub fn vote(&mut self, voter: &str, id: u64, support: Support) -> Result<u128> {
        self.ledger.cast_vote(&addr(voter), id, support as u8)
    }

    /// Propose, vote everyone in `for_voters` in favour and close voting
    pub fn pass(&mut self, proposer: &str, actions: Vec<Action>, for_voters: &[&str]) -> u64 {
        let id = self.propose(proposer, actions).unwrap();
        self.open_voting();
        for voter in for_voters {
            self.vote(voter, id, Support::For).unwrap();
        }
        self.close_voting();
        assert_eq!(self.ledger.state(id).unwrap(), ProposalState::Succeeded);
        id
    }

    pub fn wait_for_timelock(&mut self) {
        let delay = self.ledger.timelock().delay();
        self.ledger.advance_time(delay);
    }

    pub fn param(&self, key: &str) -> Option<u128> {
        self.ledger
            .target::<ParameterRegistry>(&self.params)
            .and_then(|registry| registry.parameter(key))
    }
}
