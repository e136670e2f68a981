//! Governor configuration

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{GovernanceError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Instance name, part of the ballot signing domain
    pub name: String,
    /// Network identity, part of the ballot signing domain
    pub chain_id: u64,
    pub voting_delay: u64,
    pub voting_period: u64,
    pub proposal_threshold_pct: u32,
    pub quorum_pct: u32,
    pub high_risk_quorum_pct: u32,
    pub max_operations: usize,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            voting_delay: DEFAULT_VOTING_DELAY,
            voting_period: DEFAULT_VOTING_PERIOD,
            proposal_threshold_pct: DEFAULT_PROPOSAL_THRESHOLD_PCT,
            quorum_pct: DEFAULT_QUORUM_PCT,
            high_risk_quorum_pct: DEFAULT_HIGH_RISK_QUORUM_PCT,
            max_operations: DEFAULT_MAX_OPERATIONS,
        }
    }
}

impl GovernorConfig {
    /// Check every parameter against its hard bounds
    pub fn validate(&self) -> Result<()> {
        check_bounds(
            "voting_delay",
            self.voting_delay as u128,
            MIN_VOTING_DELAY as u128,
            MAX_VOTING_DELAY as u128,
        )?;
        check_bounds(
            "voting_period",
            self.voting_period as u128,
            MIN_VOTING_PERIOD as u128,
            MAX_VOTING_PERIOD as u128,
        )?;
        check_bounds(
            "proposal_threshold_pct",
            self.proposal_threshold_pct as u128,
            MIN_PROPOSAL_THRESHOLD_PCT as u128,
            MAX_PROPOSAL_THRESHOLD_PCT as u128,
        )?;
        check_bounds(
            "quorum_pct",
            self.quorum_pct as u128,
            MIN_QUORUM_PCT as u128,
            MAX_QUORUM_PCT as u128,
        )?;
        check_bounds(
            "high_risk_quorum_pct",
            self.high_risk_quorum_pct as u128,
            MIN_HIGH_RISK_QUORUM_PCT as u128,
            MAX_HIGH_RISK_QUORUM_PCT as u128,
        )?;
        check_bounds(
            "max_operations",
            self.max_operations as u128,
            1,
            MAX_OPERATIONS_CAP as u128,
        )?;
        Ok(())
    }
}

pub(crate) fn check_bounds(name: &'static str, value: u128, min: u128, max: u128) -> Result<()> {
    if value < min || value > max {
        return Err(GovernanceError::ParameterOutOfBounds {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
