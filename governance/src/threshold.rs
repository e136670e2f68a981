//! Threshold Calculator
//!
//! Converts configured percentages into absolute vote counts against a
//! total-supply snapshot. Results are copied into each proposal at creation
//! and never recomputed for it.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::check_bounds;
use crate::constants::*;
use crate::error::Result;

/// `supply * pct / PCT_SCALE` without intermediate overflow
pub fn scale(supply: u128, pct: u32) -> u128 {
    let scale = PCT_SCALE as u128;
    let pct = pct as u128;
    (supply / scale) * pct + (supply % scale) * pct / scale
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdParams {
    proposal_threshold_pct: u32,
    quorum_pct: u32,
    high_risk_quorum_pct: u32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            proposal_threshold_pct: DEFAULT_PROPOSAL_THRESHOLD_PCT,
            quorum_pct: DEFAULT_QUORUM_PCT,
            high_risk_quorum_pct: DEFAULT_HIGH_RISK_QUORUM_PCT,
        }
    }
}

impl ThresholdParams {
    pub fn new(proposal_threshold_pct: u32, quorum_pct: u32, high_risk_quorum_pct: u32) -> Result<Self> {
        let mut params = Self::default();
        params.set_proposal_threshold_pct(proposal_threshold_pct)?;
        params.set_quorum_pct(quorum_pct)?;
        params.set_high_risk_quorum_pct(high_risk_quorum_pct)?;
        Ok(params)
    }

    pub fn proposal_threshold_pct(&self) -> u32 {
        self.proposal_threshold_pct
    }

    pub fn quorum_pct(&self) -> u32 {
        self.quorum_pct
    }

    pub fn high_risk_quorum_pct(&self) -> u32 {
        self.high_risk_quorum_pct
    }

    /// Minimum weight to submit or retain a proposal
    pub fn proposal_threshold_votes(&self, total_supply: u128) -> u128 {
        scale(total_supply, self.proposal_threshold_pct)
    }

    pub fn quorum_votes(&self, total_supply: u128) -> u128 {
        scale(total_supply, self.quorum_pct)
    }

    pub fn high_risk_quorum_votes(&self, total_supply: u128) -> u128 {
        scale(total_supply, self.high_risk_quorum_pct)
    }

    /// Quorum applying to a proposal, elevated if any action is high-risk
    pub fn quorum_for(&self, total_supply: u128, high_risk: bool) -> u128 {
        let quorum = if high_risk {
            self.high_risk_quorum_votes(total_supply)
        } else {
            self.quorum_votes(total_supply)
        };
        debug!(
            "quorum for supply {} (high risk: {}) is {}",
            total_supply, high_risk, quorum
        );
        quorum
    }

    /// Returns the previous value
    pub fn set_proposal_threshold_pct(&mut self, pct: u32) -> Result<u32> {
        check_bounds(
            "proposal_threshold_pct",
            pct as u128,
            MIN_PROPOSAL_THRESHOLD_PCT as u128,
            MAX_PROPOSAL_THRESHOLD_PCT as u128,
        )?;
        Ok(std::mem::replace(&mut self.proposal_threshold_pct, pct))
    }

    pub fn set_quorum_pct(&mut self, pct: u32) -> Result<u32> {
        check_bounds(
            "quorum_pct",
            pct as u128,
            MIN_QUORUM_PCT as u128,
            MAX_QUORUM_PCT as u128,
        )?;
        Ok(std::mem::replace(&mut self.quorum_pct, pct))
    }

    pub fn set_high_risk_quorum_pct(&mut self, pct: u32) -> Result<u32> {
        check_bounds(
            "high_risk_quorum_pct",
            pct as u128,
            MIN_HIGH_RISK_QUORUM_PCT as u128,
            MAX_HIGH_RISK_QUORUM_PCT as u128,
        )?;
        Ok(std::mem::replace(&mut self.high_risk_quorum_pct, pct))
    }
}
