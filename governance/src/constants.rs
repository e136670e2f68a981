//! Governance parameter defaults and hard bounds
//!
//! Percentages are basis points of total supply.

pub const PCT_SCALE: u32 = 10_000;

pub const DEFAULT_PROPOSAL_THRESHOLD_PCT: u32 = 1_000;
pub const MIN_PROPOSAL_THRESHOLD_PCT: u32 = 10;
pub const MAX_PROPOSAL_THRESHOLD_PCT: u32 = 1_000;

pub const DEFAULT_QUORUM_PCT: u32 = 2_000;
pub const MIN_QUORUM_PCT: u32 = 500;
pub const MAX_QUORUM_PCT: u32 = 6_000;

pub const DEFAULT_HIGH_RISK_QUORUM_PCT: u32 = 4_000;
pub const MIN_HIGH_RISK_QUORUM_PCT: u32 = 1_000;
pub const MAX_HIGH_RISK_QUORUM_PCT: u32 = 8_000;

/// Ticks between proposal creation and the start of voting
pub const DEFAULT_VOTING_DELAY: u64 = 1;
pub const MIN_VOTING_DELAY: u64 = 1;
pub const MAX_VOTING_DELAY: u64 = 40_320;

/// Ticks the voting window stays open
pub const DEFAULT_VOTING_PERIOD: u64 = 17_280;
pub const MIN_VOTING_PERIOD: u64 = 5_760;
pub const MAX_VOTING_PERIOD: u64 = 80_640;

pub const DEFAULT_MAX_OPERATIONS: usize = 10;
pub const MAX_OPERATIONS_CAP: usize = 32;

pub const DEFAULT_NAME: &str = "Governor";
pub const DEFAULT_CHAIN_ID: u64 = 1;
