//! Configuration and scenario files

use gov_crypto::Address;
use gov_timelock::{TimelockConfig, TimelockError};
use governance::{Clock, GovernanceError, GovernorConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid governor configuration: {0}")]
    Governor(#[from] GovernanceError),

    #[error("Invalid timelock configuration: {0}")]
    Timelock(#[from] TimelockError),

    #[error("Invalid account {0:?}")]
    Account(String),
}

/// `[governor]` and `[timelock]` sections; anything missing takes the
/// default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub governor: GovernorConfig,
    pub timelock: TimelockConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.governor.validate()?;
        self.timelock.validate()?;
        Ok(())
    }
}

/// Initial token distribution, by account. TOML integers are 64-bit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenSection {
    pub balances: BTreeMap<String, u64>,
}

/// Identities configured by the deployer before the first step
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RolesSection {
    pub whitelist_guardian: Option<String>,
    pub veto_guardian: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Propose {
        proposer: String,
        #[serde(default)]
        description: String,
        /// Registry parameters to set, one action each
        parameters: BTreeMap<String, u64>,
    },
    Vote {
        voter: String,
        proposal: u64,
        support: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Advance {
        #[serde(default)]
        ticks: u64,
        #[serde(default)]
        seconds: u64,
    },
    Queue {
        proposal: u64,
    },
    Execute {
        proposal: u64,
    },
    Cancel {
        caller: String,
        proposal: u64,
    },
    Veto {
        caller: String,
        proposal: u64,
    },
    /// Whitelist `account` for `seconds` from now, as the deployer
    Whitelist {
        account: String,
        seconds: u64,
    },
}

fn default_deployer() -> String {
    "deployer".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_deployer")]
    pub deployer: String,
    #[serde(default)]
    pub clock: Clock,
    #[serde(flatten)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub token: TokenSection,
    #[serde(default)]
    pub roles: RolesSection,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }
}

pub fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let text = read(path)?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Accounts are hex addresses when prefixed with `0x`, otherwise labels
pub fn account(name: &str) -> Result<Address, ConfigError> {
    if name.starts_with("0x") {
        name.parse()
            .map_err(|_| ConfigError::Account(name.to_string()))
    } else if name.is_empty() {
        Err(ConfigError::Account(name.to_string()))
    } else {
        Ok(Address::from_label(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let config: EngineConfig = toml::from_str("[governor]\nquorum_pct = 3000\n").unwrap();
        assert_eq!(config.governor.quorum_pct, 3_000);
        assert_eq!(config.governor.voting_period, GovernorConfig::default().voting_period);
        assert_eq!(config.timelock, TimelockConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bounds_are_enforced() {
        let config: EngineConfig = toml::from_str("[timelock]\ndelay = 60\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Timelock(_))));
    }

    #[test]
    fn test_scenario_steps() {
        let text = r#"
            [token]
            balances = { alice = 100, bob = 900 }

            [[step]]
            action = "propose"
            proposer = "alice"
            parameters = { fee_bps = 30 }

            [[step]]
            action = "advance"
            ticks = 2
        "#;
        let scenario = Scenario::parse(text, "inline").unwrap();
        assert_eq!(scenario.deployer, "deployer");
        assert_eq!(scenario.token.balances["bob"], 900);
        assert_eq!(scenario.steps.len(), 2);
        assert!(matches!(scenario.steps[1], Step::Advance { ticks: 2, seconds: 0 }));
    }

    #[test]
    fn test_accounts() {
        assert_eq!(account("alice").unwrap(), Address::from_label("alice"));
        let hex = Address::from_label("x").to_hex();
        assert_eq!(account(&hex).unwrap(), Address::from_label("x"));
        assert!(account("0xzz").is_err());
        assert!(account("").is_err());
    }
}
