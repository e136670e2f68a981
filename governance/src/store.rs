//! State persistence
//!
//! The governor and timelock state is written as pretty JSON next to a
//! `.sha256` file holding its checksum. Loading refuses a file whose
//! checksum does not match.

use gov_crypto::sha256_hex;
use gov_timelock::Timelock;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::clock::Clock;
use crate::events::GovernanceEvent;
use crate::governor::Governor;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checksum mismatch for {path}: expected {expected}, found {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub clock: Clock,
    pub governor: Governor,
    pub timelock: Timelock,
    pub events: Vec<GovernanceEvent>,
}

pub fn checksum_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

pub fn save(path: &Path, state: &PersistedState) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, &json)?;
    fs::write(checksum_path(path), sha256_hex(json.as_bytes()))?;
    info!("saved governance state to {}", path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<PersistedState, StoreError> {
    let json = fs::read_to_string(path)?;
    let expected = fs::read_to_string(checksum_path(path))?;
    let expected = expected.trim();
    let actual = sha256_hex(json.as_bytes());
    if expected != actual {
        return Err(StoreError::ChecksumMismatch {
            path: path.display().to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(serde_json::from_str(&json)?)
}
