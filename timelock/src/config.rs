//! Timelock configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimelockError};
use crate::{DEFAULT_DELAY, MAXIMUM_DELAY, MINIMUM_DELAY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelockConfig {
    /// Seconds between queueing and earliest execution
    pub delay: u64,
}

impl Default for TimelockConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

impl TimelockConfig {
    pub fn validate(&self) -> Result<()> {
        check_delay(self.delay)
    }
}

pub(crate) fn check_delay(delay: u64) -> Result<()> {
    if !(MINIMUM_DELAY..=MAXIMUM_DELAY).contains(&delay) {
        return Err(TimelockError::DelayOutOfBounds {
            delay,
            min: MINIMUM_DELAY,
            max: MAXIMUM_DELAY,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TimelockConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bounds_inclusive() {
        assert!(check_delay(MINIMUM_DELAY).is_ok());
        assert!(check_delay(MAXIMUM_DELAY).is_ok());
        assert!(check_delay(MINIMUM_DELAY - 1).is_err());
        assert!(check_delay(MAXIMUM_DELAY + 1).is_err());
    }
}
