use lightsout_core::LAMP_COUNT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest start sequence accepted, from `start()` to the latest go-dark
pub const MAX_SEQUENCE_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("lamp step interval must be greater than zero")]
    ZeroStepInterval,
    #[error("go-dark range {min}..{max} ms is empty")]
    EmptyGoDarkRange { min: u64, max: u64 },
    #[error("start sequence may last longer than {limit_ms} ms")]
    SequenceTooLong { limit_ms: u64 },
}

/// Timing of the start sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Delay between consecutive lamps; lamp `i` lights at `step * (i + 1)`
    pub step_interval_ms: u64,
    /// Half-open range the hold before go-dark is drawn from
    pub go_dark_range_ms: (u64, u64),
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: 1000,
            go_dark_range_ms: (1000, 2000),
        }
    }
}

impl SequencerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step_interval_ms == 0 {
            return Err(ConfigError::ZeroStepInterval);
        }
        let (min, max) = self.go_dark_range_ms;
        if min >= max {
            return Err(ConfigError::EmptyGoDarkRange { min, max });
        }
        self.longest_sequence_ms()
            .filter(|total| *total <= MAX_SEQUENCE_MS)
            .ok_or(ConfigError::SequenceTooLong {
                limit_ms: MAX_SEQUENCE_MS,
            })?;
        Ok(())
    }

    /// Worst case from `start()` to go-dark, or `None` if it overflows
    pub fn longest_sequence_ms(&self) -> Option<u64> {
        self.step_interval_ms
            .checked_mul(LAMP_COUNT as u64)?
            .checked_add(self.go_dark_range_ms.1)
    }
}
