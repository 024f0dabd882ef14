//! Configuration for a simulation batch

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SimError;

/// What the driver does when a run's score sampling stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallPolicy {
    /// Abandon the whole batch with the stall error
    Abort,
    /// Re-run the stalled season on a fresh random stream up to `max_retries` times
    Retry { max_retries: u32 },
}

impl Default for StallPolicy {
    fn default() -> Self {
        StallPolicy::Retry { max_retries: 3 }
    }
}

/// Configuration for a simulation batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent season simulations
    pub runs: usize,

    /// Master seed; absent means seeded from entropy
    pub seed: Option<u64>,

    /// Scoreline draws allowed per game before a run counts as stalled
    pub max_sampling_attempts: u32,

    pub stall_policy: StallPolicy,

    /// Start from the post-game ratings carried by final games
    pub absorb_postgame_ratings: bool,

    /// Worker threads in a dedicated pool; absent uses the global rayon pool
    pub threads: Option<usize>,

    /// Confidence level of the reported playoff-odds margin of error
    pub confidence_level: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 1_000_000,
            seed: None,
            max_sampling_attempts: 10_000,
            stall_policy: StallPolicy::default(),
            absorb_postgame_ratings: true,
            threads: None,
            confidence_level: 0.95,
        }
    }
}

impl SimulationConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SimError> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.runs == 0 {
            return Err(SimError::InvalidConfig("runs must be positive".to_string()));
        }
        if self.max_sampling_attempts == 0 {
            return Err(SimError::InvalidConfig("max_sampling_attempts must be positive".to_string()));
        }
        if self.threads == Some(0) {
            return Err(SimError::InvalidConfig("threads must be positive when set".to_string()));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(SimError::InvalidConfig(format!(
                "confidence_level must be inside (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}
