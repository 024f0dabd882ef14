//! Error types for the simulation core

use thiserror::Error;

/// Errors that can occur while validating inputs, simulating or ranking a season
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Team {team} has no entry in the rating table")]
    MissingRating { team: String },

    #[error("Team {team} is not in the team directory")]
    UnknownTeam { team: String },

    #[error("Invalid game record {game_id}: {reason}")]
    InvalidGameRecord { game_id: i64, reason: String },

    #[error("Tiebreak exhausted between teams {teams:?}")]
    TiebreakExhausted { teams: Vec<String> },

    #[error("Score sampling for game {game_id} stalled after {attempts} attempts")]
    SamplingStall { game_id: i64, attempts: u32 },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Whether a run that failed with this error may be retried with fresh randomness.
    pub fn is_stall(&self) -> bool {
        matches!(self, SimError::SamplingStall { .. })
    }
}
