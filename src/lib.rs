//! Standings Core - Monte Carlo playoff odds for an Elo-rated hockey season.
//!
//! Completes the unplayed part of a season many times over, ranks each
//! completed season with the league's tiebreak rules and tallies how often
//! every team reaches each playoff slot. Python bindings via PyO3 are
//! available behind the `python` feature.

pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod game;
pub mod outcome;
pub mod ratings;
pub mod season;
pub mod standings;
pub mod team;
pub mod tiebreak;
pub mod win_prob;

#[cfg(feature = "python")]
mod python;

pub use config::{SimulationConfig, StallPolicy};
pub use driver::{RunOutcome, SimulationDriver, SimulationReport, SimulationTally, TeamOdds, TeamTally};
pub use error::SimError;
pub use game::{parse_game_date, GameRecord, GameStatus, RatingSnapshot};
pub use outcome::{sample_outcome, GameOutcome};
pub use ratings::{absorb_postgame_ratings, replay_final_games, RatingTable};
pub use season::{simulate_game, simulate_season};
pub use standings::{compute_standings, rank_teams, season_stats, PlayoffSlot, Standings, TeamSeasonStats};
pub use team::{directory, Team, TeamDirectory};
pub use tiebreak::games_played_tiebreak;
pub use win_prob::{rating_delta, win_probability};
