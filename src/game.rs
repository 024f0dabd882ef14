use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Where a game stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Not played yet; only matchup, venue and date are meaningful
    Scheduled,
    /// Played for real
    Final,
    /// Resolved by a simulation run
    Simulated,
}

/// Ratings of both participants immediately before and after a final game.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub home_pre: f64,
    pub away_pre: f64,
    pub home_post: f64,
    pub away_post: f64,
}

/// One game of the schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: i64,
    pub date: NaiveDate,
    pub venue: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: GameStatus,
    pub overtime: bool,
    pub shootout: bool,
    #[serde(default)]
    pub ratings: Option<RatingSnapshot>,
}

impl GameRecord {
    /// An undecided game.
    pub fn scheduled(
        game_id: i64,
        date: NaiveDate,
        venue: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Self {
        GameRecord {
            game_id,
            date,
            venue: venue.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: 0,
            away_score: 0,
            status: GameStatus::Scheduled,
            overtime: false,
            shootout: false,
            ratings: None,
        }
    }

    /// Mark this game as played with the given result.
    pub fn with_result(mut self, home_score: u32, away_score: u32, overtime: bool, shootout: bool) -> Self {
        self.status = GameStatus::Final;
        self.home_score = home_score;
        self.away_score = away_score;
        self.overtime = overtime;
        self.shootout = shootout;
        self
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.status, GameStatus::Final | GameStatus::Simulated)
    }

    pub fn home_won(&self) -> bool {
        self.home_score > self.away_score
    }

    pub fn goal_diff(&self) -> u32 {
        self.home_score.abs_diff(self.away_score)
    }

    pub fn winner(&self) -> &str {
        if self.home_won() {
            &self.home_team
        } else {
            &self.away_team
        }
    }

    pub fn loser(&self) -> &str {
        if self.home_won() {
            &self.away_team
        } else {
            &self.home_team
        }
    }

    /// Went past regulation (overtime or shootout).
    pub fn is_extra_time(&self) -> bool {
        self.overtime || self.shootout
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Check the result invariants of a decided game.
    ///
    /// Scheduled games carry no result and always pass.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.home_team == self.away_team {
            return Err(self.invalid(format!("{} cannot play itself", self.home_team)));
        }
        if !self.is_decided() {
            return Ok(());
        }
        if self.home_score == self.away_score {
            return Err(self.invalid(format!("tied score {}-{}", self.home_score, self.away_score)));
        }
        if self.shootout && !self.overtime {
            return Err(self.invalid("shootout without overtime".to_string()));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> SimError {
        SimError::InvalidGameRecord {
            game_id: self.game_id,
            reason,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` game date.
pub fn parse_game_date(game_id: i64, text: &str) -> Result<NaiveDate, SimError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| SimError::InvalidGameRecord {
        game_id,
        reason: format!("bad date {text:?}: {e}"),
    })
}

/// Indices of `games` in date order.
///
/// The sort is stable, so games sharing a date keep their schedule order and
/// every rating walk over the same schedule visits games identically.
pub fn date_order(games: &[GameRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..games.len()).collect();
    order.sort_by_key(|&i| games[i].date);
    order
}
