//! Rating table bookkeeping: lookups, zero-sum updates and bringing a
//! preseason table up to date with games already played.

use std::collections::HashMap;
use tracing::debug;

use crate::error::SimError;
use crate::game::{date_order, GameRecord, GameStatus, RatingSnapshot};
use crate::team::{lookup, TeamDirectory};
use crate::win_prob::{rating_delta, rating_diff, win_probability_from_diff};

/// Team identifier to rating.
pub type RatingTable = HashMap<String, f64>;

/// Rating of `team`, failing with `MissingRating` if the table has none.
pub fn rating_of(table: &RatingTable, team: &str) -> Result<f64, SimError> {
    table
        .get(team)
        .copied()
        .ok_or_else(|| SimError::MissingRating { team: team.to_string() })
}

/// Move `delta` rating points from the loser of `game` to its winner.
pub fn apply_result(table: &mut RatingTable, game: &GameRecord, delta: f64) {
    if let Some(rating) = table.get_mut(game.winner()) {
        *rating += delta;
    }
    if let Some(rating) = table.get_mut(game.loser()) {
        *rating -= delta;
    }
}

/// Overwrite base ratings with the post-game snapshots carried by final games.
///
/// Games are visited in date order so the most recent snapshot of each team
/// wins. Returns the number of games that contributed a snapshot.
pub fn absorb_postgame_ratings(table: &mut RatingTable, season: &[GameRecord]) -> usize {
    let mut absorbed = 0;
    for i in date_order(season) {
        let game = &season[i];
        if game.status != GameStatus::Final {
            continue;
        }
        if let Some(snapshot) = game.ratings {
            table.insert(game.home_team.clone(), snapshot.home_post);
            table.insert(game.away_team.clone(), snapshot.away_post);
            absorbed += 1;
        }
    }
    debug!(games = absorbed, "absorbed post-game ratings");
    absorbed
}

/// Walk the final games of `season` in date order, updating `table` with each
/// real result and recording pre/post-game ratings on the game.
///
/// Scheduled and simulated games are left untouched. Returns the number of
/// games replayed.
pub fn replay_final_games(
    table: &mut RatingTable,
    season: &mut [GameRecord],
    teams: &TeamDirectory,
) -> Result<usize, SimError> {
    let mut replayed = 0;
    for i in date_order(season) {
        let game = &mut season[i];
        if game.status != GameStatus::Final {
            continue;
        }
        game.validate()?;

        let home_pre = rating_of(table, &game.home_team)?;
        let away_pre = rating_of(table, &game.away_team)?;
        let home_ice = lookup(teams, &game.home_team)?.plays_at_home(&game.venue);

        let diff = rating_diff(home_pre, away_pre, home_ice);
        let delta = rating_delta(diff, win_probability_from_diff(diff), game)?;
        apply_result(table, game, delta);

        game.ratings = Some(RatingSnapshot {
            home_pre,
            away_pre,
            home_post: rating_of(table, &game.home_team)?,
            away_post: rating_of(table, &game.away_team)?,
        });
        replayed += 1;
    }
    Ok(replayed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{directory, Team};
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 10, day).unwrap()
    }

    fn teams() -> TeamDirectory {
        directory(vec![
            Team::new("TOR", "Toronto Maple Leafs", "Atlantic", "Eastern", "Scotiabank Arena"),
            Team::new("MTL", "Montreal Canadiens", "Atlantic", "Eastern", "Bell Centre"),
        ])
    }

    fn table() -> RatingTable {
        [("TOR".to_string(), 1550.0), ("MTL".to_string(), 1450.0)].into_iter().collect()
    }

    #[test]
    fn test_rating_of_missing() {
        assert!(matches!(rating_of(&table(), "BOS"), Err(SimError::MissingRating { .. })));
    }

    #[test]
    fn test_replay_is_zero_sum_and_snapshots() {
        let mut ratings = table();
        let mut season = vec![
            GameRecord::scheduled(2, date(9), "Bell Centre", "MTL", "TOR").with_result(4, 1, false, false),
            GameRecord::scheduled(1, date(7), "Scotiabank Arena", "TOR", "MTL").with_result(3, 2, true, false),
            GameRecord::scheduled(3, date(11), "Scotiabank Arena", "TOR", "MTL"),
        ];

        let replayed = replay_final_games(&mut ratings, &mut season, &teams()).unwrap();
        assert_eq!(replayed, 2);
        assert!((ratings["TOR"] + ratings["MTL"] - 3000.0).abs() < 1e-9);

        // Game 1 is earlier and must be replayed first
        let first = season[1].ratings.unwrap();
        let second = season[0].ratings.unwrap();
        assert_eq!(first.home_pre, 1550.0);
        assert!(first.home_post > first.home_pre, "TOR won game 1");
        assert_eq!(second.away_pre, first.home_post);
        assert!(season[2].ratings.is_none());
    }

    #[test]
    fn test_absorb_takes_latest_snapshot() {
        let mut ratings = table();
        let mut season = vec![
            GameRecord::scheduled(1, date(7), "Scotiabank Arena", "TOR", "MTL").with_result(3, 2, false, false),
            GameRecord::scheduled(2, date(9), "Bell Centre", "MTL", "TOR").with_result(4, 1, false, false),
        ];
        replay_final_games(&mut ratings.clone(), &mut season, &teams()).unwrap();

        let absorbed = absorb_postgame_ratings(&mut ratings, &season);
        assert_eq!(absorbed, 2);
        let last = season[1].ratings.unwrap();
        assert_eq!(ratings["MTL"], last.home_post);
        assert_eq!(ratings["TOR"], last.away_post);
    }
}
