use rand::Rng;

use crate::error::SimError;
use crate::game::{date_order, GameRecord, GameStatus};
use crate::outcome::sample_outcome;
use crate::ratings::{apply_result, rating_of, RatingTable};
use crate::team::{lookup, TeamDirectory};
use crate::win_prob::{rating_delta, rating_diff, win_probability_from_diff};

/// Resolve every undecided game of a season once.
///
/// Works on a private copy of `base_ratings`: each simulated result moves the
/// copy, so later games in the same run see the effect of earlier ones. Final
/// games pass through untouched since reality is already in the base table.
///
/// # Arguments
/// * `base_ratings` - Ratings at the start of the run; never modified
/// * `season` - Full schedule, decided and undecided games
/// * `teams` - Team directory, used for home-ice lookups
/// * `max_attempts` - Scoreline draws allowed per game
/// * `rng` - Source of randomness for this run
///
/// # Returns
/// The completed season in date order, every game `Final` or `Simulated`
pub fn simulate_season<R: Rng + ?Sized>(
    base_ratings: &RatingTable,
    season: &[GameRecord],
    teams: &TeamDirectory,
    max_attempts: u32,
    rng: &mut R,
) -> Result<Vec<GameRecord>, SimError> {
    let mut ratings = base_ratings.clone();
    let mut completed = Vec::with_capacity(season.len());

    for i in date_order(season) {
        let game = &season[i];
        if game.status == GameStatus::Final {
            game.validate()?;
            completed.push(game.clone());
            continue;
        }
        completed.push(simulate_game(game, &mut ratings, teams, max_attempts, rng)?);
    }

    Ok(completed)
}

/// Simulate a single undecided game and apply its rating change to `ratings`.
pub fn simulate_game<R: Rng + ?Sized>(
    game: &GameRecord,
    ratings: &mut RatingTable,
    teams: &TeamDirectory,
    max_attempts: u32,
    rng: &mut R,
) -> Result<GameRecord, SimError> {
    let home_rating = rating_of(ratings, &game.home_team)?;
    let away_rating = rating_of(ratings, &game.away_team)?;
    let home_ice = lookup(teams, &game.home_team)?.plays_at_home(&game.venue);

    let diff = rating_diff(home_rating, away_rating, home_ice);
    let home_win_prob = win_probability_from_diff(diff);
    let outcome = sample_outcome(rng, diff, home_win_prob, max_attempts, game.game_id)?;

    let mut simulated = game.clone();
    simulated.status = GameStatus::Simulated;
    simulated.home_score = outcome.home_score;
    simulated.away_score = outcome.away_score;
    simulated.overtime = outcome.overtime;
    simulated.shootout = outcome.shootout;
    simulated.ratings = None;

    let delta = rating_delta(diff, home_win_prob, &simulated)?;
    apply_result(ratings, &simulated, delta);

    Ok(simulated)
}
