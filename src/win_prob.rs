use crate::constants::{
    AUTOCORR_BASE, AUTOCORR_MAX_UPSET_GAP, AUTOCORR_SCALE, HOME_ICE_ADVANTAGE, K_FACTOR, MOV_INTERCEPT,
    MOV_SLOPE, RATING_SCALE,
};
use crate::error::SimError;
use crate::game::GameRecord;

/// Home-minus-away rating difference, including the home-ice bonus when the
/// game is played in the home team's own building.
pub fn rating_diff(home_rating: f64, away_rating: f64, home_ice: bool) -> f64 {
    let bonus = if home_ice { HOME_ICE_ADVANTAGE } else { 0.0 };
    home_rating + bonus - away_rating
}

/// Probability of the home team winning given a home-minus-away rating difference.
///
/// Logistic curve on a base-10 scale: `1 / (10^(-diff/400) + 1)`.
pub fn win_probability_from_diff(diff: f64) -> f64 {
    1.0 / (10f64.powf(-diff / RATING_SCALE) + 1.0)
}

/// Calculate the probability of the home team beating the away team.
///
/// # Arguments
/// * `home_rating` - Current rating of the home team
/// * `away_rating` - Current rating of the away team
/// * `home_ice` - Whether the game is in the home team's building
///
/// # Returns
/// Probability of the home team winning, strictly inside (0, 1) for finite inputs
pub fn win_probability(home_rating: f64, away_rating: f64, home_ice: bool) -> f64 {
    win_probability_from_diff(rating_diff(home_rating, away_rating, home_ice))
}

/// Magnitude of the rating change earned by the winner of a decided game.
///
/// The winner gains the returned amount and the loser drops by the same amount.
///
/// # Arguments
/// * `diff` - Pre-game home-minus-away rating difference, home-ice bonus included
/// * `home_win_prob` - Pre-game home win probability derived from `diff`
/// * `game` - The decided game; its score must not be tied
pub fn rating_delta(diff: f64, home_win_prob: f64, game: &GameRecord) -> Result<f64, SimError> {
    let goal_diff = game.goal_diff();
    if goal_diff == 0 {
        return Err(SimError::InvalidGameRecord {
            game_id: game.game_id,
            reason: "rating delta requested for a tied score".to_string(),
        });
    }

    let home_won = game.home_won();
    // Positive when the winner was the favourite
    let winner_diff = if home_won { diff } else { -diff };
    let winner_diff = winner_diff.max(-AUTOCORR_MAX_UPSET_GAP);

    let margin_multiplier = MOV_SLOPE * f64::from(goal_diff).ln() + MOV_INTERCEPT;
    let autocorrelation = AUTOCORR_BASE / (AUTOCORR_SCALE * winner_diff + AUTOCORR_BASE);

    let (favourite_won, favourite_prob) = if home_win_prob < 0.5 {
        (!home_won, 1.0 - home_win_prob)
    } else {
        (home_won, home_win_prob)
    };
    let indicator = if favourite_won { 1.0 } else { 0.0 };
    let surprise = (indicator - favourite_prob).abs();

    Ok(K_FACTOR * margin_multiplier * autocorrelation * surprise)
}
