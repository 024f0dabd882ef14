use rand::Rng;
use rand_distr::{Distribution, Poisson, PoissonError};

use crate::constants::{GOAL_RATE_BASE, GOAL_RATE_SLOPE, MIN_GOAL_RATE, OVERTIME_INTERCEPT, OVERTIME_SLOPE};
use crate::error::SimError;

/// Final score and extra-time flags of one simulated game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    pub home_score: u32,
    pub away_score: u32,
    pub overtime: bool,
    pub shootout: bool,
}

/// Chance that a game with this home-minus-away rating difference needs extra time.
pub fn overtime_probability(diff: f64) -> f64 {
    1.0 / (1.0 + (OVERTIME_INTERCEPT + OVERTIME_SLOPE * diff).exp())
}

/// Expected goals for the home and away side, floored at `MIN_GOAL_RATE`.
pub fn goal_rates(diff: f64) -> (f64, f64) {
    let home = GOAL_RATE_BASE + GOAL_RATE_SLOPE * diff;
    let away = GOAL_RATE_BASE - GOAL_RATE_SLOPE * diff;
    (home.max(MIN_GOAL_RATE), away.max(MIN_GOAL_RATE))
}

/// Whether a drawn scoreline agrees with the pre-drawn winner and game length.
///
/// Extra-time games are decided by exactly one goal; regulation wins need a
/// margin of at least two so they never look like an overtime game.
pub fn score_accepted(home_score: u32, away_score: u32, home_win: bool, overtime: bool) -> bool {
    let right_winner = if home_win {
        home_score > away_score
    } else {
        away_score > home_score
    };
    if !right_winner {
        return false;
    }
    let margin = home_score.abs_diff(away_score);
    if overtime {
        margin == 1
    } else {
        margin >= 2
    }
}

/// Draw the result of one game.
///
/// Winner and game length are drawn first; scores are then rejection-sampled
/// from independent Poisson distributions until they agree with both.
///
/// # Arguments
/// * `rng` - Source of randomness
/// * `diff` - Home-minus-away rating difference, home-ice bonus included
/// * `home_win_prob` - Home win probability derived from `diff`
/// * `max_attempts` - Scoreline draws allowed before giving up
/// * `game_id` - Identifier reported if sampling stalls
pub fn sample_outcome<R: Rng + ?Sized>(
    rng: &mut R,
    diff: f64,
    home_win_prob: f64,
    max_attempts: u32,
    game_id: i64,
) -> Result<GameOutcome, SimError> {
    let home_win = rng.gen::<f64>() < home_win_prob;
    let overtime = rng.gen::<f64>() < overtime_probability(diff);
    let shootout = overtime && rng.gen_bool(0.5);

    let (home_rate, away_rate) = goal_rates(diff);
    let bad_rate = |e: PoissonError| SimError::InvalidGameRecord {
        game_id,
        reason: format!("cannot draw goals from rating difference {diff}: {e}"),
    };
    let home_goals = Poisson::new(home_rate).map_err(bad_rate)?;
    let away_goals = Poisson::new(away_rate).map_err(bad_rate)?;

    for _ in 0..max_attempts {
        let home_score = home_goals.sample(rng) as u32;
        let away_score = away_goals.sample(rng) as u32;
        if score_accepted(home_score, away_score, home_win, overtime) {
            return Ok(GameOutcome {
                home_score,
                away_score,
                overtime,
                shootout,
            });
        }
    }

    Err(SimError::SamplingStall {
        game_id,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::win_prob::win_probability_from_diff;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_overtime_more_likely_for_underdog_hosts() {
        assert!(overtime_probability(-200.0) > overtime_probability(0.0));
        assert!(overtime_probability(0.0) > overtime_probability(200.0));
        let even = overtime_probability(0.0);
        assert!(even > 0.24 && even < 0.25);
    }

    #[test]
    fn test_goal_rates_floored() {
        let (home, away) = goal_rates(5000.0);
        assert!(home > GOAL_RATE_BASE);
        assert_eq!(away, MIN_GOAL_RATE);
    }

    #[test]
    fn test_score_acceptance() {
        assert!(score_accepted(4, 2, true, false));
        assert!(!score_accepted(3, 2, true, false), "one-goal regulation wins look like overtime");
        assert!(score_accepted(3, 2, true, true));
        assert!(!score_accepted(4, 2, true, true));
        assert!(!score_accepted(2, 4, true, false));
        assert!(!score_accepted(2, 2, false, true));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(7);
        let mut rng2 = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let a = sample_outcome(&mut rng1, 35.0, win_probability_from_diff(35.0), 10_000, 1).unwrap();
            let b = sample_outcome(&mut rng2, 35.0, win_probability_from_diff(35.0), 10_000, 1).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_stall_is_bounded() {
        // An away side at the rate floor cannot outscore a 24-goal home rate
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = sample_outcome(&mut rng, 5000.0, 0.0, 5, 42);
        assert!(matches!(result, Err(SimError::SamplingStall { game_id: 42, attempts: 5 })));
    }

    proptest! {
        #[test]
        fn prop_outcome_invariants(seed: u64, diff in -400.0f64..400.0) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = sample_outcome(&mut rng, diff, win_probability_from_diff(diff), 100_000, 1).unwrap();
            prop_assert_ne!(outcome.home_score, outcome.away_score);
            prop_assert!(!outcome.shootout || outcome.overtime);
            let margin = outcome.home_score.abs_diff(outcome.away_score);
            if outcome.overtime {
                prop_assert_eq!(margin, 1);
            } else {
                prop_assert!(margin >= 2);
            }
        }
    }
}
