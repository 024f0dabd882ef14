/// Rating points added to the home side when a game is played in its own building
pub const HOME_ICE_ADVANTAGE: f64 = 50.0;

/// Logistic scale of the rating difference (a 400 point edge is 10:1 odds)
pub const RATING_SCALE: f64 = 400.0;

/// K-factor applied to every rating update
pub const K_FACTOR: f64 = 6.0;

/// Margin of victory multiplier: `MOV_SLOPE * ln(goal_diff) + MOV_INTERCEPT`
pub const MOV_SLOPE: f64 = 0.6686;
pub const MOV_INTERCEPT: f64 = 0.8048;

/// Autocorrelation adjustment: `AUTOCORR_BASE / (AUTOCORR_SCALE * winner_diff + AUTOCORR_BASE)`
pub const AUTOCORR_BASE: f64 = 2.05;
pub const AUTOCORR_SCALE: f64 = 0.001;

/// Largest underdog gap the autocorrelation term sees; keeps its denominator positive
pub const AUTOCORR_MAX_UPSET_GAP: f64 = 1000.0;

/// Fitted logistic curve for the chance a game reaches extra time
pub const OVERTIME_INTERCEPT: f64 = 1.1320032;
pub const OVERTIME_SLOPE: f64 = 0.0009822;

/// Expected goals per side: `GOAL_RATE_BASE +/- GOAL_RATE_SLOPE * rating_diff`
pub const GOAL_RATE_BASE: f64 = 2.8411351;
pub const GOAL_RATE_SLOPE: f64 = 0.0042408;

/// Floor for a Poisson goal rate so extreme rating gaps still yield a valid distribution
pub const MIN_GOAL_RATE: f64 = 0.01;

/// Standings points for a win of any kind
pub const POINTS_PER_WIN: u32 = 2;

/// Standings points for a loss in overtime or a shootout
pub const POINTS_PER_EXTRA_TIME_LOSS: u32 = 1;

/// Division seeds per division
pub const DIVISION_SEEDS: usize = 3;

/// Wildcard slots per conference
pub const WILD_CARDS: usize = 2;
