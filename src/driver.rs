use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{SimulationConfig, StallPolicy};
use crate::constants::{DIVISION_SEEDS, WILD_CARDS};
use crate::error::SimError;
use crate::game::GameRecord;
use crate::ratings::{absorb_postgame_ratings, rating_of, RatingTable};
use crate::season::simulate_season;
use crate::standings::{compute_standings, PlayoffSlot, Standings};
use crate::team::{lookup, TeamDirectory};

/// How often one team landed in each playoff slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTally {
    pub made_playoffs: u64,
    pub division_seeds: [u64; DIVISION_SEEDS],
    pub wild_cards: [u64; WILD_CARDS],
}

impl TeamTally {
    fn merge(&mut self, other: &TeamTally) {
        self.made_playoffs += other.made_playoffs;
        for (mine, theirs) in self.division_seeds.iter_mut().zip(other.division_seeds) {
            *mine += theirs;
        }
        for (mine, theirs) in self.wild_cards.iter_mut().zip(other.wild_cards) {
            *mine += theirs;
        }
    }
}

/// Counters accumulated over a batch of runs.
///
/// Each worker fills its own tally; tallies are merged once the workers finish.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTally {
    pub runs: u64,

    /// Runs that needed at least one retry after a sampling stall
    pub retried_runs: u64,

    /// Runs whose ranking fell back to identifier order somewhere
    pub unresolved_tie_runs: u64,

    pub teams: BTreeMap<String, TeamTally>,
}

impl SimulationTally {
    /// An empty tally with a zeroed entry for every team.
    pub fn new<'a>(teams: impl IntoIterator<Item = &'a String>) -> Self {
        SimulationTally {
            teams: teams.into_iter().map(|t| (t.clone(), TeamTally::default())).collect(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &RunOutcome) {
        self.runs += 1;
        if outcome.retries > 0 {
            self.retried_runs += 1;
        }
        if !outcome.standings.unresolved_ties.is_empty() {
            self.unresolved_tie_runs += 1;
        }

        for (team, slot) in outcome.standings.playoff_slots() {
            let counters = self.teams.entry(team.to_string()).or_default();
            counters.made_playoffs += 1;
            match slot {
                PlayoffSlot::DivisionSeed(i) if i < DIVISION_SEEDS => counters.division_seeds[i] += 1,
                PlayoffSlot::WildCard(i) if i < WILD_CARDS => counters.wild_cards[i] += 1,
                _ => {}
            }
        }
    }

    pub fn merge(mut self, other: SimulationTally) -> Self {
        self.runs += other.runs;
        self.retried_runs += other.retried_runs;
        self.unresolved_tie_runs += other.unresolved_tie_runs;
        for (team, counters) in &other.teams {
            self.teams.entry(team.clone()).or_default().merge(counters);
        }
        self
    }
}

/// Fractions of runs in which a team reached each outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamOdds {
    pub team: String,
    pub playoffs: f64,
    pub division_seeds: [f64; DIVISION_SEEDS],
    pub wild_cards: [f64; WILD_CARDS],

    /// Half-width of the confidence interval around `playoffs`
    pub margin_of_error: f64,
}

impl TeamOdds {
    fn from_tally(team: &str, tally: &TeamTally, runs: u64, z: f64) -> Self {
        let runs = runs.max(1) as f64;
        let playoffs = tally.made_playoffs as f64 / runs;
        TeamOdds {
            team: team.to_string(),
            playoffs,
            division_seeds: tally.division_seeds.map(|n| n as f64 / runs),
            wild_cards: tally.wild_cards.map(|n| n as f64 / runs),
            margin_of_error: z * (playoffs * (1.0 - playoffs) / runs).sqrt(),
        }
    }
}

impl fmt::Display for TeamOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.3}% playoffs (+/- {:.3}) ({:.3} D1, {:.3} D2, {:.3} D3, {:.3} WC1, {:.3} WC2)",
            self.team,
            100.0 * self.playoffs,
            100.0 * self.margin_of_error,
            100.0 * self.division_seeds[0],
            100.0 * self.division_seeds[1],
            100.0 * self.division_seeds[2],
            100.0 * self.wild_cards[0],
            100.0 * self.wild_cards[1],
        )
    }
}

/// Result of a batch: raw counters plus per-team odds, best playoff odds first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationReport {
    pub tally: SimulationTally,
    pub odds: Vec<TeamOdds>,
}

impl SimulationReport {
    pub fn new(tally: SimulationTally, confidence_level: f64) -> Result<Self, SimError> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + confidence_level / 2.0);

        let mut odds: Vec<TeamOdds> = tally
            .teams
            .iter()
            .map(|(team, counters)| TeamOdds::from_tally(team, counters, tally.runs, z))
            .collect();
        odds.sort_by(|a, b| b.playoffs.total_cmp(&a.playoffs).then_with(|| a.team.cmp(&b.team)));

        Ok(SimulationReport { tally, odds })
    }

    pub fn odds_for(&self, team: &str) -> Option<&TeamOdds> {
        self.odds.iter().find(|o| o.team == team)
    }
}

/// Standings of a single run and how many stall retries it took.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub standings: Standings,
    pub retries: u32,
}

/// Owns the read-only inputs of a batch and runs it.
#[derive(Clone, Debug)]
pub struct SimulationDriver {
    teams: TeamDirectory,
    ratings: RatingTable,
    season: Vec<GameRecord>,
    config: SimulationConfig,
}

impl SimulationDriver {
    /// Validate the inputs and prepare the base rating table.
    ///
    /// Fails if any game is malformed, names a team outside the directory, or
    /// names a team without a rating.
    pub fn new(
        teams: TeamDirectory,
        ratings: RatingTable,
        season: Vec<GameRecord>,
        config: SimulationConfig,
    ) -> Result<Self, SimError> {
        config.validate()?;

        let mut scheduled: HashSet<&str> = HashSet::new();
        for game in &season {
            game.validate()?;
            lookup(&teams, &game.home_team)?;
            lookup(&teams, &game.away_team)?;
            scheduled.insert(&game.home_team);
            scheduled.insert(&game.away_team);
        }

        let mut ratings = ratings;
        if config.absorb_postgame_ratings {
            absorb_postgame_ratings(&mut ratings, &season);
        }
        for team in scheduled {
            rating_of(&ratings, team)?;
        }

        Ok(SimulationDriver {
            teams,
            ratings,
            season,
            config,
        })
    }

    pub fn teams(&self) -> &TeamDirectory {
        &self.teams
    }

    /// Ratings every run starts from.
    pub fn ratings(&self) -> &RatingTable {
        &self.ratings
    }

    pub fn season(&self) -> &[GameRecord] {
        &self.season
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Complete the season once on the given random stream.
    pub fn simulate_season_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<GameRecord>, SimError> {
        simulate_season(
            &self.ratings,
            &self.season,
            &self.teams,
            self.config.max_sampling_attempts,
            rng,
        )
    }

    /// Simulate and rank one season from `seed`, applying the stall policy.
    ///
    /// Retry `n` replays the run on ChaCha stream `n` of the same seed.
    pub fn simulate_once(&self, seed: u64) -> Result<RunOutcome, SimError> {
        let max_retries = match self.config.stall_policy {
            StallPolicy::Abort => 0,
            StallPolicy::Retry { max_retries } => max_retries,
        };

        let mut attempt = 0;
        loop {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(u64::from(attempt));

            let result = self
                .simulate_season_with(&mut rng)
                .and_then(|completed| compute_standings(&self.teams, &completed));

            match result {
                Ok(standings) => {
                    return Ok(RunOutcome {
                        standings,
                        retries: attempt,
                    })
                }
                Err(e) if e.is_stall() && attempt < max_retries => {
                    debug!(seed, attempt, error = %e, "retrying stalled run");
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_stall() {
                        warn!(seed, attempt, error = %e, "run stalled, abandoning batch");
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Run the batch described by the configuration.
    pub fn run(&self) -> Result<SimulationReport, SimError> {
        self.run_simulations(self.config.runs, self.config.seed)
    }

    /// Run `runs` independent simulations and tally the playoff picture.
    ///
    /// Per-run seeds are drawn up front from a master ChaCha stream, so the
    /// report for a fixed seed does not depend on how runs are scheduled
    /// across threads.
    pub fn run_simulations(&self, runs: usize, seed: Option<u64>) -> Result<SimulationReport, SimError> {
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..runs).map(|_| rng.gen::<u64>()).collect();

        info!(
            runs,
            games = self.season.len(),
            teams = self.teams.len(),
            "starting simulation batch"
        );
        let start = Instant::now();

        let tally = match self.config.threads {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| SimError::InvalidConfig(format!("cannot build thread pool: {e}")))?;
                pool.install(|| self.tally_runs(&seeds))?
            }
            None => self.tally_runs(&seeds)?,
        };

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            retried_runs = tally.retried_runs,
            unresolved_tie_runs = tally.unresolved_tie_runs,
            "simulation batch finished"
        );

        SimulationReport::new(tally, self.config.confidence_level)
    }

    fn tally_runs(&self, seeds: &[u64]) -> Result<SimulationTally, SimError> {
        seeds
            .par_iter()
            .try_fold(
                || SimulationTally::new(self.teams.keys()),
                |mut tally, &seed| {
                    let outcome = self.simulate_once(seed)?;
                    tally.record(&outcome);
                    Ok(tally)
                },
            )
            .try_reduce(|| SimulationTally::new(self.teams.keys()), |a, b| Ok(a.merge(b)))
    }
}
