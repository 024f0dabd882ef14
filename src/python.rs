//! Python bindings, built with the `python` feature.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::config::SimulationConfig;
use crate::driver::{SimulationDriver, TeamOdds};
use crate::error::SimError;
use crate::game::{parse_game_date, GameRecord};
use crate::team::{directory, Team};

impl From<SimError> for PyErr {
    fn from(err: SimError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Team with its division, conference and home venue.
#[pyclass(name = "Team")]
#[derive(Clone, Debug)]
pub struct PyTeam {
    #[pyo3(get, set)]
    pub id: String,

    #[pyo3(get, set)]
    pub name: String,

    #[pyo3(get, set)]
    pub division: String,

    #[pyo3(get, set)]
    pub conference: String,

    #[pyo3(get, set)]
    pub venue: String,
}

#[pymethods]
impl PyTeam {
    #[new]
    pub fn new(id: String, name: String, division: String, conference: String, venue: String) -> Self {
        PyTeam {
            id,
            name,
            division,
            conference,
            venue,
        }
    }

    fn __repr__(&self) -> String {
        format!("Team({:?}, {:?}, {:?}, {:?})", self.id, self.name, self.division, self.conference)
    }
}

impl From<&PyTeam> for Team {
    fn from(team: &PyTeam) -> Self {
        Team::new(
            team.id.clone(),
            team.name.clone(),
            team.division.clone(),
            team.conference.clone(),
            team.venue.clone(),
        )
    }
}

/// One scheduled or completed game. Dates are ISO `YYYY-MM-DD` strings.
#[pyclass(name = "Game")]
#[derive(Clone, Debug)]
pub struct PyGame {
    #[pyo3(get, set)]
    pub game_id: i64,

    #[pyo3(get, set)]
    pub date: String,

    #[pyo3(get, set)]
    pub venue: String,

    #[pyo3(get, set)]
    pub home_team: String,

    #[pyo3(get, set)]
    pub away_team: String,

    #[pyo3(get, set)]
    pub home_score: u32,

    #[pyo3(get, set)]
    pub away_score: u32,

    /// True once the real result is known
    #[pyo3(get, set)]
    pub is_final: bool,

    #[pyo3(get, set)]
    pub overtime: bool,

    #[pyo3(get, set)]
    pub shootout: bool,
}

#[pymethods]
impl PyGame {
    #[new]
    #[pyo3(signature = (game_id, date, venue, home_team, away_team, home_score = 0, away_score = 0, is_final = false, overtime = false, shootout = false))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        game_id: i64,
        date: String,
        venue: String,
        home_team: String,
        away_team: String,
        home_score: u32,
        away_score: u32,
        is_final: bool,
        overtime: bool,
        shootout: bool,
    ) -> Self {
        PyGame {
            game_id,
            date,
            venue,
            home_team,
            away_team,
            home_score,
            away_score,
            is_final,
            overtime,
            shootout,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Game({}, {} {} @ {} {})",
            self.date, self.away_team, self.away_score, self.home_team, self.home_score
        )
    }
}

impl TryFrom<&PyGame> for GameRecord {
    type Error = SimError;

    fn try_from(game: &PyGame) -> Result<Self, SimError> {
        let date = parse_game_date(game.game_id, &game.date)?;
        let record = GameRecord::scheduled(
            game.game_id,
            date,
            game.venue.clone(),
            game.home_team.clone(),
            game.away_team.clone(),
        );
        if game.is_final {
            Ok(record.with_result(game.home_score, game.away_score, game.overtime, game.shootout))
        } else {
            Ok(record)
        }
    }
}

/// Playoff odds for one team.
#[pyclass(name = "TeamOdds")]
#[derive(Clone, Debug)]
pub struct PyTeamOdds {
    #[pyo3(get)]
    pub team: String,

    #[pyo3(get)]
    pub playoffs: f64,

    #[pyo3(get)]
    pub division_seeds: Vec<f64>,

    #[pyo3(get)]
    pub wild_cards: Vec<f64>,

    #[pyo3(get)]
    pub margin_of_error: f64,
}

#[pymethods]
impl PyTeamOdds {
    fn __str__(&self) -> String {
        format!("{}: {:.3}% playoffs", self.team, 100.0 * self.playoffs)
    }
}

impl From<TeamOdds> for PyTeamOdds {
    fn from(odds: TeamOdds) -> Self {
        PyTeamOdds {
            team: odds.team,
            playoffs: odds.playoffs,
            division_seeds: odds.division_seeds.to_vec(),
            wild_cards: odds.wild_cards.to_vec(),
            margin_of_error: odds.margin_of_error,
        }
    }
}

/// Home win probability for two ratings.
#[pyfunction]
#[pyo3(name = "win_probability", signature = (home_rating, away_rating, home_ice = true))]
fn py_win_probability(home_rating: f64, away_rating: f64, home_ice: bool) -> f64 {
    crate::win_prob::win_probability(home_rating, away_rating, home_ice)
}

/// Rating points the winner of `game` takes from the loser.
#[pyfunction]
#[pyo3(name = "rating_delta", signature = (home_rating, away_rating, game, home_ice = true))]
fn py_rating_delta(home_rating: f64, away_rating: f64, game: &PyGame, home_ice: bool) -> PyResult<f64> {
    let record = GameRecord::try_from(game)?;
    let diff = crate::win_prob::rating_diff(home_rating, away_rating, home_ice);
    let prob = crate::win_prob::win_probability_from_diff(diff);
    Ok(crate::win_prob::rating_delta(diff, prob, &record)?)
}

/// Simulate the rest of the season and return playoff odds, best first.
///
/// Settings not passed explicitly come from the TOML file at `config_path`
/// when given, otherwise from the defaults.
#[pyfunction]
#[pyo3(signature = (teams, ratings, games, runs = None, seed = None, config_path = None))]
fn simulate(
    py: Python<'_>,
    teams: Vec<PyTeam>,
    ratings: HashMap<String, f64>,
    games: Vec<PyGame>,
    runs: Option<usize>,
    seed: Option<u64>,
    config_path: Option<String>,
) -> PyResult<Vec<PyTeamOdds>> {
    let mut config = match config_path {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(runs) = runs {
        config = config.with_runs(runs);
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let teams = directory(teams.iter().map(Team::from));
    let season = games.iter().map(GameRecord::try_from).collect::<Result<Vec<_>, _>>()?;
    let driver = SimulationDriver::new(teams, ratings, season, config)?;

    let report = py.allow_threads(|| driver.run())?;
    Ok(report.odds.into_iter().map(PyTeamOdds::from).collect())
}

#[pymodule]
fn standings_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTeam>()?;
    m.add_class::<PyGame>()?;
    m.add_class::<PyTeamOdds>()?;

    m.add_function(wrap_pyfunction!(py_win_probability, m)?)?;
    m.add_function(wrap_pyfunction!(py_rating_delta, m)?)?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;

    m.add("HOME_ICE_ADVANTAGE", crate::constants::HOME_ICE_ADVANTAGE)?;
    m.add("K_FACTOR", crate::constants::K_FACTOR)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;

    fn py_game(is_final: bool) -> PyGame {
        PyGame::new(
            12,
            "2023-01-14".to_string(),
            "Rogers Place".to_string(),
            "EDM".to_string(),
            "CGY".to_string(),
            3,
            2,
            is_final,
            true,
            true,
        )
    }

    #[test]
    fn test_final_game_converts_with_result() {
        let record = GameRecord::try_from(&py_game(true)).unwrap();
        assert_eq!(record.status, GameStatus::Final);
        assert_eq!(record.date, chrono::NaiveDate::from_ymd_opt(2023, 1, 14).unwrap());
        assert_eq!((record.home_score, record.away_score), (3, 2));
        assert!(record.overtime && record.shootout);
        assert_eq!(record.winner(), "EDM");
    }

    #[test]
    fn test_unplayed_game_ignores_scores() {
        let record = GameRecord::try_from(&py_game(false)).unwrap();
        assert_eq!(record.status, GameStatus::Scheduled);
        assert_eq!((record.home_score, record.away_score), (0, 0));
        assert!(!record.overtime && !record.shootout);
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut game = py_game(true);
        game.date = "14/01/2023".to_string();
        assert!(matches!(
            GameRecord::try_from(&game),
            Err(SimError::InvalidGameRecord { game_id: 12, .. })
        ));
    }

    #[test]
    fn test_team_conversion_keeps_venue() {
        let team = PyTeam::new(
            "EDM".to_string(),
            "Edmonton Oilers".to_string(),
            "Pacific".to_string(),
            "Western".to_string(),
            "Rogers Place".to_string(),
        );
        let team = Team::from(&team);
        assert!(team.plays_at_home("Rogers Place"));
        assert_eq!(team.conference, "Western");
    }
}
