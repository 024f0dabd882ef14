//! Season records, the league-wide ranking and playoff seeding.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use crate::constants::{DIVISION_SEEDS, POINTS_PER_EXTRA_TIME_LOSS, POINTS_PER_WIN, WILD_CARDS};
use crate::error::SimError;
use crate::game::GameRecord;
use crate::team::{lookup, TeamDirectory};
use crate::tiebreak::games_played_tiebreak;

/// One team's record over a completed season.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub regulation_wins: u32,
    pub overtime_wins: u32,
    pub shootout_wins: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamSeasonStats {
    pub fn new(team: impl Into<String>) -> Self {
        TeamSeasonStats {
            team: team.into(),
            ..Default::default()
        }
    }

    pub fn goal_differential(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Keys that put teams into the same tiebreak group.
    fn wins_key(&self) -> (u32, u32, u32, u32) {
        (self.points, self.regulation_wins, self.overtime_wins, self.shootout_wins)
    }
}

/// Teams that no ranking key could separate; they are ordered by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedTie {
    pub teams: Vec<String>,
}

impl From<&UnresolvedTie> for SimError {
    fn from(tie: &UnresolvedTie) -> Self {
        SimError::TiebreakExhausted {
            teams: tie.teams.clone(),
        }
    }
}

/// Every team in ranking order, best first.
#[derive(Clone, Debug)]
pub struct Ranking {
    pub order: Vec<TeamSeasonStats>,
    pub unresolved_ties: Vec<UnresolvedTie>,
}

/// A playoff position; the index is 0 for the first seed or wildcard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayoffSlot {
    DivisionSeed(usize),
    WildCard(usize),
}

/// Playoff picture derived from a completed season.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Standings {
    /// Division name to its seeds, best first
    pub division_seeds: BTreeMap<String, Vec<String>>,

    /// Conference name to its wildcards, best first
    pub wild_cards: BTreeMap<String, Vec<String>>,

    /// Full league ranking, best first
    pub order: Vec<String>,

    pub unresolved_ties: Vec<UnresolvedTie>,
}

impl Standings {
    /// The playoff slot `team` earned, if any.
    pub fn slot_of(&self, team: &str) -> Option<PlayoffSlot> {
        for seeds in self.division_seeds.values() {
            if let Some(i) = seeds.iter().position(|t| t == team) {
                return Some(PlayoffSlot::DivisionSeed(i));
            }
        }
        for wild_cards in self.wild_cards.values() {
            if let Some(i) = wild_cards.iter().position(|t| t == team) {
                return Some(PlayoffSlot::WildCard(i));
            }
        }
        None
    }

    /// Every team holding a playoff slot with the slot it holds.
    pub fn playoff_slots(&self) -> impl Iterator<Item = (&str, PlayoffSlot)> + '_ {
        let seeds = self.division_seeds.values().flat_map(|seeds| {
            seeds
                .iter()
                .enumerate()
                .map(|(i, t)| (t.as_str(), PlayoffSlot::DivisionSeed(i)))
        });
        let wild_cards = self.wild_cards.values().flat_map(|wcs| {
            wcs.iter()
                .enumerate()
                .map(|(i, t)| (t.as_str(), PlayoffSlot::WildCard(i)))
        });
        seeds.chain(wild_cards)
    }

    /// Fail with `TiebreakExhausted` if the ranking fell back to identifier order anywhere.
    pub fn ensure_resolved(&self) -> Result<(), SimError> {
        match self.unresolved_ties.first() {
            Some(tie) => Err(tie.into()),
            None => Ok(()),
        }
    }
}

/// Fold a completed season into one record per team in the directory.
///
/// Undecided games are ignored. Records come back sorted by team identifier.
pub fn season_stats(teams: &TeamDirectory, games: &[GameRecord]) -> Result<Vec<TeamSeasonStats>, SimError> {
    let mut stats: HashMap<&str, TeamSeasonStats> = teams
        .keys()
        .map(|id| (id.as_str(), TeamSeasonStats::new(id.as_str())))
        .collect();

    for game in games.iter().filter(|g| g.is_decided()) {
        game.validate()?;
        for team in [&game.home_team, &game.away_team] {
            if !stats.contains_key(team.as_str()) {
                return Err(SimError::UnknownTeam { team: team.clone() });
            }
        }

        if let Some(winner) = stats.get_mut(game.winner()) {
            winner.wins += 1;
            winner.points += POINTS_PER_WIN;
            if game.shootout {
                winner.shootout_wins += 1;
            } else if game.overtime {
                winner.overtime_wins += 1;
            } else {
                winner.regulation_wins += 1;
            }
        }
        if let Some(loser) = stats.get_mut(game.loser()) {
            loser.losses += 1;
            if game.is_extra_time() {
                loser.points += POINTS_PER_EXTRA_TIME_LOSS;
            }
        }

        if let Some(home) = stats.get_mut(game.home_team.as_str()) {
            home.goals_for += game.home_score;
            home.goals_against += game.away_score;
        }
        if let Some(away) = stats.get_mut(game.away_team.as_str()) {
            away.goals_for += game.away_score;
            away.goals_against += game.home_score;
        }
    }

    let mut records: Vec<TeamSeasonStats> = stats.into_values().collect();
    records.sort_by(|a, b| a.team.cmp(&b.team));
    Ok(records)
}

/// Compare two records on every ranking key, best first.
///
/// `Equal` means the teams cannot be separated.
fn compare_records(a: &TeamSeasonStats, b: &TeamSeasonStats, h2h_ranks: &HashMap<String, usize>) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.regulation_wins.cmp(&a.regulation_wins))
        .then_with(|| b.overtime_wins.cmp(&a.overtime_wins))
        .then_with(|| b.shootout_wins.cmp(&a.shootout_wins))
        .then_with(|| {
            let rank_a = h2h_ranks.get(&a.team).copied().unwrap_or(0);
            let rank_b = h2h_ranks.get(&b.team).copied().unwrap_or(0);
            rank_a.cmp(&rank_b)
        })
        .then_with(|| b.goal_differential().cmp(&a.goal_differential()))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// Order every team of the directory from best to worst.
///
/// Keys in priority order: points, regulation wins, overtime wins, shootout
/// wins, points share in games among the tied teams, goal differential,
/// goals for. Teams equal on all of them are ordered by identifier and
/// reported in `unresolved_ties`.
pub fn rank_teams(teams: &TeamDirectory, games: &[GameRecord]) -> Result<Ranking, SimError> {
    let mut records = season_stats(teams, games)?;

    let mut groups: HashMap<(u32, u32, u32, u32), Vec<String>> = HashMap::new();
    for record in &records {
        groups.entry(record.wins_key()).or_default().push(record.team.clone());
    }

    let mut h2h_ranks: HashMap<String, usize> = HashMap::new();
    for tied in groups.values().filter(|g| g.len() > 1) {
        h2h_ranks.extend(games_played_tiebreak(tied, games));
    }

    records.sort_by(|a, b| compare_records(a, b, &h2h_ranks).then_with(|| a.team.cmp(&b.team)));

    let mut unresolved_ties: Vec<UnresolvedTie> = Vec::new();
    let mut start = 0;
    for end in 1..=records.len() {
        let same = end < records.len()
            && compare_records(&records[start], &records[end], &h2h_ranks) == Ordering::Equal;
        if same {
            continue;
        }
        if end - start > 1 {
            let teams: Vec<String> = records[start..end].iter().map(|r| r.team.clone()).collect();
            warn!(teams = ?teams, "cannot separate teams on any ranking key, ordering by identifier");
            unresolved_ties.push(UnresolvedTie { teams });
        }
        start = end;
    }

    Ok(Ranking {
        order: records,
        unresolved_ties,
    })
}

/// Rank a completed season and hand out playoff slots.
///
/// Walking the ranking from the top, each team takes one of its division's
/// seeds while any remain, otherwise one of its conference's wildcards while
/// any remain.
pub fn compute_standings(teams: &TeamDirectory, games: &[GameRecord]) -> Result<Standings, SimError> {
    let ranking = rank_teams(teams, games)?;

    let mut division_seeds: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut wild_cards: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for record in &ranking.order {
        let team = lookup(teams, &record.team)?;
        let seeds = division_seeds.entry(team.division.clone()).or_default();
        if seeds.len() < DIVISION_SEEDS {
            seeds.push(team.id.clone());
            continue;
        }
        let conference = wild_cards.entry(team.conference.clone()).or_default();
        if conference.len() < WILD_CARDS {
            conference.push(team.id.clone());
        }
    }

    Ok(Standings {
        division_seeds,
        wild_cards,
        order: ranking.order.into_iter().map(|r| r.team).collect(),
        unresolved_ties: ranking.unresolved_ties,
    })
}
