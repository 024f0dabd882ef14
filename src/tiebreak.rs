//! Points-percentage tiebreak over the games played among a tied group.

use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::{POINTS_PER_EXTRA_TIME_LOSS, POINTS_PER_WIN};
use crate::game::GameRecord;

/// Points a team earned out of the points it could have earned.
///
/// Compared as an exact fraction so equal percentages group together
/// regardless of how they were reached.
#[derive(Clone, Copy, Debug)]
pub struct PointsShare {
    pub earned: u32,
    pub available: u32,
}

impl PointsShare {
    pub fn ratio(&self) -> f64 {
        f64::from(self.earned) / f64::from(self.available)
    }
}

impl Ord for PointsShare {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.earned) * u64::from(other.available);
        let rhs = u64::from(other.earned) * u64::from(self.available);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for PointsShare {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PointsShare {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PointsShare {}

/// Points share of each tied team over the decided games played entirely
/// inside the group.
///
/// A team with an odd number of such games loses one game that its pairing
/// played more often in one building than the other, so an extra home or road
/// game does not skew the comparison. A team whose only game against the group
/// is that one keeps it. `None` means the team has no counted games against
/// the group.
pub fn points_shares(tied: &[String], games: &[GameRecord]) -> HashMap<String, Option<PointsShare>> {
    let index: HashMap<&str, usize> = tied.iter().enumerate().map(|(i, t)| (t.as_str(), i)).collect();
    let mut team_games: Vec<Vec<(&GameRecord, usize, usize)>> = vec![Vec::new(); tied.len()];
    let mut fixtures: HashMap<(usize, usize), u32> = HashMap::new();

    for game in games.iter().filter(|g| g.is_decided()) {
        let home = index.get(game.home_team.as_str());
        let away = index.get(game.away_team.as_str());
        if let (Some(&home), Some(&away)) = (home, away) {
            team_games[home].push((game, home, away));
            team_games[away].push((game, home, away));
            *fixtures.entry((home, away)).or_insert(0) += 1;
        }
    }

    let count = |home: usize, away: usize| fixtures.get(&(home, away)).copied().unwrap_or(0);
    let is_excess = |home: usize, away: usize| count(home, away) > count(away, home);

    let mut shares = HashMap::new();
    for (team, considered) in tied.iter().zip(&team_games) {
        let mut need_skip = considered.len() % 2 != 0 && considered.len() > 1;
        let mut earned = 0;
        let mut available = 0;

        for &(game, home, away) in considered {
            if need_skip && is_excess(home, away) {
                debug!(team = %team, game_id = game.game_id, "skipping extra home/away game");
                need_skip = false;
                continue;
            }

            available += POINTS_PER_WIN;
            if game.is_extra_time() {
                available += POINTS_PER_EXTRA_TIME_LOSS;
            }
            if game.winner() == team.as_str() {
                earned += POINTS_PER_WIN;
            } else if game.is_extra_time() {
                earned += POINTS_PER_EXTRA_TIME_LOSS;
            }
        }

        let share = (available > 0).then_some(PointsShare { earned, available });
        shares.insert(team.clone(), share);
    }

    shares
}

/// Rank a group of teams tied on points and win types by their points share
/// in games among themselves.
///
/// Rank 0 is the best share; teams with equal shares get the same rank.
/// Teams with no counted games rank after every team that has a share.
///
/// # Arguments
/// * `tied` - Identifiers of the tied teams
/// * `games` - The completed season
pub fn games_played_tiebreak(tied: &[String], games: &[GameRecord]) -> HashMap<String, usize> {
    let shares = points_shares(tied, games);

    let mut distinct: Vec<PointsShare> = shares.values().flatten().copied().collect();
    distinct.sort_by(|a, b| b.cmp(a));
    distinct.dedup();

    let ranks: HashMap<String, usize> = shares
        .iter()
        .map(|(team, share)| {
            let rank = match share {
                Some(share) => distinct.iter().position(|s| s == share).unwrap_or(distinct.len()),
                None => distinct.len(),
            };
            (team.clone(), rank)
        })
        .collect();

    if tied.len() > 2 {
        debug!(teams = ?tied, ranks = ?ranks, "resolved multi-team tiebreak");
    }

    ranks
}
