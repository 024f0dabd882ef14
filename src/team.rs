use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SimError;

/// Team directory keyed by team identifier (abbreviation).
pub type TeamDirectory = HashMap<String, Team>;

/// A team with the league structure it belongs to.
///
/// Division, conference and venue are resolved once by whoever builds the
/// directory and never change during a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,

    pub name: String,

    pub division: String,

    pub conference: String,

    /// Home arena; a game played here earns the home side its home-ice bonus
    pub venue: String,
}

impl Team {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        division: impl Into<String>,
        conference: impl Into<String>,
        venue: impl Into<String>,
    ) -> Self {
        Team {
            id: id.into(),
            name: name.into(),
            division: division.into(),
            conference: conference.into(),
            venue: venue.into(),
        }
    }

    /// Whether a game at `venue` is played in this team's own building.
    pub fn plays_at_home(&self, venue: &str) -> bool {
        self.venue == venue
    }
}

/// Build a directory from a list of teams, keyed by `Team::id`.
pub fn directory<I: IntoIterator<Item = Team>>(teams: I) -> TeamDirectory {
    teams.into_iter().map(|team| (team.id.clone(), team)).collect()
}

/// Look up a team, failing with `UnknownTeam` if it is not in the directory.
pub fn lookup<'a>(teams: &'a TeamDirectory, id: &str) -> Result<&'a Team, SimError> {
    teams.get(id).ok_or_else(|| SimError::UnknownTeam { team: id.to_string() })
}
