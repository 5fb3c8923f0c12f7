use serde::{Deserialize, Serialize};

use crate::team::Team;

/// Stable handle into the per-round agent arena.
///
/// Handles are indices into the agent list rebuilt at every round start, so a
/// handle captured in one round must not be carried into the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Display name of the human-controlled agent.
pub const PLAYER_NAME: &str = "Agent";

const CT_CALLSIGNS: &[&str] = &[
    "Phoenix", "Viper", "Hawk", "Cobra", "Ghost", "Frost", "Blaze", "Steel", "Ace", "Nova",
];

const T_CALLSIGNS: &[&str] = &[
    "Shadow", "Blade", "Reaper", "Wolf", "Raven", "Striker", "Venom", "Spectre", "Jackal", "Fury",
];

/// Callsign for a bot with the given arena index.
pub fn callsign(team: Team, index: usize) -> &'static str {
    let names = match team {
        Team::Ct => CT_CALLSIGNS,
        Team::T => T_CALLSIGNS,
    };
    names[index % names.len()]
}

/// RGB tint used by renderers for a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TeamColor {
    pub const CT: TeamColor = TeamColor {
        r: 91,
        g: 155,
        b: 213,
    };
    pub const T: TeamColor = TeamColor {
        r: 212,
        g: 168,
        b: 67,
    };

    pub fn for_team(team: Team) -> TeamColor {
        match team {
            Team::Ct => Self::CT,
            Team::T => Self::T,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callsigns_wrap_around() {
        assert_eq!(callsign(Team::Ct, 0), "Phoenix");
        assert_eq!(callsign(Team::Ct, 10), "Phoenix");
        assert_eq!(callsign(Team::T, 7), "Spectre");
    }

    #[test]
    fn team_colors_differ() {
        assert_ne!(TeamColor::for_team(Team::Ct), TeamColor::for_team(Team::T));
    }
}
