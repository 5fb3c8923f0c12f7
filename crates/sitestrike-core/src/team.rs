use std::fmt;

use serde::{Deserialize, Serialize};

/// The two sides of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Counter-terrorists, the defending side.
    #[default]
    Ct,
    /// Terrorists, the attacking side that carries the bomb.
    T,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Ct => Team::T,
            Team::T => Team::Ct,
        }
    }

    /// Short scoreboard label.
    pub fn label(self) -> &'static str {
        match self {
            Team::Ct => "CT",
            Team::T => "T",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Ct => write!(f, "CTs"),
            Team::T => write!(f, "Terrorists"),
        }
    }
}

/// Bot skill preset. Only ever applied to bot-controlled agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Maximum distance at which a bot will acquire a target.
    pub fn vision_range(self) -> f32 {
        match self {
            Difficulty::Easy => 400.0,
            Difficulty::Normal => 600.0,
            Difficulty::Hard => 900.0,
        }
    }

    /// Multiplier on the weapon fire interval (higher = slower fire).
    pub fn fire_interval_mult(self) -> f32 {
        match self {
            Difficulty::Easy => 2.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.8,
        }
    }

    /// Multiplier on weapon accuracy.
    pub fn accuracy_mult(self) -> f32 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.3,
        }
    }

    /// Parse a case-insensitive preset name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_involution() {
        assert_eq!(Team::Ct.opponent(), Team::T);
        assert_eq!(Team::T.opponent().opponent(), Team::T);
    }

    #[test]
    fn harder_bots_see_further_and_fire_faster() {
        assert!(Difficulty::Hard.vision_range() > Difficulty::Normal.vision_range());
        assert!(Difficulty::Normal.vision_range() > Difficulty::Easy.vision_range());
        assert!(Difficulty::Hard.fire_interval_mult() < Difficulty::Easy.fire_interval_mult());
        assert!(Difficulty::Hard.accuracy_mult() > Difficulty::Easy.accuracy_mult());
    }

    #[test]
    fn difficulty_parses_names() {
        assert_eq!(Difficulty::from_name("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_name("normal"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::from_name("nightmare"), None);
    }

    #[test]
    fn team_serializes_lowercase() {
        let json = serde_json::to_string(&Team::Ct).unwrap();
        assert_eq!(json, "\"ct\"");
    }
}
