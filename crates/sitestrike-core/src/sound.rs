use serde::{Deserialize, Serialize};

/// Every sound the simulation can ask the audio collaborator to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundId {
    Pistol,
    Rifle,
    Awp,
    Knife,
    Shotgun,
    Reload,
    Empty,
    Hit,
    Headshot,
    Death,
    BombPlant,
    BombDefuse,
    BombExplode,
    BombTick,
    Buy,
    RoundStart,
    CtWin,
    TWin,
    Step,
}

impl SoundId {
    pub const ALL: [SoundId; 19] = [
        SoundId::Pistol,
        SoundId::Rifle,
        SoundId::Awp,
        SoundId::Knife,
        SoundId::Shotgun,
        SoundId::Reload,
        SoundId::Empty,
        SoundId::Hit,
        SoundId::Headshot,
        SoundId::Death,
        SoundId::BombPlant,
        SoundId::BombDefuse,
        SoundId::BombExplode,
        SoundId::BombTick,
        SoundId::Buy,
        SoundId::RoundStart,
        SoundId::CtWin,
        SoundId::TWin,
        SoundId::Step,
    ];

    /// Stable identifier used by audio backends to look up a synth patch.
    pub fn as_str(self) -> &'static str {
        match self {
            SoundId::Pistol => "pistol",
            SoundId::Rifle => "rifle",
            SoundId::Awp => "awp",
            SoundId::Knife => "knife",
            SoundId::Shotgun => "shotgun",
            SoundId::Reload => "reload",
            SoundId::Empty => "empty",
            SoundId::Hit => "hit",
            SoundId::Headshot => "headshot",
            SoundId::Death => "death",
            SoundId::BombPlant => "bomb_plant",
            SoundId::BombDefuse => "bomb_defuse",
            SoundId::BombExplode => "bomb_explode",
            SoundId::BombTick => "bomb_tick",
            SoundId::Buy => "buy",
            SoundId::RoundStart => "round_start",
            SoundId::CtWin => "ct_win",
            SoundId::TWin => "t_win",
            SoundId::Step => "step",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_name_matches_as_str() {
        for sound in SoundId::ALL {
            let json = serde_json::to_string(&sound).unwrap();
            assert_eq!(json, format!("\"{}\"", sound.as_str()));
        }
    }
}
