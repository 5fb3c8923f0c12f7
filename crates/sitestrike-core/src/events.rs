use serde::{Deserialize, Serialize};

use crate::player::AgentId;
use crate::sound::SoundId;
use crate::team::Team;

/// Why a round ended. The first honored condition is the only one recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEndReason {
    TimeExpired,
    BombDefused,
    BombExploded,
    CtEliminated,
    TEliminated,
}

impl RoundEndReason {
    /// Side credited with the round.
    pub fn winner(self) -> Team {
        match self {
            RoundEndReason::TimeExpired
            | RoundEndReason::BombDefused
            | RoundEndReason::TEliminated => Team::Ct,
            RoundEndReason::BombExploded | RoundEndReason::CtEliminated => Team::T,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RoundEndReason::TimeExpired => "Time expired!",
            RoundEndReason::BombDefused => "Bomb defused!",
            RoundEndReason::BombExploded => "Bomb exploded!",
            RoundEndReason::CtEliminated => "All CTs eliminated!",
            RoundEndReason::TEliminated => "All Terrorists eliminated!",
        }
    }
}

/// Terminal result of a session, from the human player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// The human agent died. Overrides any score comparison.
    Eliminated,
    Victory,
    Defeat,
}

impl MatchOutcome {
    pub fn headline(self) -> &'static str {
        match self {
            MatchOutcome::Eliminated => "GAME OVER",
            MatchOutcome::Victory => "VICTORY!",
            MatchOutcome::Defeat => "DEFEAT!",
        }
    }
}

/// Events emitted by a simulation step for presentation collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Fire-and-forget request for the audio collaborator.
    Sound { sound: SoundId, volume: f32 },
    RoundStarted { round: u8 },
    RoundLive,
    BombPlanted { planter: AgentId, x: f32, y: f32 },
    DefuseStarted { defuser: AgentId, duration: f32 },
    DefuseAborted { defuser: AgentId },
    Kill {
        killer: Option<AgentId>,
        victim: AgentId,
        weapon: String,
        headshot: bool,
    },
    RoundEnded {
        winner: Team,
        reason: RoundEndReason,
        ct_score: u8,
        t_score: u8,
    },
    GameOver {
        outcome: MatchOutcome,
        ct_score: u8,
        t_score: u8,
    },
    /// Transient banner text ("ROUND 3", "BOMB PLANTED!").
    CenterMessage { text: String, duration: f32 },
}

impl GameEvent {
    pub fn sound(sound: SoundId) -> Self {
        GameEvent::Sound { sound, volume: 1.0 }
    }

    pub fn sound_at(sound: SoundId, volume: f32) -> Self {
        GameEvent::Sound {
            sound,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn center(text: impl Into<String>, duration: f32) -> Self {
        GameEvent::CenterMessage {
            text: text.into(),
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_credit_expected_side() {
        assert_eq!(RoundEndReason::TimeExpired.winner(), Team::Ct);
        assert_eq!(RoundEndReason::BombDefused.winner(), Team::Ct);
        assert_eq!(RoundEndReason::TEliminated.winner(), Team::Ct);
        assert_eq!(RoundEndReason::BombExploded.winner(), Team::T);
        assert_eq!(RoundEndReason::CtEliminated.winner(), Team::T);
    }

    #[test]
    fn sound_volume_is_clamped() {
        let GameEvent::Sound { volume, .. } = GameEvent::sound_at(SoundId::Step, 3.0) else {
            panic!("expected a sound event");
        };
        assert_eq!(volume, 1.0);
    }

    #[test]
    fn event_json_roundtrip() {
        let event = GameEvent::RoundEnded {
            winner: Team::T,
            reason: RoundEndReason::BombExploded,
            ct_score: 2,
            t_score: 5,
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
