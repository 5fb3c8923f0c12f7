use serde::{Deserialize, Serialize};

use crate::events::GameEvent;

/// Contract between a tactical simulation and the runtime that drives it.
///
/// The runtime owns the clock and the presentation collaborators; the game
/// only advances its own state and reports what happened.
pub trait TacticalGame {
    fn metadata(&self) -> GameMetadata;

    /// Advance the simulation by `dt` seconds. Returns the events produced.
    fn update(&mut self, dt: f32) -> Vec<GameEvent>;

    /// Encode the full authoritative state for presentation.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the state with a previously serialized snapshot.
    fn apply_state(&mut self, state: &[u8]);

    /// Apply an encoded continuous-input sample for the human agent.
    fn apply_input(&mut self, input: &[u8]);

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether the session reached its terminal state.
    fn is_game_over(&self) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub max_rounds: u8,
    pub team_size: u8,
}
