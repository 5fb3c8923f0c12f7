pub mod events;
pub mod game_trait;
pub mod player;
pub mod presentation;
pub mod protocol;
pub mod sound;
pub mod team;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::events::GameEvent;
    use crate::game_trait::TacticalGame;
    use crate::presentation::{AudioSink, FrameSink};
    use crate::sound::SoundId;

    /// Audio sink that remembers every request.
    #[derive(Debug, Default)]
    pub struct RecordingAudio {
        pub played: Vec<(SoundId, f32)>,
    }

    impl RecordingAudio {
        pub fn count(&self, sound: SoundId) -> usize {
            self.played.iter().filter(|(s, _)| *s == sound).count()
        }
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, sound: SoundId, volume: f32) {
            self.played.push((sound, volume));
        }
    }

    /// Frame sink that counts frames and keeps the last snapshot.
    #[derive(Debug)]
    pub struct RecordingFrames<S: Clone> {
        pub frames: usize,
        pub last: Option<S>,
    }

    impl<S: Clone> Default for RecordingFrames<S> {
        fn default() -> Self {
            Self {
                frames: 0,
                last: None,
            }
        }
    }

    impl<S: Clone> FrameSink<S> for RecordingFrames<S> {
        fn render(&mut self, snapshot: &S) {
            self.frames += 1;
            self.last = Some(snapshot.clone());
        }
    }

    /// Run N game ticks, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn TacticalGame, n: usize, dt: f32) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt));
        }
        all_events
    }

    /// Sound ids requested in `events`, in order.
    pub fn sounds_in(events: &[GameEvent]) -> Vec<SoundId> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Sound { sound, .. } => Some(*sound),
                _ => None,
            })
            .collect()
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Generic checks every TacticalGame implementation must pass. Game
    // crates call them from their own test modules.

    /// serialize_state() must return non-empty bytes.
    pub fn contract_state_is_published(game: &dyn TacticalGame) {
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// update() with dt>0 must advance state.
    pub fn contract_update_advances_time(game: &mut dyn TacticalGame) {
        let before = game.serialize_state();
        game.update(0.05);
        let after = game.serialize_state();
        assert_ne!(before, after, "update(dt>0) must advance game state");
    }

    /// pause() must freeze state, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(game: &mut dyn TacticalGame) {
        game.pause();
        assert!(game.is_paused());
        let before = game.serialize_state();
        let events = game.update(0.05);
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");
        assert!(events.is_empty(), "No events may be emitted while paused");

        game.resume();
        game.update(0.05);
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// serialize -> apply -> serialize must be stable.
    pub fn contract_state_roundtrip_preserves(game: &mut dyn TacticalGame) {
        let state_a = game.serialize_state();
        game.apply_state(&state_a);
        let state_b = game.serialize_state();
        assert_eq!(
            state_a, state_b,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// Malformed input bytes must be ignored without panicking.
    pub fn contract_malformed_input_ignored(game: &mut dyn TacticalGame) {
        let before = game.serialize_state();
        game.apply_input(&[0xc1, 0xff, 0x00]);
        game.apply_input(&[]);
        let after = game.serialize_state();
        assert_eq!(before, after, "Malformed input must not touch state");
    }
}
