//! Contracts for the collaborators that sit outside the simulation core.
//!
//! Audio, rendering and HUD only ever observe published state. The only way
//! back into the simulation is through its discrete action API.

use crate::events::GameEvent;
use crate::sound::SoundId;

/// Procedural audio backend. Calls never block and never return data.
pub trait AudioSink {
    fn play(&mut self, sound: SoundId, volume: f32);
}

/// Frame producer. Receives a read-only snapshot once per tick.
pub trait FrameSink<S: ?Sized> {
    fn render(&mut self, snapshot: &S);
}

/// HUD/menu layer. Receives the published HUD fields once per tick.
pub trait HudSink<H: ?Sized> {
    fn update(&mut self, hud: &H);
}

/// Audio sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: SoundId, _volume: f32) {}
}

/// Forward every sound request in `events` to `sink`, in emission order.
pub fn dispatch_sounds(events: &[GameEvent], sink: &mut dyn AudioSink) {
    for event in events {
        if let GameEvent::Sound { sound, volume } = event {
            sink.play(*sound, *volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Collect(Vec<SoundId>);

    impl AudioSink for Collect {
        fn play(&mut self, sound: SoundId, _volume: f32) {
            self.0.push(sound);
        }
    }

    #[test]
    fn dispatch_only_forwards_sounds() {
        let events = vec![
            GameEvent::sound(SoundId::RoundStart),
            GameEvent::RoundLive,
            GameEvent::sound_at(SoundId::Step, 0.3),
        ];
        let mut sink = Collect(Vec::new());
        dispatch_sounds(&events, &mut sink);
        assert_eq!(sink.0, vec![SoundId::RoundStart, SoundId::Step]);
    }
}
