//! Arcade score layered over the round economy.

use crate::Simulation;
use crate::effects::PopupTone;

pub const KILL_SCORE: u32 = 100;
pub const HEADSHOT_SCORE: u32 = 150;
pub const ROUND_WIN_SCORE: u32 = 200;
pub const SURVIVAL_SCORE: u32 = 1;
/// Seconds alive per survival point.
pub const SURVIVAL_INTERVAL: f32 = 10.0;

pub fn kill_score(headshot: bool) -> u32 {
    if headshot { HEADSHOT_SCORE } else { KILL_SCORE }
}

/// Popup text and tone for a kill worth `points`.
pub fn kill_popup(points: u32, headshot: bool) -> (String, PopupTone) {
    if headshot {
        (format!("+{points} HEADSHOT"), PopupTone::Headshot)
    } else {
        (format!("+{points}"), PopupTone::Kill)
    }
}

impl Simulation {
    /// Credit points to the human and queue a popup.
    pub(crate) fn add_score(
        &mut self,
        points: u32,
        anchor: Option<(f32, f32)>,
        text: String,
        tone: PopupTone,
    ) {
        self.state.score = self.state.score.saturating_add(points);
        self.state.effects.push_popup(anchor, text, tone);
    }

    /// Accrue live time while the human is alive.
    pub(crate) fn tick_survival(&mut self, dt: f32) {
        if !self.player().is_some_and(|p| p.alive) {
            return;
        }
        self.state.survival_time += dt;
        while self.state.survival_time >= SURVIVAL_INTERVAL {
            self.state.survival_time -= SURVIVAL_INTERVAL;
            self.add_score(
                SURVIVAL_SCORE,
                None,
                format!("+{SURVIVAL_SCORE} SURVIVAL"),
                PopupTone::Survival,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headshots_pay_more() {
        assert_eq!(kill_score(false), 100);
        assert_eq!(kill_score(true), 150);
        let (text, tone) = kill_popup(150, true);
        assert_eq!(text, "+150 HEADSHOT");
        assert_eq!(tone, PopupTone::Headshot);
    }
}
