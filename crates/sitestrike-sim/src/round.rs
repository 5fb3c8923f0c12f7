//! Round state machine: freeze, live, end, game over.
//!
//! Every transition into `End` goes through [`Simulation::end_round`], which
//! only honors the first win condition of a round.

use serde::{Deserialize, Serialize};

use sitestrike_core::events::{GameEvent, MatchOutcome, RoundEndReason};
use sitestrike_core::player::AgentId;
use sitestrike_core::sound::SoundId;
use sitestrike_core::team::Team;

use crate::agent::Agent;
use crate::bot::bot_buy;
use crate::effects::{KillFeedEntry, PopupTone};
use crate::scoring::ROUND_WIN_SCORE;
use crate::{PLAYER, Simulation};

/// Bomb blast damage per unit of distance inside the radius.
pub const EXPLOSION_FALLOFF: f32 = 0.4;
pub const BOMB_TICK_SLOW: f32 = 0.8;
pub const BOMB_TICK_FAST: f32 = 0.3;
/// Remaining fuse below which the tick speeds up.
pub const BOMB_TICK_URGENT: f32 = 10.0;
pub const EXPLOSION_SHAKE: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Freeze,
    Live,
    End,
    GameOver,
}

/// Defuse in progress. Cancelled when the defuser dies, leaves range, or the round ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Defuse {
    pub defuser: AgentId,
    pub remaining: f32,
    pub duration: f32,
}

impl Defuse {
    /// Completed fraction in `0..=1`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombState {
    pub x: f32,
    pub y: f32,
    pub site: String,
    pub fuse: f32,
    pub tick_timer: f32,
    pub defuse: Option<Defuse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub winner: Team,
    pub reason: RoundEndReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: RoundPhase,
    /// 1-based round counter.
    pub round: u8,
    pub max_rounds: u8,
    pub freeze_timer: f32,
    pub round_timer: f32,
    pub end_timer: f32,
    pub ct_score: u8,
    pub t_score: u8,
    pub bomb: Option<BombState>,
    pub last_result: Option<RoundResult>,
    pub outcome: Option<MatchOutcome>,
}

impl RoundState {
    pub fn new(max_rounds: u8) -> Self {
        Self {
            phase: RoundPhase::Freeze,
            round: 1,
            max_rounds,
            freeze_timer: 0.0,
            round_timer: 0.0,
            end_timer: 0.0,
            ct_score: 0,
            t_score: 0,
            bomb: None,
            last_result: None,
            outcome: None,
        }
    }

    pub fn score(&self, team: Team) -> u8 {
        match team {
            Team::Ct => self.ct_score,
            Team::T => self.t_score,
        }
    }
}

/// Blast damage at `distance` from the bomb, zero outside `radius`.
pub fn explosion_damage(distance: f32, radius: f32) -> f32 {
    ((radius - distance) * EXPLOSION_FALLOFF).max(0.0)
}

/// Whether the match is decided after a round: majority reached or rounds exhausted.
pub fn match_decided(ct_score: u8, t_score: u8, next_round: u8, max_rounds: u8, threshold: u8) -> bool {
    ct_score >= threshold || t_score >= threshold || next_round > max_rounds
}

impl Simulation {
    /// Rebuild every agent and reset round timers. Only the human's carried stats persist.
    pub(crate) fn start_round(&mut self) {
        let cfg = &self.config;
        let round = &mut self.state.round;
        round.phase = RoundPhase::Freeze;
        round.freeze_timer = cfg.freeze_time;
        round.round_timer = cfg.round_time;
        round.end_timer = 0.0;
        round.bomb = None;
        self.state.bullets.clear();
        self.state.effects.reset_world();

        let team_size = usize::from(cfg.team_size);
        let own = self.state.player_team;
        let enemy = own.opponent();
        let mut agents = Vec::with_capacity(team_size * 2);

        let mut player = Agent::spawn(
            PLAYER,
            own,
            true,
            &self.map,
            cfg.max_health(true),
            self.state.carried.money,
        );
        player.kills = self.state.carried.kills;
        player.deaths = self.state.carried.deaths;
        player.has_bomb = own == Team::T;
        agents.push(player);

        for i in 1..team_size {
            let mut bot = Agent::spawn(
                AgentId(i),
                own,
                false,
                &self.map,
                cfg.max_health(false),
                cfg.starting_money,
            );
            bot_buy(&mut bot, &mut self.rng);
            agents.push(bot);
        }
        for i in 0..team_size {
            let mut bot = Agent::spawn(
                AgentId(team_size + i),
                enemy,
                false,
                &self.map,
                cfg.max_health(false),
                cfg.starting_money,
            );
            bot_buy(&mut bot, &mut self.rng);
            bot.has_bomb = enemy == Team::T && i == 0;
            agents.push(bot);
        }
        self.state.agents = agents;

        let n = self.state.round.round;
        tracing::info!(round = n, team = %own, "Round started");
        self.emit(GameEvent::RoundStarted { round: n });
        self.emit(GameEvent::center(format!("ROUND {n}"), 2.0));
        self.play(SoundId::RoundStart);
    }

    pub(crate) fn tick_freeze(&mut self, dt: f32) {
        self.state.round.freeze_timer -= dt;
        self.update_player(dt, false);
        self.state.effects.step(dt);
        if self.state.round.freeze_timer <= 0.0 {
            self.state.round.freeze_timer = 0.0;
            self.state.round.phase = RoundPhase::Live;
            tracing::debug!(round = self.state.round.round, "Round live");
            self.emit(GameEvent::RoundLive);
            self.emit(GameEvent::center("GO! GO! GO!", 1.5));
        }
        self.update_camera();
    }

    pub(crate) fn tick_round_end(&mut self, dt: f32) {
        self.state.effects.step(dt);
        let round = &mut self.state.round;
        round.end_timer -= dt;
        if round.end_timer > 0.0 {
            return;
        }
        round.round = round.round.saturating_add(1);
        if match_decided(
            round.ct_score,
            round.t_score,
            round.round,
            round.max_rounds,
            self.config.win_threshold(),
        ) {
            self.end_game();
        } else {
            self.start_round();
        }
    }

    /// Resolve the round in favor of `reason.winner()`. Returns `false` when the
    /// round is not live, so later win conditions in the same tick are no-ops.
    pub(crate) fn end_round(&mut self, reason: RoundEndReason) -> bool {
        if self.state.round.phase != RoundPhase::Live {
            return false;
        }
        let winner = reason.winner();
        let own = self.state.player_team;
        let round = &mut self.state.round;
        round.phase = RoundPhase::End;
        round.end_timer = self.config.round_end_pause;
        round.round_timer = round.round_timer.max(0.0);
        if let Some(bomb) = round.bomb.as_mut() {
            bomb.defuse = None;
        }
        match winner {
            Team::Ct => round.ct_score = round.ct_score.saturating_add(1),
            Team::T => round.t_score = round.t_score.saturating_add(1),
        }
        round.last_result = Some(RoundResult { winner, reason });
        let (ct_score, t_score) = (round.ct_score, round.t_score);

        let bonus = if winner == own {
            self.config.win_bonus
        } else {
            self.config.loss_bonus
        };
        if let Some(player) = self.state.agents.get_mut(PLAYER.index()) {
            player.credit_money(bonus, self.config.money_cap);
            self.state.carried.money = player.money;
        }
        if winner == own {
            self.add_score(
                ROUND_WIN_SCORE,
                None,
                format!("+{ROUND_WIN_SCORE} ROUND WIN"),
                PopupTone::RoundWin,
            );
        }

        tracing::info!(
            round = self.state.round.round,
            winner = %winner,
            reason = reason.message(),
            ct_score,
            t_score,
            "Round ended"
        );
        self.play(match winner {
            Team::Ct => SoundId::CtWin,
            Team::T => SoundId::TWin,
        });
        self.emit(GameEvent::RoundEnded {
            winner,
            reason,
            ct_score,
            t_score,
        });
        self.emit(GameEvent::center(
            format!("{winner} WIN! {}", reason.message()),
            3.0,
        ));
        true
    }

    /// Enter the terminal phase and record the outcome for the human.
    pub(crate) fn end_game(&mut self) {
        if self.state.round.phase == RoundPhase::GameOver {
            return;
        }
        let round = &mut self.state.round;
        round.phase = RoundPhase::GameOver;
        let player_alive = self.state.agents.get(PLAYER.index()).is_some_and(|p| p.alive);
        let outcome = if !player_alive {
            MatchOutcome::Eliminated
        } else {
            // Ties go to the Terrorists.
            let winner = if round.ct_score > round.t_score {
                Team::Ct
            } else {
                Team::T
            };
            if winner == self.state.player_team {
                MatchOutcome::Victory
            } else {
                MatchOutcome::Defeat
            }
        };
        round.outcome = Some(outcome);
        let (ct_score, t_score) = (round.ct_score, round.t_score);
        self.buy_menu_open = false;
        self.scoreboard_open = false;

        tracing::info!(
            outcome = ?outcome,
            ct_score,
            t_score,
            score = self.state.score,
            kills = self.state.carried.kills,
            deaths = self.state.carried.deaths,
            "Game over"
        );
        self.emit(GameEvent::GameOver {
            outcome,
            ct_score,
            t_score,
        });
        self.emit(GameEvent::center(outcome.headline(), 5.0));
    }

    /// Plant at the agent's position. Requires a live round, a living T carrier
    /// inside a bomb site, and no bomb already down.
    pub(crate) fn plant_bomb(&mut self, id: AgentId) -> bool {
        if self.state.round.phase != RoundPhase::Live || self.state.round.bomb.is_some() {
            return false;
        }
        let Some(agent) = self.state.agents.get_mut(id.index()) else {
            return false;
        };
        if !agent.alive || agent.team != Team::T || !agent.has_bomb {
            return false;
        }
        let Some(site) = self.map.site_at(agent.x, agent.y) else {
            return false;
        };
        agent.has_bomb = false;
        let (x, y) = (agent.x, agent.y);
        tracing::info!(planter = %agent.name, site = %site.label, "Bomb planted");
        self.state.round.bomb = Some(BombState {
            x,
            y,
            site: site.label.clone(),
            fuse: self.config.bomb_fuse,
            tick_timer: 0.0,
            defuse: None,
        });
        self.play(SoundId::BombPlant);
        self.emit(GameEvent::BombPlanted { planter: id, x, y });
        self.emit(GameEvent::center("BOMB PLANTED!", 2.0));
        true
    }

    /// Begin defusing. Requires a living CT within range of an undisturbed bomb.
    pub(crate) fn start_defuse(&mut self, id: AgentId) -> bool {
        if self.state.round.phase != RoundPhase::Live {
            return false;
        }
        let Some(agent) = self.state.agents.get(id.index()) else {
            return false;
        };
        let Some(bomb) = self.state.round.bomb.as_mut() else {
            return false;
        };
        if !agent.alive
            || agent.team != Team::Ct
            || bomb.defuse.is_some()
            || agent.distance_to(bomb.x, bomb.y) >= self.config.defuse_range
        {
            return false;
        }
        let duration = self.config.defuse_time(agent.has_defuse_kit);
        bomb.defuse = Some(Defuse {
            defuser: id,
            remaining: duration,
            duration,
        });
        tracing::debug!(defuser = %agent.name, duration, "Defuse started");
        self.play(SoundId::BombDefuse);
        self.emit(GameEvent::DefuseStarted {
            defuser: id,
            duration,
        });
        self.emit(GameEvent::center("Defusing...", duration.min(2.0)));
        true
    }

    /// Advance defuse then fuse. Returns `true` when the round ended.
    pub(crate) fn tick_bomb(&mut self, dt: f32) -> bool {
        let range = self.config.defuse_range;
        let Some(bomb) = self.state.round.bomb.as_mut() else {
            return false;
        };

        if let Some(mut defuse) = bomb.defuse {
            let in_range = self
                .state
                .agents
                .get(defuse.defuser.index())
                .is_some_and(|d| d.alive && d.distance_to(bomb.x, bomb.y) < range);
            if !in_range {
                bomb.defuse = None;
                tracing::debug!(defuser = defuse.defuser.index(), "Defuse aborted");
                self.emit(GameEvent::DefuseAborted {
                    defuser: defuse.defuser,
                });
            } else {
                defuse.remaining -= dt;
                if defuse.remaining <= 0.0 {
                    self.state.round.bomb = None;
                    tracing::info!(defuser = defuse.defuser.index(), "Bomb defused");
                    self.end_round(RoundEndReason::BombDefused);
                    return true;
                }
                bomb.defuse = Some(defuse);
            }
        }

        let Some(bomb) = self.state.round.bomb.as_mut() else {
            return false;
        };
        bomb.fuse -= dt;
        if bomb.fuse <= 0.0 {
            self.explode_bomb();
            return true;
        }
        bomb.tick_timer += dt;
        let interval = if bomb.fuse < BOMB_TICK_URGENT {
            BOMB_TICK_FAST
        } else {
            BOMB_TICK_SLOW
        };
        if bomb.tick_timer >= interval {
            bomb.tick_timer = 0.0;
            self.play(SoundId::BombTick);
        }
        false
    }

    /// Detonate: radial damage straight to health, then the round goes to T.
    fn explode_bomb(&mut self) {
        let Some(bomb) = self.state.round.bomb.take() else {
            return;
        };
        let radius = self.config.explosion_radius;
        tracing::info!(x = bomb.x, y = bomb.y, "Bomb exploded");
        self.play(SoundId::BombExplode);
        self.state.effects.shake.intensity = EXPLOSION_SHAKE;
        self.state.effects.spawn_explosion(bomb.x, bomb.y, &mut self.rng);

        let mut killed = Vec::new();
        for agent in self.state.agents.iter_mut().filter(|a| a.alive) {
            let damage = explosion_damage(agent.distance_to(bomb.x, bomb.y), radius);
            if damage <= 0.0 {
                continue;
            }
            agent.health = (agent.health - damage).max(0.0);
            if agent.health <= 0.0 {
                agent.kill();
                agent.deaths += 1;
                if agent.is_player {
                    self.state.carried.deaths = agent.deaths;
                }
                killed.push((agent.id, agent.name.clone(), agent.team));
            }
        }
        for (id, name, team) in killed {
            self.state.effects.push_kill(KillFeedEntry {
                killer: None,
                victim: name,
                victim_team: team,
                weapon: "C4".to_string(),
                headshot: false,
                age: 0.0,
            });
            self.emit(GameEvent::Kill {
                killer: None,
                victim: id,
                weapon: "C4".to_string(),
                headshot: false,
            });
        }

        self.end_round(RoundEndReason::BombExploded);
        if !self.player().is_some_and(|p| p.alive) {
            self.end_game();
        }
    }

    /// Award the round to the surviving side once one side has nobody alive.
    pub(crate) fn check_elimination(&mut self) {
        if self.state.round.bomb.is_some() {
            return;
        }
        let alive = |team: Team| {
            self.state
                .agents
                .iter()
                .filter(|a| a.team == team && a.alive)
                .count()
        };
        let (ct_alive, t_alive) = (alive(Team::Ct), alive(Team::T));
        if ct_alive == 0 {
            self.end_round(RoundEndReason::CtEliminated);
        } else if t_alive == 0 {
            self.end_round(RoundEndReason::TEliminated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explosion_falls_off_linearly() {
        assert!((explosion_damage(0.0, 500.0) - 200.0).abs() < 1e-4);
        assert!((explosion_damage(250.0, 500.0) - 100.0).abs() < 1e-4);
        assert!(explosion_damage(500.0, 500.0).abs() < f32::EPSILON);
        assert!(explosion_damage(900.0, 500.0).abs() < f32::EPSILON);
    }

    #[test]
    fn match_decided_on_majority_or_exhaustion() {
        // 15 rounds: threshold 9.
        assert!(!match_decided(8, 6, 15, 15, 9));
        assert!(match_decided(9, 0, 10, 15, 9));
        assert!(match_decided(0, 9, 10, 15, 9));
        assert!(match_decided(7, 7, 16, 15, 9));
    }

    #[test]
    fn defuse_progress() {
        let d = Defuse {
            defuser: AgentId(0),
            remaining: 2.5,
            duration: 10.0,
        };
        assert!((d.progress() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn round_state_starts_at_one() {
        let r = RoundState::new(15);
        assert_eq!(r.round, 1);
        assert_eq!(r.phase, RoundPhase::Freeze);
        assert_eq!(r.score(Team::Ct), 0);
    }
}
