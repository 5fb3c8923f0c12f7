pub mod actions;
pub mod agent;
pub mod bot;
pub mod collision;
pub mod combat;
pub mod config;
pub mod effects;
pub mod hud;
pub mod map;
pub mod projectile;
pub mod round;
pub mod scoring;
pub mod weapons;

#[cfg(test)]
mod scenario_tests;
#[cfg(test)]
pub(crate) mod test_helpers;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use sitestrike_core::events::{GameEvent, RoundEndReason};
use sitestrike_core::game_trait::{GameMetadata, TacticalGame};
use sitestrike_core::player::AgentId;
use sitestrike_core::protocol::{self, ProtocolError};
use sitestrike_core::sound::SoundId;
use sitestrike_core::team::{Difficulty, Team};

use agent::Agent;
use config::SimConfig;
use effects::{Camera, Effects};
use map::{GameMap, load_map};
use projectile::Bullet;
use round::{RoundPhase, RoundState};

/// The human agent always occupies the first slot.
pub const PLAYER: AgentId = AgentId(0);

/// Seconds between footsteps while running.
const STEP_INTERVAL_RUN: f32 = 0.3;
/// Seconds between footstep dust puffs while walking.
const STEP_INTERVAL_WALK: f32 = 0.5;
const STEP_VOLUME: f32 = 0.3;

/// Continuous input sample for the human agent. Overwritten each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement direction; any non-zero vector is normalized.
    pub move_x: f32,
    pub move_y: f32,
    /// Facing angle in radians (world space).
    pub aim_angle: f32,
    /// Trigger held.
    pub fire: bool,
    /// Half-speed silent movement.
    pub walk: bool,
}

impl PlayerInput {
    /// Replace non-finite components with neutral values.
    pub fn sanitized(self) -> Self {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        Self {
            move_x: finite(self.move_x),
            move_y: finite(self.move_y),
            aim_angle: finite(self.aim_angle),
            ..self
        }
    }
}

/// Human stats that survive round resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarriedStats {
    pub money: u32,
    pub kills: u32,
    pub deaths: u32,
}

/// Published snapshot of the whole match, as read by presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Simulation clock in seconds.
    pub clock: f32,
    pub player_team: Team,
    pub difficulty: Difficulty,
    pub agents: Vec<Agent>,
    pub bullets: Vec<Bullet>,
    pub effects: Effects,
    pub camera: Camera,
    pub round: RoundState,
    pub carried: CarriedStats,
    pub score: u32,
    pub survival_time: f32,
}

/// Single-threaded match orchestrator. One [`Simulation::tick`] advances every
/// subsystem as one atomic step.
pub struct Simulation {
    pub(crate) map: GameMap,
    pub(crate) config: SimConfig,
    pub(crate) state: MatchState,
    pub(crate) rng: StdRng,
    pub(crate) input: PlayerInput,
    pub(crate) buy_menu_open: bool,
    pub(crate) scoreboard_open: bool,
    pub(crate) paused: bool,
    pub(crate) autopilot: bool,
    pub(crate) events: Vec<GameEvent>,
}

impl Simulation {
    /// New session with OS-seeded randomness, in the freeze phase of round 1.
    pub fn new(config: SimConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// New session with a fixed RNG seed.
    pub fn with_seed(config: SimConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// New session on an explicit map.
    pub fn with_map(mut config: SimConfig, map: GameMap, seed: u64) -> Self {
        config.validate();
        Self::from_parts(config, map, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut config: SimConfig, rng: StdRng) -> Self {
        config.validate();
        let map = load_map(&config.map);
        Self::from_parts(config, map, rng)
    }

    fn from_parts(config: SimConfig, map: GameMap, rng: StdRng) -> Self {
        let state = MatchState {
            clock: 0.0,
            player_team: config.team,
            difficulty: config.difficulty,
            agents: Vec::new(),
            bullets: Vec::new(),
            effects: Effects::default(),
            camera: Camera::default(),
            round: RoundState::new(config.max_rounds),
            carried: CarriedStats {
                money: config.starting_money,
                kills: 0,
                deaths: 0,
            },
            score: 0,
            survival_time: 0.0,
        };
        tracing::info!(
            map = %map.name,
            team = %config.team,
            difficulty = ?config.difficulty,
            max_rounds = config.max_rounds,
            "Session created"
        );
        let mut sim = Self {
            map,
            config,
            state,
            rng,
            input: PlayerInput::default(),
            buy_menu_open: false,
            scoreboard_open: false,
            paused: false,
            autopilot: false,
            events: Vec::new(),
        };
        sim.start_round();
        if let Some(p) = sim.state.agents.get(PLAYER.index()) {
            sim.input.aim_angle = p.angle;
        }
        sim
    }

    /// Advance the match by `dt` seconds (clamped to `max_frame_dt`) and return
    /// the events it produced. A paused or finished session does nothing.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.paused {
            return Vec::new();
        }
        if self.state.round.phase == RoundPhase::GameOver {
            return std::mem::take(&mut self.events);
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_dt)
        } else {
            0.0
        };

        self.state.clock += dt;
        self.state.effects.decay_shake(&mut self.rng);
        match self.state.round.phase {
            RoundPhase::Freeze => self.tick_freeze(dt),
            RoundPhase::Live => self.tick_live(dt),
            RoundPhase::End => self.tick_round_end(dt),
            RoundPhase::GameOver => {},
        }
        std::mem::take(&mut self.events)
    }

    fn tick_live(&mut self, dt: f32) {
        let round = &mut self.state.round;
        round.round_timer -= dt;
        if round.round_timer <= 0.0 && round.bomb.is_none() {
            self.end_round(RoundEndReason::TimeExpired);
            return;
        }
        if self.state.round.bomb.is_some() && self.tick_bomb(dt) {
            return;
        }

        self.update_player(dt, true);
        for i in 1..self.state.agents.len() {
            let id = AgentId(i);
            if !self.state.agents[i].alive {
                continue;
            }
            self.update_bot(id, dt);
            self.finish_reload_if_due(id);
            self.state.agents[i].decay_recoil(dt);
        }
        self.update_bullets(dt);
        self.state.effects.step(dt);
        self.tick_survival(dt);

        if !self.player().is_some_and(|p| p.alive) {
            self.end_game();
            return;
        }
        self.check_elimination();
        self.update_camera();
    }

    /// Drive the human from input, or from the bot brain on autopilot.
    fn update_player(&mut self, dt: f32, live: bool) {
        if !self.player().is_some_and(|p| p.alive) {
            return;
        }
        if self.autopilot {
            if live {
                self.update_bot(PLAYER, dt);
            }
        } else {
            self.drive_player(dt);
            let menus_open = self.buy_menu_open || self.scoreboard_open;
            if live && self.input.fire && !menus_open {
                self.fire_player_weapon();
            }
        }

        self.finish_reload_if_due(PLAYER);
        let clock = self.state.clock;
        let (delay, rate) = (self.config.regen_delay, self.config.regen_rate);
        let player = &mut self.state.agents[PLAYER.index()];
        player.decay_recoil(dt);
        player.regenerate(clock, dt, delay, rate);
    }

    fn drive_player(&mut self, dt: f32) {
        let input = self.input;
        let player = &mut self.state.agents[PLAYER.index()];
        player.steer(input.move_x, input.move_y, input.walk);
        player.angle = input.aim_angle;

        let mut footstep = None;
        if player.moving {
            player.anim_timer += dt;
            let fx = &mut self.state.effects;
            fx.step_timer += dt;
            let interval = if player.walking {
                STEP_INTERVAL_WALK
            } else {
                STEP_INTERVAL_RUN
            };
            if fx.step_timer > interval {
                fx.step_timer = 0.0;
                fx.spawn_dust(player.x, player.y, &mut self.rng);
                footstep = Some(!player.walking);
            }
        }
        player.integrate(&self.map, dt);
        if footstep == Some(true) {
            self.play_at(SoundId::Step, STEP_VOLUME);
        }
    }

    fn update_camera(&mut self) {
        let Some(p) = self.state.agents.get(PLAYER.index()) else {
            return;
        };
        let (x, y) = (p.x, p.y);
        self.state
            .camera
            .follow(x, y, self.map.width, self.map.height);
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn play(&mut self, sound: SoundId) {
        self.emit(GameEvent::sound(sound));
    }

    pub(crate) fn play_at(&mut self, sound: SoundId, volume: f32) {
        self.emit(GameEvent::sound_at(sound, volume));
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn player(&self) -> Option<&Agent> {
        self.state.agents.get(PLAYER.index())
    }

    pub fn input(&self) -> PlayerInput {
        self.input
    }

    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input.sanitized();
    }

    /// Decode a MessagePack [`PlayerInput`]. Malformed payloads are dropped.
    pub fn apply_input_bytes(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        match protocol::decode::<PlayerInput>(bytes) {
            Ok(input) => {
                self.set_input(input);
                Ok(())
            },
            Err(e) => {
                tracing::debug!(error = %e, "Dropped malformed input");
                Err(e)
            },
        }
    }

    /// Encode the published snapshot as MessagePack.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        protocol::encode(&self.state)
    }

    /// Viewport size the camera clamps against.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.state.camera.view_width = width;
            self.state.camera.view_height = height;
        }
    }

    /// Let the bot brain steer the human agent.
    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
    }

    pub fn is_buy_menu_open(&self) -> bool {
        self.buy_menu_open
    }

    pub fn is_scoreboard_open(&self) -> bool {
        self.scoreboard_open
    }
}

impl TacticalGame for Simulation {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "SiteStrike".to_string(),
            description: "Round-based bomb defusal against bots".to_string(),
            max_rounds: self.config.max_rounds,
            team_size: self.config.team_size,
        }
    }

    fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        self.tick(dt)
    }

    fn serialize_state(&self) -> Vec<u8> {
        self.snapshot_bytes().unwrap_or_default()
    }

    fn apply_state(&mut self, state: &[u8]) {
        match protocol::decode::<MatchState>(state) {
            Ok(s) => self.state = s,
            Err(e) => tracing::debug!(error = %e, "Dropped malformed state"),
        }
    }

    fn apply_input(&mut self, input: &[u8]) {
        let _ = self.apply_input_bytes(input);
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_game_over(&self) -> bool {
        self.state.round.phase == RoundPhase::GameOver
    }
}
