use serde::{Deserialize, Serialize};

use sitestrike_core::player::{AgentId, PLAYER_NAME, TeamColor, callsign};
use sitestrike_core::team::Team;

use crate::map::{GameMap, Point};
use crate::weapons::{EquipmentId, WeaponDef, WeaponId, default_pistol};

/// Physical radius of every agent.
pub const AGENT_RADIUS: f32 = 14.0;
/// Recoil accumulator ceiling.
pub const MAX_RECOIL: f32 = 15.0;
/// Recoil shed per second by the human agent.
pub const PLAYER_RECOIL_DECAY: f32 = 10.0;
/// Recoil shed per second by bots.
pub const BOT_RECOIL_DECAY: f32 = 8.0;

/// One owned weapon with its ammunition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutSlot {
    pub weapon: WeaponId,
    pub mag: u32,
    pub reserve: u32,
}

impl LoadoutSlot {
    /// Freshly bought or issued weapon with a full magazine and reserve.
    pub fn full(weapon: WeaponId) -> Self {
        let def = weapon.def();
        Self {
            weapon,
            mag: def.mag_size,
            reserve: def.reserve_ammo,
        }
    }
}

const BARE_KNIFE: LoadoutSlot = LoadoutSlot {
    weapon: WeaponId::Knife,
    mag: 0,
    reserve: 0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotMode {
    /// Walking the waypoint graph.
    Patrol,
    /// Holding a visible enemy as target.
    Engage,
}

/// Per-bot decision state. Also drives the human slot under autopilot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotBrain {
    pub mode: BotMode,
    pub waypoint: usize,
    pub think_timer: f32,
    pub target: Option<AgentId>,
    pub stuck_timer: f32,
    pub last_x: f32,
    pub last_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub team: Team,
    pub is_player: bool,
    pub name: String,

    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,

    pub health: f32,
    pub max_health: f32,
    pub armor: f32,
    pub helmet: bool,
    pub alive: bool,

    pub loadout: Vec<LoadoutSlot>,
    pub current: usize,
    pub utility: Vec<EquipmentId>,
    pub has_defuse_kit: bool,
    pub has_bomb: bool,

    pub money: u32,
    pub kills: u32,
    pub deaths: u32,

    /// Simulation-clock timestamps.
    pub last_shot: Option<f32>,
    pub reload_end: Option<f32>,
    pub last_damage: Option<f32>,

    pub recoil: f32,
    pub moving: bool,
    pub walking: bool,
    pub anim_timer: f32,

    pub brain: BotBrain,
}

impl Agent {
    /// Fresh agent at the start of a round: knife plus the team pistol.
    pub fn spawn(
        id: AgentId,
        team: Team,
        is_player: bool,
        map: &GameMap,
        max_health: f32,
        money: u32,
    ) -> Self {
        let Point { x, y } = map.spawn_for(team, id.index());
        let name = if is_player {
            PLAYER_NAME.to_string()
        } else {
            callsign(team, id.index()).to_string()
        };
        Self {
            id,
            team,
            is_player,
            name,
            x,
            y,
            angle: match team {
                Team::Ct => std::f32::consts::PI,
                Team::T => 0.0,
            },
            vx: 0.0,
            vy: 0.0,
            radius: AGENT_RADIUS,
            health: max_health,
            max_health,
            armor: 0.0,
            helmet: false,
            alive: true,
            loadout: vec![
                LoadoutSlot::full(WeaponId::Knife),
                LoadoutSlot::full(default_pistol(team)),
            ],
            current: 1,
            utility: Vec::new(),
            has_defuse_kit: team == Team::Ct,
            has_bomb: false,
            money,
            kills: 0,
            deaths: 0,
            last_shot: None,
            reload_end: None,
            last_damage: None,
            recoil: 0.0,
            moving: false,
            walking: false,
            anim_timer: 0.0,
            brain: BotBrain {
                mode: BotMode::Patrol,
                waypoint: map.nearest_waypoint(x, y),
                think_timer: 0.0,
                target: None,
                stuck_timer: 0.0,
                last_x: x,
                last_y: y,
            },
        }
    }

    pub fn color(&self) -> TeamColor {
        TeamColor::for_team(self.team)
    }

    /// Equipped weapon slot.
    pub fn slot(&self) -> &LoadoutSlot {
        self.loadout.get(self.current).unwrap_or(&BARE_KNIFE)
    }

    pub fn slot_mut(&mut self) -> Option<&mut LoadoutSlot> {
        self.loadout.get_mut(self.current)
    }

    pub fn weapon(&self) -> &'static WeaponDef {
        self.slot().weapon.def()
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_end.is_some()
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }

    /// Equip the first weapon in `slot` (1 primary, 2 pistol, 3 melee).
    /// Switching cancels any reload in progress.
    pub fn equip_slot(&mut self, slot: u8) -> bool {
        let Some(index) = self
            .loadout
            .iter()
            .position(|s| s.weapon.def().slot() == slot)
        else {
            return false;
        };
        self.current = index;
        self.reload_end = None;
        true
    }

    /// Add or replace a weapon and equip it with full ammunition.
    ///
    /// An owned non-melee weapon of the same category or slot is replaced;
    /// the knife is never replaced.
    pub fn give_weapon(&mut self, weapon: WeaponId) {
        let def = weapon.def();
        let existing = self.loadout.iter().position(|s| {
            let owned = s.weapon.def();
            !owned.is_melee() && (owned.category == def.category || owned.slot() == def.slot())
        });
        match existing {
            Some(index) => {
                self.loadout[index] = LoadoutSlot::full(weapon);
                self.current = index;
            },
            None => {
                self.loadout.push(LoadoutSlot::full(weapon));
                self.current = self.loadout.len() - 1;
            },
        }
        self.reload_end = None;
    }

    /// Commit velocity one axis at a time so agents slide along walls.
    pub fn integrate(&mut self, map: &GameMap, dt: f32) {
        let nx = self.x + self.vx * dt;
        let ny = self.y + self.vy * dt;
        if map.collide(nx, self.y, self.radius).is_none() && map.in_bounds(nx, self.y, self.radius)
        {
            self.x = nx;
        }
        if map.collide(self.x, ny, self.radius).is_none() && map.in_bounds(self.x, ny, self.radius)
        {
            self.y = ny;
        }
    }

    /// Set velocity from a directional input. Zero input stops the agent.
    pub fn steer(&mut self, move_x: f32, move_y: f32, walk: bool) {
        let mut speed = self.weapon().move_speed;
        self.walking = walk;
        if walk {
            speed *= 0.5;
        }
        let len = (move_x * move_x + move_y * move_y).sqrt();
        if len > f32::EPSILON {
            self.vx = move_x / len * speed;
            self.vy = move_y / len * speed;
            self.moving = true;
        } else {
            self.vx = 0.0;
            self.vy = 0.0;
            self.moving = false;
        }
    }

    /// Heal after `delay` seconds without damage, capped at max health.
    pub fn regenerate(&mut self, clock: f32, dt: f32, delay: f32, rate: f32) {
        if !self.alive || self.health >= self.max_health {
            return;
        }
        let rested = self.last_damage.is_none_or(|t| clock - t > delay);
        if rested {
            self.health = (self.health + rate * dt).min(self.max_health);
        }
    }

    pub fn decay_recoil(&mut self, dt: f32) {
        let rate = if self.is_player {
            PLAYER_RECOIL_DECAY
        } else {
            BOT_RECOIL_DECAY
        };
        self.recoil = (self.recoil - rate * dt).max(0.0);
    }

    pub fn add_recoil(&mut self, amount: f32) {
        self.recoil = (self.recoil + amount).min(MAX_RECOIL);
    }

    /// Mark dead with zero health.
    pub fn kill(&mut self) {
        self.health = 0.0;
        self.alive = false;
        self.vx = 0.0;
        self.vy = 0.0;
        self.moving = false;
        self.reload_end = None;
    }

    pub fn credit_money(&mut self, amount: u32, cap: u32) {
        self.money = self.money.saturating_add(amount).min(cap);
    }
}
