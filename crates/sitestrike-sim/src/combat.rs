use std::f32::consts::{FRAC_PI_3, PI, TAU};

use rand::Rng;
use smallvec::SmallVec;

use sitestrike_core::events::GameEvent;
use sitestrike_core::player::AgentId;
use sitestrike_core::sound::SoundId;

use crate::Simulation;
use crate::effects::KillFeedEntry;
use crate::scoring;
use crate::weapons::WeaponDef;

/// Share of raw damage soaked up by armor.
pub const ARMOR_ABSORB: f32 = 0.6;
/// Share of raw damage that reaches health through armor.
pub const ARMOR_PASS: f32 = 0.4;
/// Share of raw damage an unhelmeted headshot deals through armor.
pub const UNHELMETED_HEADSHOT: f32 = 0.8;
/// Flat reduction applied to every hit.
pub const GLOBAL_DAMAGE_MULT: f32 = 0.75;
/// Additional reduction for hits on the human agent.
pub const PLAYER_DAMAGE_MULT: f32 = 0.6;
/// Chance that a bullet hit is a headshot.
pub const HEADSHOT_CHANCE: f64 = 0.2;
/// Half-angle of the melee cone.
pub const MELEE_HALF_ANGLE: f32 = FRAC_PI_3;
/// Spread penalty for shooting while moving.
pub const MOVING_SPREAD: f32 = 0.03;

/// Outcome of running raw damage through armor and the global reductions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mitigation {
    pub health_loss: f32,
    pub armor_after: f32,
}

/// Damage mitigation for one hit.
///
/// Armor soaks 60% of the raw value and passes 40% to health; an unhelmeted
/// headshot passes 80% instead. Every hit is then scaled by 0.75, and hits on
/// the human agent by a further 0.6.
pub fn mitigate(raw: f32, armor: f32, helmet: bool, headshot: bool, is_player: bool) -> Mitigation {
    let mut dmg = raw;
    let mut armor_after = armor;
    if armor > 0.0 {
        armor_after = (armor - raw * ARMOR_ABSORB).max(0.0);
        dmg = raw * ARMOR_PASS;
        if headshot && !helmet {
            dmg = raw * UNHELMETED_HEADSHOT;
        }
    }
    dmg *= GLOBAL_DAMAGE_MULT;
    if is_player {
        dmg *= PLAYER_DAMAGE_MULT;
    }
    Mitigation {
        health_loss: dmg.max(0.0),
        armor_after,
    }
}

/// Full cone width for a human shot.
pub fn player_spread(accuracy: f32, moving: bool, recoil: f32) -> f32 {
    (1.0 - accuracy) * 0.15 + if moving { MOVING_SPREAD } else { 0.0 } + recoil * 0.003
}

/// Full cone width for a bot shot.
pub fn bot_spread(accuracy: f32, accuracy_mult: f32) -> f32 {
    (1.0 - accuracy * accuracy_mult).max(0.0) * 0.2
}

/// Absolute difference between two angles, wrapped to `[0, PI]`.
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI { TAU - d } else { d }
}

/// Whether a target at offset `(dx, dy)` sits inside the frontal melee cone.
pub fn in_melee_cone(facing: f32, dx: f32, dy: f32) -> bool {
    angle_diff(dy.atan2(dx), facing) < MELEE_HALF_ANGLE
}

/// Move ammo from reserve into the magazine. Returns `(mag, reserve)`.
pub fn reload_transfer(mag: u32, reserve: u32, mag_size: u32) -> (u32, u32) {
    let needed = mag_size.saturating_sub(mag);
    let moved = needed.min(reserve);
    (mag + moved, reserve - moved)
}

fn perturb<R: Rng>(rng: &mut R, angle: f32, spread: f32) -> f32 {
    angle + (rng.random::<f32>() - 0.5) * spread
}

impl Simulation {
    /// Human trigger pull. Returns whether a shot or swing happened.
    pub(crate) fn fire_player_weapon(&mut self) -> bool {
        let clock = self.state.clock;
        let Some(agent) = self.state.agents.get(crate::PLAYER.index()) else {
            return false;
        };
        if !agent.alive || agent.is_reloading() {
            return false;
        }
        let def = agent.weapon();
        if agent.last_shot.is_some_and(|t| clock - t < def.fire_interval) {
            return false;
        }

        if def.is_melee() {
            self.state.agents[crate::PLAYER.index()].last_shot = Some(clock);
            self.play(def.sound());
            self.melee_attack(crate::PLAYER, def);
            return true;
        }

        if agent.slot().mag == 0 {
            self.play(SoundId::Empty);
            if self.begin_reload(crate::PLAYER) {
                self.play(SoundId::Reload);
            }
            return false;
        }

        let agent = &mut self.state.agents[crate::PLAYER.index()];
        agent.last_shot = Some(clock);
        if let Some(slot) = agent.slot_mut() {
            slot.mag -= 1;
        }
        agent.add_recoil(def.recoil);
        let (x, y, angle, moving, recoil) = (agent.x, agent.y, agent.angle, agent.moving, agent.recoil);

        self.play(def.sound());
        self.state.effects.add_shake(def.recoil * 0.8, 8.0);

        for _ in 0..def.pellets.max(1) {
            let spread = player_spread(def.accuracy, moving, recoil);
            let shot = perturb(&mut self.rng, angle, spread);
            self.fire_bullet(crate::PLAYER, shot, def);
        }
        self.state.effects.add_muzzle_flash(x, y, angle);
        self.state.effects.spawn_shell_casing(x, y, angle, &mut self.rng);

        if !def.automatic {
            self.input.fire = false;
        }
        true
    }

    /// Bot trigger pull, scaled by the difficulty preset (never for the human slot).
    pub(crate) fn fire_bot_weapon(&mut self, id: AgentId) -> bool {
        let clock = self.state.clock;
        let difficulty = self.state.difficulty;
        let Some(agent) = self.state.agents.get(id.index()) else {
            return false;
        };
        if !agent.alive || agent.is_reloading() {
            return false;
        }
        let (fire_mult, acc_mult, volume) = if agent.is_player {
            (1.0, 1.0, 1.0)
        } else {
            (
                difficulty.fire_interval_mult(),
                difficulty.accuracy_mult(),
                0.25,
            )
        };
        let def = agent.weapon();
        if agent.last_shot.is_some_and(|t| clock - t < def.fire_interval * fire_mult) {
            return false;
        }
        if def.is_melee() {
            self.state.agents[id.index()].last_shot = Some(clock);
            self.melee_attack(id, def);
            return true;
        }
        if agent.slot().mag == 0 {
            return false;
        }

        let agent = &mut self.state.agents[id.index()];
        agent.last_shot = Some(clock);
        if let Some(slot) = agent.slot_mut() {
            slot.mag -= 1;
        }
        let (x, y, angle) = (agent.x, agent.y, agent.angle);

        let shot = perturb(&mut self.rng, angle, bot_spread(def.accuracy, acc_mult));
        self.fire_bullet(id, shot, def);
        self.state.effects.add_muzzle_flash(x, y, angle);
        self.play_at(def.sound(), volume);
        true
    }

    /// Hit every living enemy inside weapon range and the frontal cone.
    pub(crate) fn melee_attack(&mut self, attacker: AgentId, def: &'static WeaponDef) {
        let Some(a) = self.state.agents.get(attacker.index()) else {
            return;
        };
        let (ax, ay, facing, team) = (a.x, a.y, a.angle, a.team);
        let victims: SmallVec<[AgentId; 4]> = self
            .state
            .agents
            .iter()
            .filter(|t| t.id != attacker && t.team != team && t.alive)
            .filter(|t| {
                let dx = t.x - ax;
                let dy = t.y - ay;
                (dx * dx + dy * dy).sqrt() <= def.range && in_melee_cone(facing, dx, dy)
            })
            .map(|t| t.id)
            .collect();
        for victim in victims {
            self.damage_agent(victim, Some(attacker), def.damage, false, def.name);
        }
    }

    /// Start a reload if the equipped weapon can take one.
    pub(crate) fn begin_reload(&mut self, id: AgentId) -> bool {
        let clock = self.state.clock;
        let Some(agent) = self.state.agents.get_mut(id.index()) else {
            return false;
        };
        let def = agent.weapon();
        let slot = agent.slot();
        if !agent.alive
            || agent.is_reloading()
            || def.is_melee()
            || slot.mag >= def.mag_size
            || slot.reserve == 0
        {
            return false;
        }
        agent.reload_end = Some(clock + def.reload_time);
        true
    }

    /// Complete a reload once the clock reaches its end time.
    pub(crate) fn finish_reload_if_due(&mut self, id: AgentId) {
        let clock = self.state.clock;
        let Some(agent) = self.state.agents.get_mut(id.index()) else {
            return;
        };
        let Some(end) = agent.reload_end else {
            return;
        };
        if clock < end {
            return;
        }
        agent.reload_end = None;
        let mag_size = agent.weapon().mag_size;
        if let Some(slot) = agent.slot_mut() {
            (slot.mag, slot.reserve) = reload_transfer(slot.mag, slot.reserve, mag_size);
        }
    }

    /// Apply one hit to `target`, resolving death, rewards and feedback.
    pub(crate) fn damage_agent(
        &mut self,
        target: AgentId,
        attacker: Option<AgentId>,
        raw: f32,
        headshot: bool,
        weapon: &str,
    ) {
        let clock = self.state.clock;
        let Some(victim) = self.state.agents.get_mut(target.index()) else {
            return;
        };
        if !victim.alive {
            return;
        }
        let hit = mitigate(raw, victim.armor, victim.helmet, headshot, victim.is_player);
        victim.armor = hit.armor_after;
        victim.health = (victim.health - hit.health_loss).max(0.0);
        victim.last_damage = Some(clock);
        let (vx, vy, victim_is_player) = (victim.x, victim.y, victim.is_player);
        let died = victim.health <= 0.0;

        self.play(if headshot {
            SoundId::Headshot
        } else {
            SoundId::Hit
        });
        self.state.effects.spawn_blood(vx, vy, &mut self.rng);
        if victim_is_player {
            self.state.effects.add_shake(4.0, 10.0);
        }
        if died {
            self.resolve_kill(target, attacker, headshot, weapon);
        }
    }

    fn resolve_kill(
        &mut self,
        target: AgentId,
        attacker: Option<AgentId>,
        headshot: bool,
        weapon: &str,
    ) {
        let cap = self.config.money_cap;
        let victim = &mut self.state.agents[target.index()];
        victim.kill();
        victim.deaths += 1;
        let (vx, vy) = (victim.x, victim.y);
        let victim_name = victim.name.clone();
        let victim_team = victim.team;
        if victim.is_player {
            self.state.carried.deaths = victim.deaths;
        }

        self.play(SoundId::Death);
        self.state.effects.add_blood_decal(vx, vy);

        let mut killer_label = None;
        if let Some(killer) = attacker.and_then(|k| self.state.agents.get_mut(k.index())) {
            killer.kills += 1;
            let reward = killer.weapon().kill_reward;
            killer.credit_money(reward, cap);
            killer_label = Some((killer.name.clone(), killer.team));
            if killer.is_player {
                self.state.carried.kills = killer.kills;
                self.state.carried.money = killer.money;
                let points = scoring::kill_score(headshot);
                let (label, tone) = scoring::kill_popup(points, headshot);
                self.add_score(points, Some((vx, vy)), label, tone);
            }
        }

        tracing::debug!(
            victim = %victim_name,
            killer = killer_label.as_ref().map(|(n, _)| n.as_str()).unwrap_or("-"),
            weapon,
            headshot,
            "Agent killed"
        );
        self.state.effects.push_kill(KillFeedEntry {
            killer: killer_label,
            victim: victim_name,
            victim_team,
            weapon: weapon.to_string(),
            headshot,
            age: 0.0,
        });
        self.emit(GameEvent::Kill {
            killer: attacker,
            victim: target,
            weapon: weapon.to_string(),
            headshot,
        });
    }
}
