use rand::Rng;
use serde::{Deserialize, Serialize};

use sitestrike_core::player::AgentId;
use sitestrike_core::team::Team;

use crate::Simulation;
use crate::combat::HEADSHOT_CHANCE;
use crate::weapons::{WeaponDef, WeaponId};

/// Bullet travel speed (units/s).
pub const BULLET_SPEED: f32 = 2000.0;
/// Spawn distance ahead of the shooter.
pub const MUZZLE_OFFSET: f32 = 20.0;
/// Added to the target radius for the hit test.
pub const HIT_PADDING: f32 = 4.0;
/// Radius used for bullet-wall collision.
pub const BULLET_RADIUS: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub range: f32,
    pub traveled: f32,
    pub damage: f32,
    pub headshot_mult: f32,
    pub penetration: f32,
    pub owner: AgentId,
    pub team: Team,
    pub weapon: WeaponId,
}

impl Bullet {
    pub fn new(owner: AgentId, team: Team, x: f32, y: f32, angle: f32, def: &WeaponDef) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: x + cos * MUZZLE_OFFSET,
            y: y + sin * MUZZLE_OFFSET,
            vx: cos * BULLET_SPEED,
            vy: sin * BULLET_SPEED,
            range: def.range,
            traveled: 0.0,
            damage: def.damage,
            headshot_mult: def.headshot_mult,
            penetration: def.penetration,
            owner,
            team,
            weapon: def.id,
        }
    }
}

impl Simulation {
    pub(crate) fn fire_bullet(&mut self, shooter: AgentId, angle: f32, def: &WeaponDef) {
        let Some(s) = self.state.agents.get(shooter.index()) else {
            return;
        };
        let bullet = Bullet::new(shooter, s.team, s.x, s.y, angle, def);
        self.state.bullets.push(bullet);
    }

    /// Advance every bullet; the first living enemy touched takes the hit.
    pub(crate) fn update_bullets(&mut self, dt: f32) {
        let bullets = std::mem::take(&mut self.state.bullets);
        let mut survivors = Vec::with_capacity(bullets.len());

        for mut b in bullets {
            let step_x = b.vx * dt;
            let step_y = b.vy * dt;
            b.x += step_x;
            b.y += step_y;
            b.traveled += (step_x * step_x + step_y * step_y).sqrt();
            if b.traveled > b.range {
                continue;
            }
            if self.map.collide(b.x, b.y, BULLET_RADIUS).is_some() {
                self.state.effects.spawn_wall_hit(b.x, b.y, &mut self.rng);
                continue;
            }
            if !self.map.in_bounds(b.x, b.y, 0.0) {
                continue;
            }

            let target = self.state.agents.iter().find(|a| {
                if a.id == b.owner || a.team == b.team || !a.alive {
                    return false;
                }
                let reach = a.radius + HIT_PADDING;
                (a.x - b.x).powi(2) + (a.y - b.y).powi(2) < reach * reach
            });
            if let Some(target) = target.map(|a| a.id) {
                let headshot = self.rng.random_bool(HEADSHOT_CHANCE);
                let raw = if headshot {
                    b.damage * b.headshot_mult
                } else {
                    b.damage
                };
                let attacker = self.state.agents.get(b.owner.index()).map(|a| a.id);
                self.damage_agent(target, attacker, raw, headshot, b.weapon.def().name);
                continue;
            }
            survivors.push(b);
        }

        self.state.bullets = survivors;
    }
}
