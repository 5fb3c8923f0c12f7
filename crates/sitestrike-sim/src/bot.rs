//! Bot decision making: periodic target selection, engagement, waypoint
//! patrol and stuck recovery. The same brain drives the human slot when the
//! session runs on autopilot.

use std::f32::consts::FRAC_PI_2;

use rand::Rng;
use smallvec::SmallVec;

use sitestrike_core::player::AgentId;
use sitestrike_core::team::{Difficulty, Team};

use crate::Simulation;
use crate::agent::{Agent, BotMode};
use crate::map::Point;
use crate::round::RoundPhase;
use crate::weapons::{EquipmentId, WeaponCategory, WeaponId, available_weapons};

pub const PATROL_SPEED: f32 = 170.0;
pub const ADVANCE_SPEED: f32 = 130.0;
pub const RETREAT_SPEED: f32 = 80.0;
/// Beyond this distance an engaging bot closes in.
pub const ENGAGE_FAR: f32 = 200.0;
/// Inside this distance an engaging bot backs off.
pub const ENGAGE_NEAR: f32 = 100.0;
pub const WAYPOINT_ARRIVAL: f32 = 40.0;
/// Chance of picking the link closest to the team anchor at a junction.
pub const ANCHOR_BIAS: f64 = 0.6;
pub const STUCK_TIME: f32 = 0.8;
pub const NUDGE_DISTANCE: f32 = 30.0;
/// CTs within this distance of a visible planted bomb walk straight to it.
pub const BOMB_APPROACH: f32 = 300.0;
/// Money needed before a bot considers a rifle.
pub const RIFLE_BUDGET: u32 = 2000;
/// Money needed before a bot buys armor and helmet.
pub const ARMOR_BUDGET: u32 = 1000;

/// Round-start purchases: a random affordable rifle, then armor with helmet.
pub fn bot_buy<R: Rng>(bot: &mut Agent, rng: &mut R) {
    let rifles: SmallVec<[WeaponId; 4]> = available_weapons(bot.team)
        .filter(|w| w.category == WeaponCategory::Rifle && w.price <= bot.money)
        .map(|w| w.id)
        .collect();
    if bot.money >= RIFLE_BUDGET && !rifles.is_empty() {
        let pick = rifles[rng.random_range(0..rifles.len())];
        bot.money -= pick.def().price;
        bot.give_weapon(pick);
    }
    let armor = EquipmentId::KevlarHelmet.price();
    if bot.money >= ARMOR_BUDGET.max(armor) {
        bot.armor = 100.0;
        bot.helmet = true;
        bot.money -= armor;
    }
}

fn think_delay<R: Rng>(rng: &mut R) -> f32 {
    0.2 + rng.random::<f32>() * 0.4
}

impl Simulation {
    /// One AI step for `id`. Movement is integrated here.
    pub(crate) fn update_bot(&mut self, id: AgentId, dt: f32) {
        let i = id.index();
        let Some(bot) = self.state.agents.get_mut(i) else {
            return;
        };
        if !bot.alive {
            return;
        }

        bot.brain.think_timer -= dt;
        if bot.brain.think_timer <= 0.0 {
            bot.brain.think_timer = think_delay(&mut self.rng);
            self.bot_think(id);
        }
        self.try_bot_plant(id);

        let defusing = self
            .state
            .round
            .bomb
            .as_ref()
            .and_then(|b| b.defuse.as_ref())
            .is_some_and(|d| d.defuser == id);

        let target = self.state.agents[i]
            .brain
            .target
            .and_then(|t| self.state.agents.get(t.index()))
            .filter(|t| t.alive)
            .map(|t| (t.x, t.y));

        if defusing {
            let bot = &mut self.state.agents[i];
            bot.vx = 0.0;
            bot.vy = 0.0;
            bot.moving = false;
        } else if let Some((tx, ty)) = target {
            let bot = &mut self.state.agents[i];
            let dx = tx - bot.x;
            let dy = ty - bot.y;
            bot.angle = dy.atan2(dx);
            let dist = (dx * dx + dy * dy).sqrt();
            if self.map.has_line_of_sight(bot.x, bot.y, tx, ty) {
                self.fire_bot_weapon(id);
                let bot = &mut self.state.agents[i];
                let (sin, cos) = bot.angle.sin_cos();
                let speed = if dist > ENGAGE_FAR {
                    ADVANCE_SPEED
                } else if dist < ENGAGE_NEAR {
                    -RETREAT_SPEED
                } else {
                    0.0
                };
                bot.vx = cos * speed;
                bot.vy = sin * speed;
                bot.moving = speed != 0.0;
            } else {
                bot.brain.target = None;
                bot.brain.mode = BotMode::Patrol;
                self.bot_patrol(id);
            }
        } else {
            let bot = &mut self.state.agents[i];
            bot.brain.target = None;
            bot.brain.mode = BotMode::Patrol;
            self.bot_patrol(id);
        }

        let bot = &mut self.state.agents[i];
        bot.integrate(&self.map, dt);
        if bot.moving {
            bot.anim_timer += dt;
        }
        if defusing {
            // The defuser holds still until the defuse ends.
            bot.brain.stuck_timer = 0.0;
            bot.brain.last_x = bot.x;
            bot.brain.last_y = bot.y;
        } else {
            self.check_stuck(id, dt);
        }
    }

    /// Periodic decision: pick the nearest visible enemy, reload, start a defuse.
    fn bot_think(&mut self, id: AgentId) {
        let i = id.index();
        let bot = &self.state.agents[i];
        // Autopilot keeps the human at the default vision range.
        let vision = if bot.is_player {
            Difficulty::Normal.vision_range()
        } else {
            self.state.difficulty.vision_range()
        };
        let (bx, by, team) = (bot.x, bot.y, bot.team);

        let target = self
            .state
            .agents
            .iter()
            .filter(|e| e.team != team && e.alive)
            .map(|e| (e.id, e.distance_to(bx, by), e.x, e.y))
            .filter(|&(_, d, ex, ey)| d < vision && self.map.has_line_of_sight(bx, by, ex, ey))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, ..)| id);

        let bot = &mut self.state.agents[i];
        bot.brain.target = target;
        bot.brain.mode = if target.is_some() {
            BotMode::Engage
        } else {
            BotMode::Patrol
        };

        if bot.slot().mag == 0 && !bot.weapon().is_melee() && self.begin_reload(id) {
            tracing::trace!(bot = %self.state.agents[i].name, "Bot reloading");
        }

        if team == Team::Ct && target.is_none() {
            let in_range = self.state.round.bomb.as_ref().is_some_and(|b| {
                b.defuse.is_none()
                    && self.state.agents[i].distance_to(b.x, b.y) < self.config.defuse_range
            });
            if in_range {
                self.start_defuse(id);
            }
        }
    }

    fn try_bot_plant(&mut self, id: AgentId) {
        let Some(bot) = self.state.agents.get(id.index()) else {
            return;
        };
        if bot.team == Team::T
            && bot.has_bomb
            && self.state.round.bomb.is_none()
            && self.state.round.phase == RoundPhase::Live
            && self.map.site_at(bot.x, bot.y).is_some()
        {
            self.plant_bomb(id);
        }
    }

    /// Walk the waypoint graph, biased toward the team's objective.
    fn bot_patrol(&mut self, id: AgentId) {
        let nav = &self.map.nav;
        let bomb = self.state.round.bomb.as_ref().map(|b| Point { x: b.x, y: b.y });
        let bot = &mut self.state.agents[id.index()];
        if nav.is_empty() {
            bot.vx = 0.0;
            bot.vy = 0.0;
            bot.moving = false;
            return;
        }

        if bot.team == Team::Ct
            && let Some(bomb) = bomb
        {
            let dist = bot.distance_to(bomb.x, bomb.y);
            if dist < BOMB_APPROACH && self.map.has_line_of_sight(bot.x, bot.y, bomb.x, bomb.y) {
                let dx = bomb.x - bot.x;
                let dy = bomb.y - bot.y;
                bot.angle = dy.atan2(dx);
                if dist < self.config.defuse_range * 0.5 {
                    bot.vx = 0.0;
                    bot.vy = 0.0;
                    bot.moving = false;
                } else {
                    bot.vx = dx / dist * PATROL_SPEED;
                    bot.vy = dy / dist * PATROL_SPEED;
                    bot.moving = true;
                }
                return;
            }
        }

        if bot.brain.waypoint >= nav.len() {
            bot.brain.waypoint = self.map.nearest_waypoint(bot.x, bot.y);
        }
        let wp = &nav[bot.brain.waypoint];
        let dx = wp.x - bot.x;
        let dy = wp.y - bot.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < WAYPOINT_ARRIVAL {
            let links = &wp.links;
            if links.is_empty() {
                return;
            }
            let anchor = match (bot.team, bomb) {
                (Team::Ct, Some(bomb)) => bomb,
                (team, _) => self.map.anchor(team),
            };
            let next = if links.len() > 1 && self.rng.random_bool(ANCHOR_BIAS) {
                links
                    .iter()
                    .copied()
                    .min_by(|&a, &b| {
                        let da = anchor.distance_to(nav[a].x, nav[a].y);
                        let db = anchor.distance_to(nav[b].x, nav[b].y);
                        da.total_cmp(&db)
                    })
                    .unwrap_or(links[0])
            } else {
                links[self.rng.random_range(0..links.len())]
            };
            bot.brain.waypoint = next;
            // Velocity carries over until the next step re-aims.
            return;
        }

        bot.angle = dy.atan2(dx);
        bot.vx = dx / dist * PATROL_SPEED;
        bot.vy = dy / dist * PATROL_SPEED;
        bot.moving = true;
    }

    /// Sidestep and re-seek the graph after staying in place too long.
    ///
    /// Only displacement counts: a bot holding its ground in a fight is
    /// nudged the same as one pushing into a wall.
    fn check_stuck(&mut self, id: AgentId, dt: f32) {
        let map = &self.map;
        let bot = &mut self.state.agents[id.index()];
        let still = (bot.x - bot.brain.last_x).abs() < 1.0 && (bot.y - bot.brain.last_y).abs() < 1.0;
        if still {
            bot.brain.stuck_timer += dt;
            if bot.brain.stuck_timer > STUCK_TIME {
                let turn = if self.rng.random_bool(0.5) {
                    FRAC_PI_2
                } else {
                    -FRAC_PI_2
                };
                let (sin, cos) = (bot.angle + turn).sin_cos();
                let nx = bot.x + cos * NUDGE_DISTANCE;
                let ny = bot.y + sin * NUDGE_DISTANCE;
                if map.collide(nx, ny, bot.radius).is_none() && map.in_bounds(nx, ny, bot.radius) {
                    bot.x = nx;
                    bot.y = ny;
                }
                bot.brain.waypoint = map.nearest_waypoint(bot.x, bot.y);
                bot.brain.stuck_timer = 0.0;
                tracing::trace!(bot = %bot.name, waypoint = bot.brain.waypoint, "Bot unstuck");
            }
        } else {
            bot.brain.stuck_timer = 0.0;
        }
        bot.brain.last_x = bot.x;
        bot.brain.last_y = bot.y;
    }
}
