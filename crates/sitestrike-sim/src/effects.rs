//! Transient presentation state: particles, decals, flashes, feeds, camera.
//!
//! Nothing here feeds back into gameplay. It is simulated alongside the match
//! so renderers only need to draw what the snapshot carries.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sitestrike_core::team::Team;

/// Per-tick velocity damping applied to particles.
pub const PARTICLE_DAMPING: f32 = 0.92;
/// Decal list length that triggers pruning.
pub const MAX_DECALS: usize = 100;
/// Oldest decals dropped when the cap is exceeded.
pub const DECAL_PRUNE: usize = 20;
pub const MUZZLE_FLASH_LIFE: f32 = 0.06;
pub const KILL_FEED_LIFE: f32 = 5.0;
pub const KILL_FEED_MAX: usize = 5;
pub const POPUP_LIFE: f32 = 1.5;
/// Per-tick screen shake decay.
pub const SHAKE_DECAY: f32 = 0.9;
/// Camera follow factor per tick.
pub const CAMERA_LERP: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Dust,
    ShellCasing,
    Blood,
    Debris,
    Explosion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecalKind {
    Blood,
    BulletHole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decal {
    pub kind: DecalKind,
    pub x: f32,
    pub y: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuzzleFlash {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub life: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillFeedEntry {
    /// `None` for deaths without an attacker (bomb blast).
    pub killer: Option<(String, Team)>,
    pub victim: String,
    pub victim_team: Team,
    pub weapon: String,
    pub headshot: bool,
    pub age: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupTone {
    Kill,
    Headshot,
    RoundWin,
    Survival,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePopup {
    /// World position for kill popups; `None` means screen-centered.
    pub anchor: Option<(f32, f32)>,
    pub text: String,
    pub tone: PopupTone,
    pub age: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shake {
    pub intensity: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub view_width: f32,
    pub view_height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            view_width: 1280.0,
            view_height: 720.0,
        }
    }
}

impl Camera {
    /// Ease toward centering on `(x, y)`, then clamp to the map.
    pub fn follow(&mut self, x: f32, y: f32, map_width: f32, map_height: f32) {
        let tx = x - self.view_width / 2.0;
        let ty = y - self.view_height / 2.0;
        self.x += (tx - self.x) * CAMERA_LERP;
        self.y += (ty - self.y) * CAMERA_LERP;
        self.x = self.x.min(map_width - self.view_width).max(0.0);
        self.y = self.y.min(map_height - self.view_height).max(0.0);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub decals: Vec<Decal>,
    pub muzzle_flashes: Vec<MuzzleFlash>,
    pub kill_feed: Vec<KillFeedEntry>,
    pub popups: Vec<ScorePopup>,
    pub shake: Shake,
    /// Time since the last footstep of the human agent.
    pub step_timer: f32,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            decals: Vec::new(),
            muzzle_flashes: Vec::new(),
            kill_feed: Vec::new(),
            popups: Vec::new(),
            shake: Shake {
                intensity: 0.0,
                x: 0.0,
                y: 0.0,
            },
            step_timer: 0.0,
        }
    }
}

fn jitter<R: Rng>(rng: &mut R, spread: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * spread
}

impl Effects {
    /// Clear world-space effects at a round boundary. Feeds and popups persist.
    pub fn reset_world(&mut self) {
        self.particles.clear();
        self.decals.clear();
        self.muzzle_flashes.clear();
    }

    pub fn add_shake(&mut self, amount: f32, cap: f32) {
        self.shake.intensity = (self.shake.intensity + amount).min(cap);
    }

    pub fn decay_shake<R: Rng>(&mut self, rng: &mut R) {
        self.shake.intensity *= SHAKE_DECAY;
        self.shake.x = jitter(rng, self.shake.intensity);
        self.shake.y = jitter(rng, self.shake.intensity);
    }

    pub fn spawn_blood<R: Rng>(&mut self, x: f32, y: f32, rng: &mut R) {
        for _ in 0..10 {
            self.particles.push(Particle {
                kind: ParticleKind::Blood,
                x,
                y,
                vx: jitter(rng, 250.0),
                vy: jitter(rng, 250.0),
                life: 0.3 + rng.random::<f32>() * 0.4,
                size: rng.random_range(2.0..4.0f32).floor(),
            });
        }
    }

    pub fn spawn_wall_hit<R: Rng>(&mut self, x: f32, y: f32, rng: &mut R) {
        for _ in 0..5 {
            self.particles.push(Particle {
                kind: ParticleKind::Debris,
                x,
                y,
                vx: jitter(rng, 120.0),
                vy: jitter(rng, 120.0),
                life: 0.2 + rng.random::<f32>() * 0.15,
                size: 2.0,
            });
        }
        self.decals.push(Decal {
            kind: DecalKind::BulletHole,
            x,
            y,
            alpha: 0.5,
        });
    }

    pub fn spawn_explosion<R: Rng>(&mut self, x: f32, y: f32, rng: &mut R) {
        for _ in 0..60 {
            self.particles.push(Particle {
                kind: ParticleKind::Explosion,
                x,
                y,
                vx: jitter(rng, 800.0),
                vy: jitter(rng, 800.0),
                life: 0.8 + rng.random::<f32>() * 0.8,
                size: 3.0 + rng.random::<f32>() * 3.0,
            });
        }
    }

    pub fn spawn_shell_casing<R: Rng>(&mut self, x: f32, y: f32, angle: f32, rng: &mut R) {
        let a = angle + std::f32::consts::FRAC_PI_2;
        self.particles.push(Particle {
            kind: ParticleKind::ShellCasing,
            x: x + a.cos() * 8.0,
            y: y + a.sin() * 8.0,
            vx: a.cos() * 80.0 + jitter(rng, 40.0),
            vy: a.sin() * 80.0 + jitter(rng, 40.0),
            life: 0.6,
            size: 2.0,
        });
    }

    pub fn spawn_dust<R: Rng>(&mut self, x: f32, y: f32, rng: &mut R) {
        self.particles.push(Particle {
            kind: ParticleKind::Dust,
            x,
            y: y + 10.0,
            vx: jitter(rng, 30.0),
            vy: jitter(rng, 10.0),
            life: 0.4,
            size: 3.0,
        });
    }

    pub fn add_blood_decal(&mut self, x: f32, y: f32) {
        self.decals.push(Decal {
            kind: DecalKind::Blood,
            x,
            y,
            alpha: 0.7,
        });
    }

    pub fn add_muzzle_flash(&mut self, x: f32, y: f32, angle: f32) {
        self.muzzle_flashes.push(MuzzleFlash {
            x,
            y,
            angle,
            life: MUZZLE_FLASH_LIFE,
        });
    }

    pub fn push_kill(&mut self, entry: KillFeedEntry) {
        self.kill_feed.push(entry);
        if self.kill_feed.len() > KILL_FEED_MAX {
            let excess = self.kill_feed.len() - KILL_FEED_MAX;
            self.kill_feed.drain(..excess);
        }
    }

    pub fn push_popup(&mut self, anchor: Option<(f32, f32)>, text: String, tone: PopupTone) {
        self.popups.push(ScorePopup {
            anchor,
            text,
            tone,
            age: 0.0,
        });
    }

    /// Age everything by `dt` and drop what expired.
    pub fn step(&mut self, dt: f32) {
        self.particles.retain_mut(|p| {
            p.life -= dt;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vx *= PARTICLE_DAMPING;
            p.vy *= PARTICLE_DAMPING;
            p.life > 0.0
        });
        self.muzzle_flashes.retain_mut(|m| {
            m.life -= dt;
            m.life > 0.0
        });
        if self.decals.len() > MAX_DECALS {
            self.decals.drain(..DECAL_PRUNE);
        }
        self.kill_feed.retain_mut(|k| {
            k.age += dt;
            k.age < KILL_FEED_LIFE
        });
        self.popups.retain_mut(|p| {
            p.age += dt;
            p.age < POPUP_LIFE
        });
    }
}
