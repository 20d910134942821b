//! Burst kinematics.
//!
//! A burst is a batch of short-lived sprites launched from one point, each
//! with its own velocity, spin and lifetime, sharing one gravity constant.
//! Pure math: spawning produces a plan, and `frame()` samples a sprite's
//! pose at a given age. DOM element handling stays in the stage wiring.

use super::rng::Lcg;

pub const MIN_SPRITES: usize = 10;
pub const MAX_SPRITES: usize = 18;

pub const MIN_GRAVITY: f64 = 480.0; // px/s^2
pub const MAX_GRAVITY: f64 = 760.0;

pub const MIN_SPEED: f64 = 120.0; // px/s
pub const MAX_SPEED: f64 = 520.0;

pub const MAX_SPIN_DEG: f64 = 720.0; // deg/s, either direction

pub const MIN_LIFE_MS: f64 = 650.0;
pub const MAX_LIFE_MS: f64 = 1100.0;

pub const MIN_SIZE_PX: f64 = 28.0;
pub const MAX_SIZE_PX: f64 = 64.0;

/// Fraction of scale lost over a full lifetime.
const SCALE_DECAY: f64 = 0.15;

/// Immutable launch parameters of one sprite.
pub struct SpriteMotion {
    pub vx: f64,
    pub vy: f64,
    pub spin_deg: f64,
    pub life_ms: f64,
    pub size_px: f64,
    /// Index into the sprite image pool.
    pub image: usize,
}

/// Pose of a sprite at some age, relative to its launch point.
pub struct SpriteFrame {
    pub dx: f64,
    pub dy: f64,
    pub rot_deg: f64,
    pub opacity: f64,
    pub scale: f64,
    /// Normalized age reached 1; the sprite should be removed.
    pub done: bool,
}

impl SpriteMotion {
    /// Sample projectile motion at `age_ms` under the burst's `gravity`.
    /// Opacity and scale decay linearly with normalized age; rotation
    /// accumulates linearly with spin rate.
    pub fn frame(&self, gravity: f64, age_ms: f64) -> SpriteFrame {
        let t = age_ms / 1000.0;
        let p = (age_ms / self.life_ms).clamp(0.0, 1.0);
        SpriteFrame {
            dx: self.vx * t,
            dy: self.vy * t + 0.5 * gravity * t * t,
            rot_deg: self.spin_deg * t,
            opacity: 1.0 - p,
            scale: 1.0 - p * SCALE_DECAY,
            done: p >= 1.0,
        }
    }
}

/// One burst: a shared gravity constant plus the sprites it launches.
pub struct BurstPlan {
    pub gravity: f64,
    pub sprites: Vec<SpriteMotion>,
}

impl BurstPlan {
    /// Randomize a burst: count in [MIN_SPRITES, MAX_SPRITES), uniform
    /// launch direction and speed per sprite, image drawn from a pool of
    /// `image_count` sources.
    pub fn generate(rng: &mut Lcg, image_count: usize) -> Self {
        let gravity = rng.range(MIN_GRAVITY, MAX_GRAVITY);
        let count = rng.range(MIN_SPRITES as f64, MAX_SPRITES as f64) as usize;

        let mut sprites = Vec::with_capacity(count);
        for _ in 0..count {
            let angle = rng.range(0.0, std::f64::consts::TAU);
            let speed = rng.range(MIN_SPEED, MAX_SPEED);
            sprites.push(SpriteMotion {
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                spin_deg: rng.range(-MAX_SPIN_DEG, MAX_SPIN_DEG),
                life_ms: rng.range(MIN_LIFE_MS, MAX_LIFE_MS),
                size_px: rng.range(MIN_SIZE_PX, MAX_SIZE_PX),
                image: rng.index(image_count),
            });
        }
        Self { gravity, sprites }
    }
}
