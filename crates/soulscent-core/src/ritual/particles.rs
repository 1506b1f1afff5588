//! Incense smoke field.
//!
//! Stepped once per animation frame, decoupled from gesture sampling. The
//! field only *reads* the fill level; the spawn-rate policy below is the
//! behavioral contract (idle wisps, level-scaled emission, near-full
//! burst), the motion itself is cosmetic.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Below this fill level the censer emits only occasional idle wisps.
pub const IDLE_LEVEL_MAX: f32 = 3.0;
/// Above this fill level the emitter adds a whiteout burst.
pub const BURST_LEVEL: f32 = 90.0;

/// Idle-regime spawn probability per frame.
const IDLE_SPAWN_CHANCE: f64 = 0.04;
/// Active-regime emission: 1 particle per frame plus one per this many
/// level points.
const LEVEL_PER_EXTRA_SPAWN: f32 = 12.0;
/// Extra particles per frame while bursting.
const BURST_EXTRA: usize = 6;
/// Particles drift off the top; kill a little past the edge.
const KILL_MARGIN: f32 = 24.0;

#[derive(Debug, Clone)]
pub struct SmokeParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    /// Remaining life in frames.
    pub life: f32,
    max_life: f32,
}

impl SmokeParticle {
    /// Render alpha, fading out over the particle's life.
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0) * 0.85
    }
}

pub struct SmokeField {
    width: f32,
    height: f32,
    emitter_x: f32,
    emitter_y: f32,
    particles: Vec<SmokeParticle>,
    rng: Pcg32,
}

impl SmokeField {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_seed(width, height, 0x5005_CE17)
    }

    /// Deterministic field for tests and replayable renders.
    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self {
            width,
            height,
            emitter_x: width * 0.5,
            // Incense tip sits in the lower third of the stage.
            emitter_y: height * 0.78,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[SmokeParticle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advance one animation frame at the given fill level.
    pub fn step(&mut self, level: f32) {
        let count = self.spawn_count(level);
        for _ in 0..count {
            self.spawn_one(level);
        }
        let rng = &mut self.rng;
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            // Lateral turbulence.
            p.vx += rng.gen_range(-0.03..0.03);
            p.size += 0.04;
            p.life -= 1.0;
        }
        let (w, margin) = (self.width, KILL_MARGIN);
        self.particles
            .retain(|p| p.life > 0.0 && p.y > -margin && p.x > -margin && p.x < w + margin);
    }

    fn spawn_count(&mut self, level: f32) -> usize {
        if level < IDLE_LEVEL_MAX {
            usize::from(self.rng.gen_bool(IDLE_SPAWN_CHANCE))
        } else {
            let base = 1 + (level / LEVEL_PER_EXTRA_SPAWN) as usize;
            if level > BURST_LEVEL {
                base + BURST_EXTRA
            } else {
                base
            }
        }
    }

    fn spawn_one(&mut self, level: f32) {
        let intensity = (level / 100.0).clamp(0.0, 1.0);
        let spread = 4.0 + intensity * 14.0;
        let max_life = self.rng.gen_range(60.0..140.0);
        self.particles.push(SmokeParticle {
            x: self.emitter_x + self.rng.gen_range(-spread..spread),
            y: self.emitter_y,
            vx: self.rng.gen_range(-0.3..0.3),
            vy: -(0.4 + intensity * 1.2 + self.rng.gen_range(0.0..0.4)),
            size: self.rng.gen_range(2.0..6.0),
            life: max_life,
            max_life,
        });
    }
}
