//! Decorative particles, floating texts and shot flashes.
//!
//! Effects draw from their own random stream so spawning more or fewer of
//! them never changes a gameplay roll.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_siege_core::{definitions::Tint, EffectSnapshot};

const PARTICLE_DECAY: f32 = 0.025;
const TEXT_DECAY: f32 = 0.018;
const FLASH_DECAY: f32 = 0.08;
const PARTICLE_GRAVITY: f32 = 0.08;
const TEXT_RISE: f32 = 0.6;
/// Milliseconds represented by one unit of velocity or decay.
const FRAME_MS: f32 = 16.0;

/// Hostile deployments and hits taken by allied towers.
pub(crate) const HOSTILE_TINT: Tint = Tint::from_rgb(0xef, 0x44, 0x44);
/// Towers that were destroyed, crushed or demolished.
pub(crate) const LOSS_TINT: Tint = Tint::from_rgb(0xf9, 0x73, 0x16);
pub(crate) const GOLD_TINT: Tint = Tint::from_rgb(0xfb, 0xbf, 0x24);

#[derive(Clone, Debug)]
struct Particle {
    position: Vec2,
    velocity: Vec2,
    tint: Tint,
    life: f32,
}

#[derive(Clone, Debug)]
struct FloatingText {
    position: Vec2,
    text: String,
    life: f32,
}

#[derive(Clone, Debug)]
struct Flash {
    from: Vec2,
    to: Vec2,
    life: f32,
}

/// Every live decorative effect.
#[derive(Debug)]
pub(crate) struct Effects {
    rng: ChaCha8Rng,
    particles: Vec<Particle>,
    texts: Vec<FloatingText>,
    flashes: Vec<Flash>,
}

impl Effects {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            particles: Vec::new(),
            texts: Vec::new(),
            flashes: Vec::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.particles.clear();
        self.texts.clear();
        self.flashes.clear();
    }

    pub(crate) fn burst(&mut self, position: Vec2, tint: Tint, count: usize) {
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(0.5..2.5);
            self.particles.push(Particle {
                position,
                velocity: Vec2::from_angle(angle) * speed,
                tint,
                life: 1.0,
            });
        }
    }

    pub(crate) fn text(&mut self, position: Vec2, text: String) {
        self.texts.push(FloatingText {
            position,
            text,
            life: 1.0,
        });
    }

    pub(crate) fn flash(&mut self, from: Vec2, to: Vec2) {
        self.flashes.push(Flash { from, to, life: 1.0 });
    }

    /// Moves and fades every effect, dropping the ones that faded out.
    pub(crate) fn advance(&mut self, dt_ms: f32) {
        let frames = dt_ms / FRAME_MS;
        for particle in &mut self.particles {
            particle.position += particle.velocity * frames;
            particle.velocity.y += PARTICLE_GRAVITY * frames;
            particle.life -= PARTICLE_DECAY * frames;
        }
        self.particles.retain(|particle| particle.life > 0.0);

        for text in &mut self.texts {
            text.position.y -= TEXT_RISE * frames;
            text.life -= TEXT_DECAY * frames;
        }
        self.texts.retain(|text| text.life > 0.0);

        for flash in &mut self.flashes {
            flash.life -= FLASH_DECAY * frames;
        }
        self.flashes.retain(|flash| flash.life > 0.0);
    }

    pub(crate) fn snapshots(&self) -> Vec<EffectSnapshot> {
        let particles = self.particles.iter().map(|particle| EffectSnapshot::Particle {
            position: particle.position,
            tint: particle.tint,
            life: particle.life,
        });
        let texts = self.texts.iter().map(|text| EffectSnapshot::Text {
            position: text.position,
            text: text.text.clone(),
            life: text.life,
        });
        let flashes = self.flashes.iter().map(|flash| EffectSnapshot::Flash {
            from: flash.from,
            to: flash.to,
            life: flash.life,
        });
        particles.chain(texts).chain(flashes).collect()
    }
}
