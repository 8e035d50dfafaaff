//! Feedback effects: particles, score popups, block bumps and lava embers
//!
//! None of this affects gameplay. Randomness comes from a `Pcg32` seeded per
//! level so replays render identically.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::tile::TileCoord;
use crate::consts::TILE_SIZE;
use crate::settings::Settings;

const PARTICLE_GRAVITY: f32 = 0.4;
const PARTICLE_DRAG: f32 = 0.9;
const POPUP_LIFE: u32 = 50;
const POPUP_DRAG: f32 = 0.92;
const BUMP_FRAMES: u32 = 20;
const BUMP_GRAVITY: f32 = 1.5;
const EMBER_LIFE: u32 = 30;
const EMBER_GRAVITY: f32 = 0.15;
/// Chance per tick that a vent emits an ember
const EMBER_RATE: f32 = 0.3;

/// A colored square flung out by stomps, pickups and broken bricks
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0xRRGGBB
    pub color: u32,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

impl Particle {
    /// Remaining life as 0..1 (for alpha)
    pub fn fade(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Floating "+N" text
#[derive(Debug, Clone)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub vy: f32,
    pub value: u64,
    pub life: u32,
}

impl ScorePopup {
    pub fn fade(&self) -> f32 {
        self.life as f32 / POPUP_LIFE as f32
    }
}

/// Short upward nudge of a block that was hit from below
#[derive(Debug, Clone)]
pub struct BlockBump {
    pub coord: TileCoord,
    /// Vertical draw offset in pixels (negative is up)
    pub offset: f32,
    pub vy: f32,
    pub frame: u32,
}

/// Rising lava spark
#[derive(Debug, Clone)]
pub struct Ember {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
}

/// Columns from which embers rise out of a lava pit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmberVent {
    pub x: f32,
    pub width: f32,
    pub y: f32,
}

/// All live feedback effects for one level
#[derive(Debug, Clone)]
pub struct Effects {
    rng: Pcg32,
    max_particles: usize,
    burst_scale: f32,
    vent: Option<EmberVent>,
    pub particles: Vec<Particle>,
    pub popups: Vec<ScorePopup>,
    pub bumps: Vec<BlockBump>,
    pub embers: Vec<Ember>,
}

impl Effects {
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            max_particles: settings.max_particles(),
            burst_scale: settings.quality.burst_scale(),
            vent: None,
            particles: Vec::new(),
            popups: Vec::new(),
            bumps: Vec::new(),
            embers: Vec::new(),
        }
    }

    pub fn with_vent(mut self, vent: Option<EmberVent>) -> Self {
        self.vent = vent;
        self
    }

    /// Spawn a burst of particles at `pos`, scaled by quality and capped
    pub fn burst(&mut self, pos: Vec2, color: u32, count: usize) {
        let scaled = (count as f32 * self.burst_scale).round() as usize;
        let room = self.max_particles.saturating_sub(self.particles.len());
        for _ in 0..scaled.min(room) {
            let life = 30.0 + self.rng.random::<f32>() * 20.0;
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(
                    self.rng.random_range(-3.0..3.0),
                    -self.rng.random::<f32>() * 5.0 - 2.0,
                ),
                color,
                life,
                max_life: life,
                size: self.rng.random_range(3.0..7.0),
            });
        }
    }

    pub fn popup(&mut self, pos: Vec2, value: u64) {
        self.popups.push(ScorePopup {
            pos,
            vy: -2.0,
            value,
            life: POPUP_LIFE,
        });
    }

    pub fn bump(&mut self, coord: TileCoord, vy: f32) {
        self.bumps.push(BlockBump {
            coord,
            offset: 0.0,
            vy,
            frame: 0,
        });
    }

    /// Draw offset of a bumping block at `coord`, if any
    pub fn bump_offset(&self, coord: TileCoord) -> Option<f32> {
        self.bumps
            .iter()
            .find(|b| b.coord == coord)
            .map(|b| b.offset.min(0.0))
    }

    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.vel.x *= PARTICLE_DRAG;
            p.vel.y += PARTICLE_GRAVITY;
            p.pos += p.vel;
            p.life -= 1.0;
        }
        self.particles.retain(|p| p.life > 0.0);

        for popup in &mut self.popups {
            popup.pos.y += popup.vy;
            popup.vy *= POPUP_DRAG;
            popup.life = popup.life.saturating_sub(1);
        }
        self.popups.retain(|p| p.life > 0);

        for bump in &mut self.bumps {
            bump.offset += bump.vy;
            bump.vy += BUMP_GRAVITY;
            bump.frame += 1;
        }
        self.bumps.retain(|b| b.frame < BUMP_FRAMES);

        if let Some(vent) = self.vent {
            if self.rng.random::<f32>() < EMBER_RATE {
                let x = vent.x + self.rng.random::<f32>() * vent.width;
                self.embers.push(Ember {
                    pos: Vec2::new(x, vent.y),
                    vel: Vec2::new(
                        self.rng.random_range(-1.0..1.0),
                        -self.rng.random::<f32>() * 4.0 - 1.0,
                    ),
                    life: EMBER_LIFE,
                });
            }
        }
        for ember in &mut self.embers {
            ember.pos += ember.vel;
            ember.vel.y += EMBER_GRAVITY;
            ember.life = ember.life.saturating_sub(1);
        }
        self.embers.retain(|e| e.life > 0);
    }

    /// Drop every live effect; the RNG stream carries on
    pub fn clear(&mut self) {
        self.particles.clear();
        self.popups.clear();
        self.bumps.clear();
        self.embers.clear();
    }
}

impl EmberVent {
    /// Vent spanning `span` columns starting at `col`, just above the bottom of the level
    pub fn from_columns(col: u32, span: u32, level_height_px: f32) -> Self {
        Self {
            x: col as f32 * TILE_SIZE,
            width: span as f32 * TILE_SIZE,
            y: level_height_px - 20.0,
        }
    }
}
