//! Shared body integration used by every entity
//!
//! Velocities are in pixels per tick; y grows downward, so negative `vel.y` rises.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{HorizontalHit, VerticalContact, resolve_horizontal, resolve_vertical};
use super::tile::TileWorld;
use crate::Rect;

/// Horizontal facing of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal velocity (keeps `current` when standing still)
    pub fn from_velocity(vx: f32, current: Facing) -> Facing {
        if vx < 0.0 {
            Facing::Left
        } else if vx > 0.0 {
            Facing::Right
        } else {
            current
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Position, velocity and bounding box of a moving entity
#[derive(Debug, Clone)]
pub struct Body {
    /// Top-left corner in world pixels
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    /// Horizontal inset of the vertical probe columns (keeps feet off wall edges)
    pub foot_inset: f32,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            on_ground: false,
            foot_inset: 0.0,
        }
    }

    pub fn with_foot_inset(mut self, inset: f32) -> Self {
        self.foot_inset = inset;
        self
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Accumulate gravity up to terminal fall speed
    #[inline]
    pub fn apply_gravity(&mut self, gravity: f32, max_fall: f32) {
        self.vel.y = (self.vel.y + gravity).min(max_fall);
    }

    /// Launch upward with an initial velocity
    pub fn jump(&mut self, velocity: f32) {
        self.vel.y = velocity;
        self.on_ground = false;
    }

    /// Variable jump height: soften the ascent while still rising fast
    pub fn cut_jump(&mut self, threshold: f32, cut: f32) {
        if self.vel.y < threshold {
            self.vel.y += cut;
        }
    }

    /// Damped coast toward zero horizontal speed
    #[inline]
    pub fn coast(&mut self, damping: f32) {
        self.vel.x *= damping;
    }

    /// Move by `vel.x` and resolve against solid columns
    pub fn step_horizontal(&mut self, world: &TileWorld) -> Option<HorizontalHit> {
        self.pos.x += self.vel.x;
        resolve_horizontal(self, world)
    }

    /// Move by `vel.y` and resolve against floors and ceilings
    pub fn step_vertical(&mut self, world: &TileWorld) -> VerticalContact {
        self.pos.y += self.vel.y;
        self.on_ground = false;
        resolve_vertical(self, world)
    }

    /// Keep the body inside a horizontal span
    pub fn clamp_x(&mut self, min: f32, max: f32) {
        self.pos.x = self.pos.x.clamp(min, max.max(min));
    }

    /// Ballistic motion with no tile collision (death animations)
    pub fn drift(&mut self, gravity: f32) {
        self.vel.y += gravity;
        self.pos += self.vel;
    }
}
