//! Rabbit Run - a tile-based 2D platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, entities, game state)
//! - `catalog`: Level definitions and the built-in campaign
//! - `render`: Draw requests for an external renderer
//! - `settings`: Viewport, effects quality and gameplay tuning
//! - `error`: Load-time error types

pub mod catalog;
pub mod error;
pub mod render;
pub mod settings;
pub mod sim;

pub use catalog::{LevelCatalog, LevelDef};
pub use error::{ConfigError, LevelError};
pub use settings::{QualityPreset, Settings, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, all tuning values are per tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks a single host frame may advance (stall protection)
    pub const MAX_FRAME_TICKS: u32 = 3;

    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 32.0;
    /// Far edges of a box are exclusive; probes stop this far short of them
    pub const EDGE_EPSILON: f32 = 0.01;

    /// Default viewport (20 rows of tiles tall)
    pub const VIEWPORT_WIDTH: f32 = 960.0;
    pub const VIEWPORT_HEIGHT: f32 = 640.0;

    /// Starting lives for a fresh run
    pub const START_LIVES: u8 = 3;
}

/// Axis-aligned rectangle in world pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test (touching edges do not overlap)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Convert a world pixel coordinate to a tile index (floor, may be negative)
#[inline]
pub fn to_tile(px: f32) -> i32 {
    (px / consts::TILE_SIZE).floor() as i32
}

/// World pixel position of a tile's top-left corner
#[inline]
pub fn tile_origin(row: i32, col: i32) -> Vec2 {
    Vec2::new(col as f32 * consts::TILE_SIZE, row as f32 * consts::TILE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let b = Rect::new(32.0, 0.0, 32.0, 32.0);
        assert!(!a.overlaps(&b));

        let c = Rect::new(31.0, 31.0, 4.0, 4.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_to_tile_floors_negative() {
        assert_eq!(to_tile(0.0), 0);
        assert_eq!(to_tile(31.9), 0);
        assert_eq!(to_tile(32.0), 1);
        assert_eq!(to_tile(-0.5), -1);
    }
}
