//! Pickups: carrots, coins and mushrooms

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::AudioCue;
use crate::Rect;
use crate::consts::TILE_SIZE;

pub const COLLECTIBLE_WIDTH: f32 = 16.0;
pub const COLLECTIBLE_HEIGHT: f32 = 18.0;

/// Pop-out gravity per tick
const POP_GRAVITY: f32 = 0.3;
/// Launch speed of a mushroom placed in level data
const MUSHROOM_POP: f32 = -3.0;
/// Bob animation phase step (render only)
const BOB_STEP: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleKind {
    Carrot,
    Coin,
    Mushroom,
}

impl CollectibleKind {
    pub fn score(&self) -> u64 {
        match self {
            CollectibleKind::Carrot => 50,
            CollectibleKind::Coin => 100,
            CollectibleKind::Mushroom => 200,
        }
    }

    pub fn cue(&self) -> AudioCue {
        match self {
            CollectibleKind::Carrot | CollectibleKind::Coin => AudioCue::Coin,
            CollectibleKind::Mushroom => AudioCue::PowerUp,
        }
    }

    /// Pickup particle color and count
    pub fn burst(&self) -> (u32, usize) {
        match self {
            CollectibleKind::Carrot => (0xFF9900, 5),
            CollectibleKind::Coin => (0xFFEE44, 5),
            CollectibleKind::Mushroom => (0xFF3333, 6),
        }
    }
}

/// Upward launch that settles back at its starting height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopOut {
    pub vy: f32,
    pub rest_y: f32,
}

#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub collected: bool,
    pub pop: Option<PopOut>,
    pub bob_phase: f32,
}

impl Collectible {
    /// Place a level-data item on spawn tile `(tx, ty)`
    pub fn spawn(id: u32, kind: CollectibleKind, tx: u32, ty: u32) -> Self {
        let pos = Vec2::new(tx as f32 * TILE_SIZE, (ty as f32 - 1.0) * TILE_SIZE);
        let mut item = Self::at(id, kind, pos);
        if kind == CollectibleKind::Mushroom {
            item = item.popping(MUSHROOM_POP);
        }
        item
    }

    pub fn at(id: u32, kind: CollectibleKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            collected: false,
            pop: None,
            // Spread bob phases without an RNG
            bob_phase: (id % 8) as f32 * 0.785,
        }
    }

    pub fn popping(mut self, vy: f32) -> Self {
        self.pop = Some(PopOut {
            vy,
            rest_y: self.pos.y,
        });
        self
    }

    pub fn hitbox(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, COLLECTIBLE_WIDTH, COLLECTIBLE_HEIGHT)
    }

    pub fn update(&mut self) {
        self.bob_phase += BOB_STEP;
        if self.collected {
            return;
        }
        if let Some(pop) = &mut self.pop {
            self.pos.y += pop.vy;
            pop.vy += POP_GRAVITY;
            if self.pos.y >= pop.rest_y {
                self.pos.y = pop.rest_y;
                self.pop = None;
            }
        }
    }

    /// Vertical draw offset of the idle bob
    pub fn bob_offset(&self) -> f32 {
        self.bob_phase.sin() * 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_table() {
        assert_eq!(CollectibleKind::Carrot.score(), 50);
        assert_eq!(CollectibleKind::Coin.score(), 100);
        assert_eq!(CollectibleKind::Mushroom.score(), 200);
        assert_eq!(CollectibleKind::Mushroom.cue(), AudioCue::PowerUp);
    }

    #[test]
    fn test_pop_out_settles_at_start() {
        let mut coin = Collectible::at(1, CollectibleKind::Coin, Vec2::new(8.0, 100.0)).popping(-6.0);
        let mut highest = coin.pos.y;
        for _ in 0..60 {
            coin.update();
            highest = highest.min(coin.pos.y);
        }
        assert!(highest < 100.0);
        assert_eq!(coin.pos.y, 100.0);
        assert!(coin.pop.is_none());
    }

    #[test]
    fn test_mushroom_spawns_popping() {
        let mushroom = Collectible::spawn(1, CollectibleKind::Mushroom, 40, 10);
        assert!(mushroom.pop.is_some());
        assert_eq!(mushroom.pos, Vec2::new(1280.0, 288.0));
        assert!(Collectible::spawn(2, CollectibleKind::Coin, 1, 1).pop.is_none());
    }
}
