//! Axis-separated collision resolution against the tile grid
//!
//! Bodies move horizontally first and are pushed out of any solid column they
//! entered, then move vertically and are pushed out of the floor or ceiling.
//! Doing the axes separately avoids corner-catching ambiguity. Both passes only
//! sample the cells a body can have entered this tick, so approach speeds below
//! one tile per tick never tunnel.

use super::physics::Body;
use super::tile::{Tile, TileCoord, TileWorld};
use crate::consts::{EDGE_EPSILON, TILE_SIZE};
use crate::to_tile;

/// A solid column stopped horizontal movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalHit {
    pub col: i32,
}

/// A rising body struck a Brick or QuestionBlock from below
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHit {
    pub coord: TileCoord,
    pub tile: Tile,
}

/// Result of the vertical pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalContact {
    /// Came to rest on a tile top this tick
    pub landed: bool,
    /// Struck a tile bottom while rising
    pub bumped_head: bool,
    /// First hittable block struck, if any
    pub block_hit: Option<BlockHit>,
}

/// Resolve horizontal penetration after the body has moved by `vel.x`
///
/// Samples the leading-edge column, then the trailing-edge column, across every
/// row the body spans. On a hit the body is snapped to the tile boundary on the
/// approach side and `vel.x` is zeroed.
pub fn resolve_horizontal(body: &mut Body, world: &TileWorld) -> Option<HorizontalHit> {
    let vx = body.vel.x;
    if vx == 0.0 {
        return None;
    }

    let rect = body.rect();
    let row_top = to_tile(rect.top());
    let row_bottom = to_tile(rect.bottom() - EDGE_EPSILON);
    let left = to_tile(rect.left());
    let right = to_tile(rect.right() - EDGE_EPSILON);
    let cols = if vx > 0.0 { [right, left] } else { [left, right] };

    for col in cols {
        if !(row_top..=row_bottom).any(|row| world.blocks_passage(row, col)) {
            continue;
        }
        if vx > 0.0 {
            body.pos.x = col as f32 * TILE_SIZE - body.size.x;
        } else {
            body.pos.x = (col + 1) as f32 * TILE_SIZE;
        }
        body.vel.x = 0.0;
        return Some(HorizontalHit { col });
    }
    None
}

/// Resolve vertical penetration after the body has moved by `vel.y`
///
/// Falling bodies probe the row holding their bottom edge, so a body resting on
/// a tile top stays grounded every tick. Rising bodies probe the row holding
/// their top edge. Both probe two columns, inset by the body's foot inset.
pub fn resolve_vertical(body: &mut Body, world: &TileWorld) -> VerticalContact {
    let mut contact = VerticalContact::default();
    let rect = body.rect();
    let cols = [
        to_tile(rect.left() + body.foot_inset),
        to_tile(rect.right() - EDGE_EPSILON - body.foot_inset),
    ];

    if body.vel.y >= 0.0 {
        let row = to_tile(rect.bottom());
        let row_top = row as f32 * TILE_SIZE;
        let prev_bottom = rect.bottom() - body.vel.y;
        for col in cols {
            if supports(world, row, col, row_top, prev_bottom) {
                body.pos.y = row_top - body.size.y;
                body.vel.y = 0.0;
                body.on_ground = true;
                contact.landed = true;
            }
        }
    } else {
        let row = to_tile(rect.top());
        for col in cols {
            if world.blocks_passage(row, col) {
                body.pos.y = (row + 1) as f32 * TILE_SIZE;
                body.vel.y = 0.0;
                contact.bumped_head = true;
                let tile = world.tile_at(row, col);
                if contact.block_hit.is_none() && tile.is_hittable() {
                    contact.block_hit = Some(BlockHit {
                        coord: TileCoord { row, col },
                        tile,
                    });
                }
            }
        }
    }

    contact
}

/// Whether a cell catches a falling body
///
/// With one-way platforms a Platform only catches bodies that were above it
/// before this tick's movement.
fn supports(world: &TileWorld, row: i32, col: i32, row_top: f32, prev_bottom: f32) -> bool {
    if !world.blocks_landing(row, col) {
        return false;
    }
    if world.blocks_passage(row, col) {
        return true;
    }
    prev_bottom <= row_top + 0.5
}

/// Whether the cell below a grounded body's leading edge is open (a ledge or pit)
pub fn ledge_ahead(body: &Body, world: &TileWorld) -> bool {
    let rect = body.rect();
    let col = if body.vel.x > 0.0 {
        to_tile(rect.right())
    } else {
        to_tile(rect.left())
    };
    let below = to_tile(rect.bottom() + 2.0);
    !world.blocks_landing(below, col)
}
