//! Draw requests for an external renderer
//!
//! `build_frame` flattens a `GameState` into plain data: visible tiles, sprite
//! keys at world positions, effect primitives and HUD values. Positions are in
//! world pixels; subtract `camera_x` for screen space.

use glam::Vec2;
use serde::Serialize;

use crate::consts::TILE_SIZE;
use crate::{Rect, tile_origin};
use crate::sim::effects::Effects;
use crate::sim::enemy::{Enemy, Species};
use crate::sim::physics::Facing;
use crate::sim::player::{Player, PlayerFrame, PowerState};
use crate::sim::tile::Tile;
use crate::sim::{GamePhase, GameState, World};

/// One non-Air tile in view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileDraw {
    pub row: i32,
    pub col: i32,
    pub tile: Tile,
    /// Top-left corner, including any bump offset
    pub pos: Vec2,
}

/// One entity sprite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    /// e.g. `rabbit_big_run1`, `zombie_0`, `boss_rage_1`, `coin`
    pub key: String,
    pub pos: Vec2,
    /// Sprites are authored facing right
    pub flip_x: bool,
    /// Draw with a white flash (boss post-hit window)
    pub flash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleDraw {
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopupDraw {
    pub pos: Vec2,
    pub value: u64,
    pub alpha: f32,
}

/// Full-screen overlay the host should show on top of the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overlay {
    Title,
    Paused,
    LevelClear { score: u64 },
    GameOver { score: u64 },
    Win { score: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BossHud {
    pub hp: u8,
    pub max_hp: u8,
    pub phase: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub lives: u8,
    pub score: u64,
    pub level_name: String,
    /// 1-based
    pub level_number: usize,
    pub big: bool,
    pub boss: Option<BossHud>,
    pub overlay: Option<Overlay>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawFrame {
    pub camera_x: f32,
    pub tiles: Vec<TileDraw>,
    /// Back to front: collectibles, enemies, player
    pub sprites: Vec<Sprite>,
    pub particles: Vec<ParticleDraw>,
    pub popups: Vec<PopupDraw>,
    pub hud: Hud,
}

/// Build the draw requests for the current state
pub fn build_frame(state: &GameState) -> DrawFrame {
    let overlay = overlay_for(state);
    let Some(world) = &state.world else {
        return DrawFrame {
            camera_x: 0.0,
            tiles: Vec::new(),
            sprites: Vec::new(),
            particles: Vec::new(),
            popups: Vec::new(),
            hud: Hud {
                lives: 0,
                score: state.final_score,
                level_name: String::new(),
                level_number: 0,
                big: false,
                boss: None,
                overlay,
            },
        };
    };

    let camera_x = world.camera.x;
    let mut sprites = Vec::with_capacity(world.collectibles.len() + world.enemies.len() + 1);
    for item in world.collectibles.iter().filter(|c| !c.collected) {
        sprites.push(Sprite {
            key: collectible_key(item.kind).into(),
            pos: item.pos + Vec2::new(0.0, item.bob_offset()),
            flip_x: false,
            flash: false,
        });
    }
    for enemy in world.enemies.iter().filter(|e| e.alive) {
        sprites.push(enemy_sprite(enemy));
    }
    if !world.player.flicker_hidden() {
        sprites.push(Sprite {
            key: player_key(&world.player),
            pos: world.player.pos(),
            flip_x: world.player.facing == Facing::Left,
            flash: false,
        });
    }

    let (particles, popups) = effect_draws(&world.effects, state.settings.max_particles());

    DrawFrame {
        camera_x,
        tiles: visible_tiles(world),
        sprites,
        particles,
        popups,
        hud: Hud {
            lives: world.player.lives,
            score: world.player.score,
            level_name: world.name.clone(),
            level_number: world.index + 1,
            big: world.player.is_big(),
            boss: world.boss().and_then(Enemy::boss_state).map(|b| BossHud {
                hp: b.hp,
                max_hp: b.max_hp,
                phase: b.phase(),
            }),
            overlay,
        },
    }
}

fn overlay_for(state: &GameState) -> Option<Overlay> {
    let score = state.final_score;
    match state.phase {
        GamePhase::Title => Some(Overlay::Title),
        GamePhase::Paused => Some(Overlay::Paused),
        GamePhase::LevelClear => Some(Overlay::LevelClear { score }),
        GamePhase::GameOver => Some(Overlay::GameOver { score }),
        GamePhase::Win => Some(Overlay::Win { score }),
        GamePhase::Playing | GamePhase::Dying => None,
    }
}

/// Non-Air tiles in the columns the camera can see
fn visible_tiles(world: &World) -> Vec<TileDraw> {
    let view = Rect::new(
        world.camera.x,
        0.0,
        world.camera.viewport_width(),
        world.tiles.height() as f32 * TILE_SIZE,
    );
    world
        .tiles
        .tiles_in_rect(&view)
        .filter(|&(_, tile)| tile != Tile::Air)
        .map(|(coord, tile)| {
            let offset = world.effects.bump_offset(coord).unwrap_or(0.0);
            TileDraw {
                row: coord.row,
                col: coord.col,
                tile,
                pos: tile_origin(coord.row, coord.col) + Vec2::new(0.0, offset),
            }
        })
        .collect()
}

fn collectible_key(kind: crate::sim::CollectibleKind) -> &'static str {
    use crate::sim::CollectibleKind::*;
    match kind {
        Carrot => "carrot",
        Coin => "coin",
        Mushroom => "mushroom",
    }
}

fn enemy_sprite(enemy: &Enemy) -> Sprite {
    let name = enemy.species.as_str();
    let key = if enemy.dying {
        format!("{name}_dead")
    } else {
        match enemy.boss_state() {
            Some(boss) if boss.is_enraged() => format!("{name}_rage_{}", enemy.anim_frame()),
            _ => format!("{name}_{}", enemy.anim_frame()),
        }
    };
    Sprite {
        key,
        pos: enemy.body.pos,
        flip_x: enemy.facing == Facing::Left,
        flash: enemy.species == Species::Boss && enemy.is_invincible(),
    }
}

fn player_key(player: &Player) -> String {
    let size = match player.power {
        PowerState::Small => "small",
        PowerState::Big => "big",
    };
    let frame = match player.frame() {
        PlayerFrame::Idle => "idle",
        PlayerFrame::Run1 => "run1",
        PlayerFrame::Run2 => "run2",
        PlayerFrame::Jump => "jump",
        PlayerFrame::Die => "die",
    };
    format!("rabbit_{size}_{frame}")
}

fn effect_draws(effects: &Effects, max_particles: usize) -> (Vec<ParticleDraw>, Vec<PopupDraw>) {
    let sparks = effects.particles.iter().map(|p| ParticleDraw {
        pos: p.pos,
        size: p.size,
        color: p.color,
        alpha: p.fade(),
    });
    let embers = effects.embers.iter().map(|e| ParticleDraw {
        pos: e.pos,
        size: 3.0,
        color: EMBER_COLOR,
        alpha: 1.0,
    });
    let particles = sparks.chain(embers).take(max_particles).collect();

    let popups = effects
        .popups
        .iter()
        .map(|p| PopupDraw {
            pos: p.pos,
            value: p.value,
            alpha: p.fade(),
        })
        .collect();
    (particles, popups)
}

const EMBER_COLOR: u32 = 0xFF6600;
