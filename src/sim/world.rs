//! Per-level world aggregate
//!
//! Owns everything that lives and dies with one level. Only score and lives
//! cross level boundaries, by value through `Carry`.

use glam::Vec2;

use super::camera::Camera;
use super::collectible::{Collectible, CollectibleKind};
use super::collision::BlockHit;
use super::effects::{Effects, EmberVent};
use super::enemy::{Enemy, Species};
use super::events::{AudioCue, GameEvent};
use super::interaction::{collect_pickups, resolve_enemies};
use super::physics::Facing;
use super::player::{Player, PlayerControls};
use super::tile::{Tile, TileCoord, TileWorld};
use crate::catalog::{LevelDef, SpawnPoint};
use crate::consts::TILE_SIZE;
use crate::error::LevelError;
use crate::settings::{Settings, Tuning};

/// Popped coins sit this far in from the block's left edge
const POP_COIN_INSET: f32 = 8.0;
const POP_COIN_VELOCITY: f32 = -6.0;
const QUESTION_BUMP_VELOCITY: f32 = -4.0;
const BRICK_BUMP_VELOCITY: f32 = -3.0;
const BRICK_COLOR: u32 = 0xAA6622;
const BRICK_PARTICLES: usize = 8;

/// State carried from one life or level to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carry {
    pub lives: u8,
    pub score: u64,
}

/// What one Playing tick produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub jumped: bool,
    pub player_died: bool,
    /// The level-end latch fired this tick
    pub level_cleared: bool,
}

#[derive(Debug, Clone)]
pub struct World {
    pub index: usize,
    pub name: String,
    pub spawn: SpawnPoint,
    pub goal_x: Option<u32>,
    pub boss_level: bool,
    pub tiles: TileWorld,
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id
    pub collectibles: Vec<Collectible>,
    pub effects: Effects,
    pub camera: Camera,
    pub boss_defeated: bool,
    /// Set once the level has been cleared; never re-triggers
    pub goal_reached: bool,
    spawns: Vec<(Species, u32, u32)>,
    next_id: u32,
}

impl World {
    /// Build a fresh level from its definition
    pub fn load(
        index: usize,
        def: &LevelDef,
        carry: Carry,
        settings: &Settings,
    ) -> Result<Self, LevelError> {
        let tuning = &settings.tuning;
        let tiles = def.tile_world(tuning.one_way_platforms)?;
        let vent = def
            .lava_vent
            .map(|v| EmberVent::from_columns(v.col, v.span, tiles.pixel_height()));
        // Distinct effect stream per level
        let seed = settings.seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);

        let mut world = Self {
            index,
            name: def.name.clone(),
            spawn: def.spawn,
            goal_x: def.goal_x,
            boss_level: def.boss_level,
            player: Player::at_spawn(def.spawn.tx, def.spawn.ty, carry.lives, carry.score),
            tiles,
            enemies: Vec::new(),
            collectibles: Vec::new(),
            effects: Effects::new(seed, settings).with_vent(vent),
            camera: Camera::new(settings.viewport_width, tuning),
            boss_defeated: false,
            goal_reached: false,
            spawns: def.enemy_spawns(),
            next_id: 1,
        };

        world.spawn_enemies(tuning);
        for spawn in &def.collectibles {
            let id = world.next_entity_id();
            world
                .collectibles
                .push(Collectible::spawn(id, spawn.kind, spawn.tx, spawn.ty));
        }

        log::info!(
            "Loaded level {} '{}' ({}x{} tiles, {} enemies, {} collectibles)",
            index + 1,
            world.name,
            world.tiles.width(),
            world.tiles.height(),
            world.enemies.len(),
            world.collectibles.len()
        );
        Ok(world)
    }

    /// Allocate a new entity id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Keep entity lists in id order for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.collectibles.sort_by_key(|c| c.id);
    }

    /// (Re)create enemies from the level's spawn list; a defeated boss stays gone
    fn spawn_enemies(&mut self, tuning: &Tuning) {
        self.enemies.clear();
        for (species, tx, ty) in self.spawns.clone() {
            if species == Species::Boss && self.boss_defeated {
                continue;
            }
            let id = self.next_entity_id();
            self.enemies.push(Enemy::spawn(id, species, tx, ty, tuning));
        }
    }

    pub fn level_width(&self) -> f32 {
        self.tiles.pixel_width()
    }

    /// The boss, while it is still alive
    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies
            .iter()
            .find(|e| e.species == Species::Boss && e.alive)
    }

    /// One Playing tick, in fixed order: player, blocks, fall check, enemies,
    /// contacts, pickups, effects, camera, level end
    pub fn step(
        &mut self,
        controls: &PlayerControls,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        let step = self.player.update(controls, &self.tiles, tuning);
        if step.jumped {
            outcome.jumped = true;
            events.push(GameEvent::Sound(AudioCue::Jump));
        }
        if let Some(hit) = step.block_hit {
            self.hit_block(hit, events);
        }

        if self.player.body.pos.y > self.tiles.pixel_height() + tuning.fall_death_margin
            && self.player.kill(tuning)
        {
            log::debug!("Player fell out of level '{}'", self.name);
            events.push(GameEvent::Sound(AudioCue::Die));
        }
        if self.player.dying {
            outcome.player_died = true;
            return outcome;
        }

        let target_x = self.player.pos().x;
        for enemy in &mut self.enemies {
            if enemy.update(&self.tiles, target_x, tuning).boss_jumped {
                events.push(GameEvent::Sound(AudioCue::Boss));
            }
        }
        self.enemies.retain(|e| e.alive);

        let contacts = resolve_enemies(
            &mut self.player,
            &mut self.enemies,
            &mut self.effects,
            events,
            tuning,
        );
        if contacts.boss_defeated {
            self.boss_defeated = true;
        }
        if contacts.player_killed {
            outcome.player_died = true;
            return outcome;
        }

        for item in &mut self.collectibles {
            item.update();
        }
        collect_pickups(
            &mut self.player,
            &mut self.collectibles,
            &mut self.effects,
            events,
        );
        self.collectibles.retain(|c| !c.collected);

        self.effects.update();
        self.camera
            .update(self.player.pos().x, self.tiles.pixel_width());

        outcome.level_cleared = self.check_level_end();
        outcome
    }

    /// React to the player's head striking a Brick or QuestionBlock
    pub fn hit_block(&mut self, hit: BlockHit, events: &mut Vec<GameEvent>) {
        let TileCoord { row, col } = hit.coord;
        match hit.tile {
            Tile::QuestionBlock => {
                self.tiles.set(row, col, Tile::UsedBlock);
                events.push(GameEvent::Sound(AudioCue::Block));
                self.effects.bump(hit.coord, QUESTION_BUMP_VELOCITY);

                let above = Vec2::new(col as f32 * TILE_SIZE, (row - 1) as f32 * TILE_SIZE);
                let occupied = self.collectibles.iter().any(|c| {
                    !c.collected
                        && (c.pos.x - above.x).abs() < TILE_SIZE
                        && (c.pos.y - above.y).abs() < TILE_SIZE
                });
                if !occupied {
                    let id = self.next_entity_id();
                    let pos = above + Vec2::new(POP_COIN_INSET, 0.0);
                    self.collectibles.push(
                        Collectible::at(id, CollectibleKind::Coin, pos).popping(POP_COIN_VELOCITY),
                    );
                }
                log::debug!("Question block at ({row}, {col}) used (coin: {})", !occupied);
            }
            Tile::Brick => {
                events.push(GameEvent::Sound(AudioCue::Block));
                if self.player.is_big() {
                    self.tiles.set(row, col, Tile::Air);
                    let center = Vec2::new(
                        col as f32 * TILE_SIZE + TILE_SIZE * 0.5,
                        row as f32 * TILE_SIZE + 8.0,
                    );
                    self.effects.burst(center, BRICK_COLOR, BRICK_PARTICLES);
                    log::debug!("Brick at ({row}, {col}) broken");
                } else {
                    self.effects.bump(hit.coord, BRICK_BUMP_VELOCITY);
                }
            }
            _ => {}
        }
    }

    /// Latch the level end once (goal column or boss defeat)
    pub fn check_level_end(&mut self) -> bool {
        if self.goal_reached {
            return false;
        }
        let reached = if self.boss_level {
            self.boss_defeated
        } else {
            self.goal_x
                .is_some_and(|goal| self.player.pos().x >= goal as f32 * TILE_SIZE)
        };
        if reached {
            log::info!("Level '{}' cleared", self.name);
            self.goal_reached = true;
        }
        reached
    }

    /// Death animation tick
    pub fn step_dying(&mut self, tuning: &Tuning) {
        self.player
            .update(&PlayerControls::default(), &self.tiles, tuning);
        self.effects.update();
    }

    /// Level-clear walk-off tick
    pub fn step_level_clear(&mut self, tuning: &Tuning) {
        let player = &mut self.player;
        player.body.vel.x = tuning.level_clear_walk_speed;
        player.body.pos.x += tuning.level_clear_walk_speed;
        player.facing = Facing::Right;
        player.anim_tick += 1;
        self.effects.update();
        self.camera
            .update(self.player.pos().x, self.tiles.pixel_width());
    }

    /// Put a fresh player at the spawn tile and reset enemies, camera and effects
    pub fn respawn(&mut self, lives: u8, tuning: &Tuning) {
        let score = self.player.score;
        self.player = Player::at_spawn(self.spawn.tx, self.spawn.ty, lives, score);
        self.player.invincible = tuning.respawn_grace_ticks;
        self.spawn_enemies(tuning);
        self.camera.reset();
        self.effects.clear();
        log::debug!("Respawned in '{}' with {} lives", self.name, lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LevelCatalog;
    use crate::sim::collectible::COLLECTIBLE_WIDTH;

    fn load(index: usize) -> World {
        let catalog = LevelCatalog::builtin();
        World::load(
            index,
            catalog.get(index).unwrap(),
            Carry { lives: 3, score: 0 },
            &Settings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_load_spawns_entities() {
        let world = load(0);
        assert_eq!(world.enemies.len(), 10);
        assert_eq!(world.collectibles.len(), 10);
        assert_eq!(world.player.pos(), Vec2::new(64.0, 416.0));
        assert_eq!(world.camera.x, 0.0);
        let ids: Vec<u32> = world.enemies.iter().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_question_block_pops_coin_once() {
        let mut world = load(0);
        let mut events = Vec::new();
        let coord = TileCoord { row: 10, col: 15 };
        let before = world.collectibles.len();
        world.hit_block(
            BlockHit {
                coord,
                tile: Tile::QuestionBlock,
            },
            &mut events,
        );
        assert_eq!(world.tiles.tile_at(10, 15), Tile::UsedBlock);
        assert_eq!(world.collectibles.len(), before + 1);
        let coin = world.collectibles.last().unwrap();
        assert_eq!(coin.pos, Vec2::new(15.0 * 32.0 + 8.0, 9.0 * 32.0));
        assert!(coin.pop.is_some());
        assert_eq!(events, vec![GameEvent::Sound(AudioCue::Block)]);
        assert!(world.effects.bump_offset(coord).is_some());
    }

    #[test]
    fn test_question_block_skips_occupied_cell() {
        let mut world = load(0);
        let id = world.next_entity_id();
        world.collectibles.push(Collectible::at(
            id,
            CollectibleKind::Carrot,
            Vec2::new(28.0 * 32.0 + COLLECTIBLE_WIDTH, 10.0 * 32.0),
        ));
        let before = world.collectibles.len();
        world.hit_block(
            BlockHit {
                coord: TileCoord { row: 11, col: 28 },
                tile: Tile::QuestionBlock,
            },
            &mut Vec::new(),
        );
        assert_eq!(world.tiles.tile_at(11, 28), Tile::UsedBlock);
        assert_eq!(world.collectibles.len(), before);
    }

    #[test]
    fn test_brick_breaks_only_when_big() {
        let mut world = load(0);
        let hit = BlockHit {
            coord: TileCoord { row: 12, col: 8 },
            tile: Tile::Brick,
        };
        world.hit_block(hit, &mut Vec::new());
        assert_eq!(world.tiles.tile_at(12, 8), Tile::Brick);

        world.player.power_up();
        world.hit_block(hit, &mut Vec::new());
        assert_eq!(world.tiles.tile_at(12, 8), Tile::Air);
        assert!(!world.effects.particles.is_empty());
    }

    #[test]
    fn test_player_jumps_into_question_block() {
        let mut world = load(0);
        world.enemies.clear();
        let tuning = Tuning::default();
        // Platform row 12 spans columns 62..67; question block at (9, 64)
        world.player.body.pos = Vec2::new(64.0 * 32.0 + 2.0, 340.0);
        let mut events = Vec::new();
        let idle = PlayerControls::default();
        for _ in 0..10 {
            world.step(&idle, &tuning, &mut events);
        }
        assert!(world.player.body.on_ground);
        assert_eq!(world.player.body.rect().bottom(), 12.0 * 32.0);

        let jump = PlayerControls {
            jump: true,
            jump_held: true,
            ..Default::default()
        };
        world.step(&jump, &tuning, &mut events);
        let held = PlayerControls {
            jump_held: true,
            ..Default::default()
        };
        for _ in 0..30 {
            world.step(&held, &tuning, &mut events);
        }
        assert_eq!(world.tiles.tile_at(9, 64), Tile::UsedBlock);
        assert!(events.contains(&GameEvent::Sound(AudioCue::Jump)));
        assert!(events.contains(&GameEvent::Sound(AudioCue::Block)));
        assert!(
            world
                .collectibles
                .iter()
                .any(|c| c.kind == CollectibleKind::Coin && c.pos.x == 64.0 * 32.0 + 8.0)
        );
    }

    #[test]
    fn test_falling_out_kills_player() {
        let mut world = load(1);
        world.enemies.clear();
        let tuning = Tuning::default();
        world.player.invincible = 50;
        world.player.body.pos = Vec2::new(100.0, world.tiles.pixel_height() + 70.0);
        let mut events = Vec::new();
        let outcome = world.step(&PlayerControls::default(), &tuning, &mut events);
        assert!(outcome.player_died);
        assert!(world.player.dying);
        assert_eq!(events, vec![GameEvent::Sound(AudioCue::Die)]);
    }

    #[test]
    fn test_goal_latches_once() {
        let mut world = load(0);
        world.enemies.clear();
        world.player.body.pos.x = 77.0 * 32.0;
        assert!(world.check_level_end());
        assert!(!world.check_level_end());
        // Walking back and crossing again does not re-trigger
        world.player.body.pos.x = 10.0;
        assert!(!world.check_level_end());
        world.player.body.pos.x = 78.0 * 32.0;
        assert!(!world.check_level_end());
    }

    #[test]
    fn test_respawn_keeps_defeated_boss_gone() {
        let mut world = load(2);
        let tuning = Tuning::default();
        assert!(world.boss().is_some());
        world.player.add_score(700);
        world.boss_defeated = true;
        world.respawn(2, &tuning);
        assert!(world.boss().is_none());
        assert_eq!(world.enemies.len(), 4);
        assert_eq!(world.player.lives, 2);
        assert_eq!(world.player.score, 700);
        assert_eq!(world.camera.x, 0.0);
    }

    #[test]
    fn test_respawn_clears_effects() {
        let mut world = load(0);
        let tuning = Tuning::default();
        let pos = world.player.pos();
        world.effects.burst(pos, 0xFFFFFF, 8);
        world.effects.popup(pos, 100);
        world.effects.bump(TileCoord { row: 10, col: 15 }, -4.0);
        world.respawn(2, &tuning);
        assert!(world.effects.particles.is_empty());
        assert!(world.effects.popups.is_empty());
        assert!(world.effects.bumps.is_empty());
    }
}
