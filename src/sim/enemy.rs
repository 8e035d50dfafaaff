//! Enemy species and their per-tick behavior
//!
//! Every enemy shares one `Enemy` record; behavior is dispatched on `Brain`.
//! Species constants live in a single profile table.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::ledge_ahead;
use super::physics::{Body, Facing};
use super::tile::TileWorld;
use crate::Rect;
use crate::consts::TILE_SIZE;
use crate::settings::Tuning;

/// Enemy species tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Zombie,
    Skeleton,
    Dragon,
    Boss,
}

/// Static per-species data
#[derive(Debug, Clone, Copy)]
pub struct SpeciesProfile {
    pub size: Vec2,
    /// Initial horizontal speed (negative walks left)
    pub spawn_vx: f32,
    /// Awarded for each landed stomp
    pub stomp_score: u64,
    /// Stomp particle color (0xRRGGBB)
    pub burst_color: u32,
    /// Ticks per two-frame animation cycle
    pub anim_period: u32,
}

const ZOMBIE: SpeciesProfile = SpeciesProfile {
    size: Vec2::new(24.0, 30.0),
    spawn_vx: -1.4,
    stomp_score: 100,
    burst_color: 0x55EE55,
    anim_period: 16,
};

const SKELETON: SpeciesProfile = SpeciesProfile {
    size: Vec2::new(22.0, 30.0),
    spawn_vx: -1.8,
    stomp_score: 200,
    burst_color: 0xFFFFFF,
    anim_period: 20,
};

const DRAGON: SpeciesProfile = SpeciesProfile {
    size: Vec2::new(36.0, 22.0),
    spawn_vx: -1.5,
    stomp_score: 300,
    burst_color: 0xFF4400,
    anim_period: 16,
};

const BOSS: SpeciesProfile = SpeciesProfile {
    size: Vec2::new(60.0, 44.0),
    spawn_vx: -2.0,
    stomp_score: 500,
    burst_color: 0x9900FF,
    anim_period: 20,
};

/// Dragon vertical float
const FLOAT_STEP: f32 = 0.06;
const FLOAT_AMPLITUDE: f32 = 28.0;
/// Upward pop when a regular enemy is stomped
const STOMP_POP: f32 = -4.0;
/// Boss deceleration when close to its target
const BOSS_BRAKE: f32 = 0.9;
/// Upward impulse when the boss is defeated
const BOSS_DEATH_POP: f32 = -8.0;

impl Species {
    /// Parse a level-data species name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "zombie" => Some(Species::Zombie),
            "skeleton" => Some(Species::Skeleton),
            "dragon" => Some(Species::Dragon),
            "boss" => Some(Species::Boss),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Zombie => "zombie",
            Species::Skeleton => "skeleton",
            Species::Dragon => "dragon",
            Species::Boss => "boss",
        }
    }

    pub fn profile(&self) -> &'static SpeciesProfile {
        match self {
            Species::Zombie => &ZOMBIE,
            Species::Skeleton => &SKELETON,
            Species::Dragon => &DRAGON,
            Species::Boss => &BOSS,
        }
    }

    /// Top-left spawn position for spawn tile `(tx, ty)`
    ///
    /// Walkers stand on the tile below `ty`; dragons float at row `ty` itself.
    pub fn spawn_position(&self, tx: u32, ty: u32) -> Vec2 {
        let row = match self {
            Species::Dragon => ty as f32,
            _ => ty as f32 - 1.0,
        };
        Vec2::new(tx as f32 * TILE_SIZE, row * TILE_SIZE)
    }
}

/// Boss-only state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub hp: u8,
    pub max_hp: u8,
    /// Remaining ticks during which stomps are ignored
    pub invincible: u32,
    pub jump_timer: u32,
    /// Where the boss returns if it ever falls out of the arena
    pub home: Vec2,
}

impl BossState {
    /// Phase 2 starts at half health
    pub fn is_enraged(&self) -> bool {
        u32::from(self.hp) * 2 <= u32::from(self.max_hp)
    }

    pub fn phase(&self) -> u8 {
        if self.is_enraged() { 2 } else { 1 }
    }
}

/// Species-specific behavior state
#[derive(Debug, Clone, PartialEq)]
pub enum Brain {
    /// Ground patrol (Zombie, Skeleton)
    Walker,
    /// Sine float around a fixed baseline (Dragon)
    Flyer { base_y: f32, float_phase: f32 },
    Boss(BossState),
}

/// Result of a landed stomp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StompOutcome {
    /// Boss still invincible from the previous stomp
    Ignored,
    /// Regular enemy dies in one stomp
    Killed,
    /// Boss lost one hit point
    Damaged { hp_left: u8 },
    /// Boss hit points reached zero
    Defeated,
}

/// Side effects of one enemy update
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyStep {
    pub boss_jumped: bool,
    /// Fell far enough below the level to be removed
    pub despawned: bool,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub species: Species,
    pub body: Body,
    pub brain: Brain,
    pub facing: Facing,
    /// False once the enemy should be removed from the level
    pub alive: bool,
    pub dying: bool,
    pub death_timer: u32,
    pub anim_tick: u32,
}

impl Enemy {
    pub fn spawn(id: u32, species: Species, tx: u32, ty: u32, tuning: &Tuning) -> Self {
        let profile = species.profile();
        let pos = species.spawn_position(tx, ty);
        let mut body = Body::new(pos, profile.size);
        body.vel.x = profile.spawn_vx;

        let brain = match species {
            Species::Zombie | Species::Skeleton => Brain::Walker,
            Species::Dragon => Brain::Flyer {
                base_y: pos.y,
                float_phase: 0.0,
            },
            Species::Boss => Brain::Boss(BossState {
                hp: tuning.boss_max_hp,
                max_hp: tuning.boss_max_hp,
                invincible: 0,
                jump_timer: 0,
                home: pos,
            }),
        };

        Self {
            id,
            species,
            body,
            brain,
            facing: Facing::Left,
            alive: true,
            dying: false,
            death_timer: 0,
            anim_tick: 0,
        }
    }

    /// Alive and not in its death fall; only active enemies interact
    #[inline]
    pub fn is_active(&self) -> bool {
        self.alive && !self.dying
    }

    #[inline]
    pub fn hitbox(&self) -> Rect {
        self.body.rect()
    }

    pub fn boss_state(&self) -> Option<&BossState> {
        match &self.brain {
            Brain::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    /// Stomps are currently ignored (boss post-hit window)
    pub fn is_invincible(&self) -> bool {
        self.boss_state().is_some_and(|b| b.invincible > 0)
    }

    /// Two-frame animation index
    pub fn anim_frame(&self) -> u8 {
        let period = self.species.profile().anim_period;
        if self.anim_tick % period < period / 2 { 0 } else { 1 }
    }

    /// Advance one tick; `target_x` is the player's x (the boss seeks it)
    pub fn update(&mut self, world: &TileWorld, target_x: f32, tuning: &Tuning) -> EnemyStep {
        let mut step = EnemyStep::default();
        if !self.alive {
            return step;
        }

        if self.dying {
            self.death_timer += 1;
            let gravity = if matches!(self.brain, Brain::Boss(_)) {
                tuning.gravity * 0.5
            } else {
                tuning.gravity
            };
            self.body.drift(gravity);
            if self.body.pos.y > world.pixel_height() + tuning.enemy_despawn_margin {
                self.alive = false;
                step.despawned = true;
            }
            return step;
        }

        self.anim_tick += 1;
        match &mut self.brain {
            Brain::Walker => patrol(&mut self.body, world, tuning),
            Brain::Flyer {
                base_y,
                float_phase,
            } => {
                *float_phase += FLOAT_STEP;
                let body = &mut self.body;
                body.pos.y = *base_y + float_phase.sin() * FLOAT_AMPLITUDE;
                body.pos.x += body.vel.x;
                let max_x = world.pixel_width() - body.size.x;
                if body.pos.x < 0.0 {
                    body.pos.x = 0.0;
                    body.vel.x = body.vel.x.abs();
                } else if body.pos.x > max_x {
                    body.pos.x = max_x;
                    body.vel.x = -body.vel.x.abs();
                }
            }
            Brain::Boss(boss) => {
                step.boss_jumped = boss_update(boss, &mut self.body, world, target_x, tuning);
            }
        }
        self.facing = Facing::from_velocity(self.body.vel.x, self.facing);
        step
    }

    /// Apply a landed stomp
    pub fn stomp(&mut self, tuning: &Tuning) -> StompOutcome {
        if !self.is_active() {
            return StompOutcome::Ignored;
        }
        match &mut self.brain {
            Brain::Boss(boss) => {
                if boss.invincible > 0 {
                    return StompOutcome::Ignored;
                }
                boss.hp = boss.hp.saturating_sub(1);
                boss.invincible = tuning.boss_invincibility_ticks;
                if boss.hp == 0 {
                    self.dying = true;
                    self.death_timer = 0;
                    self.body.vel.y = BOSS_DEATH_POP;
                    StompOutcome::Defeated
                } else {
                    StompOutcome::Damaged { hp_left: boss.hp }
                }
            }
            _ => {
                self.dying = true;
                self.death_timer = 0;
                self.body.vel = Vec2::new(0.0, STOMP_POP);
                StompOutcome::Killed
            }
        }
    }
}

/// Ground patrol: reverse on walls, ledges and the world edges
fn patrol(body: &mut Body, world: &TileWorld, tuning: &Tuning) {
    body.apply_gravity(tuning.gravity, tuning.max_fall_speed);

    let vx = body.vel.x;
    let mut reverse = body.step_horizontal(world).is_some();
    body.vel.x = vx;

    let max_x = world.pixel_width() - body.size.x;
    if body.pos.x < 0.0 || body.pos.x > max_x {
        body.clamp_x(0.0, max_x);
        reverse = true;
    }
    // Airborne spawns drop straight down before patrolling
    if !reverse && body.on_ground && ledge_ahead(body, world) {
        reverse = true;
    }
    if reverse {
        body.vel.x = -vx;
    }

    body.step_vertical(world);
}

/// Boss seek/jump behavior; returns true when a jump starts
fn boss_update(
    boss: &mut BossState,
    body: &mut Body,
    world: &TileWorld,
    target_x: f32,
    tuning: &Tuning,
) -> bool {
    boss.invincible = boss.invincible.saturating_sub(1);

    let enraged = boss.is_enraged();
    let speed = if enraged {
        tuning.boss_enraged_speed
    } else {
        tuning.boss_speed
    };
    let dx = target_x - body.pos.x;
    if dx.abs() > tuning.boss_close_range {
        body.vel.x = speed.copysign(dx);
    } else {
        body.vel.x *= BOSS_BRAKE;
    }
    // Holds at pit edges instead of walking in
    if body.on_ground && body.vel.x != 0.0 && ledge_ahead(body, world) {
        body.vel.x = 0.0;
    }

    boss.jump_timer += 1;
    let interval = if enraged {
        tuning.boss_enraged_jump_interval
    } else {
        tuning.boss_jump_interval
    };
    let mut jumped = false;
    if boss.jump_timer > interval && body.on_ground {
        body.jump(tuning.boss_jump_velocity);
        boss.jump_timer = 0;
        jumped = true;
    }

    body.apply_gravity(tuning.gravity, tuning.max_fall_speed);
    body.step_horizontal(world);
    body.clamp_x(0.0, world.pixel_width() - body.size.x);
    body.step_vertical(world);

    if body.pos.y > world.pixel_height() {
        log::debug!("Boss fell out of the arena, returning home");
        body.pos = boss.home;
        body.vel = Vec2::ZERO;
    }
    jumped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::Tile;

    /// Floor on row 16 from `from` to `to` (exclusive), open elsewhere
    fn floor(width: usize, from: i32, to: i32) -> TileWorld {
        let mut world = TileWorld::empty(width, 20);
        for col in from..to {
            for row in 16..20 {
                world.set(row, col, Tile::Ground);
            }
        }
        world
    }

    fn settle(enemy: &mut Enemy, world: &TileWorld, tuning: &Tuning) {
        for _ in 0..20 {
            enemy.update(world, 0.0, tuning);
        }
    }

    #[test]
    fn test_species_names() {
        for species in [Species::Zombie, Species::Skeleton, Species::Dragon, Species::Boss] {
            assert_eq!(Species::from_name(species.as_str()), Some(species));
        }
        assert_eq!(Species::from_name("SKELETON"), Some(Species::Skeleton));
        assert_eq!(Species::from_name("slime"), None);
    }

    #[test]
    fn test_spawn_positions() {
        let tuning = Tuning::default();
        let zombie = Enemy::spawn(1, Species::Zombie, 16, 14, &tuning);
        assert_eq!(zombie.body.pos, Vec2::new(512.0, 416.0));
        let dragon = Enemy::spawn(2, Species::Dragon, 18, 7, &tuning);
        assert_eq!(dragon.body.pos, Vec2::new(576.0, 224.0));
    }

    #[test]
    fn test_walker_reverses_at_wall() {
        let tuning = Tuning::default();
        let mut world = floor(20, 0, 20);
        world.set(15, 3, Tile::Pipe);
        let mut zombie = Enemy::spawn(1, Species::Zombie, 6, 16, &tuning);
        let mut turned = false;
        for _ in 0..200 {
            zombie.update(&world, 0.0, &tuning);
            assert!(zombie.body.pos.x >= 4.0 * TILE_SIZE);
            if zombie.body.vel.x > 0.0 {
                turned = true;
                break;
            }
        }
        assert!(turned);
        assert_eq!(zombie.facing, Facing::Right);
    }

    #[test]
    fn test_walker_reverses_at_ledge() {
        let tuning = Tuning::default();
        let world = floor(20, 4, 20);
        let mut skeleton = Enemy::spawn(1, Species::Skeleton, 8, 16, &tuning);
        for _ in 0..300 {
            skeleton.update(&world, 0.0, &tuning);
            assert!(skeleton.body.on_ground || skeleton.anim_tick < 5);
            assert!(skeleton.body.pos.y < 16.0 * TILE_SIZE);
        }
    }

    #[test]
    fn test_dragon_floats_without_gravity() {
        let tuning = Tuning::default();
        let world = TileWorld::empty(20, 20);
        let mut dragon = Enemy::spawn(1, Species::Dragon, 10, 7, &tuning);
        let base = dragon.body.pos.y;
        for _ in 0..500 {
            dragon.update(&world, 0.0, &tuning);
            assert!((dragon.body.pos.y - base).abs() <= FLOAT_AMPLITUDE + 0.001);
            assert!(dragon.body.pos.x >= 0.0);
            assert!(dragon.body.rect().right() <= world.pixel_width());
        }
    }

    #[test]
    fn test_dragon_turns_at_left_edge() {
        let tuning = Tuning::default();
        let world = TileWorld::empty(20, 20);
        let mut dragon = Enemy::spawn(1, Species::Dragon, 0, 7, &tuning);
        dragon.update(&world, 0.0, &tuning);
        assert_eq!(dragon.body.pos.x, 0.0);
        assert!(dragon.body.vel.x > 0.0);
    }

    #[test]
    fn test_regular_stomp_kills_in_one() {
        let tuning = Tuning::default();
        for species in [Species::Zombie, Species::Skeleton, Species::Dragon] {
            let mut enemy = Enemy::spawn(1, species, 5, 10, &tuning);
            assert_eq!(enemy.stomp(&tuning), StompOutcome::Killed);
            assert!(!enemy.is_active());
            assert_eq!(enemy.stomp(&tuning), StompOutcome::Ignored);
        }
    }

    #[test]
    fn test_boss_takes_six_stomps() {
        let tuning = Tuning::default();
        let mut boss = Enemy::spawn(1, Species::Boss, 10, 16, &tuning);
        for expected in (1..6u8).rev() {
            assert_eq!(boss.stomp(&tuning), StompOutcome::Damaged { hp_left: expected });
            // Stomps during the invincibility window do nothing
            assert_eq!(boss.stomp(&tuning), StompOutcome::Ignored);
            if let Brain::Boss(state) = &mut boss.brain {
                state.invincible = 0;
            }
        }
        assert_eq!(boss.stomp(&tuning), StompOutcome::Defeated);
        assert!(boss.dying);
        assert!(boss.body.vel.y < 0.0);
    }

    #[test]
    fn test_boss_enrages_at_half_health() {
        let tuning = Tuning::default();
        let mut boss = Enemy::spawn(1, Species::Boss, 10, 16, &tuning);
        let hits = |boss: &mut Enemy, n: usize| {
            for _ in 0..n {
                if let Brain::Boss(state) = &mut boss.brain {
                    state.invincible = 0;
                }
                boss.stomp(&tuning);
            }
        };
        hits(&mut boss, 2);
        assert_eq!(boss.boss_state().map(BossState::phase), Some(1));
        hits(&mut boss, 1);
        assert_eq!(boss.boss_state().map(BossState::phase), Some(2));
    }

    #[test]
    fn test_boss_seeks_and_jumps() {
        let tuning = Tuning::default();
        let world = floor(40, 0, 40);
        let mut boss = Enemy::spawn(1, Species::Boss, 30, 16, &tuning);
        settle(&mut boss, &world, &tuning);
        let start_x = boss.body.pos.x;
        let mut jumped = false;
        for _ in 0..130 {
            jumped |= boss.update(&world, 64.0, &tuning).boss_jumped;
        }
        assert!(jumped);
        assert!(boss.body.pos.x < start_x);
        assert_eq!(boss.facing, Facing::Left);
    }

    #[test]
    fn test_boss_holds_at_pit_edge() {
        let tuning = Tuning::default();
        let mut world = floor(40, 0, 40);
        for row in 16..20 {
            for col in 20..24 {
                world.set(row, col, Tile::Air);
            }
        }
        let mut boss = Enemy::spawn(1, Species::Boss, 26, 16, &tuning);
        for _ in 0..100 {
            boss.update(&world, 0.0, &tuning);
        }
        assert!(boss.body.pos.x >= 24.0 * TILE_SIZE - tuning.boss_speed);
        assert!(boss.body.on_ground);
    }

    #[test]
    fn test_dying_enemy_despawns_below_level() {
        let tuning = Tuning::default();
        let world = floor(20, 0, 20);
        let mut zombie = Enemy::spawn(1, Species::Zombie, 5, 16, &tuning);
        zombie.stomp(&tuning);
        let mut despawned = false;
        for _ in 0..200 {
            despawned |= zombie.update(&world, 0.0, &tuning).despawned;
        }
        assert!(despawned);
        assert!(!zombie.alive);
    }
}
