//! The player character
//!
//! Life cycle per life: Normal ⇄ Invincible (after a downgrade) → Dying. A dying
//! player only plays its death hop; the game state decides when the life ends.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::BlockHit;
use super::physics::{Body, Facing};
use super::tile::TileWorld;
use crate::Rect;
use crate::consts::TILE_SIZE;
use crate::settings::Tuning;

pub const PLAYER_WIDTH: f32 = 28.0;
pub const PLAYER_HEIGHT: f32 = 30.0;
/// Hitbox is narrower than the collision box on both sides
const HITBOX_INSET: f32 = 2.0;
/// Ticks per run-cycle frame
const RUN_FRAME_TICKS: u32 = 8;

/// Size tier gating one-hit death vs. one-hit downgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerState {
    #[default]
    Small,
    Big,
}

/// Observable life state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Normal,
    /// Post-damage flicker window; hits are ignored
    Invincible,
    Dying,
}

/// What a hit did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Invincible or already dying
    Ignored,
    /// Big → Small with an invincibility window
    PoweredDown,
    Killed,
}

/// Animation frame for sprite selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerFrame {
    Idle,
    Run1,
    Run2,
    Jump,
    Die,
}

/// Per-tick control state after jump buffering
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControls {
    pub left: bool,
    pub right: bool,
    /// A buffered jump press is pending
    pub jump: bool,
    pub jump_held: bool,
}

/// What happened during a player update
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerStep {
    pub jumped: bool,
    pub block_hit: Option<BlockHit>,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub lives: u8,
    /// Never decreases within a life
    pub score: u64,
    pub power: PowerState,
    /// Remaining invincibility ticks
    pub invincible: u32,
    pub dying: bool,
    /// Ticks since the death hop started (animation only)
    pub death_timer: u32,
    pub facing: Facing,
    pub anim_tick: u32,
    run_frame: bool,
}

impl Player {
    /// Create a player standing on spawn tile `(tx, ty)`
    pub fn at_spawn(tx: u32, ty: u32, lives: u8, score: u64) -> Self {
        let pos = Vec2::new(
            tx as f32 * TILE_SIZE,
            (ty as f32 - 1.0) * TILE_SIZE,
        );
        Self {
            body: Body::new(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
                .with_foot_inset(HITBOX_INSET),
            lives,
            score,
            power: PowerState::Small,
            invincible: 0,
            dying: false,
            death_timer: 0,
            facing: Facing::Right,
            anim_tick: 0,
            run_frame: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    /// Damage/pickup box
    pub fn hitbox(&self) -> Rect {
        let rect = self.body.rect();
        Rect::new(
            rect.left() + HITBOX_INSET,
            rect.top(),
            rect.size.x - HITBOX_INSET * 2.0,
            rect.size.y,
        )
    }

    pub fn state(&self) -> PlayerState {
        if self.dying {
            PlayerState::Dying
        } else if self.invincible > 0 {
            PlayerState::Invincible
        } else {
            PlayerState::Normal
        }
    }

    pub fn is_big(&self) -> bool {
        self.power == PowerState::Big
    }

    /// Advance one tick of movement, collision and timers
    pub fn update(&mut self, controls: &PlayerControls, world: &TileWorld, tuning: &Tuning) -> PlayerStep {
        if self.dying {
            self.death_timer += 1;
            self.body.drift(tuning.gravity);
            return PlayerStep::default();
        }

        let body = &mut self.body;
        if controls.left {
            body.vel.x = -tuning.run_speed;
            self.facing = Facing::Left;
        } else if controls.right {
            body.vel.x = tuning.run_speed;
            self.facing = Facing::Right;
        } else {
            body.coast(tuning.coast_damping);
        }

        let mut step = PlayerStep::default();
        if controls.jump && body.on_ground {
            body.jump(tuning.jump_velocity);
            step.jumped = true;
        }
        if !controls.jump_held {
            body.cut_jump(tuning.jump_cut_threshold, tuning.jump_cut);
        }
        body.apply_gravity(tuning.gravity, tuning.max_fall_speed);

        body.step_horizontal(world);
        body.clamp_x(0.0, world.pixel_width() - body.size.x);
        step.block_hit = body.step_vertical(world).block_hit;

        self.invincible = self.invincible.saturating_sub(1);

        self.anim_tick += 1;
        if self.anim_tick % RUN_FRAME_TICKS == 0 {
            self.run_frame = !self.run_frame;
        }

        step
    }

    /// Apply enemy damage; a no-op while invincible or dying
    pub fn take_hit(&mut self, tuning: &Tuning) -> HitOutcome {
        if self.dying || self.invincible > 0 {
            return HitOutcome::Ignored;
        }
        match self.power {
            PowerState::Big => {
                self.power = PowerState::Small;
                self.invincible = tuning.hit_invincibility_ticks;
                HitOutcome::PoweredDown
            }
            PowerState::Small => {
                self.kill(tuning);
                HitOutcome::Killed
            }
        }
    }

    /// Start dying regardless of invincibility; returns false if already dying
    pub fn kill(&mut self, tuning: &Tuning) -> bool {
        if self.dying {
            return false;
        }
        self.dying = true;
        self.death_timer = 0;
        self.body.vel = Vec2::new(0.0, tuning.death_hop_velocity);
        true
    }

    /// Mushroom pickup; returns true if the power state changed
    pub fn power_up(&mut self) -> bool {
        let changed = self.power == PowerState::Small;
        self.power = PowerState::Big;
        changed
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Upward impulse after a stomp
    pub fn bounce(&mut self, velocity: f32) {
        self.body.vel.y = velocity;
        self.body.on_ground = false;
    }

    pub fn frame(&self) -> PlayerFrame {
        if self.dying {
            PlayerFrame::Die
        } else if !self.body.on_ground {
            PlayerFrame::Jump
        } else if self.body.vel.x.abs() > 0.5 {
            if self.run_frame {
                PlayerFrame::Run2
            } else {
                PlayerFrame::Run1
            }
        } else {
            PlayerFrame::Idle
        }
    }

    /// Invincibility flicker: hidden on alternating 4-tick spans
    pub fn flicker_hidden(&self) -> bool {
        self.invincible > 0 && (self.invincible / 4) % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::Tile;
    use proptest::prelude::*;

    /// Flat floor on row 16, like the built-in levels
    fn flat_world() -> TileWorld {
        let mut world = TileWorld::empty(40, 20);
        for row in 16..20 {
            for col in 0..40 {
                world.set(row, col, Tile::Ground);
            }
        }
        world
    }

    fn grounded_player(world: &TileWorld, tuning: &Tuning) -> Player {
        let mut player = Player::at_spawn(2, 14, 3, 0);
        for _ in 0..30 {
            player.update(&PlayerControls::default(), world, tuning);
        }
        assert!(player.body.on_ground);
        player
    }

    #[test]
    fn test_spawn_falls_to_floor() {
        let tuning = Tuning::default();
        let world = flat_world();
        let player = grounded_player(&world, &tuning);
        assert_eq!(player.body.rect().bottom(), 16.0 * TILE_SIZE);
        assert_eq!(player.body.vel.y, 0.0);
        assert_eq!(player.frame(), PlayerFrame::Idle);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let tuning = Tuning::default();
        let world = flat_world();
        let mut player = grounded_player(&world, &tuning);
        let jump = PlayerControls {
            jump: true,
            jump_held: true,
            ..Default::default()
        };
        assert!(player.update(&jump, &world, &tuning).jumped);
        assert!(player.body.vel.y < 0.0);
        // Mid-air presses do nothing
        assert!(!player.update(&jump, &world, &tuning).jumped);
    }

    #[test]
    fn test_releasing_jump_lowers_apex() {
        let tuning = Tuning::default();
        let world = flat_world();
        let apex = |hold: bool| {
            let mut player = grounded_player(&world, &tuning);
            let start = player.pos().y;
            let mut controls = PlayerControls {
                jump: true,
                jump_held: hold,
                ..Default::default()
            };
            let mut highest = start;
            for _ in 0..60 {
                player.update(&controls, &world, &tuning);
                controls.jump = false;
                highest = highest.min(player.pos().y);
            }
            start - highest
        };
        assert!(apex(true) > apex(false));
    }

    #[test]
    fn test_coasts_after_release() {
        let tuning = Tuning::default();
        let world = flat_world();
        let mut player = grounded_player(&world, &tuning);
        let right = PlayerControls {
            right: true,
            ..Default::default()
        };
        player.update(&right, &world, &tuning);
        assert_eq!(player.body.vel.x, tuning.run_speed);
        assert_eq!(player.facing, Facing::Right);
        player.update(&PlayerControls::default(), &world, &tuning);
        assert!(player.body.vel.x > 0.0 && player.body.vel.x < tuning.run_speed);
    }

    #[test]
    fn test_clamped_to_world() {
        let tuning = Tuning::default();
        let world = flat_world();
        let mut player = grounded_player(&world, &tuning);
        let left = PlayerControls {
            left: true,
            ..Default::default()
        };
        for _ in 0..100 {
            player.update(&left, &world, &tuning);
        }
        assert_eq!(player.pos().x, 0.0);
    }

    #[test]
    fn test_big_hit_downgrades_then_small_hit_kills() {
        let tuning = Tuning::default();
        let mut player = Player::at_spawn(2, 14, 3, 0);
        assert!(player.power_up());
        assert!(!player.power_up());
        assert_eq!(player.take_hit(&tuning), HitOutcome::PoweredDown);
        assert_eq!(player.power, PowerState::Small);
        assert_eq!(player.state(), PlayerState::Invincible);

        player.invincible = 0;
        assert_eq!(player.take_hit(&tuning), HitOutcome::Killed);
        assert_eq!(player.state(), PlayerState::Dying);
        assert_eq!(player.lives, 3);
        assert_eq!(player.take_hit(&tuning), HitOutcome::Ignored);
    }

    #[test]
    fn test_kill_ignores_invincibility() {
        let tuning = Tuning::default();
        let mut player = Player::at_spawn(2, 14, 3, 0);
        player.invincible = 50;
        assert!(player.kill(&tuning));
        assert!(player.dying);
        assert!(!player.kill(&tuning));
    }

    #[test]
    fn test_dying_player_ignores_controls() {
        let tuning = Tuning::default();
        let world = flat_world();
        let mut player = grounded_player(&world, &tuning);
        player.kill(&tuning);
        let x = player.pos().x;
        let step = player.update(
            &PlayerControls {
                right: true,
                jump: true,
                ..Default::default()
            },
            &world,
            &tuning,
        );
        assert!(!step.jumped);
        assert_eq!(player.pos().x, x);
        assert_eq!(player.death_timer, 1);
        assert_eq!(player.frame(), PlayerFrame::Die);
    }

    proptest! {
        #[test]
        fn prop_invincibility_blocks_all_damage(ticks in 1u32..200, big in any::<bool>()) {
            let tuning = Tuning::default();
            let mut player = Player::at_spawn(2, 14, 3, 0);
            if big {
                player.power_up();
            }
            player.invincible = ticks;
            let power = player.power;
            prop_assert_eq!(player.take_hit(&tuning), HitOutcome::Ignored);
            prop_assert_eq!(player.power, power);
            prop_assert_eq!(player.lives, 3);
            prop_assert!(!player.dying);
        }
    }
}
