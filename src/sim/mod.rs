//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (every tuning value is per 60 Hz tick)
//! - Seeded RNG only (and only for cosmetic effects)
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod camera;
pub mod collectible;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod events;
pub mod input;
pub mod interaction;
pub mod physics;
pub mod player;
pub mod state;
pub mod tick;
pub mod tile;
pub mod world;

pub use camera::Camera;
pub use collectible::{Collectible, CollectibleKind};
pub use collision::{BlockHit, ledge_ahead};
pub use effects::Effects;
pub use enemy::{BossState, Enemy, Species, StompOutcome};
pub use events::{AudioCue, GameEvent, Screen};
pub use input::InputBuffer;
pub use interaction::{Contact, classify};
pub use physics::{Body, Facing};
pub use player::{Player, PlayerControls, PlayerState, PowerState};
pub use state::{GamePhase, GameState};
pub use tick::{FixedStep, TickInput, tick};
pub use tile::{Tile, TileCoord, TileWorld};
pub use world::{Carry, World};
