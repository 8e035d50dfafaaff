//! Game settings and gameplay tuning
//!
//! Settings are plain data supplied by the host (JSON or code). Nothing here is
//! persisted by the crate itself.

use serde::{Deserialize, Serialize};

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::error::ConfigError;

/// Quality preset levels for feedback effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 32,
            QualityPreset::Medium => 128,
            QualityPreset::High => 512,
        }
    }

    /// Particle count multiplier applied to each burst
    pub fn burst_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.5,
        }
    }
}

/// Gameplay constants, all in pixels and ticks (60 Hz)
///
/// Defaults reproduce the shipped game feel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    pub gravity: f32,
    pub max_fall_speed: f32,
    /// Horizontal velocity multiplier per tick when no direction is held
    pub coast_damping: f32,
    /// Treat Platform tiles as passable from below and from the sides
    pub one_way_platforms: bool,

    // === Player ===
    pub run_speed: f32,
    pub jump_velocity: f32,
    /// Upward speed above which releasing jump cuts the ascent
    pub jump_cut_threshold: f32,
    /// Velocity added per tick while the cut applies
    pub jump_cut: f32,
    pub jump_buffer_ticks: u32,
    pub hit_invincibility_ticks: u32,
    /// Invincibility granted on respawn (0 = respawn straight into normal state)
    pub respawn_grace_ticks: u32,
    pub death_hop_velocity: f32,
    /// How far below the level bottom the player may fall before dying
    pub fall_death_margin: f32,

    // === Interactions ===
    pub stomp_threshold: f32,
    pub stomp_bounce: f32,

    // === Boss ===
    pub boss_max_hp: u8,
    pub boss_invincibility_ticks: u32,
    pub boss_speed: f32,
    pub boss_enraged_speed: f32,
    pub boss_jump_velocity: f32,
    pub boss_jump_interval: u32,
    pub boss_enraged_jump_interval: u32,
    /// Horizontal distance inside which the boss stops chasing
    pub boss_close_range: f32,

    // === Flow ===
    pub death_ticks: u32,
    pub level_clear_ticks: u32,
    pub level_clear_walk_speed: f32,
    /// Dying enemies are removed this far below the level
    pub enemy_despawn_margin: f32,

    // === Camera ===
    /// Fraction of the viewport kept to the left of the player
    pub camera_lead: f32,
    pub camera_smoothing: f32,

    // === Screen switches (ticks after entering the phase) ===
    pub stage_clear_screen_delay: u32,
    pub game_over_screen_delay: u32,
    pub win_screen_delay: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.55,
            max_fall_speed: 16.0,
            coast_damping: 0.7,
            one_way_platforms: false,

            run_speed: 3.5,
            jump_velocity: -13.0,
            jump_cut_threshold: -6.0,
            jump_cut: 1.5,
            jump_buffer_ticks: 10,
            hit_invincibility_ticks: 80,
            respawn_grace_ticks: 0,
            death_hop_velocity: -14.0,
            fall_death_margin: 64.0,

            stomp_threshold: 14.0,
            stomp_bounce: -10.0,

            boss_max_hp: 6,
            boss_invincibility_ticks: 40,
            boss_speed: 1.8,
            boss_enraged_speed: 2.5,
            boss_jump_velocity: -16.0,
            boss_jump_interval: 120,
            boss_enraged_jump_interval: 80,
            boss_close_range: 60.0,

            death_ticks: 90,
            level_clear_ticks: 120,
            level_clear_walk_speed: 2.0,
            enemy_despawn_margin: 200.0,

            camera_lead: 0.35,
            camera_smoothing: 0.12,

            stage_clear_screen_delay: 24,
            game_over_screen_delay: 30,
            win_screen_delay: 36,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Effects quality preset
    pub quality: QualityPreset,
    /// Particle effects (stomps, pickups, broken bricks)
    pub particles: bool,
    /// Viewport size in pixels (drives camera clamping and tile culling)
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Seed for feedback-effect randomness
    pub seed: u64,
    /// Gameplay tuning
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            seed: 0x5EED_CAFE,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse settings from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded settings (quality: {}, viewport: {}x{})",
            settings.quality.as_str(),
            settings.viewport_width,
            settings.viewport_height
        );
        Ok(settings)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        let t = &self.tuning;
        if !(0.0..1.0).contains(&t.camera_smoothing) || t.camera_smoothing == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "camera_smoothing must be in (0, 1), got {}",
                t.camera_smoothing
            )));
        }
        if t.boss_max_hp == 0 {
            return Err(ConfigError::Invalid("boss_max_hp must be at least 1".into()));
        }
        if t.death_ticks == 0 {
            return Err(ConfigError::Invalid("death_ticks must be at least 1".into()));
        }
        Ok(())
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }
}
