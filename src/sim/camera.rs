//! Horizontal follow camera

use crate::settings::Tuning;

/// Smoothed horizontal scroll that leads the player
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Left edge of the view in world pixels
    pub x: f32,
    viewport_width: f32,
    lead: f32,
    smoothing: f32,
}

impl Camera {
    pub fn new(viewport_width: f32, tuning: &Tuning) -> Self {
        Self {
            x: 0.0,
            viewport_width,
            lead: tuning.camera_lead,
            smoothing: tuning.camera_smoothing,
        }
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Where the camera wants to be, clamped to the level
    pub fn target(&self, player_x: f32, level_width: f32) -> f32 {
        let max_x = (level_width - self.viewport_width).max(0.0);
        (player_x - self.viewport_width * self.lead).clamp(0.0, max_x)
    }

    /// Ease toward the target by the smoothing factor
    pub fn update(&mut self, player_x: f32, level_width: f32) {
        let target = self.target(player_x, level_width);
        self.x += (target - self.x) * self.smoothing;
    }

    pub fn reset(&mut self) {
        self.x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_clamps_to_level() {
        let camera = Camera::new(960.0, &Tuning::default());
        assert_eq!(camera.target(100.0, 2560.0), 0.0);
        assert_eq!(camera.target(5000.0, 2560.0), 1600.0);
        assert_eq!(camera.target(1336.0, 2560.0), 1000.0);
        // Narrow level never scrolls
        assert_eq!(camera.target(500.0, 640.0), 0.0);
    }

    #[test]
    fn test_update_eases_toward_target() {
        let mut camera = Camera::new(960.0, &Tuning::default());
        camera.update(1336.0, 2560.0);
        assert!((camera.x - 120.0).abs() < 1e-3);
        for _ in 0..200 {
            camera.update(1336.0, 2560.0);
        }
        assert!((camera.x - 1000.0).abs() < 0.01);
        camera.reset();
        assert_eq!(camera.x, 0.0);
    }
}
