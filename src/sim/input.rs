//! Jump buffering
//!
//! A jump press is remembered for a few ticks so a press slightly before landing
//! still fires the jump once the player touches ground.

use serde::{Deserialize, Serialize};

/// Countdown window that remembers a jump press
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputBuffer {
    window: u32,
    remaining: u32,
}

impl InputBuffer {
    pub fn new(window: u32) -> Self {
        Self {
            window,
            remaining: 0,
        }
    }

    /// Record a jump press (restarts the window)
    pub fn press(&mut self) {
        self.remaining = self.window;
    }

    /// Whether a press is currently buffered
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Read the buffer for this tick, then count it down
    pub fn tick(&mut self) -> bool {
        let active = self.is_active();
        self.remaining = self.remaining.saturating_sub(1);
        active
    }

    /// Drop the buffered press once it has produced a jump
    pub fn consume(&mut self) {
        self.remaining = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_lasts_exactly_the_window() {
        let mut buffer = InputBuffer::new(10);
        buffer.press();
        let active: Vec<bool> = (0..12).map(|_| buffer.tick()).collect();
        assert!(active[..10].iter().all(|&a| a));
        assert!(!active[10] && !active[11]);
    }

    #[test]
    fn test_consume_clears_until_next_press() {
        let mut buffer = InputBuffer::new(10);
        buffer.press();
        assert!(buffer.tick());
        buffer.consume();
        assert!(!buffer.tick());
        buffer.press();
        assert!(buffer.is_active());
    }

    #[test]
    fn test_idle_buffer_never_underflows() {
        let mut buffer = InputBuffer::new(3);
        for _ in 0..5 {
            assert!(!buffer.tick());
        }
        assert!(!buffer.is_active());
    }
}
