//! Outbound notifications for the audio engine and UI host

use serde::{Deserialize, Serialize};

use super::state::GamePhase;

/// One-shot sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    Jump,
    Coin,
    Stomp,
    Die,
    Hit,
    Block,
    Boss,
    LevelUp,
    GameOver,
    PowerUp,
}

/// Full-screen UI panels the host shows between levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Title,
    Game,
    LevelClear,
    GameOver,
    Win,
}

/// Events emitted by the simulation, drained by the host once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(AudioCue),
    /// Start a background track (index from level data)
    PlayMusic(u32),
    StopMusic,
    ShowScreen(Screen),
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// An event held back for a number of ticks
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub remaining: u32,
    pub event: GameEvent,
}

/// Tick-based delay queue; the state machine clears it on every phase change
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pending: Vec<Scheduled>,
}

impl Schedule {
    pub fn push(&mut self, delay_ticks: u32, event: GameEvent) {
        self.pending.push(Scheduled {
            remaining: delay_ticks,
            event,
        });
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Count every entry down one tick and move the due ones to `out` in push order
    pub fn advance(&mut self, out: &mut Vec<GameEvent>) {
        for entry in &mut self.pending {
            entry.remaining = entry.remaining.saturating_sub(1);
        }
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|e| e.remaining == 0);
        self.pending = waiting;
        out.extend(due.into_iter().map(|e| e.event));
    }
}
