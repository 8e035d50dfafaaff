//! Game state and phase bookkeeping
//!
//! `GameState` owns the level catalog, the current `World` and the outbound
//! event queue. Phase changes go through `set_phase` so every transition is
//! announced and clears pending scheduled events.

use serde::{Deserialize, Serialize};

use super::events::{GameEvent, Schedule, Screen};
use super::input::InputBuffer;
use super::world::{Carry, World};
use crate::catalog::LevelCatalog;
use crate::consts::START_LIVES;
use crate::error::LevelError;
use crate::settings::Settings;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start command
    Title,
    /// Active gameplay
    Playing,
    Paused,
    /// Death animation before respawn or game over
    Dying,
    /// Walk-off after reaching the goal or beating the boss
    LevelClear,
    /// Lives exhausted
    GameOver,
    /// Final level cleared
    Win,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Title => "Title",
            GamePhase::Playing => "Playing",
            GamePhase::Paused => "Paused",
            GamePhase::Dying => "Dying",
            GamePhase::LevelClear => "LevelClear",
            GamePhase::GameOver => "GameOver",
            GamePhase::Win => "Win",
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    catalog: LevelCatalog,
    /// Current phase
    pub phase: GamePhase,
    /// Ticks spent in the current phase (drives Dying and LevelClear)
    pub phase_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Index of the loaded level in the catalog
    pub level_index: usize,
    /// Loaded level; `None` on the title screen
    pub world: Option<World>,
    pub jump_buffer: InputBuffer,
    /// Score shown on the level-clear, game-over and win screens
    pub final_score: u64,
    events: Vec<GameEvent>,
    schedule: Schedule,
}

impl GameState {
    /// Create a state on the title screen
    ///
    /// Settings that fail validation are replaced by the defaults.
    pub fn new(catalog: LevelCatalog, settings: Settings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("Rejected settings ({e}), using defaults");
                Settings::default()
            }
        };
        let jump_buffer = InputBuffer::new(settings.tuning.jump_buffer_ticks);
        Self {
            settings,
            catalog,
            phase: GamePhase::Title,
            phase_ticks: 0,
            time_ticks: 0,
            level_index: 0,
            world: None,
            jump_buffer,
            final_score: 0,
            events: Vec::new(),
            schedule: Schedule::default(),
        }
    }

    /// Title-screen state over the built-in campaign
    pub fn with_builtin(settings: Settings) -> Self {
        Self::new(LevelCatalog::builtin(), settings)
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Score of the current run (0 on the title screen)
    pub fn score(&self) -> u64 {
        self.world
            .as_ref()
            .map_or(self.final_score, |w| w.player.score)
    }

    pub fn lives(&self) -> u8 {
        self.world.as_ref().map_or(0, |w| w.player.lives)
    }

    /// Switch phase, announcing it and dropping scheduled events
    pub fn set_phase(&mut self, to: GamePhase) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        log::info!("Phase {} -> {}", from.as_str(), to.as_str());
        self.phase = to;
        self.phase_ticks = 0;
        self.schedule.clear();
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Emit `event` after `delay_ticks` ticks unless the phase changes first
    pub fn schedule(&mut self, delay_ticks: u32, event: GameEvent) {
        self.schedule.push(delay_ticks, event);
    }

    pub fn pending_scheduled(&self) -> usize {
        self.schedule.len()
    }

    /// Count scheduled events down one tick
    pub fn advance_schedule(&mut self) {
        self.schedule.advance(&mut self.events);
    }

    /// Take every event emitted since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Load a level and make it current
    pub fn load_level(&mut self, index: usize, carry: Carry) -> Result<(), LevelError> {
        let def = self.catalog.get(index)?;
        let music = def.music;
        let world = World::load(index, def, carry, &self.settings)?;
        self.world = Some(world);
        self.level_index = index;
        self.jump_buffer = InputBuffer::new(self.settings.tuning.jump_buffer_ticks);
        self.events.push(GameEvent::PlayMusic(music));
        Ok(())
    }

    /// Fresh run from the first level with full lives and zero score
    pub fn start_run(&mut self) -> Result<(), LevelError> {
        self.load_level(
            0,
            Carry {
                lives: START_LIVES,
                score: 0,
            },
        )?;
        self.final_score = 0;
        self.set_phase(GamePhase::Playing);
        self.emit(GameEvent::ShowScreen(Screen::Game));
        log::info!("Run started ({} levels)", self.catalog.len());
        Ok(())
    }

    /// Drop the current run and return to the title screen
    pub fn return_to_title(&mut self) {
        self.world = None;
        self.set_phase(GamePhase::Title);
        self.emit(GameEvent::StopMusic);
        self.emit(GameEvent::ShowScreen(Screen::Title));
    }

    /// Keep entity lists sorted by id
    pub fn normalize_order(&mut self) {
        if let Some(world) = &mut self.world {
            world.normalize_order();
        }
    }
}
