//! Fixed timestep simulation tick
//!
//! Core game loop that advances the phase machine deterministically, plus the
//! accumulator that turns host frame times into whole ticks.

use super::events::{AudioCue, GameEvent, Screen};
use super::player::PlayerControls;
use super::state::{GamePhase, GameState};
use super::world::Carry;
use crate::consts::{MAX_FRAME_TICKS, SIM_DT};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump was pressed since the last tick
    pub jump_pressed: bool,
    /// Jump is currently held (controls jump height)
    pub jump_held: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start a run (title, game over and win screens)
    pub start: bool,
    /// Leave the game over or win screen
    pub to_title: bool,
}

impl TickInput {
    /// Fold a newer input sample in: held state is replaced, presses accumulate
    pub fn merge(&mut self, newer: &TickInput) {
        self.move_left = newer.move_left;
        self.move_right = newer.move_right;
        self.jump_held = newer.jump_held;
        self.jump_pressed |= newer.jump_pressed;
        self.pause |= newer.pause;
        self.start |= newer.start;
        self.to_title |= newer.to_title;
    }

    /// Clear one-shot inputs after processing
    pub fn clear_one_shots(&mut self) {
        self.jump_pressed = false;
        self.pause = false;
        self.start = false;
        self.to_title = false;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.set_phase(GamePhase::Paused);
                return;
            }
            GamePhase::Paused => {
                state.set_phase(GamePhase::Playing);
                return;
            }
            _ => {}
        }
    }
    // Paused time does not count
    if state.phase == GamePhase::Paused {
        return;
    }

    state.time_ticks += 1;
    state.advance_schedule();

    match state.phase {
        GamePhase::Title => {
            if input.start {
                begin_run(state);
            }
        }
        GamePhase::Paused => {}
        GamePhase::Playing => tick_playing(state, input),
        GamePhase::Dying => tick_dying(state),
        GamePhase::LevelClear => tick_level_clear(state),
        GamePhase::GameOver | GamePhase::Win => {
            if input.start {
                begin_run(state);
            } else if input.to_title {
                state.return_to_title();
            }
        }
    }

    state.normalize_order();
}

fn begin_run(state: &mut GameState) {
    if let Err(e) = state.start_run() {
        log::error!("Failed to start run: {e}");
        state.return_to_title();
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput) {
    if input.jump_pressed {
        state.jump_buffer.press();
    }
    let controls = PlayerControls {
        left: input.move_left,
        right: input.move_right,
        jump: state.jump_buffer.tick(),
        jump_held: input.jump_held,
    };

    let tuning = state.settings.tuning.clone();
    let mut events = Vec::new();
    let outcome = match &mut state.world {
        Some(world) => world.step(&controls, &tuning, &mut events),
        None => return,
    };
    for event in events {
        state.emit(event);
    }
    if outcome.jumped {
        state.jump_buffer.consume();
    }

    if outcome.player_died {
        state.set_phase(GamePhase::Dying);
    } else if outcome.level_cleared {
        state.final_score = state.score();
        state.set_phase(GamePhase::LevelClear);
        state.emit(GameEvent::Sound(AudioCue::LevelUp));
        state.schedule(
            tuning.stage_clear_screen_delay,
            GameEvent::ShowScreen(Screen::LevelClear),
        );
    }
}

fn tick_dying(state: &mut GameState) {
    state.phase_ticks += 1;
    let tuning = state.settings.tuning.clone();
    let Some(world) = &mut state.world else {
        return;
    };
    world.step_dying(&tuning);
    if state.phase_ticks < tuning.death_ticks {
        return;
    }

    let lives = world.player.lives.saturating_sub(1);
    if lives == 0 {
        world.player.lives = 0;
        state.final_score = world.player.score;
        log::info!("Game over (score {})", state.final_score);
        state.set_phase(GamePhase::GameOver);
        state.emit(GameEvent::StopMusic);
        state.emit(GameEvent::Sound(AudioCue::GameOver));
        state.schedule(
            tuning.game_over_screen_delay,
            GameEvent::ShowScreen(Screen::GameOver),
        );
    } else {
        world.respawn(lives, &tuning);
        state.jump_buffer.consume();
        state.set_phase(GamePhase::Playing);
    }
}

fn tick_level_clear(state: &mut GameState) {
    state.phase_ticks += 1;
    let tuning = state.settings.tuning.clone();
    let carry = match &mut state.world {
        Some(world) => {
            world.step_level_clear(&tuning);
            Carry {
                lives: world.player.lives,
                score: world.player.score,
            }
        }
        None => return,
    };
    if state.phase_ticks < tuning.level_clear_ticks {
        return;
    }

    if state.catalog().is_final(state.level_index) {
        state.final_score = carry.score;
        log::info!("Campaign complete (score {})", carry.score);
        state.set_phase(GamePhase::Win);
        state.emit(GameEvent::StopMusic);
        state.emit(GameEvent::Sound(AudioCue::LevelUp));
        state.schedule(tuning.win_screen_delay, GameEvent::ShowScreen(Screen::Win));
        return;
    }

    let next = state.level_index + 1;
    match state.load_level(next, carry) {
        Ok(()) => {
            state.set_phase(GamePhase::Playing);
            state.emit(GameEvent::ShowScreen(Screen::Game));
        }
        Err(e) => {
            log::error!("Failed to load level {}: {e}", next + 1);
            state.return_to_title();
        }
    }
}

/// Turns variable host frame times into whole simulation ticks
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
    pending: TickInput,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time carried over to the next frame, in seconds
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Run every tick `frame_dt` seconds owes, at most `MAX_FRAME_TICKS`
    ///
    /// One-shot inputs reach only the first tick and are held until a tick
    /// runs. Time beyond the cap is dropped. Returns the ticks run.
    pub fn advance(&mut self, state: &mut GameState, input: &TickInput, frame_dt: f32) -> u32 {
        self.pending.merge(input);
        self.accumulator += frame_dt.max(0.0);

        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_FRAME_TICKS {
            tick(state, &self.pending);
            self.accumulator -= SIM_DT;
            ticks += 1;

            self.pending.clear_one_shots();
        }
        if ticks == MAX_FRAME_TICKS && self.accumulator >= SIM_DT {
            log::debug!("Frame stall: dropping {:.3}s of backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        ticks
    }
}
