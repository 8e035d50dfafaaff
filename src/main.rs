//! Rabbit Run entry point
//!
//! Runs the campaign headlessly under a scripted autopilot. Usage:
//!
//! ```text
//! rabbit-run [settings.json] [levels.json]
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) to follow the run.

use std::error::Error;
use std::fs;

use rabbit_run::consts::{SIM_DT, TILE_SIZE};
use rabbit_run::sim::{FixedStep, GameEvent, GamePhase, GameState, TickInput, World};
use rabbit_run::{LevelCatalog, Settings};

/// Give up after ten minutes of simulated time
const MAX_FRAMES: u32 = 60 * 60 * 10;
/// Ticks the autopilot holds jump for
const JUMP_HOLD_TICKS: u32 = 22;
/// How far ahead the autopilot looks for trouble
const LOOKAHEAD: f32 = 48.0;

/// Hold right, jump at walls, pits and enemies
#[derive(Debug, Default)]
struct Autopilot {
    holding: u32,
    last_x: f32,
    stalled: u32,
}

impl Autopilot {
    fn input(&mut self, state: &GameState) -> TickInput {
        match state.phase {
            GamePhase::Title => TickInput {
                start: true,
                ..Default::default()
            },
            GamePhase::Playing => match &state.world {
                Some(world) => self.steer(world),
                None => TickInput::default(),
            },
            _ => TickInput::default(),
        }
    }

    fn steer(&mut self, world: &World) -> TickInput {
        let player = &world.player;
        let rect = player.body.rect();

        if (player.pos().x - self.last_x).abs() < 0.5 {
            self.stalled += 1;
        } else {
            self.stalled = 0;
        }
        self.last_x = player.pos().x;

        let probe_x = rect.right() + LOOKAHEAD * 0.5;
        let wall_ahead = world.tiles.tile_at_point(probe_x, rect.bottom() - 4.0).is_solid();
        let pit_ahead = (0..4).all(|d| {
            !world
                .tiles
                .tile_at_point(probe_x, rect.bottom() + 4.0 + d as f32 * TILE_SIZE)
                .is_solid()
        });
        let enemy_ahead = world.enemies.iter().any(|e| {
            e.is_active()
                && e.body.pos.x > rect.left()
                && e.body.pos.x - rect.right() < LOOKAHEAD * 2.0
                && (e.body.rect().center().y - rect.center().y).abs() < TILE_SIZE * 2.0
        });

        let mut jump_pressed = false;
        if player.body.on_ground
            && (wall_ahead || pit_ahead || enemy_ahead || self.stalled > 10)
        {
            jump_pressed = true;
            self.holding = JUMP_HOLD_TICKS;
        }
        let jump_held = self.holding > 0;
        self.holding = self.holding.saturating_sub(1);

        TickInput {
            move_right: true,
            jump_pressed,
            jump_held,
            ..Default::default()
        }
    }
}

fn load_settings(path: Option<&String>) -> Result<Settings, Box<dyn Error>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(Settings::from_json(&json)?)
        }
        None => Ok(Settings::default()),
    }
}

fn load_catalog(path: Option<&String>) -> Result<LevelCatalog, Box<dyn Error>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(LevelCatalog::from_json(&json)?)
        }
        None => Ok(LevelCatalog::builtin()),
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Sound(cue) => log::debug!("sound {cue:?}"),
        GameEvent::PlayMusic(track) => log::debug!("music track {track}"),
        GameEvent::StopMusic => log::debug!("music stopped"),
        GameEvent::ShowScreen(screen) => log::info!("screen {screen:?}"),
        GameEvent::PhaseChanged { .. } => {}
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = load_settings(args.first())?;
    let catalog = load_catalog(args.get(1))?;
    log::info!("Rabbit Run (headless) starting with {} levels", catalog.len());

    let mut state = GameState::new(catalog, settings);
    let mut step = FixedStep::new();
    let mut autopilot = Autopilot::default();
    let mut furthest_level = 0;

    for _ in 0..MAX_FRAMES {
        let input = autopilot.input(&state);
        step.advance(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            log_event(&event);
        }
        furthest_level = furthest_level.max(state.level_index + 1);

        if matches!(state.phase, GamePhase::GameOver | GamePhase::Win)
            && state.pending_scheduled() == 0
        {
            break;
        }
    }

    log::info!(
        "Finished in {} ticks: {:?}, level {} reached, score {}",
        state.time_ticks,
        state.phase,
        furthest_level,
        state.score()
    );
    println!(
        "{:?} - level {} reached, final score {}",
        state.phase,
        furthest_level,
        state.score()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
