//! Player contacts with enemies and pickups

use glam::Vec2;

use super::collectible::{Collectible, CollectibleKind};
use super::effects::Effects;
use super::enemy::{Enemy, StompOutcome};
use super::events::{AudioCue, GameEvent};
use super::player::{HitOutcome, Player};
use crate::settings::Tuning;

/// Popups appear this far above the player
const POPUP_RISE: f32 = 20.0;
const STOMP_PARTICLES: usize = 10;

/// How a player/enemy overlap resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    /// Player came down on the enemy's top edge
    Stomp,
    /// Any other overlap damages the player
    Hit,
}

/// What enemy contacts did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactSummary {
    pub stomps: u32,
    pub boss_defeated: bool,
    pub player_killed: bool,
}

/// Classify the contact between the player and one active enemy
pub fn classify(player: &Player, enemy: &Enemy, tuning: &Tuning) -> Contact {
    if !enemy.is_active() || player.dying {
        return Contact::None;
    }
    if !player.hitbox().overlaps(&enemy.hitbox()) {
        return Contact::None;
    }
    let depth = player.body.rect().bottom() - enemy.body.rect().top();
    if depth < tuning.stomp_threshold && player.body.vel.y > 0.0 {
        Contact::Stomp
    } else {
        Contact::Hit
    }
}

/// Resolve contacts against every enemy in id order
///
/// Stops at the first contact that kills the player.
pub fn resolve_enemies(
    player: &mut Player,
    enemies: &mut [Enemy],
    effects: &mut Effects,
    events: &mut Vec<GameEvent>,
    tuning: &Tuning,
) -> ContactSummary {
    let mut summary = ContactSummary::default();
    for enemy in enemies.iter_mut() {
        match classify(player, enemy, tuning) {
            Contact::None => {}
            Contact::Stomp => {
                let outcome = enemy.stomp(tuning);
                player.bounce(tuning.stomp_bounce);
                if outcome == StompOutcome::Ignored {
                    continue;
                }
                summary.stomps += 1;
                let points = enemy.species.profile().stomp_score;
                player.add_score(points);
                effects.popup(player.pos() - Vec2::new(0.0, POPUP_RISE), points);
                effects.burst(
                    enemy.body.rect().center(),
                    enemy.species.profile().burst_color,
                    STOMP_PARTICLES,
                );
                events.push(GameEvent::Sound(AudioCue::Stomp));
                if outcome == StompOutcome::Defeated {
                    log::info!("Boss defeated");
                    summary.boss_defeated = true;
                }
            }
            Contact::Hit => match player.take_hit(tuning) {
                HitOutcome::Ignored => {}
                HitOutcome::PoweredDown => events.push(GameEvent::Sound(AudioCue::Hit)),
                HitOutcome::Killed => {
                    events.push(GameEvent::Sound(AudioCue::Die));
                    summary.player_killed = true;
                    break;
                }
            },
        }
    }
    summary
}

/// Collect every uncollected item the player overlaps; returns points gained
pub fn collect_pickups(
    player: &mut Player,
    collectibles: &mut [Collectible],
    effects: &mut Effects,
    events: &mut Vec<GameEvent>,
) -> u64 {
    if player.dying {
        return 0;
    }
    let hitbox = player.hitbox();
    let mut gained = 0;
    for item in collectibles.iter_mut().filter(|c| !c.collected) {
        if !hitbox.overlaps(&item.hitbox()) {
            continue;
        }
        item.collected = true;
        let points = item.kind.score();
        player.add_score(points);
        gained += points;
        if item.kind == CollectibleKind::Mushroom {
            player.power_up();
        }
        events.push(GameEvent::Sound(item.kind.cue()));
        let (color, count) = item.kind.burst();
        effects.burst(item.pos, color, count);
        effects.popup(player.pos() - Vec2::new(0.0, POPUP_RISE), points);
    }
    gained
}
