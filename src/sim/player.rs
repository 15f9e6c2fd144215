//! Player-interaction resolver
//!
//! A move looks at the occupant of the target cell and dispatches on its
//! kind. Rejected moves return an error and leave the state untouched.

use super::element::{Colour, Direction, ElementKind, Position};
use super::explosion::{ExplosionYield, apply_explosion};
use super::grid::MoveMode;
use super::state::{GameEvent, GameState, LoseCause, Outcome};
use crate::error::{Result, SimError};

/// What an accepted move did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Dug,
    CollectedDiamond,
    CollectedKey(Colour),
    Unlocked(Colour),
    Pushed,
    ReachedExit,
    /// Walked into an enemy
    Died,
}

/// Resolve one directional command
pub fn move_player(state: &mut GameState, dir: Direction) -> Result<MoveOutcome> {
    let from = state.player.pos;
    if !state.player.is_alive() {
        return Err(SimError::IllegalMove { from, to: from });
    }
    let Some(to) = state.grid.step(from, dir) else {
        return Err(SimError::IllegalMove { from, to: from });
    };
    let target = state.grid.get(to)?.kind;

    match target {
        ElementKind::Path => {
            enter(state, to)?;
            Ok(MoveOutcome::Moved)
        }
        ElementKind::Dirt => {
            enter(state, to)?;
            state.emit(GameEvent::DirtDug { pos: to });
            Ok(MoveOutcome::Dug)
        }
        ElementKind::LockedDoor { unlocked: true, .. } => {
            enter(state, to)?;
            Ok(MoveOutcome::Moved)
        }
        ElementKind::LockedDoor { colour, .. } => {
            if !state.player.holds(colour) {
                return Err(SimError::MismatchedKey {
                    door: colour,
                    held: state.player.keys.iter().copied().collect(),
                });
            }
            state.grid.update(
                to,
                ElementKind::LockedDoor {
                    colour,
                    unlocked: true,
                },
            )?;
            log::debug!("{colour:?} door unlocked at {to}");
            state.emit(GameEvent::DoorUnlocked { pos: to, colour });
            enter(state, to)?;
            Ok(MoveOutcome::Unlocked(colour))
        }
        ElementKind::Key { colour } => {
            enter(state, to)?;
            state.player.keys.insert(colour);
            log::debug!("{colour:?} key collected at {to}");
            state.emit(GameEvent::KeyCollected { pos: to, colour });
            Ok(MoveOutcome::CollectedKey(colour))
        }
        ElementKind::Diamond { .. } => {
            enter(state, to)?;
            state.player.diamonds += 1;
            let total = state.player.diamonds;
            state.emit(GameEvent::DiamondCollected { pos: to, total });
            Ok(MoveOutcome::CollectedDiamond)
        }
        ElementKind::Boulder { .. } => {
            let beyond = state
                .grid
                .step(to, dir)
                .filter(|&p| state.grid.is_enterable(p))
                .ok_or(SimError::IllegalMove { from, to })?;
            state.grid.move_element(to, beyond, MoveMode::Enter)?;
            enter(state, to)?;
            state.emit(GameEvent::BoulderPushed { from: to, to: beyond });
            Ok(MoveOutcome::Pushed)
        }
        ElementKind::Exit => {
            if state.player.diamonds < state.level.diamonds_required {
                return Err(SimError::IllegalMove { from, to });
            }
            enter(state, to)?;
            log::info!("Exit reached with {} diamonds", state.player.diamonds);
            state.emit(GameEvent::ExitReached);
            Ok(MoveOutcome::ReachedExit)
        }
        enemy if enemy.is_enemy() => {
            state.kill_player(LoseCause::EnemyContact);
            apply_explosion(state, from, ExplosionYield::Residue)?;
            Ok(MoveOutcome::Died)
        }
        _ => Err(SimError::IllegalMove { from, to }),
    }
}

/// Move the player tile to `to`, replacing whatever is there
fn enter(state: &mut GameState, to: Position) -> Result<()> {
    state.grid.move_element(state.player.pos, to, MoveMode::Displace)?;
    state.player.pos = to;
    Ok(())
}

/// Terminal state check: death loses, standing on the exit with enough
/// diamonds wins
pub fn check_outcome(state: &GameState) -> Outcome {
    if state.outcome.is_terminal() {
        return state.outcome;
    }
    if let Some(cause) = state.player.cause_of_death() {
        return Outcome::Lost(cause);
    }
    let on_exit = state.exit == Some(state.player.pos);
    if on_exit && state.player.diamonds >= state.level.diamonds_required {
        return Outcome::Won;
    }
    Outcome::Continue
}
