//! Rock physics: falling and rolling
//!
//! Both phases walk a row-major snapshot of the active index taken at pass
//! start and record the cells claimed during the pass. A rock that moved is
//! never processed again in the same pass, and two rocks never claim one cell.

use std::collections::HashSet;

use super::element::{Direction, ElementKind, Motion, Position};
use super::enemy;
use super::explosion::{ExplosionYield, apply_explosion};
use super::grid::MoveMode;
use super::state::{GameEvent, GameState, LoseCause};
use crate::error::Result;

/// Drop every unsupported rock one cell and resolve landings.
/// Returns the number of rocks that moved.
pub fn fall_phase(state: &mut GameState) -> Result<usize> {
    let mut claimed: HashSet<Position> = HashSet::new();
    let mut moved = 0;

    for pos in state.grid.active_positions() {
        if claimed.contains(&pos) {
            continue;
        }
        let Some(kind) = state.grid.kind_at(pos) else {
            continue;
        };
        if !kind.is_rock() {
            continue;
        }
        let falling = kind.motion() == Some(Motion::Falling);

        let Some(below) = state.grid.step(pos, Direction::Down) else {
            // Bottom row
            if falling {
                land(state, pos, kind)?;
            }
            continue;
        };

        if state.grid.is_enterable(below) && !claimed.contains(&below) {
            state.grid.update(pos, kind.with_motion(Motion::Falling))?;
            state.grid.move_element(pos, below, MoveMode::Enter)?;
            claimed.insert(below);
            moved += 1;
            continue;
        }

        if !falling {
            continue;
        }
        match state.grid.kind_at(below) {
            Some(ElementKind::Player) => {
                state.kill_player(LoseCause::Crushed);
                apply_explosion(state, below, ExplosionYield::Residue)?;
            }
            Some(target) if target.is_patrol() => {
                enemy::destroy_enemy(state, below)?;
            }
            // Handled by the magic wall phase
            Some(ElementKind::MagicWall) => {}
            _ => land(state, pos, kind)?,
        }
    }

    Ok(moved)
}

/// Roll resting rocks off the rocks beneath them, left before right.
/// Returns the number of rocks that rolled.
pub fn roll_phase(state: &mut GameState) -> Result<usize> {
    let mut claimed: HashSet<Position> = HashSet::new();
    let mut rolled = 0;

    for pos in state.grid.active_positions() {
        if claimed.contains(&pos) {
            continue;
        }
        let Some(kind) = state.grid.kind_at(pos) else {
            continue;
        };
        if kind.motion() != Some(Motion::Resting) {
            continue;
        }
        let on_rock = state
            .grid
            .step(pos, Direction::Down)
            .and_then(|below| state.grid.kind_at(below))
            .is_some_and(|below| below.is_rock());
        if !on_rock {
            continue;
        }

        for side in [Direction::Left, Direction::Right] {
            let Some(target) = roll_target(state, pos, side, &claimed) else {
                continue;
            };
            state.grid.update(pos, kind.with_motion(Motion::Falling))?;
            state.grid.move_element(pos, target, MoveMode::Enter)?;
            claimed.insert(target);
            state.emit(GameEvent::RockRolled { from: pos, to: target });
            rolled += 1;
            break;
        }
    }

    Ok(rolled)
}

/// Side cell a rock can roll into: the side and the cell below it must both
/// be free
fn roll_target(
    state: &GameState,
    pos: Position,
    side: Direction,
    claimed: &HashSet<Position>,
) -> Option<Position> {
    let target = state.grid.step(pos, side)?;
    let beneath = state.grid.step(target, Direction::Down)?;
    let free = |p: Position| state.grid.is_enterable(p) && !claimed.contains(&p);
    (free(target) && free(beneath)).then_some(target)
}

fn land(state: &mut GameState, pos: Position, kind: ElementKind) -> Result<()> {
    state.grid.update(pos, kind.with_motion(Motion::Resting))?;
    state.emit(GameEvent::RockLanded { pos });
    Ok(())
}
