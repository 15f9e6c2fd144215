//! Magic wall transformation
//!
//! A falling rock that reaches a magic wall passes through it and changes
//! type: Boulder becomes Diamond, Diamond becomes Boulder. The wall stays.

use super::element::{Direction, ElementKind, Motion, Position};
use super::state::{GameEvent, GameState};
use crate::consts::MAGIC_WALL_DROP;
use crate::error::Result;

/// The rock kind produced by passing through a magic wall
pub fn transmute(kind: ElementKind) -> Option<ElementKind> {
    match kind {
        ElementKind::Boulder { .. } => Some(ElementKind::Diamond {
            motion: Motion::Falling,
        }),
        ElementKind::Diamond { .. } => Some(ElementKind::Boulder {
            motion: Motion::Falling,
        }),
        _ => None,
    }
}

/// Pass the rock at `rock_pos` through the magic wall directly below it.
///
/// The new rock appears `MAGIC_WALL_DROP` rows below the wall if that cell
/// is inside the grid and enterable; otherwise the rock is destroyed. Either
/// way the rock's cell becomes Path. Returns false (and changes nothing) if
/// there is no rock above a magic wall at `rock_pos`.
pub fn transform(state: &mut GameState, rock_pos: Position) -> Result<bool> {
    let Some(kind) = state.grid.kind_at(rock_pos) else {
        return Ok(false);
    };
    let Some(new_kind) = transmute(kind) else {
        return Ok(false);
    };
    let Some(wall) = state.grid.step(rock_pos, Direction::Down) else {
        return Ok(false);
    };
    if state.grid.kind_at(wall) != Some(ElementKind::MagicWall) {
        return Ok(false);
    }

    let dest = Position::new(wall.row + MAGIC_WALL_DROP, wall.col);
    state.grid.set(rock_pos, ElementKind::Path)?;
    if state.grid.is_enterable(dest) {
        state.grid.set(dest, new_kind)?;
        log::debug!("Magic wall at {wall}: {:?} -> {:?} at {dest}", kind.tile(), new_kind.tile());
        state.emit(GameEvent::RockTransformed { from: rock_pos, to: dest });
    } else {
        log::debug!("Magic wall at {wall} swallowed {:?}", kind.tile());
        state.emit(GameEvent::RockSwallowed { pos: rock_pos });
    }
    Ok(true)
}

/// Transform every falling rock sitting on a magic wall
pub fn magic_wall_phase(state: &mut GameState) -> Result<()> {
    for pos in state.grid.active_positions() {
        let falling = state
            .grid
            .kind_at(pos)
            .is_some_and(|k| k.motion() == Some(Motion::Falling));
        if falling {
            transform(state, pos)?;
        }
    }
    Ok(())
}
