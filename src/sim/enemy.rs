//! Enemy behaviour: amoeba growth, patrol movement, proximity kill

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::element::{Direction, ElementKind, Position};
use super::explosion::{ExplosionYield, apply_explosion};
use super::grid::MoveMode;
use super::state::{GameEvent, GameState, LoseCause};
use crate::error::Result;

/// Blast left by a destroyed patrol enemy
pub fn death_yield(kind: ElementKind) -> ExplosionYield {
    match kind {
        ElementKind::Butterfly { .. } => ExplosionYield::Diamonds,
        _ => ExplosionYield::Residue,
    }
}

/// Destroy the patrol enemy at `pos` with an explosion centred on it
pub fn destroy_enemy(state: &mut GameState, pos: Position) -> Result<()> {
    let Some(kind) = state.grid.kind_at(pos).filter(ElementKind::is_patrol) else {
        return Ok(());
    };
    log::debug!("{:?} destroyed at {pos}", kind.tile());
    state.emit(GameEvent::EnemyKilled { pos });
    apply_explosion(state, pos, death_yield(kind))?;
    Ok(())
}

fn kill_by_contact(state: &mut GameState) -> Result<()> {
    state.kill_player(LoseCause::EnemyContact);
    let at = state.player.pos;
    apply_explosion(state, at, ExplosionYield::Residue)?;
    Ok(())
}

/// Orthogonal neighbours an amoeba can spread into
fn growth_candidates(state: &GameState, pos: Position) -> Vec<Position> {
    Direction::ALL
        .iter()
        .filter_map(|&dir| state.grid.step(pos, dir))
        .filter(|&p| {
            matches!(
                state.grid.kind_at(p),
                Some(ElementKind::Path | ElementKind::Dirt)
            )
        })
        .collect()
}

/// One round of amoeba growth. Cells spawned this round do not grow until
/// the next one.
pub fn amoeba_phase(state: &mut GameState) -> Result<()> {
    if state.colony.halted {
        return Ok(());
    }

    let cells: Vec<Position> = state
        .grid
        .active_positions()
        .into_iter()
        .filter(|&p| matches!(state.grid.kind_at(p), Some(ElementKind::Amoeba { .. })))
        .collect();
    if cells.is_empty() {
        return Ok(());
    }
    if cells.len() > state.config.amoeba.max_population {
        halt_colony(state, cells.len());
        return Ok(());
    }

    let chance = state.config.amoeba.growth_chance;
    let mut any_candidate = false;
    for pos in cells {
        let candidates = growth_candidates(state, pos);
        if candidates.is_empty() {
            continue;
        }
        any_candidate = true;
        if !state.rng.random_bool(chance) {
            continue;
        }
        let Some(&target) = candidates.choose(&mut state.rng) else {
            continue;
        };
        state.grid.set(target, ElementKind::Amoeba { growth: 0 })?;
        if let Some(ElementKind::Amoeba { growth }) = state.grid.kind_at(pos) {
            state.grid.update(pos, ElementKind::Amoeba { growth: growth + 1 })?;
        }
        state.emit(GameEvent::AmoebaGrew { pos: target });
    }

    if any_candidate {
        state.colony.stalled_ticks = 0;
    } else {
        state.colony.stalled_ticks += 1;
        if state.colony.stalled_ticks >= state.config.amoeba.stall_limit {
            let population = state.grid.count_active(|k| matches!(k, ElementKind::Amoeba { .. }));
            halt_colony(state, population);
        }
    }
    Ok(())
}

fn halt_colony(state: &mut GameState, population: usize) {
    log::debug!("Amoeba growth halted at population {population}");
    state.colony.halted = true;
    state.emit(GameEvent::AmoebaHalted { population });
}

/// Move every patrol enemy one cell: straight ahead if free, otherwise
/// turn toward its preferred hand, then the other hand, then back.
pub fn patrol_phase(state: &mut GameState) -> Result<()> {
    let mut moved: HashSet<Position> = HashSet::new();

    for pos in state.grid.active_positions() {
        if moved.contains(&pos) {
            continue;
        }
        let Some(kind) = state.grid.kind_at(pos) else {
            continue;
        };
        let Some(facing) = kind.facing() else {
            continue;
        };

        if state.player.is_alive() && state.grid.step(pos, facing) == Some(state.player.pos) {
            kill_by_contact(state)?;
            continue;
        }

        let hand = state.config.hand_for(&kind);
        let options = [
            facing,
            hand.turn(facing),
            hand.opposite().turn(facing),
            facing.reverse(),
        ];
        let next = options.into_iter().find_map(|dir| {
            state
                .grid
                .step(pos, dir)
                .filter(|&p| state.grid.is_enterable(p) && !moved.contains(&p))
                .map(|p| (dir, p))
        });
        if let Some((dir, target)) = next {
            state.grid.update(pos, kind.with_facing(dir))?;
            state.grid.move_element(pos, target, MoveMode::Enter)?;
            moved.insert(target);
        }
    }
    Ok(())
}

/// Kill the player if any patrol enemy is orthogonally adjacent
pub fn proximity_phase(state: &mut GameState) -> Result<()> {
    if !state.player.is_alive() {
        return Ok(());
    }
    let player = state.player.pos;
    let touching = state.grid.active_positions().into_iter().any(|p| {
        p.is_adjacent(player) && state.grid.kind_at(p).is_some_and(|k| k.is_patrol())
    });
    if touching {
        kill_by_contact(state)?;
    }
    Ok(())
}
