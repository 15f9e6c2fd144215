//! Explosion propagation and residue decay

use super::element::{ElementKind, Position};
use super::state::{GameEvent, GameState, LoseCause};
use crate::error::Result;

/// What a blast leaves behind in each explodable cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionYield {
    Residue,
    Diamonds,
}

/// Convert every explodable cell of the 3×3 block around `centre` in one
/// pass. Cells outside the grid and non-explodable cells are skipped; the
/// blast does not chain. Returns the number of cells converted.
pub fn apply_explosion(
    state: &mut GameState,
    centre: Position,
    fill: ExplosionYield,
) -> Result<usize> {
    let replacement = match fill {
        ExplosionYield::Residue => ElementKind::ExplosionResidue { born: state.clock },
        ExplosionYield::Diamonds => ElementKind::diamond(),
    };

    let mut converted = 0;
    for dr in -1isize..=1 {
        for dc in -1isize..=1 {
            let (Some(row), Some(col)) = (
                centre.row.checked_add_signed(dr),
                centre.col.checked_add_signed(dc),
            ) else {
                continue;
            };
            let pos = Position::new(row, col);
            let Some(kind) = state.grid.kind_at(pos) else {
                continue;
            };
            if !kind.is_explodable() {
                continue;
            }
            if kind == ElementKind::Player {
                state.kill_player(LoseCause::Exploded);
            }
            state.grid.set(pos, replacement)?;
            converted += 1;
        }
    }

    log::debug!("Explosion at {centre}: {converted} cells ({fill:?})");
    state.emit(GameEvent::Explosion { centre });
    Ok(converted)
}

/// Turn residue left by earlier ticks back into Path
pub fn explosion_phase(state: &mut GameState) -> Result<()> {
    let mut cleared = 0;
    for pos in state.grid.active_positions() {
        if let Some(ElementKind::ExplosionResidue { born }) = state.grid.kind_at(pos) {
            if born < state.clock {
                state.grid.set(pos, ElementKind::Path)?;
                cleared += 1;
            }
        }
    }
    if cleared > 0 {
        state.emit(GameEvent::ResidueCleared { count: cleared });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Level;
    use crate::settings::SimConfig;
    use crate::sim::element::Tile;
    use proptest::prelude::*;

    fn state_from(codes: Vec<Vec<u8>>) -> GameState {
        GameState::new(Level::untimed(codes, 0), SimConfig::default()).unwrap()
    }

    fn tile(state: &GameState, row: usize, col: usize) -> Tile {
        state.grid.kind_at(Position::new(row, col)).unwrap().tile()
    }

    #[test]
    fn test_explosion_converts_three_by_three() {
        let mut state = state_from(vec![
            vec![2, 1, 1, 1, 1],
            vec![1, 1, 3, 1, 1],
            vec![1, 14, 4, 15, 1],
            vec![1, 1, 1, 1, 1],
            vec![1, 1, 1, 1, 1],
        ]);
        let converted =
            apply_explosion(&mut state, Position::new(2, 2), ExplosionYield::Residue).unwrap();
        assert_eq!(converted, 8);

        for row in 0..5 {
            for col in 0..5 {
                let inside = (1..=3).contains(&row) && (1..=3).contains(&col);
                let expected = match (row, col) {
                    (2, 2) => Tile::TitaniumWall,
                    _ if inside => Tile::ExplosionResidue,
                    (0, 0) => Tile::Player,
                    _ => Tile::Dirt,
                };
                assert_eq!(tile(&state, row, col), expected, "cell ({row}, {col})");
            }
        }
        assert!(state.player.is_alive());
    }

    #[test]
    fn test_explosion_clipped_at_edge_kills_player() {
        let mut state = state_from(vec![vec![2, 1], vec![1, 1]]);
        let converted =
            apply_explosion(&mut state, Position::new(0, 0), ExplosionYield::Residue).unwrap();
        assert_eq!(converted, 4);
        assert_eq!(state.player.cause_of_death(), Some(LoseCause::Exploded));
    }

    #[test]
    fn test_diamond_yield() {
        let mut state = state_from(vec![vec![2, 0, 0, 0], vec![0, 0, 0, 0], vec![0, 0, 0, 0]]);
        apply_explosion(&mut state, Position::new(1, 2), ExplosionYield::Diamonds).unwrap();
        assert_eq!(tile(&state, 1, 2), Tile::Diamond);
        assert_eq!(tile(&state, 0, 1), Tile::Diamond);
        assert_eq!(tile(&state, 0, 0), Tile::Player);
    }

    #[test]
    fn test_residue_decays_on_next_phase_only() {
        let mut state = state_from(vec![vec![2, 0, 0, 0]]);
        state.clock = 10;
        apply_explosion(&mut state, Position::new(0, 2), ExplosionYield::Residue).unwrap();

        // Same tick: residue survives
        explosion_phase(&mut state).unwrap();
        assert_eq!(tile(&state, 0, 2), Tile::ExplosionResidue);

        state.clock = 11;
        explosion_phase(&mut state).unwrap();
        for col in 1..4 {
            assert_eq!(tile(&state, 0, col), Tile::Path);
        }
        assert!(state.grid.active_positions().is_empty());
    }

    proptest! {
        #[test]
        fn prop_titanium_never_affected(row in 0usize..6, col in 0usize..6) {
            let mut codes = vec![vec![4u8; 6]; 6];
            codes[5][5] = 2;
            let mut state = state_from(codes);
            apply_explosion(&mut state, Position::new(row, col), ExplosionYield::Residue).unwrap();
            let titanium = state.grid.count(|k| *k == ElementKind::TitaniumWall);
            let hit_player = row >= 4 && col >= 4;
            prop_assert_eq!(titanium, 35);
            prop_assert_eq!(state.player.is_alive(), !hit_player);
        }
    }
}
