//! Grid store
//!
//! Row-major cell storage plus an ordered index of active elements (rocks,
//! enemies, explosion residue) so phases never scan the whole grid.

use std::collections::BTreeSet;

use super::element::{Direction, Element, ElementKind, Position};
use crate::error::{ConstructionError, Result, SimError};

/// How [`Grid::move_element`] treats the destination occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    /// Destination must be enterable
    Enter,
    /// Destination occupant is replaced regardless (explicit push/dig)
    Displace,
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Element>,
    active: BTreeSet<Position>,
}

impl Grid {
    /// Grid of the given size filled with Path
    pub fn new(rows: usize, cols: usize) -> Self {
        let cells = (0..rows * cols)
            .map(|i| Element::new(ElementKind::Path, Position::new(i / cols, i % cols)))
            .collect();
        Self {
            rows,
            cols,
            cells,
            active: BTreeSet::new(),
        }
    }

    /// Build from a tile-code matrix. Player count is validated by the
    /// simulation state, not here.
    pub fn from_codes(codes: &[Vec<u8>]) -> std::result::Result<Self, ConstructionError> {
        let rows = codes.len();
        let cols = codes.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(ConstructionError::Empty);
        }

        let mut grid = Grid::new(rows, cols);
        for (row, line) in codes.iter().enumerate() {
            if line.len() != cols {
                return Err(ConstructionError::Ragged {
                    row,
                    expected: cols,
                    found: line.len(),
                });
            }
            for (col, &code) in line.iter().enumerate() {
                let kind = ElementKind::from_code(code)
                    .ok_or(ConstructionError::UnknownCode { code, row, col })?;
                grid.install(Position::new(row, col), kind);
            }
        }
        Ok(grid)
    }

    /// Encode back to a tile-code matrix
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|e| e.kind.code()).collect())
            .collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    #[inline]
    fn index(&self, pos: Position) -> Result<usize> {
        if self.in_bounds(pos) {
            Ok(pos.row * self.cols + pos.col)
        } else {
            Err(SimError::OutOfBounds {
                row: pos.row,
                col: pos.col,
            })
        }
    }

    pub fn get(&self, pos: Position) -> Result<&Element> {
        let i = self.index(pos)?;
        Ok(&self.cells[i])
    }

    /// Kind at `pos`, or `None` outside the grid
    pub fn kind_at(&self, pos: Position) -> Option<ElementKind> {
        self.get(pos).ok().map(|e| e.kind)
    }

    /// True only for in-bounds enterable cells
    pub fn is_enterable(&self, pos: Position) -> bool {
        self.kind_at(pos).is_some_and(|k| k.is_enterable())
    }

    /// Replace the occupant of `pos`, returning the previous one
    pub fn set(&mut self, pos: Position, kind: ElementKind) -> Result<Element> {
        self.index(pos)?;
        Ok(self.install(pos, kind))
    }

    /// Update the state of the element at `pos` in place
    pub fn update(&mut self, pos: Position, kind: ElementKind) -> Result<()> {
        self.set(pos, kind).map(|_| ())
    }

    /// Clear `from` to Path and install its element at `to`, returning the
    /// displaced occupant of `to`. Rejected moves leave the grid untouched.
    pub fn move_element(
        &mut self,
        from: Position,
        to: Position,
        mode: MoveMode,
    ) -> Result<Element> {
        let src = self.index(from)?;
        let dst = self.index(to)?;
        if from == to || (mode == MoveMode::Enter && !self.cells[dst].is_enterable()) {
            return Err(SimError::IllegalMove { from, to });
        }

        let moving = self.cells[src].kind;
        self.install(from, ElementKind::Path);
        Ok(self.install(to, moving))
    }

    /// Neighbour one step away, if inside the grid
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.in_bounds(next).then_some(next)
    }

    /// Row-major snapshot of active positions
    pub fn active_positions(&self) -> Vec<Position> {
        self.active.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.cells.iter()
    }

    /// First matching cell in row-major order
    pub fn find(&self, pred: impl Fn(&ElementKind) -> bool) -> Option<Position> {
        self.cells.iter().find(|e| pred(&e.kind)).map(Element::position)
    }

    pub fn count(&self, pred: impl Fn(&ElementKind) -> bool) -> usize {
        self.cells.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Count over the active index only
    pub fn count_active(&self, pred: impl Fn(&ElementKind) -> bool) -> usize {
        self.active
            .iter()
            .filter(|&&p| self.kind_at(p).is_some_and(|k| pred(&k)))
            .count()
    }

    /// Write a cell and keep the active index consistent. Caller has
    /// already bounds-checked `pos`.
    fn install(&mut self, pos: Position, kind: ElementKind) -> Element {
        let i = pos.row * self.cols + pos.col;
        let old = std::mem::replace(&mut self.cells[i], Element::new(kind, pos));
        if kind.is_active() {
            self.active.insert(pos);
        } else {
            self.active.remove(&pos);
        }
        old
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::element::Motion;

    #[test]
    fn test_from_codes_positions_match_cells() {
        let grid = Grid::from_codes(&[vec![0, 1, 2], vec![3, 4, 14]]).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        for element in grid.iter() {
            let pos = element.position();
            assert_eq!(grid.get(pos).unwrap().position(), pos);
        }
        assert_eq!(grid.kind_at(Position::new(0, 1)), Some(ElementKind::Dirt));
        assert_eq!(grid.active_positions(), vec![Position::new(1, 2)]);
    }

    #[test]
    fn test_unknown_code_is_fatal() {
        let err = Grid::from_codes(&[vec![0, 99]]).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::UnknownCode {
                code: 99,
                row: 0,
                col: 1
            }
        );
    }

    #[test]
    fn test_ragged_and_empty_rejected() {
        assert_eq!(Grid::from_codes(&[]).unwrap_err(), ConstructionError::Empty);
        assert!(matches!(
            Grid::from_codes(&[vec![0, 0], vec![0]]).unwrap_err(),
            ConstructionError::Ragged { row: 1, .. }
        ));
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut grid = Grid::new(2, 2);
        let err = grid.set(Position::new(2, 0), ElementKind::Dirt).unwrap_err();
        assert!(matches!(err, SimError::OutOfBounds { row: 2, col: 0 }));
    }

    #[test]
    fn test_move_preserves_state_and_index() {
        let mut grid = Grid::new(3, 1);
        let falling = ElementKind::Boulder {
            motion: Motion::Falling,
        };
        grid.set(Position::new(0, 0), falling).unwrap();
        grid.move_element(Position::new(0, 0), Position::new(1, 0), MoveMode::Enter)
            .unwrap();

        assert_eq!(grid.kind_at(Position::new(0, 0)), Some(ElementKind::Path));
        assert_eq!(grid.kind_at(Position::new(1, 0)), Some(falling));
        assert_eq!(grid.get(Position::new(1, 0)).unwrap().position(), Position::new(1, 0));
        assert_eq!(grid.active_positions(), vec![Position::new(1, 0)]);
    }

    #[test]
    fn test_move_into_blocked_cell_is_rejected() {
        let mut grid = Grid::from_codes(&[vec![14], vec![3]]).unwrap();
        let err = grid
            .move_element(Position::new(0, 0), Position::new(1, 0), MoveMode::Enter)
            .unwrap_err();
        assert!(matches!(err, SimError::IllegalMove { .. }));
        assert_eq!(grid.kind_at(Position::new(0, 0)), Some(ElementKind::boulder()));
        assert_eq!(grid.kind_at(Position::new(1, 0)), Some(ElementKind::NormalWall));

        // Displacing push replaces the occupant
        let displaced = grid
            .move_element(Position::new(0, 0), Position::new(1, 0), MoveMode::Displace)
            .unwrap();
        assert_eq!(displaced.kind, ElementKind::NormalWall);
        assert_eq!(grid.kind_at(Position::new(1, 0)), Some(ElementKind::boulder()));
    }

    #[test]
    fn test_zero_width_grid_exports_empty_rows() {
        let grid = Grid::new(3, 0);
        assert_eq!(grid.to_codes(), vec![Vec::<u8>::new(); 3]);
        assert!(!grid.in_bounds(Position::new(0, 0)));
        assert!(Grid::new(0, 4).to_codes().is_empty());
    }

    #[test]
    fn test_step_is_bounded() {
        let grid = Grid::new(2, 2);
        let origin = Position::new(0, 0);
        assert_eq!(grid.step(origin, Direction::Up), None);
        assert_eq!(grid.step(origin, Direction::Left), None);
        assert_eq!(grid.step(origin, Direction::Down), Some(Position::new(1, 0)));
        assert_eq!(grid.step(Position::new(1, 1), Direction::Right), None);
    }

    #[test]
    fn test_codes_round_trip() {
        let codes = vec![
            vec![4, 4, 4, 4, 4],
            vec![4, 2, 1, 14, 4],
            vec![4, 7, 6, 15, 4],
            vec![4, 5, 16, 20, 4],
            vec![4, 4, 4, 4, 4],
        ];
        let grid = Grid::from_codes(&codes).unwrap();
        assert_eq!(grid.to_codes(), codes);
    }
}
