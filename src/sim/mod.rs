//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (row-major over the active index)
//! - No rendering or platform dependencies

pub mod element;
pub mod enemy;
pub mod explosion;
pub mod grid;
pub mod magic_wall;
pub mod physics;
pub mod player;
pub mod state;
pub mod tick;

pub use element::{Colour, Direction, Element, ElementKind, Hand, Motion, Position, Tile};
pub use explosion::{ExplosionYield, apply_explosion};
pub use grid::{Grid, MoveMode};
pub use player::{MoveOutcome, check_outcome, move_player};
pub use state::{CellView, GameEvent, GameState, LoseCause, Outcome, Player, Snapshot};
pub use tick::{Phase, TickInput, advance, tick};
