//! Game state and core simulation types
//!
//! Everything a phase reads or writes lives in [`GameState`], which is
//! passed explicitly to every phase. There is no global state.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::element::{Colour, Direction, ElementKind, Position, Tile};
use super::grid::Grid;
use crate::error::{ConstructionError, Result};
use crate::persistence::Level;
use crate::settings::SimConfig;

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoseCause {
    /// Hit by a falling rock
    Crushed,
    /// Touched or walked into an enemy
    EnemyContact,
    /// Caught in a blast
    Exploded,
    /// Level countdown reached zero
    OutOfTime,
}

/// Result reported to the presentation layer after each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Continue,
    Won,
    Lost(LoseCause),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}

/// Events emitted during a tick, for animation/sound hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    DirtDug { pos: Position },
    DiamondCollected { pos: Position, total: u32 },
    KeyCollected { pos: Position, colour: Colour },
    DoorUnlocked { pos: Position, colour: Colour },
    BoulderPushed { from: Position, to: Position },
    RockLanded { pos: Position },
    RockRolled { from: Position, to: Position },
    RockTransformed { from: Position, to: Position },
    RockSwallowed { pos: Position },
    Explosion { centre: Position },
    ResidueCleared { count: usize },
    AmoebaGrew { pos: Position },
    AmoebaHalted { population: usize },
    EnemyKilled { pos: Position },
    PlayerKilled { cause: LoseCause },
    ExitReached,
}

/// The player's per-attempt state. The grid holds a `Player` tile at `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub pos: Position,
    /// Never decreases during an attempt
    pub diamonds: u32,
    pub keys: BTreeSet<Colour>,
    death: Option<LoseCause>,
}

impl Player {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            diamonds: 0,
            keys: BTreeSet::new(),
            death: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    pub fn cause_of_death(&self) -> Option<LoseCause> {
        self.death
    }

    pub fn holds(&self, colour: Colour) -> bool {
        self.keys.contains(&colour)
    }
}

/// Colony-wide amoeba bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmoebaColony {
    /// Consecutive amoeba ticks with no growth candidate
    pub stalled_ticks: u32,
    /// Growth stopped for the rest of the attempt
    pub halted: bool,
}

/// One cell of a rendering snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub tile: Tile,
    pub colour: Option<Colour>,
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major
    pub cells: Vec<CellView>,
    pub diamonds: u32,
    pub diamonds_required: u32,
    pub alive: bool,
    pub paused: bool,
    pub outcome: Outcome,
    pub seconds_remaining: Option<u32>,
}

impl Snapshot {
    pub fn cell(&self, pos: Position) -> Option<&CellView> {
        (pos.row < self.rows && pos.col < self.cols)
            .then(|| &self.cells[pos.row * self.cols + pos.col])
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    /// Template the grid is rebuilt from on reset
    pub level: Level,
    pub grid: Grid,
    pub player: Player,
    /// Designated exit cell, if the level has one
    pub exit: Option<Position>,
    /// Seeded RNG; the only source of randomness
    pub rng: Pcg32,
    /// Scheduler ticks elapsed while running
    pub clock: u64,
    pub paused: bool,
    /// Latest directional command, consumed by the next player phase
    pub pending_move: Option<Direction>,
    pub colony: AmoebaColony,
    pub seconds_remaining: Option<u32>,
    pub outcome: Outcome,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh attempt from a level template
    pub fn new(level: Level, config: SimConfig) -> Result<Self> {
        config.validate()?;
        let (grid, player_pos, exit) = build_grid(&level)?;
        log::info!(
            "Level loaded: {}x{}, {} diamonds required",
            grid.rows(),
            grid.cols(),
            level.diamonds_required
        );
        Ok(Self {
            rng: Pcg32::seed_from_u64(config.seed),
            seconds_remaining: level.time_limit_secs,
            config,
            level,
            grid,
            player: Player::new(player_pos),
            exit,
            clock: 0,
            paused: false,
            pending_move: None,
            colony: AmoebaColony::default(),
            outcome: Outcome::Continue,
            events: Vec::new(),
        })
    }

    /// Discard every piece of attempt state and rebuild from the template
    pub fn reset(&mut self) -> Result<()> {
        let fresh = GameState::new(self.level.clone(), self.config.clone())?;
        *self = fresh;
        log::info!("Level reset");
        Ok(())
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Mark the player dead. Later causes do not overwrite the first.
    pub fn kill_player(&mut self, cause: LoseCause) {
        if self.player.death.is_none() {
            log::info!("Player killed: {:?} at {}", cause, self.player.pos);
            self.player.death = Some(cause);
            self.emit(GameEvent::PlayerKilled { cause });
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current grid in the tile-code format
    pub fn save_codes(&self) -> Vec<Vec<u8>> {
        self.grid.to_codes()
    }

    /// Current grid as a level template with this level's parameters
    pub fn save_level(&self) -> Level {
        Level {
            codes: self.save_codes(),
            ..self.level.clone()
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            cells: self
                .grid
                .iter()
                .map(|e| CellView {
                    tile: e.kind.tile(),
                    colour: e.kind.colour(),
                })
                .collect(),
            diamonds: self.player.diamonds,
            diamonds_required: self.level.diamonds_required,
            alive: self.player.is_alive(),
            paused: self.paused,
            outcome: self.outcome,
            seconds_remaining: self.seconds_remaining,
        }
    }
}

fn build_grid(level: &Level) -> Result<(Grid, Position, Option<Position>)> {
    let grid = Grid::from_codes(&level.codes)?;

    let mut player = None;
    for element in grid.iter().filter(|e| e.kind == ElementKind::Player) {
        match player {
            None => player = Some(element.position()),
            Some(first) => {
                return Err(ConstructionError::MultiplePlayers {
                    first,
                    second: element.position(),
                }
                .into());
            }
        }
    }

    let player = player.ok_or(ConstructionError::MissingPlayer)?;
    let exit = grid.find(|k| *k == ElementKind::Exit);
    Ok((grid, player, exit))
}
