//! Element model
//!
//! Every tile and entity kind is one variant of [`ElementKind`]. Per-kind
//! behaviour flags come from a single dispatch table ([`ElementKind::traits`])
//! instead of a type hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid coordinate, ordered row-major (row first, then column)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonally adjacent (not diagonal, not same cell)
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Orthogonal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row, col) offset
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Rotate 90° counter-clockwise
    pub fn turn_left(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Rotate 90° clockwise
    pub fn turn_right(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Parse a single-letter command (U/D/L/R, case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Wall-following hand preference for patrol enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn turn(self, dir: Direction) -> Direction {
        match self {
            Hand::Left => dir.turn_left(),
            Hand::Right => dir.turn_right(),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

/// Key and door colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Colour {
    Red,
    Green,
    Yellow,
    Blue,
}

/// Rock motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Resting,
    Falling,
}

/// Every kind of grid occupant, with its per-instance state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Path,
    Dirt,
    NormalWall,
    TitaniumWall,
    MagicWall,
    LockedDoor { colour: Colour, unlocked: bool },
    Key { colour: Colour },
    Boulder { motion: Motion },
    Diamond { motion: Motion },
    Player,
    /// `growth` counts the cells this amoeba has spawned
    Amoeba { growth: u32 },
    Frog { facing: Direction },
    Butterfly { facing: Direction },
    Firefly { facing: Direction },
    /// `born` is the scheduler clock value at creation
    ExplosionResidue { born: u64 },
    Exit,
}

/// Behaviour flags for one element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traits {
    /// A rock or patrol enemy may move into this cell
    pub enterable: bool,
    /// An explosion replaces this cell
    pub explodable: bool,
    /// Tracked in the grid's active index
    pub active: bool,
}

const fn traits(enterable: bool, explodable: bool, active: bool) -> Traits {
    Traits {
        enterable,
        explodable,
        active,
    }
}

/// Fieldless tile tag for rendering snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Path,
    Dirt,
    NormalWall,
    TitaniumWall,
    MagicWall,
    LockedDoor,
    UnlockedDoor,
    Key,
    Boulder,
    Diamond,
    Player,
    Amoeba,
    Frog,
    Butterfly,
    Firefly,
    ExplosionResidue,
    Exit,
}

impl ElementKind {
    pub const fn boulder() -> Self {
        ElementKind::Boulder {
            motion: Motion::Resting,
        }
    }

    pub const fn diamond() -> Self {
        ElementKind::Diamond {
            motion: Motion::Resting,
        }
    }

    /// Per-variant behaviour table
    pub fn traits(&self) -> Traits {
        use ElementKind::*;
        match self {
            Path | Key { .. } => traits(true, true, false),
            Dirt | NormalWall | MagicWall | Player => traits(false, true, false),
            TitaniumWall | Exit => traits(false, false, false),
            LockedDoor { unlocked, .. } => traits(*unlocked, true, false),
            Boulder { .. } | Diamond { .. } => traits(false, true, true),
            Amoeba { .. } | Frog { .. } | Butterfly { .. } | Firefly { .. } => {
                traits(false, true, true)
            }
            ExplosionResidue { .. } => traits(false, true, true),
        }
    }

    #[inline]
    pub fn is_enterable(&self) -> bool {
        self.traits().enterable
    }

    #[inline]
    pub fn is_explodable(&self) -> bool {
        self.traits().explodable
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.traits().active
    }

    /// Boulder or Diamond
    pub fn is_rock(&self) -> bool {
        matches!(self, ElementKind::Boulder { .. } | ElementKind::Diamond { .. })
    }

    pub fn motion(&self) -> Option<Motion> {
        match self {
            ElementKind::Boulder { motion } | ElementKind::Diamond { motion } => Some(*motion),
            _ => None,
        }
    }

    /// Same rock kind with a new motion; non-rocks are returned unchanged
    pub fn with_motion(self, motion: Motion) -> Self {
        match self {
            ElementKind::Boulder { .. } => ElementKind::Boulder { motion },
            ElementKind::Diamond { .. } => ElementKind::Diamond { motion },
            other => other,
        }
    }

    /// Frog, Butterfly or Firefly
    pub fn is_patrol(&self) -> bool {
        self.facing().is_some()
    }

    /// Any kind the player dies walking into
    pub fn is_enemy(&self) -> bool {
        self.is_patrol() || matches!(self, ElementKind::Amoeba { .. })
    }

    pub fn facing(&self) -> Option<Direction> {
        match self {
            ElementKind::Frog { facing }
            | ElementKind::Butterfly { facing }
            | ElementKind::Firefly { facing } => Some(*facing),
            _ => None,
        }
    }

    /// Same patrol kind facing a new way; other kinds are returned unchanged
    pub fn with_facing(self, facing: Direction) -> Self {
        match self {
            ElementKind::Frog { .. } => ElementKind::Frog { facing },
            ElementKind::Butterfly { .. } => ElementKind::Butterfly { facing },
            ElementKind::Firefly { .. } => ElementKind::Firefly { facing },
            other => other,
        }
    }

    pub fn colour(&self) -> Option<Colour> {
        match self {
            ElementKind::LockedDoor { colour, .. } | ElementKind::Key { colour } => Some(*colour),
            _ => None,
        }
    }

    pub fn tile(&self) -> Tile {
        match self {
            ElementKind::Path => Tile::Path,
            ElementKind::Dirt => Tile::Dirt,
            ElementKind::NormalWall => Tile::NormalWall,
            ElementKind::TitaniumWall => Tile::TitaniumWall,
            ElementKind::MagicWall => Tile::MagicWall,
            ElementKind::LockedDoor { unlocked: false, .. } => Tile::LockedDoor,
            ElementKind::LockedDoor { unlocked: true, .. } => Tile::UnlockedDoor,
            ElementKind::Key { .. } => Tile::Key,
            ElementKind::Boulder { .. } => Tile::Boulder,
            ElementKind::Diamond { .. } => Tile::Diamond,
            ElementKind::Player => Tile::Player,
            ElementKind::Amoeba { .. } => Tile::Amoeba,
            ElementKind::Frog { .. } => Tile::Frog,
            ElementKind::Butterfly { .. } => Tile::Butterfly,
            ElementKind::Firefly { .. } => Tile::Firefly,
            ElementKind::ExplosionResidue { .. } => Tile::ExplosionResidue,
            ElementKind::Exit => Tile::Exit,
        }
    }

    /// Decode a level tile code
    pub fn from_code(code: u8) -> Option<Self> {
        use Colour::*;
        let door = |colour| ElementKind::LockedDoor {
            colour,
            unlocked: false,
        };
        Some(match code {
            0 => ElementKind::Path,
            1 => ElementKind::Dirt,
            2 => ElementKind::Player,
            3 => ElementKind::NormalWall,
            4 => ElementKind::TitaniumWall,
            5 => ElementKind::MagicWall,
            6 => door(Red),
            7 => ElementKind::Key { colour: Red },
            8 => door(Green),
            9 => ElementKind::Key { colour: Green },
            10 => door(Yellow),
            11 => ElementKind::Key { colour: Yellow },
            12 => door(Blue),
            13 => ElementKind::Key { colour: Blue },
            14 => ElementKind::boulder(),
            15 => ElementKind::diamond(),
            16 => ElementKind::Amoeba { growth: 0 },
            17 => ElementKind::Frog {
                facing: Direction::Left,
            },
            18 => ElementKind::Butterfly {
                facing: Direction::Left,
            },
            19 => ElementKind::Firefly {
                facing: Direction::Left,
            },
            20 => ElementKind::Exit,
            _ => return None,
        })
    }

    /// Encode as a level tile code. Transient state (residue, unlocked
    /// doors) saves as Path.
    pub fn code(&self) -> u8 {
        use Colour::*;
        match self {
            ElementKind::Path => 0,
            ElementKind::Dirt => 1,
            ElementKind::Player => 2,
            ElementKind::NormalWall => 3,
            ElementKind::TitaniumWall => 4,
            ElementKind::MagicWall => 5,
            ElementKind::LockedDoor { unlocked: true, .. } => 0,
            ElementKind::LockedDoor { colour, .. } => match colour {
                Red => 6,
                Green => 8,
                Yellow => 10,
                Blue => 12,
            },
            ElementKind::Key { colour } => match colour {
                Red => 7,
                Green => 9,
                Yellow => 11,
                Blue => 13,
            },
            ElementKind::Boulder { .. } => 14,
            ElementKind::Diamond { .. } => 15,
            ElementKind::Amoeba { .. } => 16,
            ElementKind::Frog { .. } => 17,
            ElementKind::Butterfly { .. } => 18,
            ElementKind::Firefly { .. } => 19,
            ElementKind::Exit => 20,
            ElementKind::ExplosionResidue { .. } => 0,
        }
    }
}

/// One grid occupant. The position is owned by the grid and always matches
/// the cell the element sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pos: Position,
}

impl Element {
    pub(crate) fn new(kind: ElementKind, pos: Position) -> Self {
        Self { kind, pos }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn is_enterable(&self) -> bool {
        self.kind.is_enterable()
    }

    pub fn is_explodable(&self) -> bool {
        self.kind.is_explodable()
    }
}
