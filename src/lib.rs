//! Rockfall - a tile-grid cave excavation simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, physics, enemies, player, scheduler)
//! - `settings`: Data-driven simulation tuning
//! - `persistence`: Tile-code matrix level format
//! - `error`: Error taxonomy shared by every module

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{ConstructionError, Result, SimError};
pub use persistence::Level;
pub use settings::SimConfig;

/// Game configuration constants
pub mod consts {
    /// Length of one scheduler tick in milliseconds
    pub const BASE_TICK_MS: u64 = 10;
    /// Scheduler ticks per simulated second (drives the level countdown)
    pub const TICKS_PER_SECOND: u64 = 1000 / BASE_TICK_MS;

    /// Default phase cadences, in scheduler ticks
    pub const PLAYER_CADENCE: u64 = 5; // 50 ms
    pub const PROXIMITY_CADENCE: u64 = 2; // 20 ms
    pub const FALL_CADENCE: u64 = 50; // 500 ms
    pub const ROLL_CADENCE: u64 = 150; // 1.5 s
    pub const MAGIC_WALL_CADENCE: u64 = 50;
    pub const PATROL_CADENCE: u64 = 100;
    pub const AMOEBA_CADENCE: u64 = 100;
    pub const WIN_LOSE_CADENCE: u64 = 1;
    /// Residue decay is not configurable; residue lasts one tick
    pub const EXPLOSION_CADENCE: u64 = 1;

    /// Rows below a magic wall where the transformed rock appears
    pub const MAGIC_WALL_DROP: usize = 2;

    /// Level countdown when a level does not specify one
    pub const DEFAULT_TIME_LIMIT_SECS: u32 = 120;
}
