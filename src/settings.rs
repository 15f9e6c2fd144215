//! Simulation tuning
//!
//! Loaded from JSON by the host. Every value has a default, so a partial
//! file is enough.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::sim::element::{ElementKind, Hand};

/// Phase cadences in scheduler ticks (one tick = `BASE_TICK_MS`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cadences {
    pub player: u64,
    pub proximity: u64,
    pub falling: u64,
    pub rolling: u64,
    pub magic_wall: u64,
    pub patrol: u64,
    pub amoeba: u64,
    pub win_lose: u64,
}

impl Default for Cadences {
    fn default() -> Self {
        Self {
            player: PLAYER_CADENCE,
            proximity: PROXIMITY_CADENCE,
            falling: FALL_CADENCE,
            rolling: ROLL_CADENCE,
            magic_wall: MAGIC_WALL_CADENCE,
            patrol: PATROL_CADENCE,
            amoeba: AMOEBA_CADENCE,
            win_lose: WIN_LOSE_CADENCE,
        }
    }
}

impl Cadences {
    /// Every phase fires on every tick (handy for tests and replays)
    pub fn every_tick() -> Self {
        Self {
            player: 1,
            proximity: 1,
            falling: 1,
            rolling: 1,
            magic_wall: 1,
            patrol: 1,
            amoeba: 1,
            win_lose: 1,
        }
    }

    fn as_array(&self) -> [(&'static str, u64); 8] {
        [
            ("player", self.player),
            ("proximity", self.proximity),
            ("falling", self.falling),
            ("rolling", self.rolling),
            ("magic_wall", self.magic_wall),
            ("patrol", self.patrol),
            ("amoeba", self.amoeba),
            ("win_lose", self.win_lose),
        ]
    }
}

/// Amoeba colony growth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmoebaConfig {
    /// Chance per amoeba cell per amoeba tick to spawn a neighbour
    pub growth_chance: f64,
    /// Growth halts once the population exceeds this
    pub max_population: usize,
    /// Growth halts after this many consecutive ticks with nowhere to grow
    pub stall_limit: u32,
}

impl Default for AmoebaConfig {
    fn default() -> Self {
        Self {
            growth_chance: 0.03,
            max_population: 200,
            stall_limit: 30,
        }
    }
}

/// Wall-following hand for each patrol enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub frog_hand: Hand,
    pub butterfly_hand: Hand,
    pub firefly_hand: Hand,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            frog_hand: Hand::Left,
            butterfly_hand: Hand::Right,
            firefly_hand: Hand::Left,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed; the same seed and inputs replay identically
    pub seed: u64,
    pub cadence: Cadences,
    pub amoeba: AmoebaConfig,
    pub patrol: PatrolConfig,
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded simulation config (seed {})", config.seed);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, cadence) in self.cadence.as_array() {
            if cadence == 0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name} cadence must be at least 1 tick"
                )));
            }
        }
        let chance = self.amoeba.growth_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(SimError::InvalidConfig(format!(
                "amoeba growth chance {chance} outside [0, 1]"
            )));
        }
        if self.amoeba.stall_limit == 0 {
            return Err(SimError::InvalidConfig(
                "amoeba stall limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Hand preference for a patrol kind tag
    pub fn hand_for(&self, kind: &ElementKind) -> Hand {
        match kind {
            ElementKind::Frog { .. } => self.patrol.frog_hand,
            ElementKind::Butterfly { .. } => self.patrol.butterfly_hand,
            _ => self.patrol.firefly_hand,
        }
    }
}
