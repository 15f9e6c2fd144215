//! Fixed timestep scheduler
//!
//! One call to [`tick`] advances the simulation by `BASE_TICK_MS`. Every
//! phase has a cadence in base ticks; the phases due on a tick run to
//! completion in [`Phase::PRIORITY`] order. Residue decay runs on every
//! tick, so explosion residue lives for exactly one tick after the one
//! that created it.

use super::element::{Direction, Position};
use super::enemy::{amoeba_phase, patrol_phase, proximity_phase};
use super::explosion::{ExplosionYield, apply_explosion, explosion_phase};
use super::magic_wall::magic_wall_phase;
use super::physics::{fall_phase, roll_phase};
use super::player::{check_outcome, move_player};
use super::state::{GameState, LoseCause, Outcome};
use crate::consts::{EXPLOSION_CADENCE, TICKS_PER_SECOND};
use crate::error::Result;
use crate::settings::Cadences;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Directional command; replaces any move still pending
    pub movement: Option<Direction>,
    pub pause: bool,
    /// Wins over `pause` when both are set
    pub resume: bool,
    /// Rebuild the level from its template
    pub reset: bool,
    /// Explode the 3×3 block around this cell right away
    pub detonate: Option<Position>,
}

impl TickInput {
    pub fn movement(dir: Direction) -> Self {
        Self {
            movement: Some(dir),
            ..Default::default()
        }
    }
}

/// A scheduled phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Player,
    Proximity,
    Falling,
    Rolling,
    MagicWall,
    Explosion,
    Patrol,
    Amoeba,
    WinLose,
}

impl Phase {
    /// Execution order when several phases are due on the same tick
    pub const PRIORITY: [Phase; 9] = [
        Phase::Player,
        Phase::Proximity,
        Phase::Falling,
        Phase::Rolling,
        Phase::MagicWall,
        Phase::Explosion,
        Phase::Patrol,
        Phase::Amoeba,
        Phase::WinLose,
    ];

    pub fn cadence(self, cadences: &Cadences) -> u64 {
        match self {
            Phase::Player => cadences.player,
            Phase::Proximity => cadences.proximity,
            Phase::Falling => cadences.falling,
            Phase::Rolling => cadences.rolling,
            Phase::MagicWall => cadences.magic_wall,
            Phase::Explosion => EXPLOSION_CADENCE,
            Phase::Patrol => cadences.patrol,
            Phase::Amoeba => cadences.amoeba,
            Phase::WinLose => cadences.win_lose,
        }
    }

    pub fn is_due(self, clock: u64, cadences: &Cadences) -> bool {
        clock % self.cadence(cadences) == 0
    }
}

/// Advance the game state by one base tick
pub fn tick(state: &mut GameState, input: &TickInput) -> Result<Outcome> {
    if input.reset {
        state.reset()?;
        return Ok(state.outcome);
    }

    // Finished games only respond to reset
    if state.outcome.is_terminal() {
        return Ok(state.outcome);
    }

    if input.pause {
        state.paused = true;
    }
    if input.resume {
        state.paused = false;
    }

    if let Some(dir) = input.movement {
        if state.paused {
            log::debug!("Move {dir:?} ignored while paused");
        } else {
            state.pending_move = Some(dir);
        }
    }

    if state.paused {
        if let Some(centre) = input.detonate {
            detonate(state, centre)?;
        }
        return Ok(state.outcome);
    }

    state.clock += 1;
    if state.clock % TICKS_PER_SECOND == 0 {
        count_down(state);
    }
    // Stamped with the new clock so the residue outlives this tick
    if let Some(centre) = input.detonate {
        detonate(state, centre)?;
    }

    let cadences = state.config.cadence;
    for phase in Phase::PRIORITY {
        if phase.is_due(state.clock, &cadences) {
            log::trace!("Tick {}: {:?}", state.clock, phase);
            run_phase(state, phase)?;
        }
    }

    Ok(state.outcome)
}

/// Run idle ticks until `ticks` have passed or the game ends
pub fn advance(state: &mut GameState, ticks: u64) -> Result<Outcome> {
    let idle = TickInput::default();
    for _ in 0..ticks {
        if tick(state, &idle)?.is_terminal() {
            break;
        }
    }
    Ok(state.outcome)
}

fn detonate(state: &mut GameState, centre: Position) -> Result<()> {
    if state.grid.in_bounds(centre) {
        apply_explosion(state, centre, ExplosionYield::Residue)?;
    } else {
        log::debug!("Detonation at {centre} is outside the grid");
    }
    Ok(())
}

fn count_down(state: &mut GameState) {
    let Some(secs) = state.seconds_remaining else {
        return;
    };
    let left = secs.saturating_sub(1);
    state.seconds_remaining = Some(left);
    if left == 0 {
        state.kill_player(LoseCause::OutOfTime);
    }
}

fn run_phase(state: &mut GameState, phase: Phase) -> Result<()> {
    match phase {
        Phase::Player => {
            let Some(dir) = state.pending_move.take() else {
                return Ok(());
            };
            match move_player(state, dir) {
                Ok(outcome) => log::trace!("Move {dir:?}: {outcome:?}"),
                Err(e) if e.is_recoverable() => log::debug!("Move {dir:?} rejected: {e}"),
                Err(e) => return Err(e),
            }
        }
        Phase::Proximity => proximity_phase(state)?,
        Phase::Falling => {
            fall_phase(state)?;
        }
        Phase::Rolling => {
            roll_phase(state)?;
        }
        Phase::MagicWall => magic_wall_phase(state)?,
        Phase::Explosion => explosion_phase(state)?,
        Phase::Patrol => patrol_phase(state)?,
        Phase::Amoeba => amoeba_phase(state)?,
        Phase::WinLose => {
            let outcome = check_outcome(state);
            if outcome != state.outcome {
                state.outcome = outcome;
                log::info!("Level finished after {} ticks: {:?}", state.clock, outcome);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Level;
    use crate::settings::SimConfig;
    use crate::sim::element::{ElementKind, Tile};

    fn state_from(codes: Vec<Vec<u8>>, diamonds_required: u32) -> GameState {
        GameState::new(Level::untimed(codes, diamonds_required), SimConfig::default()).unwrap()
    }

    fn tile(state: &GameState, row: usize, col: usize) -> Tile {
        state.grid.kind_at(Position::new(row, col)).unwrap().tile()
    }

    fn pause() -> TickInput {
        TickInput {
            pause: true,
            ..Default::default()
        }
    }

    fn resume() -> TickInput {
        TickInput {
            resume: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(Phase::PRIORITY[0], Phase::Player);
        assert_eq!(Phase::PRIORITY[8], Phase::WinLose);
        let cadences = Cadences::default();
        assert!(Phase::Falling.is_due(50, &cadences));
        assert!(!Phase::Rolling.is_due(100, &cadences));
        assert!(Phase::WinLose.is_due(7, &cadences));
        assert!(Phase::Explosion.is_due(13, &cadences));
    }

    #[test]
    fn test_player_moves_on_player_cadence() {
        let mut state = state_from(vec![vec![2, 0, 0]], 0);
        tick(&mut state, &TickInput::movement(Direction::Right)).unwrap();
        advance(&mut state, 3).unwrap();
        assert_eq!(state.player.pos, Position::new(0, 0));
        assert_eq!(state.pending_move, Some(Direction::Right));

        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(state.clock, 5);
        assert_eq!(state.player.pos, Position::new(0, 1));
        assert_eq!(state.pending_move, None);
    }

    #[test]
    fn test_latest_move_wins() {
        let mut state = state_from(vec![vec![0, 2, 0]], 0);
        tick(&mut state, &TickInput::movement(Direction::Left)).unwrap();
        tick(&mut state, &TickInput::movement(Direction::Right)).unwrap();
        advance(&mut state, 3).unwrap();
        assert_eq!(state.player.pos, Position::new(0, 2));
    }

    #[test]
    fn test_rejected_move_does_not_stop_the_tick() {
        let mut state = state_from(vec![vec![2, 6]], 0);
        tick(&mut state, &TickInput::movement(Direction::Right)).unwrap();
        assert_eq!(advance(&mut state, 10).unwrap(), Outcome::Continue);
        assert_eq!(state.clock, 11);
        assert_eq!(tile(&state, 0, 1), Tile::LockedDoor);
    }

    #[test]
    fn test_pause_freezes_clock_and_resume_has_no_catch_up() {
        let mut state = state_from(vec![vec![2, 0], vec![0, 14], vec![0, 0], vec![0, 0]], 0);
        advance(&mut state, 49).unwrap();
        assert_eq!(tile(&state, 1, 1), Tile::Boulder);

        tick(&mut state, &pause()).unwrap();
        assert!(state.paused);
        advance(&mut state, 500).unwrap();
        assert_eq!(state.clock, 49);
        assert_eq!(tile(&state, 1, 1), Tile::Boulder);

        // Resume runs the tick that was next before the pause, and only that one
        tick(&mut state, &resume()).unwrap();
        assert_eq!(state.clock, 50);
        assert_eq!(tile(&state, 1, 1), Tile::Path);
        assert_eq!(tile(&state, 2, 1), Tile::Boulder);
        assert_eq!(tile(&state, 3, 1), Tile::Path);
    }

    #[test]
    fn test_moves_ignored_while_paused() {
        let mut state = state_from(vec![vec![2, 0]], 0);
        tick(&mut state, &pause()).unwrap();
        tick(&mut state, &TickInput::movement(Direction::Right)).unwrap();
        assert_eq!(state.pending_move, None);
        tick(&mut state, &resume()).unwrap();
        advance(&mut state, 10).unwrap();
        assert_eq!(state.player.pos, Position::new(0, 0));
    }

    #[test]
    fn test_detonate_applies_while_paused() {
        let mut state = state_from(vec![vec![2, 1, 1, 1], vec![1, 1, 1, 1]], 0);
        tick(&mut state, &pause()).unwrap();
        let detonate = TickInput {
            detonate: Some(Position::new(0, 3)),
            ..Default::default()
        };
        tick(&mut state, &detonate).unwrap();
        assert_eq!(state.clock, 0);
        assert_eq!(tile(&state, 0, 2), Tile::ExplosionResidue);
        assert_eq!(tile(&state, 1, 3), Tile::ExplosionResidue);
        assert_eq!(tile(&state, 0, 1), Tile::Dirt);

        // Out of bounds is ignored
        let outside = TickInput {
            detonate: Some(Position::new(9, 9)),
            ..Default::default()
        };
        tick(&mut state, &outside).unwrap();
    }

    #[test]
    fn test_residue_lasts_one_tick() {
        let mut state = state_from(vec![vec![2, 1, 1, 1]], 0);
        let detonate = TickInput {
            detonate: Some(Position::new(0, 3)),
            ..Default::default()
        };
        tick(&mut state, &detonate).unwrap();
        assert_eq!(state.clock, 1);
        assert_eq!(tile(&state, 0, 3), Tile::ExplosionResidue);
        assert_eq!(tile(&state, 0, 2), Tile::ExplosionResidue);

        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(tile(&state, 0, 3), Tile::Path);
        assert_eq!(tile(&state, 0, 2), Tile::Path);
        assert_eq!(tile(&state, 0, 1), Tile::Dirt);
    }

    #[test]
    fn test_detonation_on_hundredth_tick_stays_visible() {
        let mut state = state_from(vec![vec![2, 1, 1, 1, 1]], 0);
        advance(&mut state, 99).unwrap();
        let detonate = TickInput {
            detonate: Some(Position::new(0, 4)),
            ..Default::default()
        };
        tick(&mut state, &detonate).unwrap();
        assert_eq!(state.clock, 100);
        assert_eq!(tile(&state, 0, 4), Tile::ExplosionResidue);

        tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(tile(&state, 0, 4), Tile::Path);
    }

    #[test]
    fn test_crush_residue_clears_next_tick() {
        let mut state = state_from(vec![vec![14], vec![0], vec![2], vec![1]], 0);
        advance(&mut state, 100).unwrap();
        assert_eq!(tile(&state, 3, 0), Tile::ExplosionResidue);
        // Terminal after the crush, so inspect the decay directly
        state.clock += 1;
        explosion_phase(&mut state).unwrap();
        assert_eq!(tile(&state, 3, 0), Tile::Path);
    }

    #[test]
    fn test_paused_detonation_clears_on_first_tick_after_resume() {
        let mut state = state_from(vec![vec![2, 1, 1, 1]], 0);
        tick(&mut state, &pause()).unwrap();
        let detonate = TickInput {
            detonate: Some(Position::new(0, 3)),
            ..Default::default()
        };
        tick(&mut state, &detonate).unwrap();
        advance(&mut state, 20).unwrap();
        assert_eq!(tile(&state, 0, 3), Tile::ExplosionResidue);

        tick(&mut state, &resume()).unwrap();
        assert_eq!(state.clock, 1);
        assert_eq!(tile(&state, 0, 3), Tile::Path);
    }

    #[test]
    fn test_falling_boulder_crushes_player() {
        let mut state = state_from(vec![vec![14], vec![0], vec![2]], 0);
        let outcome = advance(&mut state, 1000).unwrap();
        assert_eq!(outcome, Outcome::Lost(LoseCause::Crushed));
        assert_eq!(state.clock, 100);
        assert_eq!(tile(&state, 2, 0), Tile::ExplosionResidue);

        // Terminal: further ticks do nothing
        tick(&mut state, &TickInput::movement(Direction::Up)).unwrap();
        assert_eq!(state.clock, 100);
    }

    #[test]
    fn test_adjacent_enemy_kills_on_proximity_cadence() {
        let mut state = state_from(vec![vec![2, 17], vec![4, 4]], 0);
        tick(&mut state, &TickInput::default()).unwrap();
        assert!(state.player.is_alive());
        let outcome = tick(&mut state, &TickInput::default()).unwrap();
        assert_eq!(outcome, Outcome::Lost(LoseCause::EnemyContact));
    }

    #[test]
    fn test_collect_then_exit_wins() {
        let mut state = state_from(vec![vec![2, 15, 20]], 1);
        tick(&mut state, &TickInput::movement(Direction::Right)).unwrap();
        advance(&mut state, 4).unwrap();
        assert_eq!(state.player.diamonds, 1);
        tick(&mut state, &TickInput::movement(Direction::Right)).unwrap();
        let outcome = advance(&mut state, 4).unwrap();
        assert_eq!(outcome, Outcome::Won);
        assert_eq!(state.clock, 10);
    }

    #[test]
    fn test_countdown_runs_out() {
        let level = Level {
            time_limit_secs: Some(2),
            ..Level::untimed(vec![vec![2, 0]], 0)
        };
        let mut state = GameState::new(level, SimConfig::default()).unwrap();
        assert_eq!(advance(&mut state, 199).unwrap(), Outcome::Continue);
        assert_eq!(state.seconds_remaining, Some(1));
        assert_eq!(advance(&mut state, 1).unwrap(), Outcome::Lost(LoseCause::OutOfTime));
        assert_eq!(state.seconds_remaining, Some(0));
    }

    #[test]
    fn test_reset_restores_template() {
        let codes = vec![vec![2, 15, 14], vec![0, 0, 0]];
        let mut state = state_from(codes.clone(), 0);
        tick(&mut state, &TickInput::movement(Direction::Right)).unwrap();
        advance(&mut state, 60).unwrap();
        assert_eq!(state.player.diamonds, 1);
        assert_ne!(state.save_codes(), codes);

        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &reset).unwrap(), Outcome::Continue);
        assert_eq!(state.save_codes(), codes);
        assert_eq!(state.player.diamonds, 0);
        assert_eq!(state.player.pos, Position::new(0, 0));
        assert_eq!(state.clock, 0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_reset_after_loss() {
        let mut state = state_from(vec![vec![2, 17], vec![4, 4]], 0);
        advance(&mut state, 5).unwrap();
        assert!(state.outcome().is_terminal());
        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &reset).unwrap();
        assert_eq!(state.outcome(), Outcome::Continue);
        assert!(state.player.is_alive());
    }

    #[test]
    fn test_determinism() {
        let codes = vec![
            vec![2, 0, 1, 0, 1, 0],
            vec![0, 16, 0, 1, 0, 0],
            vec![1, 0, 0, 0, 19, 0],
            vec![0, 1, 0, 14, 0, 16],
        ];
        let mut config = SimConfig::with_seed(4242);
        config.cadence = Cadences::every_tick();
        config.amoeba.growth_chance = 0.3;

        let run = || {
            let mut state =
                GameState::new(Level::untimed(codes.clone(), 0), config.clone()).unwrap();
            let inputs = [Direction::Down, Direction::Down, Direction::Right];
            for dir in inputs {
                tick(&mut state, &TickInput::movement(dir)).unwrap();
            }
            advance(&mut state, 40).unwrap();
            (state.save_codes(), state.clock, state.outcome(), state.drain_events())
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_every_tick_cadence_runs_all_phases() {
        let mut config = SimConfig::default();
        config.cadence = Cadences::every_tick();
        let level = Level::untimed(vec![vec![2, 14], vec![0, 0], vec![0, 0]], 0);
        let mut state = GameState::new(level, config).unwrap();
        advance(&mut state, 1).unwrap();
        assert_eq!(state.grid.kind_at(Position::new(1, 1)).map(|k| k.tile()), Some(Tile::Boulder));
        advance(&mut state, 1).unwrap();
        assert!(matches!(
            state.grid.kind_at(Position::new(2, 1)),
            Some(ElementKind::Boulder { .. })
        ));
    }
}
