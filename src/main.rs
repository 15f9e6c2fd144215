//! Rockfall entry point
//!
//! Headless runner: loads a level, replays a move string through the
//! scheduler and prints the final grid and outcome.
//!
//! Usage: `rockfall <level.json|level.txt> [moves] [config.json]`
//!
//! Moves are `U`/`D`/`L`/`R`; `.` idles for one player step.

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use rockfall::consts::{PLAYER_CADENCE, TICKS_PER_SECOND};
#[cfg(not(target_arch = "wasm32"))]
use rockfall::sim::{Direction, GameState, Outcome, Snapshot, Tile, TickInput, advance, tick};
#[cfg(not(target_arch = "wasm32"))]
use rockfall::{Level, Result, SimConfig};

/// Idle time after the last move so rocks and enemies can settle
#[cfg(not(target_arch = "wasm32"))]
const SETTLE_SECS: u64 = 5;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(level_path) = args.first() else {
        eprintln!("usage: rockfall <level.json|level.txt> [moves] [config.json]");
        return ExitCode::from(64);
    };
    let moves = args.get(1).map(String::as_str).unwrap_or("");
    let config_path = args.get(2);

    match run(level_path, moves, config_path.map(String::as_str)) {
        Ok(Outcome::Lost(_)) => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; hosts drive `sim::tick` directly
}

#[cfg(not(target_arch = "wasm32"))]
fn run(level_path: &str, moves: &str, config_path: Option<&str>) -> Result<Outcome> {
    let level = load_level(level_path)?;
    let config = match config_path {
        Some(path) => SimConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SimConfig::default(),
    };

    log::info!("Rockfall starting: {level_path}");
    let mut state = GameState::new(level, config)?;

    for c in moves.chars() {
        if state.outcome().is_terminal() {
            break;
        }
        let input = match Direction::from_char(c) {
            Some(dir) => TickInput::movement(dir),
            None if c == '.' => TickInput::default(),
            None => {
                log::warn!("Skipping unknown move {c:?}");
                continue;
            }
        };
        tick(&mut state, &input)?;
        advance(&mut state, PLAYER_CADENCE - 1)?;
    }
    let outcome = advance(&mut state, SETTLE_SECS * TICKS_PER_SECOND)?;

    let snapshot = state.snapshot();
    print!("{}", render(&snapshot));
    println!(
        "diamonds {}/{}  outcome {:?}",
        snapshot.diamonds, snapshot.diamonds_required, outcome
    );
    Ok(outcome)
}

/// JSON files carry their own parameters. Plain text levels require every
/// diamond present at load.
#[cfg(not(target_arch = "wasm32"))]
fn load_level(path: &str) -> Result<Level> {
    let text = std::fs::read_to_string(path)?;
    if path.ends_with(".json") {
        return Level::from_json(&text);
    }
    let mut level = Level::from_text(&text, 0)?;
    let diamonds = level.codes.iter().flatten().filter(|&&code| code == 15).count();
    level.diamonds_required = diamonds as u32;
    Ok(level)
}

#[cfg(not(target_arch = "wasm32"))]
fn render(snapshot: &Snapshot) -> String {
    let mut out = String::with_capacity((snapshot.cols + 1) * snapshot.rows);
    for row in snapshot.cells.chunks(snapshot.cols) {
        out.extend(row.iter().map(|cell| glyph(cell.tile)));
        out.push('\n');
    }
    out
}

#[cfg(not(target_arch = "wasm32"))]
fn glyph(tile: Tile) -> char {
    match tile {
        Tile::Path => ' ',
        Tile::Dirt => '.',
        Tile::NormalWall => '#',
        Tile::TitaniumWall => 'W',
        Tile::MagicWall => 'M',
        Tile::LockedDoor => 'D',
        Tile::UnlockedDoor => 'd',
        Tile::Key => 'k',
        Tile::Boulder => 'O',
        Tile::Diamond => '*',
        Tile::Player => '@',
        Tile::Amoeba => 'a',
        Tile::Frog => 'f',
        Tile::Butterfly => 'b',
        Tile::Firefly => 'q',
        Tile::ExplosionResidue => 'x',
        Tile::Exit => 'E',
    }
}
