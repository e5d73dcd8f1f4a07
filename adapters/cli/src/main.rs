#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted Gem Hunter match demo.
//!
//! The demo seeds a board with random gems, completes a four-in-line match,
//! lets the bonus-spawning system place the earned rocket, activates it and
//! ticks the resulting sweeps to completion, printing the event stream along
//! the way.

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use gem_hunter_board::{self as board, query, Board};
use gem_hunter_core::{CellCoord, Command, Event, GemColor};
use gem_hunter_system_bonus_spawning::BonusSpawning;
use rand::Rng as _;
use rand_chacha::{rand_core::SeedableRng as _, ChaCha8Rng};

mod catalog;

const TICK: Duration = Duration::from_millis(100);
const MATCH_LENGTH: i32 = 4;

/// Command-line arguments for the demo.
#[derive(Debug, Parser)]
#[command(name = "gem-hunter", about = "Runs a scripted match-3 bonus demo")]
struct Args {
    /// Number of cell columns on the demo board.
    #[arg(long, default_value_t = 8)]
    columns: u32,
    /// Number of cell rows on the demo board.
    #[arg(long, default_value_t = 6)]
    rows: u32,
    /// Seed for the deterministic gem fill.
    #[arg(long, default_value_t = 0x6765_6d73)]
    seed: u64,
    /// Number of random gem colors to draw from.
    #[arg(long, default_value_t = 4)]
    colors: u8,
    /// Optional JSON file describing the bonus-shape catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    anyhow::ensure!(
        args.columns as i32 > MATCH_LENGTH && args.rows >= 2,
        "demo board must be at least {}x2",
        MATCH_LENGTH + 1
    );
    anyhow::ensure!(args.colors > 0, "demo needs at least one gem color");

    let system = match &args.catalog {
        Some(path) => BonusSpawning::new(
            catalog::load_catalog(path)
                .with_context(|| format!("loading catalog from {}", path.display()))?,
        ),
        None => BonusSpawning::standard(),
    };

    let mut board = Board::new(args.columns, args.rows);
    let mut events = Vec::new();
    seed_board(&mut board, &args, &mut events);

    // Complete the scripted match and let the system react to it.
    let match_row = args.rows as i32 / 2;
    let match_cells: Vec<CellCoord> = (0..MATCH_LENGTH)
        .map(|x| CellCoord::new(x, match_row))
        .collect();
    board::apply(
        &mut board,
        Command::CompleteMatch {
            cells: match_cells.clone(),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    system.handle(&events, &mut commands);
    anyhow::ensure!(
        !commands.is_empty(),
        "catalog produced no bonus for a {MATCH_LENGTH}-in-line match"
    );
    for command in commands {
        board::apply(&mut board, command, &mut events);
    }

    // Activate whatever bonus was earned at the match origin.
    board::apply(
        &mut board,
        Command::ActivateBonus {
            cell: match_cells[0],
            swapped_color: None,
        },
        &mut events,
    );

    while query::active_sweep_count(&board) > 0 {
        board::apply(&mut board, Command::Tick { dt: TICK }, &mut events);
    }

    for event in &events {
        println!("{event:?}");
    }
    println!(
        "demo finished: {} gems remain, input locked: {}",
        query::gem_count(&board),
        query::is_input_locked(&board)
    );
    Ok(())
}

/// Fills the board with seeded random gems, keeping the scripted match row
/// uniform so the demo always completes a four-in-line.
fn seed_board(board: &mut Board, args: &Args, out_events: &mut Vec<Event>) {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let match_row = args.rows as i32 / 2;
    let match_color = GemColor::new(args.colors);

    for y in 0..args.rows as i32 {
        for x in 0..args.columns as i32 {
            let cell = CellCoord::new(x, y);
            let color = if y == match_row && x < MATCH_LENGTH {
                match_color
            } else {
                GemColor::new(rng.gen_range(0..args.colors))
            };
            board::apply(board, Command::SpawnGem { cell, color }, out_events);
        }
    }
}
