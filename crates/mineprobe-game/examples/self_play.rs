//! Plays a batch of seeded games with the solver and reports the win rate.
//!
//! Every game is checked against its hidden layout: the run stops with an
//! error if the solver ever reports a mine as certainly safe or a clear
//! tile as a certain mine.
//!
//! # Usage
//!
//! ```sh
//! cargo run --release --example self_play -- --board 30x16/99 --games 1000
//! ```
//!
//! Replay a batch by passing the same seed phrase (or 64 hex digits):
//!
//! ```sh
//! cargo run --release --example self_play -- --seed nightly --games 200
//! ```
//!
//! Turn solver features off to compare their effect:
//!
//! ```sh
//! cargo run --release --example self_play -- --no-tie-break --brute-force-threshold 0
//! ```

use std::{process, str::FromStr, time::Instant};

use clap::Parser;
use mineprobe_core::Coord;
use mineprobe_game::{AutoplayError, GameRecord, GameSeed, GameStatus, Minefield, StartRule};
use mineprobe_solver::{SolveOptions, Solver};
use rayon::prelude::*;

/// Board size written as `WIDTHxHEIGHT/MINES`.
#[derive(Debug, Clone, Copy)]
struct BoardSize {
    width: usize,
    height: usize,
    mines: usize,
}

impl FromStr for BoardSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("expected WIDTHxHEIGHT/MINES, got {s:?}");
        let (dims, mines) = s.split_once('/').ok_or_else(invalid)?;
        let (width, height) = dims.split_once(['x', 'X']).ok_or_else(invalid)?;
        Ok(Self {
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.trim().parse().map_err(|_| invalid())?,
            mines: mines.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
#[expect(clippy::struct_excessive_bools)]
struct Args {
    /// Board size and mine count.
    #[arg(long, value_name = "WxH/M", default_value = "9x9/10")]
    board: BoardSize,

    /// Number of games to play.
    #[arg(long, value_name = "COUNT", default_value_t = 100)]
    games: u64,

    /// Batch seed: 64 hex digits or any phrase. Random when omitted.
    #[arg(long, value_name = "SEED")]
    seed: Option<String>,

    /// Keep the start tile's neighbours free of mines too.
    #[arg(long)]
    zero_start: bool,

    /// Disable tie-break scoring.
    #[arg(long)]
    no_tie_break: bool,

    /// Disable dead tile analysis.
    #[arg(long)]
    no_dead_tile_analysis: bool,

    /// Disable unavoidable-guess detection.
    #[arg(long)]
    no_5050_check: bool,

    /// Largest solution count handed to the exhaustive search.
    #[arg(long, value_name = "COUNT", default_value_t = 200)]
    brute_force_threshold: i64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let batch = match &args.seed {
        Some(text) => text.parse::<GameSeed>().unwrap_or_else(|_| GameSeed::from_phrase(text)),
        None => GameSeed::random(),
    };
    let rule = if args.zero_start {
        StartRule::Zero
    } else {
        StartRule::Safe
    };
    let options = SolveOptions {
        allow_tie_break: !args.no_tie_break,
        allow_dead_tile_analysis: !args.no_dead_tile_analysis,
        allow_5050_check: !args.no_5050_check,
        brute_force_threshold: args.brute_force_threshold,
        verbose: false,
    };
    let solver = Solver::default();
    let BoardSize {
        width,
        height,
        mines,
    } = args.board;

    let start = Instant::now();
    let results: Vec<(GameSeed, Result<GameRecord, AutoplayError>)> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let seed = batch.derive(i);
            let result = Minefield::generate(width, height, mines, Coord::new(0, 0), rule, seed)
                .map_err(AutoplayError::from)
                .and_then(|mut field| field.autoplay(&solver, &options, width * height));
            (seed, result)
        })
        .collect();

    let mut won: usize = 0;
    let mut no_guess: usize = 0;
    for (seed, result) in &results {
        match result {
            Ok(record) => {
                if record.status == GameStatus::Won {
                    won += 1;
                    if !record.guessed {
                        no_guess += 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("Game {seed} failed: {e}");
                process::exit(1);
            }
        }
    }

    let played = results.len();
    #[expect(clippy::cast_precision_loss)]
    let rate = if played == 0 {
        0.0
    } else {
        100.0 * won as f64 / played as f64
    };
    println!("Seed:");
    println!("  {batch}");
    println!();
    println!("Results:");
    println!("  Board: {width}x{height}/{mines}");
    println!("  Played: {played}");
    println!("  Won: {won} ({rate:.2}%)");
    println!("  Won without guessing: {no_guess}");
    println!("  Elapsed: {:?}", start.elapsed());
}
