//! Tic-tac-toe player
//!
//! Solves the game from a starting position, then plays it out with the
//! chosen strategy for each side and prints every board.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tictactoe_core::State;
use tictactoe_solver::{play, Solver, Strategy, Tally};

#[derive(Parser, Debug)]
#[command(name = "tictactoe", version, about = "Solve tic-tac-toe and play it out")]
struct Args {
    /// Strategy for crosses (moves first)
    #[arg(long, value_enum, default_value_t = Strategy::Random)]
    cross: Strategy,

    /// Strategy for noughts
    #[arg(long, value_enum, default_value_t = Strategy::Random)]
    nought: Strategy,

    /// Number of games to play (0 = until interrupted)
    #[arg(long, default_value_t = 1)]
    games: u64,

    /// Seed for the random strategy
    #[arg(long)]
    seed: Option<u64>,

    /// Starting position, e.g. "X...O...." (player to move follows from the counts)
    #[arg(long, default_value = ".........")]
    start: State,

    /// Only print outcomes, not boards
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // Finish the current game on Ctrl-C, then report
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    let mut solver = Solver::new();
    let value = solver.solve(args.start);
    solver.stats.log_summary();
    info!(value, "starting position solved");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut tally = Tally::default();
    while args.games == 0 || tally.games() < args.games {
        if !running.load(Ordering::SeqCst) {
            warn!("interrupted");
            break;
        }

        let game = play(&solver, args.start, args.cross, args.nought, &mut rng)
            .with_context(|| format!("playing game {}", tally.games() + 1))?;

        if !args.quiet {
            for state in &game.states[1..] {
                println!("{}", state);
            }
        }
        println!("{}", game.outcome);
        tally.record(game.outcome);
    }

    info!(
        cross = %args.cross,
        nought = %args.nought,
        cross_wins = tally.cross_wins,
        nought_wins = tally.nought_wins,
        draws = tally.draws,
        "{}",
        tally
    );
    Ok(())
}
