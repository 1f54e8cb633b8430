//! Count the full game tree (no transposition compression).
//!
//! Usage: cargo run --release --bin count_tree -- [--start "X...O...."]

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tictactoe_core::State;
use tictactoe_solver::{count_tree, Solver};

#[derive(Parser, Debug)]
#[command(name = "count_tree", about = "Enumerate every game path from a position")]
struct Args {
    /// Starting position in 9-character notation
    #[arg(long, default_value = ".........")]
    start: State,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let start = Instant::now();
    let count = count_tree(args.start);
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "tree enumerated");

    // Distinct positions, for comparison with the path count
    let mut solver = Solver::new();
    solver.solve(args.start);

    println!("Starting position:\n{}", args.start);
    for (ply, nodes) in count.nodes_per_ply.iter().enumerate().filter(|&(_, &n)| n > 0) {
        println!("  ply {}: {} nodes", ply, nodes);
    }
    println!("Total nodes:        {}", count.nodes());
    println!("Distinct positions: {}", solver.len());
    println!("Complete games:     {}", count.games());
    println!("  - Crosses won: {}", count.cross_wins);
    println!("  - Noughts won: {}", count.nought_wins);
    println!("  - Draws:       {}", count.draws);
    Ok(())
}
