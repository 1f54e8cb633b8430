//! Solver statistics tracking.

use std::time::Instant;

use serde::Serialize;
use tictactoe_core::{Outcome, Player};
use tracing::info;

/// Statistics collected during solving.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SolverStats {
    /// States whose entry was computed (terminal or from children)
    pub states_solved: u64,

    /// Memo hits (state already in the table when reached again)
    pub cache_hits: u64,

    /// Terminal states (game ended - win or draw)
    pub terminal_states: u64,

    /// Breakdown of terminal outcomes
    pub cross_wins: u64,
    pub nought_wins: u64,
    pub draws: u64,

    /// Deepest recursion level below the root
    pub max_depth: u64,

    #[serde(skip)]
    start_time: Option<Instant>,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a terminal state outcome
    pub fn record_terminal(&mut self, outcome: Outcome) {
        self.terminal_states += 1;
        match outcome {
            Outcome::Win(Player::Cross) => self.cross_wins += 1,
            Outcome::Win(Player::Nought) => self.nought_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Ongoing => {}
        }
    }

    /// Record that a state was reached `depth` plies below the root
    #[inline]
    pub fn record_depth(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    /// Get states solved per second since the stats were created
    pub fn states_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.states_solved as f64 / elapsed;
            }
        }
        0.0
    }

    /// Emit the final summary as a single structured event
    pub fn log_summary(&self) {
        info!(
            states_solved = self.states_solved,
            cache_hits = self.cache_hits,
            terminal_states = self.terminal_states,
            cross_wins = self.cross_wins,
            nought_wins = self.nought_wins,
            draws = self.draws,
            max_depth = self.max_depth,
            states_per_sec = self.states_per_sec(),
            "solver summary"
        );
    }
}
