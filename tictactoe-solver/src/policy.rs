//! Turn policies: pick the next position for the player to move.

use rand::Rng;
use tictactoe_core::{Error, Pos, Result, State};

use crate::solver::Solver;

/// Look up the recorded best move for `state`.
///
/// The solver must already have been run on a root `state` is reachable
/// from; an unsolved state is reported as [`Error::Unsolved`] and a finished
/// game as [`Error::GameOver`].
pub fn optimal_move(state: State, solver: &Solver) -> Result<Pos> {
    let entry = solver.entry(state).ok_or(Error::Unsolved(state))?;
    entry.best_move.ok_or(Error::GameOver)
}

/// Pick one of the empty cells uniformly at random.
///
/// Callers check for a finished game first; only a full board is rejected.
pub fn random_move<R: Rng + ?Sized>(state: State, rng: &mut R) -> Result<Pos> {
    let empty: Vec<Pos> = state.empty_cells().collect();
    if empty.is_empty() {
        return Err(Error::BoardFull);
    }
    Ok(empty[rng.random_range(0..empty.len())])
}
