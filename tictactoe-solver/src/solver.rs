//! Recursive minimax solver with a memo table and no pruning.
//!
//! Every state reachable from the root is visited exactly once. Each move
//! strictly increases the number of marks on the board, so the recursion is
//! at most nine plies deep and the game graph has no cycles.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tictactoe_core::{Error, Outcome, Pos, Result, State};
use tracing::{debug, info};

use crate::stats::SolverStats;

/// Values, always from the perspective of the player to move
pub const WIN: i8 = 1;
pub const DRAW: i8 = 0;
pub const LOSS: i8 = -1;

/// Memo table entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Entry {
    /// Lowest-indexed optimal position, `None` for terminal states
    pub best_move: Option<Pos>,
    /// Game-theoretic value for the player to move
    pub value: i8,
}

/// Value of a terminal state for the player to move in it, or `None` while
/// the game is still running.
///
/// In any reachable won state the player to move is the one who just lost,
/// so wins score `LOSS` here and turn into `WIN` one ply up.
pub fn terminal_value(state: State) -> Option<i8> {
    match state.evaluate() {
        Outcome::Ongoing => None,
        Outcome::Draw => Some(DRAW),
        Outcome::Win(winner) if winner == state.whose_turn() => Some(WIN),
        Outcome::Win(_) => Some(LOSS),
    }
}

/// Minimax solver owning its memo table.
#[derive(Debug)]
pub struct Solver {
    /// Memo table: state -> (best move, value). Entries are written once.
    table: HashMap<State, Entry>,
    /// Solver statistics
    pub stats: SolverStats,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            stats: SolverStats::new(),
        }
    }

    /// Solve every state reachable from `root` and return the root's value.
    ///
    /// Calling it again on an already solved state is a table lookup.
    pub fn solve(&mut self, root: State) -> i8 {
        let start = Instant::now();
        let known = self.table.len();

        let value = self.solve_state(root, 0);

        info!(
            root = %root.notation(),
            value,
            new_states = self.table.len() - known,
            total_states = self.table.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "solve complete"
        );
        value
    }

    fn solve_state(&mut self, state: State, depth: u64) -> i8 {
        if let Some(entry) = self.table.get(&state) {
            self.stats.cache_hits += 1;
            return entry.value;
        }
        self.stats.record_depth(depth);

        if let Some(value) = terminal_value(state) {
            self.stats.record_terminal(state.evaluate());
            self.insert(state, Entry { best_move: None, value });
            return value;
        }

        let symbol = state.whose_turn().symbol();
        let mut best_move = None;
        let mut best_value = LOSS - 1;

        // Ascending order with a strict comparison keeps the lowest position on ties
        for pos in state.empty_cells() {
            let child = state.set_cell(pos, symbol).toggle_turn();
            let value = -self.solve_state(child, depth + 1);
            if value > best_value {
                best_value = value;
                best_move = Some(pos);
            }
        }

        self.insert(state, Entry { best_move, value: best_value });
        best_value
    }

    fn insert(&mut self, state: State, entry: Entry) {
        let previous = self.table.insert(state, entry);
        debug_assert!(previous.is_none(), "memo entry for {:?} written twice", state);
        self.stats.states_solved += 1;
        if self.stats.states_solved % 1000 == 0 {
            debug!(states = self.stats.states_solved, "solving");
        }
    }

    /// Get the memo entry for a state, if it has been solved.
    #[inline]
    pub fn entry(&self, state: State) -> Option<Entry> {
        self.table.get(&state).copied()
    }

    /// Check whether a state has a memo entry.
    #[inline]
    pub fn is_solved(&self, state: State) -> bool {
        self.table.contains_key(&state)
    }

    /// Value of a solved state for its player to move.
    pub fn value(&self, state: State) -> Result<i8> {
        self.entry(state)
            .map(|entry| entry.value)
            .ok_or(Error::Unsolved(state))
    }

    /// Recorded best move of a solved state (`None` when terminal).
    pub fn best_move(&self, state: State) -> Result<Option<Pos>> {
        self.entry(state)
            .map(|entry| entry.best_move)
            .ok_or(Error::Unsolved(state))
    }

    /// The state reached by playing the recorded best move.
    pub fn best_successor(&self, state: State) -> Result<Option<State>> {
        match self.best_move(state)? {
            Some(pos) => Ok(Some(state.place(pos)?)),
            None => Ok(None),
        }
    }

    /// States along optimal play from `state` down to a terminal state,
    /// starting with `state` itself.
    pub fn principal_variation(&self, state: State) -> Result<Vec<State>> {
        let mut line = vec![state];
        let mut current = state;
        while let Some(next) = self.best_successor(current)? {
            line.push(next);
            current = next;
        }
        Ok(line)
    }

    /// Number of solved states.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Read-only view of the memo table.
    pub fn table(&self) -> &HashMap<State, Entry> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_core::{Player, Symbol};

    fn solved() -> Solver {
        let mut solver = Solver::new();
        solver.solve(State::new());
        solver
    }

    #[test]
    fn test_solve_initial_position() {
        let mut solver = Solver::new();
        let value = solver.solve(State::new());

        // Perfect play from the empty board is a draw
        assert_eq!(value, DRAW);
        assert_eq!(solver.len(), 5478);
        assert_eq!(solver.entry(State::new()), Some(Entry { best_move: Some(Pos(0)), value: DRAW }));
    }

    #[test]
    fn test_stats_after_full_solve() {
        let solver = solved();
        assert_eq!(solver.stats.states_solved, 5478);
        assert_eq!(solver.stats.terminal_states, 958);
        assert_eq!(solver.stats.cross_wins, 626);
        assert_eq!(solver.stats.nought_wins, 316);
        assert_eq!(solver.stats.draws, 16);
        assert_eq!(solver.stats.max_depth, 9);
        assert!(solver.stats.cache_hits > 0);
    }

    #[test]
    fn test_value_distribution() {
        let solver = solved();
        let count = |v: i8| solver.table().values().filter(|e| e.value == v).count();
        assert_eq!(count(WIN), 2836);
        assert_eq!(count(DRAW), 1068);
        assert_eq!(count(LOSS), 1574);
    }

    #[test]
    fn test_terminal_entries_have_no_move() {
        let solver = solved();
        for (&state, entry) in solver.table() {
            assert_eq!(entry.best_move.is_none(), state.evaluate().is_terminal(), "{:?}", state);
        }
    }

    #[test]
    fn test_terminal_value_perspective() {
        // Cross just completed the top row; Nought is to move and has lost
        let state: State = "XXXOO....".parse().unwrap();
        assert_eq!(state.whose_turn(), Player::Nought);
        assert_eq!(terminal_value(state), Some(LOSS));

        let draw: State = "XOXXOOOXX".parse().unwrap();
        assert_eq!(terminal_value(draw), Some(DRAW));

        assert_eq!(terminal_value(State::new()), None);
    }

    #[test]
    fn test_winning_move_found() {
        // Cross to move can complete the top row at 2
        let state: State = "XX.OO....".parse().unwrap();
        let mut solver = Solver::new();
        assert_eq!(solver.solve(state), WIN);
        assert_eq!(solver.best_move(state), Ok(Some(Pos(2))));
    }

    #[test]
    fn test_forced_block() {
        // Nought to move must block at 2 or lose
        let state: State = "XX..O....".parse().unwrap();
        let mut solver = Solver::new();
        solver.solve(state);
        assert_eq!(solver.best_move(state), Ok(Some(Pos(2))));
    }

    #[test]
    fn test_zero_sum() {
        let solver = solved();
        for (&state, entry) in solver.table() {
            if let Some(successor) = solver.best_successor(state).unwrap() {
                assert_eq!(entry.value, -solver.value(successor).unwrap(), "{:?}", state);
            }
        }
    }

    #[test]
    fn test_best_move_is_maximal_and_lowest() {
        let solver = solved();
        for (&state, entry) in solver.table() {
            let Some(best) = entry.best_move else { continue };
            let symbol = state.whose_turn().symbol();
            for pos in state.empty_cells() {
                let child = state.set_cell(pos, symbol).toggle_turn();
                let value = -solver.value(child).unwrap();
                assert!(value <= entry.value);
                if pos < best {
                    assert!(value < entry.value, "tie not broken low at {:?}", state);
                }
            }
        }
    }

    #[test]
    fn test_deterministic_tables() {
        let a = solved();
        let b = solved();
        assert_eq!(a.table(), b.table());
    }

    #[test]
    fn test_resolve_is_lookup() {
        let mut solver = solved();
        let hits = solver.stats.cache_hits;
        assert_eq!(solver.solve(State::new()), DRAW);
        assert_eq!(solver.len(), 5478);
        assert_eq!(solver.stats.cache_hits, hits + 1);
    }

    #[test]
    fn test_subtree_matches_full_table() {
        let root = State::new().set_cell(Pos(4), Symbol::Cross).toggle_turn();
        let mut partial = Solver::new();
        partial.solve(root);

        let full = solved();
        assert!(partial.len() < full.len());
        for (state, entry) in partial.table() {
            assert_eq!(full.entry(*state), Some(*entry));
        }
    }

    #[test]
    fn test_optimal_line_from_empty_board() {
        let solver = solved();
        let line = solver.principal_variation(State::new()).unwrap();
        assert_eq!(line.len(), 10);
        let last = *line.last().unwrap();
        assert_eq!(last.notation(), "XXOOOXXOX");
        assert_eq!(last.evaluate(), Outcome::Draw);
    }

    #[test]
    fn test_default_matches_new() {
        let mut solver = Solver::default();
        solver.solve(State::new());
        assert_eq!(solver.len(), 5478);
        assert!(solver.stats.states_per_sec() > 0.0);
    }

    #[test]
    fn test_unsolved_queries() {
        let solver = Solver::new();
        assert!(solver.is_empty());
        assert_eq!(solver.value(State::new()), Err(Error::Unsolved(State::new())));
        assert_eq!(solver.best_move(State::new()), Err(Error::Unsolved(State::new())));
        assert!(!solver.is_solved(State::new()));
    }
}
