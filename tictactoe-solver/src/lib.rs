//! Tic-tac-toe solver.
//!
//! [`Solver`] runs an exhaustive memoized minimax over every state reachable
//! from a root and records the best move and value of each. The turn
//! policies in [`policy`] and the game loop in [`game`] read that table;
//! [`tree`] counts the unmemoized game tree as a cross-check.

pub mod game;
pub mod policy;
pub mod solver;
pub mod stats;
pub mod tree;

pub use game::{play, Playthrough, Strategy, Tally};
pub use policy::{optimal_move, random_move};
pub use solver::{Entry, Solver, DRAW, LOSS, WIN};
pub use stats::SolverStats;
pub use tree::{count_tree, TreeCount};
