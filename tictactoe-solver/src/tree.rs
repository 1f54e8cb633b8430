//! Count the full game tree (no transposition compression).
//!
//! Every path is enumerated, so the same position reached by different move
//! orders is counted once per path. Useful as an independent cross-check of
//! the memoized solver, which visits each position only once.

use serde::Serialize;
use tictactoe_core::{Outcome, Player, Pos, State, NUM_CELLS};

/// Stack frame for iterative DFS.
struct Frame {
    state: State,
    /// Empty cells still to explore
    moves: Vec<Pos>,
    /// Index of next move to explore
    move_idx: usize,
}

impl Frame {
    fn new(state: State) -> Self {
        Self {
            state,
            moves: state.empty_cells().collect(),
            move_idx: 0,
        }
    }
}

/// Node and leaf counts of a game tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeCount {
    /// Nodes at each ply below the root (index 0 is the root itself)
    pub nodes_per_ply: [u64; NUM_CELLS + 1],
    /// Terminal leaves by outcome
    pub cross_wins: u64,
    pub nought_wins: u64,
    pub draws: u64,
}

impl TreeCount {
    /// Total nodes, root included.
    pub fn nodes(&self) -> u64 {
        self.nodes_per_ply.iter().sum()
    }

    /// Number of distinct complete games (terminal leaves).
    pub fn games(&self) -> u64 {
        self.cross_wins + self.nought_wins + self.draws
    }

    fn record_leaf(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win(Player::Cross) => self.cross_wins += 1,
            Outcome::Win(Player::Nought) => self.nought_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Ongoing => {}
        }
    }
}

/// Enumerate every path from `root` to a finished game.
pub fn count_tree(root: State) -> TreeCount {
    let mut count = TreeCount::default();
    let mut stack: Vec<Frame> = Vec::with_capacity(NUM_CELLS + 1);

    count.nodes_per_ply[0] += 1;
    let outcome = root.evaluate();
    if outcome.is_terminal() {
        count.record_leaf(outcome);
        return count;
    }
    stack.push(Frame::new(root));

    while let Some(frame) = stack.last_mut() {
        if frame.move_idx == frame.moves.len() {
            stack.pop();
            continue;
        }

        let pos = frame.moves[frame.move_idx];
        frame.move_idx += 1;
        let child = frame.state.set_cell(pos, frame.state.whose_turn().symbol()).toggle_turn();

        // Frames on the stack are the ancestors of `child`
        count.nodes_per_ply[stack.len()] += 1;

        let outcome = child.evaluate();
        if outcome.is_terminal() {
            count.record_leaf(outcome);
        } else {
            stack.push(Frame::new(child));
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_tree_from_empty_board() {
        let count = count_tree(State::new());

        assert_eq!(
            count.nodes_per_ply,
            [1, 9, 72, 504, 3024, 15120, 54720, 148176, 200448, 127872]
        );
        assert_eq!(count.nodes(), 549_946);
        assert_eq!(count.games(), 255_168);
        assert_eq!(count.cross_wins, 131_184);
        assert_eq!(count.nought_wins, 77_904);
        assert_eq!(count.draws, 46_080);
    }

    #[test]
    fn test_terminal_root() {
        let root: State = "XXXOO....".parse().unwrap();
        let count = count_tree(root);
        assert_eq!(count.nodes(), 1);
        assert_eq!(count.cross_wins, 1);
    }

    #[test]
    fn test_one_cell_left() {
        let root: State = "XOXXOO.XO".parse().unwrap();
        let count = count_tree(root);
        assert_eq!(count.nodes_per_ply[..2], [1, 1]);
        assert_eq!(count.games(), 1);
    }
}
