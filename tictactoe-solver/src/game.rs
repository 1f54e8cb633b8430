//! Playing a game out from a root state with one strategy per player.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tictactoe_core::{Outcome, Player, Pos, Result, State};
use tracing::debug;

use crate::policy::{optimal_move, random_move};
use crate::solver::Solver;

/// How a player chooses its moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Recorded best move from the memo table
    Optimal,
    /// Uniformly random empty cell
    Random,
}

impl Strategy {
    /// Pick a move for the player to move in `state`.
    pub fn choose<R: Rng + ?Sized>(self, state: State, solver: &Solver, rng: &mut R) -> Result<Pos> {
        match self {
            Strategy::Optimal => optimal_move(state, solver),
            Strategy::Random => random_move(state, rng),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Optimal => f.write_str("optimal"),
            Strategy::Random => f.write_str("random"),
        }
    }
}

/// A finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Playthrough {
    /// Every state from the root to the terminal state
    pub states: Vec<State>,
    /// Position played at each ply
    pub moves: Vec<Pos>,
    pub outcome: Outcome,
}

impl Playthrough {
    /// The terminal state.
    pub fn final_state(&self) -> State {
        // `states` always starts with the root
        self.states[self.states.len() - 1]
    }
}

/// Alternate `cross` and `nought` from `root` until the game ends.
///
/// `Strategy::Optimal` requires `solver` to hold every state reachable from
/// `root`.
pub fn play<R: Rng + ?Sized>(
    solver: &Solver,
    root: State,
    cross: Strategy,
    nought: Strategy,
    rng: &mut R,
) -> Result<Playthrough> {
    let mut state = root;
    let mut states = vec![root];
    let mut moves = Vec::new();

    let outcome = loop {
        let outcome = state.evaluate();
        if outcome.is_terminal() {
            break outcome;
        }

        let player = state.whose_turn();
        let strategy = match player {
            Player::Cross => cross,
            Player::Nought => nought,
        };
        let pos = strategy.choose(state, solver, rng)?;
        state = state.place(pos)?;
        debug!(%player, %strategy, pos = pos.0, board = %state.notation(), "move");

        states.push(state);
        moves.push(pos);
    };

    Ok(Playthrough { states, moves, outcome })
}

/// Outcome counts over several games.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub cross_wins: u64,
    pub nought_wins: u64,
    pub draws: u64,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win(Player::Cross) => self.cross_wins += 1,
            Outcome::Win(Player::Nought) => self.nought_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Ongoing => {}
        }
    }

    /// Number of finished games recorded.
    pub fn games(&self) -> u64 {
        self.cross_wins + self.nought_wins + self.draws
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games: crosses won {}, noughts won {}, draws {}",
            self.games(),
            self.cross_wins,
            self.nought_wins,
            self.draws
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tictactoe_core::Error;

    fn solved() -> Solver {
        let mut solver = Solver::new();
        solver.solve(State::new());
        solver
    }

    #[test]
    fn test_optimal_self_play_is_draw() {
        let solver = solved();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let game = play(&solver, State::new(), Strategy::Optimal, Strategy::Optimal, &mut rng).unwrap();

        assert_eq!(game.outcome, Outcome::Draw);
        assert_eq!(game.moves, [0, 4, 1, 2, 6, 3, 5, 7, 8].map(Pos).to_vec());
        assert_eq!(game.states.len(), 10);
        assert_eq!(game.final_state().notation(), "XXOOOXXOX");
    }

    #[test]
    fn test_optimal_never_loses_to_random() {
        let solver = solved();
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let as_cross = play(&solver, State::new(), Strategy::Optimal, Strategy::Random, &mut rng).unwrap();
            assert_ne!(as_cross.outcome, Outcome::Win(Player::Nought), "seed {}", seed);

            let as_nought = play(&solver, State::new(), Strategy::Random, Strategy::Optimal, &mut rng).unwrap();
            assert_ne!(as_nought.outcome, Outcome::Win(Player::Cross), "seed {}", seed);
        }
    }

    #[test]
    fn test_random_game_reaches_terminal() {
        let solver = Solver::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let game = play(&solver, State::new(), Strategy::Random, Strategy::Random, &mut rng).unwrap();
            assert!(game.outcome.is_terminal());
            assert_eq!(game.final_state().evaluate(), game.outcome);
            assert_eq!(game.moves.len() + 1, game.states.len());
            assert!((5..=9).contains(&game.moves.len()));
        }
    }

    #[test]
    fn test_play_from_terminal_root() {
        let solver = Solver::new();
        let root: State = "XXXOO....".parse().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let game = play(&solver, root, Strategy::Optimal, Strategy::Optimal, &mut rng).unwrap();
        assert_eq!(game.outcome, Outcome::Win(Player::Cross));
        assert!(game.moves.is_empty());
    }

    #[test]
    fn test_optimal_requires_solved_root() {
        let solver = Solver::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = play(&solver, State::new(), Strategy::Optimal, Strategy::Random, &mut rng);
        assert_eq!(result, Err(Error::Unsolved(State::new())));
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        tally.record(Outcome::Draw);
        tally.record(Outcome::Win(Player::Cross));
        tally.record(Outcome::Draw);
        tally.record(Outcome::Ongoing);

        assert_eq!(tally.games(), 3);
        assert_eq!(tally.draws, 2);
        assert_eq!(tally.to_string(), "3 games: crosses won 1, noughts won 0, draws 2");
    }
}
