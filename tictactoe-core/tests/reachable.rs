//! Walks every state reachable from the empty board through `State::place`
//! and checks the encoding invariants on each of them.

use std::collections::{HashSet, VecDeque};

use tictactoe_core::{Outcome, Player, Pos, State, Symbol};

fn reachable_states() -> HashSet<State> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(State::new());
    queue.push_back(State::new());

    while let Some(state) = queue.pop_front() {
        if state.evaluate().is_terminal() {
            continue;
        }
        for pos in state.empty_cells() {
            let child = state.place(pos).expect("empty cell on a live board");
            if seen.insert(child) {
                queue.push_back(child);
            }
        }
    }
    seen
}

#[test]
fn test_reachable_state_count() {
    assert_eq!(reachable_states().len(), 5478);
}

#[test]
fn test_terminal_state_counts() {
    let mut cross = 0;
    let mut nought = 0;
    let mut draws = 0;
    for state in reachable_states() {
        match state.evaluate() {
            Outcome::Win(Player::Cross) => cross += 1,
            Outcome::Win(Player::Nought) => nought += 1,
            Outcome::Draw => draws += 1,
            Outcome::Ongoing => {}
        }
    }
    assert_eq!((cross, nought, draws), (626, 316, 16));
}

#[test]
fn test_turn_flag_matches_move_count() {
    for state in reachable_states() {
        let crosses = state.count(Player::Cross);
        let noughts = state.count(Player::Nought);
        let expected = if crosses == noughts { Player::Cross } else { Player::Nought };
        assert_eq!(state.whose_turn(), expected, "{:?}", state);
        assert!(crosses == noughts || crosses == noughts + 1);
    }
}

#[test]
fn test_winner_is_never_the_player_to_move() {
    for state in reachable_states() {
        if let Outcome::Win(winner) = state.evaluate() {
            assert_eq!(winner, state.whose_turn().opponent(), "{:?}", state);
        }
    }
}

#[test]
fn test_encodings_roundtrip() {
    for state in reachable_states() {
        assert_eq!(State::from_bits(state.to_bits()), Ok(state));
        assert_eq!(state.notation().parse::<State>(), Ok(state));
        for pos in Pos::all() {
            assert_ne!((state.to_bits() >> (30 - 2 * pos.0 as u32)) & 0b11, 0b10);
        }
        let marked = Pos::all().filter(|&pos| state.cell(pos) != Symbol::Empty).count();
        assert_eq!(marked, state.occupied_count());
    }
}
