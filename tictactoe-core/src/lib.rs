//! Tic-tac-toe game logic with a packed 32-bit board representation.
//!
//! # State Encoding (32-bit)
//!
//! ```text
//! Bits 30-31: cell 0      Bits 22-23: cell 4      Bits 14-15: cell 8
//! Bits 28-29: cell 1      Bits 20-21: cell 5      Bit  13:    turn (0 = X, 1 = O)
//! Bits 26-27: cell 2      Bits 18-19: cell 6      Bits 0-12:  unused (always zero)
//! Bits 24-25: cell 3      Bits 16-17: cell 7
//!
//! Each cell (2 bits):
//!   00 = empty, 01 = cross, 11 = nought, 10 = never used
//!
//! Cell indices (row-major order):
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//! ```
//!
//! States are `Copy` values. Every operation returns a new state and leaves
//! its input untouched.

mod error;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::{Error, Result};

/// Number of cells on the board.
pub const NUM_CELLS: usize = 9;

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
pub const WIN_LINES: [[Pos; 3]; 8] = [
    [Pos(0), Pos(1), Pos(2)], // Row 0
    [Pos(3), Pos(4), Pos(5)], // Row 1
    [Pos(6), Pos(7), Pos(8)], // Row 2
    [Pos(0), Pos(3), Pos(6)], // Col 0
    [Pos(1), Pos(4), Pos(7)], // Col 1
    [Pos(2), Pos(5), Pos(8)], // Col 2
    [Pos(0), Pos(4), Pos(8)], // Main diagonal
    [Pos(2), Pos(4), Pos(6)], // Anti-diagonal
];

/// Player identifier. Cross always opens the game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    Cross,
    Nought,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Cross => Player::Nought,
            Player::Nought => Player::Cross,
        }
    }

    /// The mark this player leaves on the board.
    #[inline]
    pub fn symbol(self) -> Symbol {
        match self {
            Player::Cross => Symbol::Cross,
            Player::Nought => Symbol::Nought,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Cross => f.write_str("X"),
            Player::Nought => f.write_str("O"),
        }
    }
}

/// Contents of a single cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Symbol {
    Empty = 0b00,
    Cross = 0b01,
    Nought = 0b11,
}

impl Symbol {
    /// Decode a 2-bit cell value. The unused `10` pattern yields `None`.
    #[inline]
    pub fn from_bits(bits: u32) -> Option<Symbol> {
        match bits {
            0b00 => Some(Symbol::Empty),
            0b01 => Some(Symbol::Cross),
            0b11 => Some(Symbol::Nought),
            _ => None,
        }
    }

    /// The 2-bit encoding of this symbol.
    #[inline]
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// The player owning this mark, if any.
    #[inline]
    pub fn player(self) -> Option<Player> {
        match self {
            Symbol::Empty => None,
            Symbol::Cross => Some(Player::Cross),
            Symbol::Nought => Some(Player::Nought),
        }
    }

    /// Character used by the console renderer.
    pub fn to_char(self) -> char {
        match self {
            Symbol::Empty => ' ',
            Symbol::Cross => 'X',
            Symbol::Nought => 'O',
        }
    }

    /// Parse a notation character. `.`, `-`, `_` and space are empty.
    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            '.' | '-' | '_' | ' ' => Some(Symbol::Empty),
            'X' | 'x' => Some(Symbol::Cross),
            'O' | 'o' | '0' => Some(Symbol::Nought),
            _ => None,
        }
    }
}

/// Position on the 3x3 board (0-8).
///
/// Layout:
/// ```text
///   0 1 2
///   3 4 5
///   6 7 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pos(pub u8);

impl Pos {
    /// Checked constructor.
    pub fn new(index: u8) -> Result<Pos> {
        let pos = Pos(index);
        if pos.is_valid() {
            Ok(pos)
        } else {
            Err(Error::InvalidPosition(index))
        }
    }

    /// Create a position from row and column (0-2 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < 3 && col < 3);
        Pos(row * 3 + col)
    }

    /// Get the row (0-2).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Check if this is a valid position (0-8).
    #[inline]
    pub fn is_valid(self) -> bool {
        (self.0 as usize) < NUM_CELLS
    }

    /// Iterate over all 9 positions in ascending order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..NUM_CELLS as u8).map(Pos)
    }

    /// Shift of this cell's two bits inside the encoding.
    #[inline]
    fn shift(self) -> u32 {
        30 - 2 * self.0 as u32
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of inspecting a state for a finished game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win(Player),
    Draw,
    Ongoing,
}

impl Outcome {
    /// Whether the game has ended.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    /// The winning player, if any.
    #[inline]
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(player) => Some(player),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(Player::Cross) => f.write_str("Crosses won!"),
            Outcome::Win(Player::Nought) => f.write_str("Noughts won!"),
            Outcome::Draw => f.write_str("Draw!"),
            Outcome::Ongoing => f.write_str("In progress"),
        }
    }
}

/// Compact game state - fits in a single u32.
///
/// See module documentation for encoding details.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct State(u32);

impl State {
    /// Mask for a single cell.
    const CELL_MASK: u32 = 0b11;
    /// Bit position for the turn flag.
    const TURN_BIT: u32 = 13;
    /// All bits a well-formed encoding may use.
    const USED_BITS: u32 = 0xFFFF_C000 | (1 << Self::TURN_BIT);

    /// The empty board with Cross to move (all-zero encoding).
    pub const EMPTY: State = State(0);

    /// Create a new empty board with Cross to move.
    #[inline]
    pub fn new() -> State {
        State::EMPTY
    }

    /// Create a state from a raw encoding, rejecting unused cell patterns and
    /// stray bits.
    pub fn from_bits(bits: u32) -> Result<State> {
        if bits & !Self::USED_BITS != 0 {
            return Err(Error::InvalidEncoding(bits));
        }
        let state = State(bits);
        for pos in Pos::all() {
            if Symbol::from_bits(state.raw_cell(pos)).is_none() {
                return Err(Error::InvalidEncoding(bits));
            }
        }
        Ok(state)
    }

    /// Get the raw u32 encoding.
    #[inline]
    pub fn to_bits(self) -> u32 {
        self.0
    }

    /// # Panics
    ///
    /// Panics if `pos` is off the board.
    #[inline]
    fn raw_cell(self, pos: Pos) -> u32 {
        assert!(pos.is_valid(), "position {} is off the board", pos.0);
        (self.0 >> pos.shift()) & Self::CELL_MASK
    }

    /// Get the symbol at a position.
    #[inline]
    pub fn cell(self, pos: Pos) -> Symbol {
        // `from_bits` and the setters never store the unused pattern.
        match self.raw_cell(pos) {
            0b01 => Symbol::Cross,
            0b11 => Symbol::Nought,
            _ => Symbol::Empty,
        }
    }

    /// Check if a cell is empty.
    #[inline]
    pub fn is_empty(self, pos: Pos) -> bool {
        self.raw_cell(pos) == 0
    }

    /// Return a copy with `symbol` written at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is off the board or already occupied. Use
    /// [`State::try_set_cell`] when the input is not trusted.
    pub fn set_cell(self, pos: Pos, symbol: Symbol) -> State {
        match self.try_set_cell(pos, symbol) {
            Ok(state) => state,
            Err(e) => panic!("set_cell precondition violated: {}", e),
        }
    }

    /// Checked form of [`State::set_cell`].
    pub fn try_set_cell(self, pos: Pos, symbol: Symbol) -> Result<State> {
        if !pos.is_valid() {
            return Err(Error::InvalidPosition(pos.0));
        }
        if !self.is_empty(pos) {
            return Err(Error::OccupiedCell(pos));
        }
        Ok(State(self.0 | (symbol.bits() << pos.shift())))
    }

    /// Get the player to move.
    #[inline]
    pub fn whose_turn(self) -> Player {
        if (self.0 >> Self::TURN_BIT) & 1 == 0 {
            Player::Cross
        } else {
            Player::Nought
        }
    }

    /// Return a copy with the turn flag flipped.
    #[inline]
    pub fn toggle_turn(self) -> State {
        State(self.0 ^ (1 << Self::TURN_BIT))
    }

    /// Play one ply: mark `pos` for the player to move, then pass the turn.
    pub fn place(self, pos: Pos) -> Result<State> {
        if self.evaluate().is_terminal() {
            return Err(Error::GameOver);
        }
        Ok(self.try_set_cell(pos, self.whose_turn().symbol())?.toggle_turn())
    }

    /// Empty positions in ascending order.
    pub fn empty_cells(self) -> impl Iterator<Item = Pos> {
        Pos::all().filter(move |&pos| self.is_empty(pos))
    }

    /// Number of marks on the board.
    pub fn occupied_count(self) -> usize {
        Pos::all().filter(|&pos| !self.is_empty(pos)).count()
    }

    /// Check if every cell is occupied.
    #[inline]
    pub fn is_full(self) -> bool {
        self.occupied_count() == NUM_CELLS
    }

    /// Count the marks of one player.
    pub fn count(self, player: Player) -> usize {
        let symbol = player.symbol();
        Pos::all().filter(|&pos| self.cell(pos) == symbol).count()
    }

    fn winner_and_line(self) -> Option<(Player, [Pos; 3])> {
        WIN_LINES.iter().find_map(|line| {
            let first = self.cell(line[0]);
            let player = first.player()?;
            (self.cell(line[1]) == first && self.cell(line[2]) == first).then_some((player, *line))
        })
    }

    /// Get the first completed line, checked in row, column, diagonal order.
    pub fn winning_line(self) -> Option<[Pos; 3]> {
        self.winner_and_line().map(|(_, line)| line)
    }

    /// Determine whether the game has ended and how.
    ///
    /// A completed line wins, a full board without one is a draw, anything
    /// else is still ongoing.
    pub fn evaluate(self) -> Outcome {
        if let Some((player, _)) = self.winner_and_line() {
            Outcome::Win(player)
        } else if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }

    /// Same as [`State::evaluate`].
    #[inline]
    pub fn outcome(self) -> Outcome {
        self.evaluate()
    }

    /// Render the 9-character row-major notation, `.` for empty cells.
    pub fn notation(self) -> String {
        Pos::all()
            .map(|pos| match self.cell(pos) {
                Symbol::Empty => '.',
                symbol => symbol.to_char(),
            })
            .collect()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("bits", &format_args!("{:#010x}", self.0))
            .field("board", &self.notation())
            .field("to_move", &self.whose_turn())
            .finish()
    }
}

/// Console rendering: three rows of `X|O| `.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3u8 {
            let cells: Vec<String> = (0..3u8)
                .map(|col| self.cell(Pos::from_row_col(row, col)).to_char().to_string())
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl FromStr for State {
    type Err = Error;

    /// Parse 9 row-major cell characters, optionally split into rows with `/`.
    /// The player to move is derived from the piece counts.
    fn from_str(s: &str) -> Result<State> {
        let invalid = |reason: String| Error::InvalidNotation {
            notation: s.to_string(),
            reason,
        };

        let chars: Vec<char> = s.chars().filter(|&c| c != '/').collect();
        if chars.len() != NUM_CELLS {
            return Err(invalid(format!("expected {} cells, got {}", NUM_CELLS, chars.len())));
        }

        let mut state = State::new();
        for (pos, &c) in Pos::all().zip(&chars) {
            let symbol = Symbol::from_char(c)
                .ok_or_else(|| invalid(format!("unexpected character '{}' at {}", c, pos)))?;
            if symbol != Symbol::Empty {
                state = state.try_set_cell(pos, symbol)?;
            }
        }

        let crosses = state.count(Player::Cross);
        let noughts = state.count(Player::Nought);
        if crosses == noughts {
            Ok(state)
        } else if crosses == noughts + 1 {
            Ok(state.toggle_turn())
        } else {
            Err(Error::InvalidPieceCounts { crosses, noughts })
        }
    }
}

impl TryFrom<u32> for State {
    type Error = Error;

    fn try_from(bits: u32) -> Result<State> {
        State::from_bits(bits)
    }
}

impl From<State> for u32 {
    fn from(state: State) -> u32 {
        state.0
    }
}
