//! # Gomoku (Five in a Row)
//!
//! Players alternately place stones on an empty intersection of a square
//! board. Black moves first. A stone that completes a run of exactly five of
//! its colour through itself, horizontally, vertically or diagonally, wins;
//! six or more in a row do not count. A full board without a winner is a draw.

use crate::bitpack::BitPack;
use crate::error::MoveError;
use crate::games::lines::{LineTable, AXES};
use crate::{GameState, Player};
use colored::Colorize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const BLACK: Player = 1;
pub const WHITE: Player = -1;

/// Stones in a winning run.
pub const WIN_LENGTH: usize = 5;

const CELL_EMPTY: u8 = 0b00;
const CELL_BLACK: u8 = 0b01;
const CELL_WHITE: u8 = 0b11;

/// A placement at `(row, col)`, both 0-based.
///
/// Moves are shown and parsed 1-based, e.g. `(4, 8)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct GomokuMove(pub usize, pub usize);

impl fmt::Display for GomokuMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0 + 1, self.1 + 1)
    }
}

impl FromStr for GomokuMove {
    type Err = String;

    /// Accepts `r c`, `r,c` or `(r, c)` with 1-based coordinates.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = parse_coordinates(s)?;
        Ok(GomokuMove(row, col))
    }
}

/// Parse a 1-based coordinate pair into 0-based `(row, col)`.
pub(crate) fn parse_coordinates(s: &str) -> Result<(usize, usize), String> {
    let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<&str> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 2 {
        return Err(format!("expected two coordinates like \"3 4\", got {:?}", s.trim()));
    }
    let mut coords = [0usize; 2];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        let value = part.parse::<usize>().map_err(|e| format!("{:?}: {}", part, e))?;
        if value == 0 {
            return Err("coordinates start at 1".to_string());
        }
        *slot = value - 1;
    }
    Ok((coords[0], coords[1]))
}

/// Gomoku position.
#[derive(Debug, Clone)]
pub struct GomokuState {
    size: usize,
    cells: BitPack<2>,
    lines: Arc<LineTable>,
    to_move: Player,
    winner: Option<Player>,
    stones: usize,
    last_move: Option<GomokuMove>,
}

impl GomokuState {
    /// Empty `size`×`size` board with Black to move.
    ///
    /// # Panics
    /// If `size` is smaller than [`WIN_LENGTH`].
    pub fn new(size: usize) -> Self {
        assert!(
            size >= WIN_LENGTH,
            "gomoku board must be at least {}x{}",
            WIN_LENGTH,
            WIN_LENGTH
        );
        GomokuState {
            size,
            cells: BitPack::new(size * size),
            lines: Arc::new(LineTable::new(size, WIN_LENGTH)),
            to_move: BLACK,
            winner: None,
            stones: 0,
            last_move: None,
        }
    }

    /// Replay `moves` from an empty board.
    pub fn from_moves(size: usize, moves: &[GomokuMove]) -> Result<Self, MoveError> {
        let mut state = Self::new(size);
        for mv in moves {
            state.make_move(mv)?;
        }
        Ok(state)
    }

    pub fn get_board_size(&self) -> usize {
        self.size
    }

    /// Owner of the stone at `(row, col)`, if any.
    pub fn stone_at(&self, row: usize, col: usize) -> Option<Player> {
        match self.cells.get(row * self.size + col) {
            CELL_BLACK => Some(BLACK),
            CELL_WHITE => Some(WHITE),
            _ => None,
        }
    }

    pub fn last_move(&self) -> Option<GomokuMove> {
        self.last_move
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.stones
    }

    fn cell_code(player: Player) -> u8 {
        if player == BLACK {
            CELL_BLACK
        } else {
            CELL_WHITE
        }
    }

    /// Whether the stone just placed at `cell` sits in a run of exactly five.
    fn completes_five(&self, cell: usize) -> bool {
        let code = self.cells.get(cell);
        let run = |ray: &[usize]| ray.iter().take_while(|&&i| self.cells.get(i) == code).count();
        (0..AXES.len()).any(|axis| {
            let (back, forward) = self.lines.axis(cell, axis);
            1 + run(back) + run(forward) == WIN_LENGTH
        })
    }
}

impl GameState for GomokuState {
    type Move = GomokuMove;

    fn get_current_player(&self) -> Option<Player> {
        (!self.is_terminal()).then_some(self.to_move)
    }

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.stones == self.size * self.size
    }

    fn is_draw(&self) -> bool {
        self.winner.is_none() && self.stones == self.size * self.size
    }

    fn get_winner(&self) -> Option<Player> {
        self.winner
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        (0..self.size * self.size)
            .filter(|&i| self.cells.get(i) == CELL_EMPTY)
            .map(|i| GomokuMove(i / self.size, i % self.size))
            .collect()
    }

    fn make_move(&mut self, mv: &Self::Move) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        let GomokuMove(row, col) = *mv;
        if row >= self.size || col >= self.size {
            return Err(MoveError::Illegal(format!("{} is off the board", mv)));
        }
        let cell = row * self.size + col;
        if self.cells.get(cell) != CELL_EMPTY {
            return Err(MoveError::Illegal(format!("{} is occupied", mv)));
        }

        self.cells.set(cell, Self::cell_code(self.to_move));
        self.stones += 1;
        self.last_move = Some(*mv);
        if self.completes_five(cell) {
            self.winner = Some(self.to_move);
        }
        self.to_move = -self.to_move;
        Ok(())
    }

    fn is_legal(&self, mv: &Self::Move) -> bool {
        !self.is_terminal()
            && mv.0 < self.size
            && mv.1 < self.size
            && self.cells.get(mv.0 * self.size + mv.1) == CELL_EMPTY
    }

    fn player_label(player: Player) -> &'static str {
        if player == BLACK {
            "Black"
        } else {
            "White"
        }
    }
}

impl fmt::Display for GomokuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 1..=self.size {
            write!(f, "{:>3}", col)?;
        }
        writeln!(f)?;
        for row in 0..self.size {
            write!(f, "{:>3}", row + 1)?;
            for col in 0..self.size {
                let last = self.last_move == Some(GomokuMove(row, col));
                let symbol = match self.stone_at(row, col) {
                    Some(BLACK) if last => "@".dimmed().bold(),
                    Some(BLACK) => "@".dimmed(),
                    Some(_) if last => "O".bold(),
                    Some(_) => "O".normal(),
                    None => ".".normal(),
                };
                write!(f, "  {}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Tactical 9×9 positions with known best replies.
pub mod puzzles {
    use super::{GomokuMove, GomokuState};
    use crate::error::MoveError;
    use crate::Player;

    pub const PUZZLE_SIZE: usize = 9;

    /// A position given as a 1-based move list, plus the replies that solve it.
    #[derive(Debug, Clone, Copy)]
    pub struct Puzzle {
        pub name: &'static str,
        pub to_move: Player,
        moves: &'static [(usize, usize)],
        solutions: &'static [(usize, usize)],
    }

    impl Puzzle {
        /// Build the puzzle position.
        pub fn position(&self) -> Result<GomokuState, MoveError> {
            let moves: Vec<GomokuMove> = self.moves.iter().map(|&(r, c)| GomokuMove(r - 1, c - 1)).collect();
            GomokuState::from_moves(PUZZLE_SIZE, &moves)
        }

        /// Moves that solve the puzzle.
        pub fn solutions(&self) -> Vec<GomokuMove> {
            self.solutions.iter().map(|&(r, c)| GomokuMove(r - 1, c - 1)).collect()
        }

        pub fn is_solution(&self, mv: &GomokuMove) -> bool {
            self.solutions().contains(mv)
        }
    }

    pub const PUZZLES: [Puzzle; 4] = [
        Puzzle {
            name: "broken-three",
            to_move: super::BLACK,
            moves: &[
                (5, 6), (5, 5), (6, 5), (6, 4), (7, 4), (4, 7), (8, 3),
                (9, 2), (6, 6), (4, 6), (7, 3), (3, 7), (2, 8), (4, 5),
            ],
            solutions: &[(4, 4), (4, 8)],
        },
        Puzzle {
            name: "block-the-four",
            to_move: super::WHITE,
            moves: &[
                (5, 5), (6, 5), (5, 4), (5, 6), (7, 4), (4, 7), (6, 4), (8, 4), (4, 4),
                (3, 4), (4, 5), (3, 6), (4, 6), (3, 7), (3, 5), (2, 5), (7, 3),
            ],
            solutions: &[(8, 2)],
        },
        Puzzle {
            name: "crowded-middle",
            to_move: super::WHITE,
            moves: &[
                (5, 5), (4, 5), (5, 6), (5, 4), (4, 6), (3, 6), (2, 7), (6, 3), (7, 2),
                (6, 5), (6, 4), (7, 3), (5, 3), (7, 6), (3, 7), (2, 8), (8, 7), (7, 5),
                (5, 7), (7, 7), (7, 4), (4, 3), (3, 2), (4, 7), (3, 5), (7, 9), (7, 8),
                (2, 4), (4, 4),
            ],
            solutions: &[(2, 6), (6, 2)],
        },
        Puzzle {
            name: "double-threat",
            to_move: super::WHITE,
            moves: &[
                (6, 5), (5, 5), (5, 6), (4, 4), (7, 4), (4, 7), (6, 6), (4, 6),
                (4, 5), (6, 4), (3, 7), (5, 3), (3, 4), (7, 3), (8, 2),
            ],
            solutions: &[(2, 3), (6, 7)],
        },
    ];
}
