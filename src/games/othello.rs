//! # Othello (Reversi)
//!
//! Players place discs so that they flank one or more straight lines of
//! opposing discs, which are then flipped.
//!
//! ## Rules
//! - Dark moves first from the standard four-disc centre
//! - A placement must flip at least one opposing disc
//! - A player without a legal placement passes; the opponent moves again
//! - When neither player can move the game ends and the side with more discs
//!   wins (equal counts are a draw)
//!
//! Every empty cell carries marker bits saying which side may place there.
//! The markers are refreshed after each move, so move generation and
//! legality checks are plain lookups.

use crate::bitpack::BitPack;
use crate::error::MoveError;
use crate::games::gomoku::parse_coordinates;
use crate::games::lines::LineTable;
use crate::players::ScoredGame;
use crate::{GameState, Player};
use colored::Colorize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DARK: Player = 1;
pub const LIGHT: Player = -1;

pub const MIN_SIZE: usize = 4;
pub const MAX_SIZE: usize = 16;

const CELL_EMPTY: u8 = 0b000;
const CELL_DARK: u8 = 0b001;
const CELL_LIGHT: u8 = 0b111;
const MAY_DARK: u8 = 0b010;
const MAY_LIGHT: u8 = 0b100;

#[inline]
fn is_empty(code: u8) -> bool {
    code & 0b001 == 0
}

#[inline]
fn disc(player: Player) -> u8 {
    if player == DARK {
        CELL_DARK
    } else {
        CELL_LIGHT
    }
}

#[inline]
fn marker(player: Player) -> u8 {
    if player == DARK {
        MAY_DARK
    } else {
        MAY_LIGHT
    }
}

/// A placement at `(row, col)`, both 0-based. Shown and parsed 1-based.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct OthelloMove(pub usize, pub usize);

impl fmt::Display for OthelloMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0 + 1, self.1 + 1)
    }
}

impl FromStr for OthelloMove {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = parse_coordinates(s)?;
        Ok(OthelloMove(row, col))
    }
}

/// Othello position.
#[derive(Debug, Clone)]
pub struct OthelloState {
    size: usize,
    cells: BitPack<3>,
    lines: Arc<LineTable>,
    /// `None` once neither side can move
    to_move: Option<Player>,
    winner: Option<Player>,
    darks: usize,
    lights: usize,
    last_move: Option<OthelloMove>,
}

impl OthelloState {
    /// Standard starting position on a `size`×`size` board. Dark moves first.
    ///
    /// # Panics
    /// If `size` is odd or outside `MIN_SIZE..=MAX_SIZE`.
    pub fn new(size: usize) -> Self {
        let mut state = Self::empty(size);
        let k = size / 2;
        for (row, col, player) in [(k - 1, k, DARK), (k, k - 1, DARK), (k - 1, k - 1, LIGHT), (k, k, LIGHT)] {
            state.put(row * size + col, player);
        }
        state.settle(DARK);
        state
    }

    /// Build a position from text rows: `@` dark, `O` light, anything else empty.
    /// `to_move` passes straight away if it has no placement.
    pub fn from_rows(rows: &[&str], to_move: Player) -> Result<Self, MoveError> {
        let size = rows.len();
        if size % 2 != 0 || !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(MoveError::Illegal(format!("unsupported board size {}", size)));
        }
        let mut state = Self::empty(size);
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().collect();
            if symbols.len() != size {
                return Err(MoveError::Illegal(format!(
                    "row {} has {} cells, expected {}",
                    row + 1,
                    symbols.len(),
                    size
                )));
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                match symbol {
                    '@' => state.put(row * size + col, DARK),
                    'O' => state.put(row * size + col, LIGHT),
                    _ => {}
                }
            }
        }
        state.settle(to_move);
        Ok(state)
    }

    fn empty(size: usize) -> Self {
        assert!(
            size % 2 == 0 && (MIN_SIZE..=MAX_SIZE).contains(&size),
            "othello board size must be even and between {} and {}, got {}",
            MIN_SIZE,
            MAX_SIZE,
            size
        );
        OthelloState {
            size,
            cells: BitPack::new(size * size),
            lines: Arc::new(LineTable::new(size, size - 1)),
            to_move: None,
            winner: None,
            darks: 0,
            lights: 0,
            last_move: None,
        }
    }

    pub fn get_board_size(&self) -> usize {
        self.size
    }

    /// Owner of the disc at `(row, col)`, if any.
    pub fn disc_at(&self, row: usize, col: usize) -> Option<Player> {
        match self.cells.get(row * self.size + col) {
            CELL_DARK => Some(DARK),
            CELL_LIGHT => Some(LIGHT),
            _ => None,
        }
    }

    pub fn disc_count(&self, player: Player) -> usize {
        if player == DARK {
            self.darks
        } else {
            self.lights
        }
    }

    /// Own discs minus opposing discs, from `player`'s side.
    pub fn score_difference(&self, player: Player) -> i32 {
        let diff = self.darks as i32 - self.lights as i32;
        if player == DARK {
            diff
        } else {
            -diff
        }
    }

    pub fn last_move(&self) -> Option<OthelloMove> {
        self.last_move
    }

    fn put(&mut self, cell: usize, player: Player) {
        match self.cells.get(cell) {
            CELL_DARK => self.darks -= 1,
            CELL_LIGHT => self.lights -= 1,
            _ => {}
        }
        self.cells.set(cell, disc(player));
        if player == DARK {
            self.darks += 1;
        } else {
            self.lights += 1;
        }
    }

    /// Number of opposing discs `player` would flip along `ray`.
    fn flank_length(&self, ray: &[usize], player: Player) -> usize {
        let own = disc(player);
        let other = disc(-player);
        let run = ray.iter().take_while(|&&i| self.cells.get(i) == other).count();
        match ray.get(run) {
            Some(&end) if run > 0 && self.cells.get(end) == own => run,
            _ => 0,
        }
    }

    fn can_place(&self, cell: usize, player: Player) -> bool {
        self.lines.rays(cell).any(|ray| self.flank_length(ray, player) > 0)
    }

    /// Recompute every empty cell's markers. Returns whether dark and light
    /// have a placement.
    fn refresh_markers(&mut self) -> (bool, bool) {
        let (mut dark_moves, mut light_moves) = (false, false);
        for cell in 0..self.size * self.size {
            if !is_empty(self.cells.get(cell)) {
                continue;
            }
            let mut code = CELL_EMPTY;
            if self.can_place(cell, DARK) {
                code |= MAY_DARK;
                dark_moves = true;
            }
            if self.can_place(cell, LIGHT) {
                code |= MAY_LIGHT;
                light_moves = true;
            }
            self.cells.set(cell, code);
        }
        (dark_moves, light_moves)
    }

    /// Hand the turn to `next` if it can move, else back to its opponent,
    /// else end the game.
    fn settle(&mut self, next: Player) {
        let (dark_moves, light_moves) = self.refresh_markers();
        let has_moves = |p: Player| if p == DARK { dark_moves } else { light_moves };
        if has_moves(next) {
            self.to_move = Some(next);
        } else if has_moves(-next) {
            self.to_move = Some(-next);
        } else {
            self.to_move = None;
            self.winner = match self.darks.cmp(&self.lights) {
                std::cmp::Ordering::Greater => Some(DARK),
                std::cmp::Ordering::Less => Some(LIGHT),
                std::cmp::Ordering::Equal => None,
            };
        }
    }
}

impl GameState for OthelloState {
    type Move = OthelloMove;

    fn get_current_player(&self) -> Option<Player> {
        self.to_move
    }

    fn is_terminal(&self) -> bool {
        self.to_move.is_none()
    }

    fn is_draw(&self) -> bool {
        self.is_terminal() && self.winner.is_none()
    }

    fn get_winner(&self) -> Option<Player> {
        self.winner
    }

    fn get_possible_moves(&self) -> Vec<Self::Move> {
        let Some(player) = self.to_move else {
            return Vec::new();
        };
        let mark = marker(player);
        (0..self.size * self.size)
            .filter(|&i| {
                let code = self.cells.get(i);
                is_empty(code) && code & mark != 0
            })
            .map(|i| OthelloMove(i / self.size, i % self.size))
            .collect()
    }

    fn make_move(&mut self, mv: &Self::Move) -> Result<(), MoveError> {
        let player = self.to_move.ok_or(MoveError::GameOver)?;
        if !self.is_legal(mv) {
            return Err(MoveError::Illegal(mv.to_string()));
        }

        let cell = mv.0 * self.size + mv.1;
        let lines = Arc::clone(&self.lines);
        for ray in lines.rays(cell) {
            let flips = self.flank_length(ray, player);
            for &i in &ray[..flips] {
                self.put(i, player);
            }
        }
        self.put(cell, player);
        self.last_move = Some(*mv);
        self.settle(-player);
        Ok(())
    }

    fn is_legal(&self, mv: &Self::Move) -> bool {
        let Some(player) = self.to_move else {
            return false;
        };
        if mv.0 >= self.size || mv.1 >= self.size {
            return false;
        }
        let code = self.cells.get(mv.0 * self.size + mv.1);
        is_empty(code) && code & marker(player) != 0
    }

    fn player_label(player: Player) -> &'static str {
        if player == DARK {
            "Dark"
        } else {
            "Light"
        }
    }
}

impl ScoredGame for OthelloState {
    fn score_difference(&self, player: Player) -> i32 {
        OthelloState::score_difference(self, player)
    }
}

impl fmt::Display for OthelloState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 1..=self.size {
            write!(f, "{:>3}", col)?;
        }
        writeln!(f)?;
        for row in 0..self.size {
            write!(f, "{:>3}", row + 1)?;
            for col in 0..self.size {
                let last = self.last_move == Some(OthelloMove(row, col));
                let symbol = match self.disc_at(row, col) {
                    Some(DARK) if last => "@".dimmed().bold(),
                    Some(DARK) => "@".dimmed(),
                    Some(_) if last => "O".bold(),
                    Some(_) => "O".normal(),
                    None => ".".normal(),
                };
                write!(f, "  {}", symbol)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Dark: {}", self.darks)?;
        write!(f, "Light: {}", self.lights)
    }
}
