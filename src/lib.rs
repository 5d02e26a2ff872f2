//! Monte Carlo Tree Search for alternating two-player board games.
//!
//! A game plugs in by implementing [`GameState`]. [`MCTS`] then picks moves
//! for it within a thinking budget, using UCB1 selection and uniformly random
//! rollouts. The crate also ships Gomoku and Othello, a handful of players and
//! a controller that runs a game between two of them.

pub mod arena;
pub mod bitpack;
pub mod config;
pub mod display;
pub mod error;
pub mod game_controller;
pub mod games;
pub mod node;
pub mod players;
pub mod rollout;
pub mod search;
pub mod tree;

use std::fmt::{Debug, Display};
use std::hash::Hash;

pub use config::{MctsConfig, SearchBudget};
pub use error::{ArenaError, MoveError, PlayerError, SearchError};
pub use search::{ChildStatistics, SearchObserver, SearchStatistics, MCTS};

/// Player identifier. The side that moves first is `1`, the other `-1`.
pub type Player = i32;

/// The state of the game. Must be cloneable to be used in the MCTS.
///
/// Every clone must be an independent copy: the search keeps one per tree
/// node and mutates them freely.
pub trait GameState: Clone {
    /// The type of a move in the game.
    type Move: Clone + Eq + Hash + Debug + Display;

    /// Returns the player whose turn it is, or `None` once the game is over.
    fn get_current_player(&self) -> Option<Player>;

    /// Returns true if the game is over.
    fn is_terminal(&self) -> bool;

    /// Returns true if the game ended without a winner. Only meaningful when
    /// [`GameState::is_terminal`] holds.
    fn is_draw(&self) -> bool;

    /// Returns the winner of the game, if any.
    /// `None` for a draw or if the game is not over.
    fn get_winner(&self) -> Option<Player>;

    /// Returns all legal moves for the player to move, in a deterministic order.
    fn get_possible_moves(&self) -> Vec<Self::Move>;

    /// Applies a move for the player to move.
    fn make_move(&mut self, mv: &Self::Move) -> Result<(), MoveError>;

    /// Returns true if `mv` may be played now.
    fn is_legal(&self, mv: &Self::Move) -> bool {
        !self.is_terminal() && self.get_possible_moves().contains(mv)
    }

    /// Human-readable name of a side, used in prompts and transcripts.
    fn player_label(player: Player) -> &'static str {
        if player == 1 {
            "Player 1"
        } else {
            "Player 2"
        }
    }
}
