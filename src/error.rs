//! Error types shared by the engine, the games and the players.

use thiserror::Error;

/// Rejection of a move by a game's rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already finished")]
    GameOver,

    #[error("illegal move {0}")]
    Illegal(String),
}

/// The node arena refused to grow past its configured ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("node arena exhausted after {limit} nodes")]
    Exhausted { limit: usize },
}

/// Errors that can occur during an MCTS search.
///
/// Every variant is a contract failure of the caller or of the game
/// implementation; none of them is retried.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("cannot choose a move from a finished position")]
    GameFinished,

    #[error("position is not finished but reports no legal moves")]
    NoLegalMoves,

    #[error("game rejected a move during search: {0}")]
    IllegalMove(#[from] MoveError),

    #[error("search ran out of nodes: {0}")]
    NodeBudgetExhausted(#[from] ArenaError),

    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
}

/// Errors a player can report instead of a move.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("rules rejected a move: {0}")]
    IllegalMove(#[from] MoveError),

    #[error("input closed before a move was entered")]
    InputClosed,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
