//! Uniform random rollout policy.
//!
//! The same generator serves two purposes during a search: picking which
//! freshly expanded child to simulate from, and playing a position out to
//! the end.

use crate::error::SearchError;
use crate::{GameState, Player};
use rand::Rng;

/// Final result of a played-out game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub winner: Option<Player>,
}

impl Outcome {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Draw one element uniformly from a non-empty slice.
pub fn pick_uniform<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Result<&'a T, SearchError> {
    if items.is_empty() {
        return Err(SearchError::NoLegalMoves);
    }
    Ok(&items[rng.random_range(0..items.len())])
}

/// Play uniformly random legal moves from a copy of `state` until the game ends.
pub fn playout<S: GameState, R: Rng + ?Sized>(state: &S, rng: &mut R) -> Result<Outcome, SearchError> {
    let mut sim_state = state.clone();
    while !sim_state.is_terminal() {
        let moves = sim_state.get_possible_moves();
        let mv = pick_uniform(rng, &moves)?;
        sim_state.make_move(mv)?;
    }
    Ok(Outcome {
        winner: sim_state.get_winner(),
    })
}
