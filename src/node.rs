//! MCTS tree node representation.
//!
//! Each node owns its own copy of the position it represents and the
//! statistics of the simulations that passed through it. Children form an
//! intrusive singly-linked list: a parent points at its first child and each
//! child at its next sibling.

use crate::arena::NodeId;
use crate::{GameState, Player};

/// A node in the Monte Carlo search tree.
#[derive(Debug, Clone)]
pub struct SearchNode<S: GameState> {
    /// Position reached at this node
    pub state: S,

    /// Player who made the move leading here (None for the root)
    pub mover: Option<Player>,

    /// Move applied to the parent to reach this node (None for the root)
    pub mv: Option<S::Move>,

    /// Number of simulations folded into this node or a descendant
    pub visits: u32,

    /// Simulations counted as a win for `mover`
    pub wins: f64,

    /// Cached `wins / max(visits, 1)`
    pub value: f64,

    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl<S: GameState> SearchNode<S> {
    /// Create a new root node.
    pub fn new_root(state: S) -> Self {
        Self {
            state,
            mover: None,
            mv: None,
            visits: 0,
            wins: 0.0,
            value: 0.0,
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }

    /// Create a new child node. Linking into the sibling list is left to the tree.
    pub fn new_child(parent: NodeId, mover: Option<Player>, mv: S::Move, state: S) -> Self {
        Self {
            state,
            mover,
            mv: Some(mv),
            visits: 0,
            wins: 0.0,
            value: 0.0,
            parent: Some(parent),
            first_child: None,
            next_sibling: None,
        }
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.first_child.is_some()
    }

    /// UCB1 score used while selecting among siblings.
    ///
    /// Both the parent visit count under the logarithm and the child visit
    /// count in the denominator are floored at 1, so an unvisited child gets
    /// the finite bonus `bias * sqrt(ln(parent_visits))` rather than infinite
    /// priority.
    #[inline]
    pub fn ucb1(&self, parent_visits: u32, exploration_bias: f64) -> f64 {
        let log_n = f64::from(parent_visits.max(1)).ln();
        self.value + exploration_bias * (log_n / f64::from(self.visits.max(1))).sqrt()
    }

    /// Fold one simulation result into the statistics.
    ///
    /// Only a win for `mover` is credited; draws and losses just count as a visit.
    #[inline]
    pub fn record(&mut self, winner: Option<Player>) {
        self.visits += 1;
        if let (Some(mover), Some(winner)) = (self.mover, winner) {
            if mover == winner {
                self.wins += 1.0;
            }
        }
        self.value = self.wins / f64::from(self.visits.max(1));
    }
}
