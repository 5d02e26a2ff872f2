//! MCTS tree structure on top of the node arena.
//!
//! The tree owns the arena for one move decision. Children are created all
//! at once and prepended to their parent's sibling list, so the most
//! recently created child is always the list head.

use crate::arena::{NodeArena, NodeId};
use crate::error::SearchError;
use crate::node::SearchNode;
use crate::{GameState, Player};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct SearchTree<S: GameState> {
    nodes: NodeArena<SearchNode<S>>,
    root: Option<NodeId>,
}

impl<S: GameState> SearchTree<S> {
    pub fn new(chunk_size: usize, max_nodes: Option<usize>) -> Self {
        let mut nodes = NodeArena::with_chunk_size(chunk_size);
        nodes.set_max_nodes(max_nodes);
        Self { nodes, root: None }
    }

    /// Drop the previous tree and start a new one rooted at `state`.
    pub fn reset(&mut self, state: S) -> Result<NodeId, SearchError> {
        self.nodes.clear();
        let root = self.nodes.allocate(SearchNode::new_root(state))?;
        self.root = Some(root);
        Ok(root)
    }

    /// Discard every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Root node ID.
    ///
    /// # Panics
    /// If the tree has not been reset with a root position.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root.expect("search tree has no root")
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode<S> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S> {
        self.nodes.get_mut(id)
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id` in sibling-list order.
    pub fn children(&self, id: NodeId) -> Children<'_, S> {
        Children {
            tree: self,
            next: self.get(id).first_child,
        }
    }

    /// Allocate a child of `parent` and make it the head of the sibling list.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        mover: Option<Player>,
        mv: S::Move,
        state: S,
    ) -> Result<NodeId, SearchError> {
        let mut child = SearchNode::new_child(parent, mover, mv, state);
        child.next_sibling = self.get(parent).first_child;
        let child_id = self.nodes.allocate(child)?;
        self.get_mut(parent).first_child = Some(child_id);
        Ok(child_id)
    }

    /// Walk from the root to a leaf, at every level taking the child with
    /// the highest UCB1 score. Ties go to the first child in the list.
    pub fn select(&self, exploration_bias: f64) -> NodeId {
        let mut current = self.root();
        while self.get(current).is_expanded() {
            let parent_visits = self.get(current).visits;
            let mut best: Option<(NodeId, f64)> = None;
            for (id, child) in self.children(current) {
                let score = child.ucb1(parent_visits, exploration_bias);
                match best {
                    Some((_, best_score)) if score <= best_score => {}
                    _ => best = Some((id, score)),
                }
            }
            match best {
                Some((id, _)) => current = id,
                None => break,
            }
        }
        current
    }

    /// Record a simulation result on `leaf` and each of its ancestors.
    pub fn backpropagate(&mut self, leaf: NodeId, winner: Option<Player>) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.record(winner);
            current = node.parent;
        }
    }

    /// Root child with the highest value; ties go to the first in the list.
    pub fn best_root_child(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for (id, child) in self.children(self.root()) {
            match best {
                Some((_, best_value)) if child.value <= best_value => {}
                _ => best = Some((id, child.value)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Node ids reachable from the root, depth first, children in list order.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Depth of the deepest node below the root.
    pub fn max_depth(&self) -> u32 {
        let mut max = 0;
        let mut stack = vec![(self.root(), 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(self.children(id).map(|(c, _)| (c, depth + 1)));
        }
        max
    }
}

/// Iterator over a node's children, following `next_sibling` links.
pub struct Children<'a, S: GameState> {
    tree: &'a SearchTree<S>,
    next: Option<NodeId>,
}

impl<'a, S: GameState> Iterator for Children<'a, S> {
    type Item = (NodeId, &'a SearchNode<S>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.tree.get(id);
        self.next = node.next_sibling;
        Some((id, node))
    }
}
