//! Chunked bump allocator for search-tree nodes.
//!
//! Nodes are stored in fixed-capacity chunks. A chunk is allocated once with
//! its full capacity and only ever pushed into while it has room, so its
//! buffer never moves: ids and references handed out earlier stay valid no
//! matter how many nodes are allocated afterwards. Nothing is freed
//! individually; [`NodeArena::clear`] drops everything at once.

use crate::error::ArenaError;
use std::ops::{Index, IndexMut};

/// Number of nodes per chunk unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena of `T` values addressed by [`NodeId`].
#[derive(Debug)]
pub struct NodeArena<T> {
    chunks: Vec<Vec<T>>,
    chunk_size: usize,
    len: usize,
    max_nodes: Option<usize>,
}

impl<T> NodeArena<T> {
    /// Create an empty, unbounded arena with the default chunk size.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an empty arena whose chunks hold `chunk_size` nodes each.
    ///
    /// A chunk size of zero is treated as one.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
            max_nodes: None,
        }
    }

    /// Limit the arena to `max_nodes` live nodes. `None` removes the limit.
    pub fn set_max_nodes(&mut self, max_nodes: Option<usize>) {
        self.max_nodes = max_nodes;
    }

    pub fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks currently holding nodes.
    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| !c.is_empty()).count()
    }

    /// Number of allocated nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value` and return its id.
    pub fn allocate(&mut self, value: T) -> Result<NodeId, ArenaError> {
        if let Some(limit) = self.max_nodes {
            if self.len >= limit {
                return Err(ArenaError::Exhausted { limit });
            }
        }

        let chunk_index = self.len / self.chunk_size;
        if chunk_index == self.chunks.len() {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
        }
        let chunk = &mut self.chunks[chunk_index];
        debug_assert!(chunk.len() < self.chunk_size);
        chunk.push(value);

        let id = NodeId(self.len as u32);
        self.len += 1;
        Ok(id)
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &T {
        let i = id.index();
        &self.chunks[i / self.chunk_size][i % self.chunk_size]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut T {
        let i = id.index();
        &mut self.chunks[i / self.chunk_size][i % self.chunk_size]
    }

    /// Drop every node. All ids handed out so far become invalid.
    ///
    /// The first chunk's buffer is kept for the next search.
    pub fn clear(&mut self) {
        self.chunks.truncate(1);
        if let Some(first) = self.chunks.first_mut() {
            first.clear();
        }
        self.len = 0;
    }

    /// Iterate over all nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.chunks
            .iter()
            .flat_map(|chunk| chunk.iter())
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }
}

impl<T: Default> NodeArena<T> {
    /// Allocate a default-initialised node.
    pub fn allocate_default(&mut self) -> Result<NodeId, ArenaError> {
        self.allocate(T::default())
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        self.get(id)
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        self.get_mut(id)
    }
}
