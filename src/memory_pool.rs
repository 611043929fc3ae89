use crate::node::Node;
use crate::node_index::NodeIndex;

/// A contiguous, index-addressable, densely packed sequence of [`Node`]s.
///
/// Position `0` is reserved for the terminal sentinel and is installed once at
/// construction. Capacity is always a power of two; [`MemoryPool::append`] doubles it
/// when full. Access by raw position performs no bounds check on the hot path
/// (`get_unchecked`/`get_unchecked_mut`) — callers are expected to only ever hold
/// positions that were actually handed out by `append`, an invariant the unique table
/// and GC both maintain.
pub struct MemoryPool {
    nodes: Vec<Node>,
}

impl MemoryPool {
    /// Create a pool with the given power-of-two capacity, pre-populated with the
    /// terminal node at position `0`.
    pub(crate) fn new(capacity: u32) -> MemoryPool {
        debug_assert!(capacity.is_power_of_two());
        let mut nodes = Vec::with_capacity(capacity as usize);
        nodes.push(Node::TERMINAL);
        MemoryPool { nodes }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.nodes.len() as u32
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.nodes.capacity() as u32
    }

    #[inline]
    pub fn get(&self, position: u32) -> &Node {
        &self.nodes[position as usize]
    }

    /// # Safety
    /// `position` must be `< self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, position: u32) -> &Node {
        unsafe { self.nodes.get_unchecked(position as usize) }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, position: u32) -> &mut Node {
        &mut self.nodes[position as usize]
    }

    /// Append `node` as a new position and return it. The caller is responsible for
    /// having already checked the unique table (this always allocates — deduplication
    /// is `UniqueTable`'s job, not the pool's).
    ///
    /// Returns `None` if the pool is already at `NodeIndex::MAX_POSITION` nodes (the
    /// caller turns this into `Error::ResourceExhausted`).
    pub(crate) fn append(&mut self, node: Node) -> Option<u32> {
        if self.nodes.len() as u32 > NodeIndex::MAX_POSITION {
            return None;
        }
        let position = self.nodes.len() as u32;
        self.nodes.push(node);
        Some(position)
    }

    /// True once `len()` has reached the current capacity and the next `append` would
    /// need to grow the backing vector.
    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.nodes.len() == self.nodes.capacity()
    }

    /// Double the pool's capacity. Existing positions are untouched; this only affects
    /// how many more nodes can be appended before the next doubling.
    pub(crate) fn grow(&mut self) {
        self.nodes.reserve_exact(self.nodes.capacity());
    }

    /// Iterate positions from the highest-allocated down to `1`, skipping the terminal.
    /// Used by the GC's mark-propagation phase, which relies on the age invariant
    /// (a parent always sits above its children) to do a single descending pass.
    pub(crate) fn positions_high_to_low(&self) -> impl Iterator<Item = u32> {
        (1..self.nodes.len() as u32).rev()
    }

    /// Replace the backing storage wholesale. Used by the GC's compaction phase, which
    /// builds a fresh, densely packed vector and swaps it in once done.
    pub(crate) fn replace_all(&mut self, nodes: Vec<Node>) {
        debug_assert!(!nodes.is_empty());
        debug_assert!(nodes[0].is_terminal());
        self.nodes = nodes;
    }
}
