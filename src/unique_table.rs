use crate::memory_pool::MemoryPool;
use crate::node::{Node, Variable};
use crate::node_index::NodeIndex;

const UNDEFINED: u32 = u32::MAX;

/// Odd multiplier used to disperse the variable id before it is folded into the two
/// child hashes. Any odd constant works; this one matches the corpus convention of
/// picking a Knuth-style multiplicative hash seed (see `SEED64`/`SEED32` in the teacher
/// crate and `TaskCache::SEED` in its `v4::apply` module).
const VARIABLE_MULTIPLIER: u64 = 0x9e_37_79_b9_7f_4a_7c_15;

/// Hash-consing table mapping the structural key `(variable, low, high)` to the single
/// pool position that stores it.
///
/// Implemented as an open-addressed dictionary with separate chaining: `buckets[hash &
/// mask]` holds the position of the first node hashed into that bucket, and `chain[pos]`
/// links to the next position sharing the bucket (`UNDEFINED` terminates the chain).
/// Storing the chain in a parallel array indexed by pool position — rather than inside
/// `Node` itself — keeps `Node` at its minimal size and lets the GC rebuild the chain
/// array wholesale from the (much smaller) set of live nodes after compaction.
pub struct UniqueTable {
    buckets: Vec<u32>,
    chain: Vec<u32>,
    mask: u32,
    count: u32,
}

impl UniqueTable {
    /// Create a table sized for `capacity` nodes (must be a power of two). `chain` is
    /// pre-sized to match so that `get_or_add` never needs to bounds-check a push.
    pub(crate) fn new(capacity: u32) -> UniqueTable {
        debug_assert!(capacity.is_power_of_two());
        UniqueTable {
            buckets: vec![UNDEFINED; capacity as usize],
            chain: vec![UNDEFINED; capacity as usize],
            mask: capacity - 1,
            count: 0,
        }
    }

    #[inline]
    fn hash(variable: Variable, low: NodeIndex, high: NodeIndex) -> u64 {
        let v = u64::from(u32::from(variable)).wrapping_mul(VARIABLE_MULTIPLIER);
        v ^ low.hash_component() ^ (high.hash_component().wrapping_mul(3))
    }

    #[inline]
    fn bucket_of(&self, variable: Variable, low: NodeIndex, high: NodeIndex) -> usize {
        (Self::hash(variable, low, high) & u64::from(self.mask)) as usize
    }

    /// Look up `(variable, low, high)`, returning the existing position if the node is
    /// already hash-consed. `low`/`high` are used to drive the age-ordering fast path:
    /// while walking the chain, if the current entry's position is `<=` both children's
    /// positions, no *older* node can equal a node that is necessarily younger than both
    /// of its children, so the search stops early instead of walking the rest of the
    /// chain. This exploits the GC's age invariant (a node's children always sit at a
    /// lower position than the node itself).
    fn find(&self, pool: &MemoryPool, variable: Variable, low: NodeIndex, high: NodeIndex) -> Option<u32> {
        let youngest_child = low.get_position().max(high.get_position());
        let mut cursor = self.buckets[self.bucket_of(variable, low, high)];
        while cursor != UNDEFINED {
            if cursor <= youngest_child {
                // No node at or below the youngest child's position can match: a real
                // match would have to be younger than both of its own children.
                break;
            }
            let candidate = pool.get(cursor);
            if candidate.key() == (variable, low, high) {
                return Some(cursor);
            }
            cursor = self.chain[cursor as usize];
        }
        None
    }

    /// Hash-cons `(variable, low, high)`: return the existing node's index if present,
    /// otherwise append a fresh node to `pool` and register it. Returns `None` if the
    /// pool has no room for a new node (caller raises `Error::ResourceExhausted`).
    ///
    /// The returned `NodeIndex` is always non-complemented here — floating the complement
    /// bit to the incoming edge is the `Factory`'s job (`Allocate` normalizes before
    /// calling this), so the table only ever stores and returns canonical, uncomplemented
    /// positions.
    pub(crate) fn get_or_add(
        &mut self,
        pool: &mut MemoryPool,
        variable: Variable,
        low: NodeIndex,
        high: NodeIndex,
    ) -> Option<NodeIndex> {
        debug_assert!(!low.is_complemented());
        if let Some(existing) = self.find(pool, variable, low, high) {
            return Some(NodeIndex::at(existing));
        }

        let position = pool.append(Node::new(variable, low, high))?;
        debug_assert!(self.chain.len() > position as usize);
        let bucket = self.bucket_of(variable, low, high);
        self.chain[position as usize] = self.buckets[bucket];
        self.buckets[bucket] = position;
        self.count += 1;
        Some(NodeIndex::at(position))
    }

    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.count
    }

    #[inline]
    pub(crate) fn capacity(&self) -> u32 {
        self.mask + 1
    }

    #[inline]
    pub(crate) fn should_grow(&self) -> bool {
        self.count >= self.capacity()
    }

    /// Rebuild the table at `capacity` (which may equal, or be double, the current
    /// capacity) by re-hashing every live node already present in `pool`. Used both for
    /// the ordinary "`count == capacity`" resize (§4.3) and for the post-GC-compaction
    /// rebuild, which invalidates every previously stored position regardless of whether
    /// the pool itself grew.
    pub(crate) fn rebuild(&mut self, capacity: u32, pool: &MemoryPool) {
        *self = UniqueTable::new(capacity);
        // Positions are visited in increasing order so that the chain each bucket ends
        // up with still has the same "youngest first" shape the age-ordering fast path
        // in `find` expects.
        for position in 1..pool.len() {
            let node = pool.get(position);
            if node.is_terminal() {
                continue;
            }
            let bucket = self.bucket_of(node.variable(), node.low(), node.high());
            self.chain[position as usize] = self.buckets[bucket];
            self.buckets[bucket] = position;
            self.count += 1;
        }
    }
}
