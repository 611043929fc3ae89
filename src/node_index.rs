/// A 32-bit tagged reference to a node in a [`crate::memory_pool::MemoryPool`].
///
/// The low bit is the *complement* bit; the remaining 31 bits are the *position* within
/// the pool. Position `0` is reserved for the sole terminal node, so the two Boolean
/// constants are represented purely by the complement bit on a pointer to position `0`:
/// `False` is position `0` with complement `0`, `True` is position `0` with complement `1`.
///
/// Flipping the complement bit negates the Boolean function rooted at this edge in
/// constant time ("complement edges") without touching the pool at all.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// The constant `false` function: position `0`, not complemented.
    pub const FALSE: NodeIndex = NodeIndex(0);

    /// The constant `true` function: position `0`, complemented.
    pub const TRUE: NodeIndex = NodeIndex(1);

    /// Largest position representable in 31 bits. This is also the largest number of
    /// non-terminal nodes the full variant's pool can ever hold (`ResourceExhausted`
    /// is raised before this would be exceeded).
    pub const MAX_POSITION: u32 = (1 << 31) - 1;

    /// Sentinel used only inside GC forwarding tables to mark "not yet assigned" /
    /// "dead, never forwarded" entries. Never a valid edge value in a live `Node`.
    pub(crate) const UNDEFINED_MARKER: NodeIndex = NodeIndex((Self::MAX_POSITION << 1) | 1);

    #[inline]
    pub(crate) fn is_undefined_marker(self) -> bool {
        self == Self::UNDEFINED_MARKER
    }

    /// Build an index from a raw `position` and `complemented` flag.
    ///
    /// *Panics:* (debug only) if `position` does not fit into 31 bits.
    #[inline]
    pub(crate) fn new(position: u32, complemented: bool) -> NodeIndex {
        debug_assert!(position <= Self::MAX_POSITION);
        NodeIndex((position << 1) | (complemented as u32))
    }

    /// A non-complemented pointer to `position`.
    #[inline]
    pub(crate) fn at(position: u32) -> NodeIndex {
        NodeIndex::new(position, false)
    }

    /// Toggle the complement bit, i.e. negate the function rooted at this edge.
    #[inline]
    #[must_use]
    pub fn flip(self) -> NodeIndex {
        NodeIndex(self.0 ^ 1)
    }

    #[inline]
    pub fn is_complemented(self) -> bool {
        self.0 & 1 != 0
    }

    /// The position within the pool this index refers to, ignoring the complement bit.
    #[inline]
    pub fn get_position(self) -> u32 {
        self.0 >> 1
    }

    /// True if this index points at the terminal position (either constant).
    #[inline]
    pub fn is_constant(self) -> bool {
        self.get_position() == 0
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == Self::TRUE
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == Self::FALSE
    }

    /// Hash contribution for this index: `position + complement_parity`.
    ///
    /// Deliberately *not* the raw 32-bit encoding — the caches rely on this staying a
    /// small, non-negative number so that masking with `size - 1` disperses evenly
    /// instead of being dominated by the complement bit's parity.
    #[inline]
    pub(crate) fn hash_component(self) -> u64 {
        u64::from(self.get_position()) + u64::from(self.is_complemented())
    }

    #[inline]
    pub(crate) fn into_raw(self) -> u32 {
        self.0
    }
}

impl PartialOrd for NodeIndex {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering by position only; used by the commutative-operand canonicalization in
/// [`crate::caches`], which wants "smaller position first" regardless of complement bit.
impl Ord for NodeIndex {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.get_position().cmp(&other.get_position())
    }
}

#[cfg(test)]
mod tests {
    use super::NodeIndex;

    #[test]
    fn constants_point_at_terminal() {
        assert!(NodeIndex::FALSE.is_constant());
        assert!(NodeIndex::TRUE.is_constant());
        assert!(NodeIndex::FALSE.is_false());
        assert!(NodeIndex::TRUE.is_true());
        assert_ne!(NodeIndex::FALSE, NodeIndex::TRUE);
    }

    #[test]
    fn flip_is_involutive() {
        let a = NodeIndex::at(5);
        assert_eq!(a, a.flip().flip());
        assert_ne!(a, a.flip());
        assert_eq!(NodeIndex::TRUE, NodeIndex::FALSE.flip());
        assert_eq!(NodeIndex::FALSE, NodeIndex::TRUE.flip());
    }

    #[test]
    fn position_and_complement_roundtrip() {
        let idx = NodeIndex::new(123_456, true);
        assert_eq!(123_456, idx.get_position());
        assert!(idx.is_complemented());
        assert_eq!(idx, idx.flip().flip());
    }

    #[test]
    fn ordering_ignores_complement_bit() {
        let a = NodeIndex::new(3, false);
        let b = NodeIndex::new(3, true);
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
        assert!(NodeIndex::at(2) < NodeIndex::at(3));
    }
}
