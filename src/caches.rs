use crate::node_index::NodeIndex;

/// Tag distinguishing which binary or "n-ary-keyed-as-binary" operation a [`Cache2`] slot
/// belongs to, so that `and(a, b)` and `iff(a, b)` never collide just because they share
/// operands.
///
/// `Exists` and `Replace` are logically single-BDD operations, but their second argument
/// (a variable set / variable map) is itself hash-consed to a small integer identifier
/// (§3: "tagged with a unique identifier used as a cache key"), which lets them reuse the
/// exact same two-operand slot shape as `And`/`Iff` — the second "node index" slot simply
/// holds that identifier instead of a real node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum Operator {
    And,
    Iff,
    Exists,
    Replace,
}

impl Operator {
    /// Commutative operators get their operands canonicalized (smaller position first)
    /// before hashing, halving the effective cache footprint for symmetric arguments.
    /// `Exists`/`Replace` are not commutative (the second operand is a set/map id, not
    /// a peer node), so they are never reordered.
    #[inline]
    fn is_commutative(self) -> bool {
        matches!(self, Operator::And | Operator::Iff)
    }
}

#[inline]
fn mix(a: NodeIndex, b: NodeIndex, op: Operator) -> u64 {
    a.hash_component()
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ b.hash_component().wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (op as u64).wrapping_mul(0xFF51_AFD7_ED55_8CCD)
}

/// Direct-mapped cache for one-operand operations (currently only `SatCount`). Keyed by
/// a single `NodeIndex`; on collision the slot is simply overwritten, trading
/// completeness for O(1), allocation-free lookups — a false *hit* is impossible (the
/// stored key is always compared), only a false *miss* (eviction) is possible.
pub(crate) struct Cache1<R: Copy> {
    slots: Vec<Option<(NodeIndex, R)>>,
    mask: usize,
}

impl<R: Copy> Cache1<R> {
    pub(crate) fn new(size: u32) -> Cache1<R> {
        debug_assert!(size.is_power_of_two());
        Cache1 {
            slots: vec![None; size as usize],
            mask: size as usize - 1,
        }
    }

    #[inline]
    fn slot(&self, key: NodeIndex) -> usize {
        (key.hash_component() as usize) & self.mask
    }

    pub(crate) fn get(&self, key: NodeIndex) -> Option<R> {
        match &self.slots[self.slot(key)] {
            Some((stored_key, value)) if *stored_key == key => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn insert(&mut self, key: NodeIndex, value: R) {
        let slot = self.slot(key);
        self.slots[slot] = Some((key, value));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub(crate) fn resize(&mut self, size: u32) {
        *self = Cache1::new(size);
    }
}

impl<R: Copy> Clone for Cache1<R> {
    fn clone(&self) -> Self {
        Cache1 {
            slots: self.slots.clone(),
            mask: self.mask,
        }
    }
}

/// Direct-mapped cache for two-operand operations (`And`, `Iff`, `Exists`, `Replace`).
/// See [`Operator`] for the canonicalization rule applied to commutative operators.
pub(crate) struct Cache2 {
    slots: Vec<Option<(NodeIndex, NodeIndex, Operator, NodeIndex)>>,
    mask: usize,
}

impl Cache2 {
    pub(crate) fn new(size: u32) -> Cache2 {
        debug_assert!(size.is_power_of_two());
        Cache2 {
            slots: vec![None; size as usize],
            mask: size as usize - 1,
        }
    }

    #[inline]
    fn canonicalize(op: Operator, a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
        if op.is_commutative() && b < a {
            (b, a)
        } else {
            (a, b)
        }
    }

    pub(crate) fn get(&self, op: Operator, a: NodeIndex, b: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = Self::canonicalize(op, a, b);
        let slot = (mix(a, b, op) as usize) & self.mask;
        match self.slots[slot] {
            Some((ka, kb, kop, result)) if ka == a && kb == b && kop == op => Some(result),
            _ => None,
        }
    }

    pub(crate) fn insert(&mut self, op: Operator, a: NodeIndex, b: NodeIndex, result: NodeIndex) {
        let (a, b) = Self::canonicalize(op, a, b);
        let slot = (mix(a, b, op) as usize) & self.mask;
        self.slots[slot] = Some((a, b, op, result));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub(crate) fn resize(&mut self, size: u32) {
        *self = Cache2::new(size);
    }
}

/// Direct-mapped cache for the three-operand `ite(f, g, h)` operation.
pub(crate) struct Cache3 {
    slots: Vec<Option<(NodeIndex, NodeIndex, NodeIndex, NodeIndex)>>,
    mask: usize,
}

impl Cache3 {
    pub(crate) fn new(size: u32) -> Cache3 {
        debug_assert!(size.is_power_of_two());
        Cache3 {
            slots: vec![None; size as usize],
            mask: size as usize - 1,
        }
    }

    #[inline]
    fn slot(&self, f: NodeIndex, g: NodeIndex, h: NodeIndex) -> usize {
        let mixed = f
            .hash_component()
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ g.hash_component().wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ h.hash_component().wrapping_mul(0x1656_67B1_9E37_79F9);
        (mixed as usize) & self.mask
    }

    pub(crate) fn get(&self, f: NodeIndex, g: NodeIndex, h: NodeIndex) -> Option<NodeIndex> {
        match self.slots[self.slot(f, g, h)] {
            Some((kf, kg, kh, result)) if kf == f && kg == g && kh == h => Some(result),
            _ => None,
        }
    }

    pub(crate) fn insert(&mut self, f: NodeIndex, g: NodeIndex, h: NodeIndex, result: NodeIndex) {
        let slot = self.slot(f, g, h);
        self.slots[slot] = Some((f, g, h, result));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub(crate) fn resize(&mut self, size: u32) {
        *self = Cache3::new(size);
    }
}

/// The three fixed-size operation caches, sized as `pool_capacity / cache_ratio`
/// (§4.5). Reset (cleared, or fully reallocated on a pool resize) after any GC pass and
/// after the pool grows, since every previously-cached `NodeIndex` may now be invalid.
pub(crate) struct OperationCaches {
    pub(crate) sat_count: Cache1<f64>,
    pub(crate) binary: Cache2,
    pub(crate) ite: Cache3,
    cache_ratio: u32,
}

impl OperationCaches {
    pub(crate) fn new(pool_capacity: u32, cache_ratio: u32) -> OperationCaches {
        let size = Self::size_for(pool_capacity, cache_ratio);
        OperationCaches {
            sat_count: Cache1::new(size),
            binary: Cache2::new(size),
            ite: Cache3::new(size),
            cache_ratio,
        }
    }

    fn size_for(pool_capacity: u32, cache_ratio: u32) -> u32 {
        (pool_capacity / cache_ratio).next_power_of_two().max(1)
    }

    pub(crate) fn clear(&mut self) {
        self.sat_count.clear();
        self.binary.clear();
        self.ite.clear();
    }

    pub(crate) fn resize(&mut self, pool_capacity: u32) {
        let size = Self::size_for(pool_capacity, self.cache_ratio);
        self.sat_count.resize(size);
        self.binary.resize(size);
        self.ite.resize(size);
    }
}
