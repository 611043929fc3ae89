//! Mark-sweep-compact garbage collector (spec.md §4.8).
//!
//! Runs as four phases against a [`Manager`](crate::manager::Manager)'s owned collaborators:
//! mark every node reachable from a live [`Handle`](crate::handle::Handle), propagate marks
//! to children in a single descending pass (relying on the pool's age invariant), compact
//! live nodes into a freshly packed vector while recording an old-position to new-`NodeIndex`
//! forwarding table, then rebuild the unique table and handle table against that forwarding.

use crate::caches::OperationCaches;
use crate::config::ManagerConfig;
use crate::handle_table::HandleTable;
use crate::memory_pool::MemoryPool;
use crate::node::Node;
use crate::node_index::NodeIndex;
use crate::unique_table::UniqueTable;

/// The piecewise `gc_load_increase` schedule (spec.md §4.8/§9): the live-node fraction a
/// pool must retain after compaction before it is doubled, rather than just having its
/// caches cleared in place. Small pools resize eagerly, since a doubling is cheap and
/// avoids collecting again almost immediately; large pools resist it, since doubling a
/// large pool is itself an expensive allocation.
fn gc_load_increase(capacity: u32) -> f64 {
    match capacity {
        c if c <= 1 << 16 => 0.2,
        c if c <= 1 << 18 => 0.35,
        c if c <= 1 << 20 => 0.5,
        c if c <= 1 << 22 => 0.65,
        _ => 0.8,
    }
}

/// Summary of one collection pass, used only for logging.
pub(crate) struct GcReport {
    pub(crate) live_before: u32,
    pub(crate) live_after: u32,
    pub(crate) capacity: u32,
    pub(crate) grew: bool,
}

/// Phase 1 + 2: mark every node reachable from a live handle, then, walking positions from
/// highest-allocated down to `1`, mark the children of every marked node. The age invariant
/// (a node's children always sit below it) guarantees a single descending pass is enough —
/// by the time a child is visited, every node that could have marked it already has.
fn mark(pool: &mut MemoryPool, handle_table: &HandleTable) {
    handle_table.mark_all_live(pool);
    for position in pool.positions_high_to_low() {
        let node = *pool.get(position);
        if !node.is_marked() {
            continue;
        }
        for child in [node.low(), node.high()] {
            let child_position = child.get_position();
            if child_position != 0 {
                pool.get_mut(child_position).set_mark(true);
            }
        }
    }
}

/// Phase 3: sweep positions `1..=high`, copying each marked node to the next free slot in
/// a fresh vector and remapping its children through the forwarding table built so far.
/// Because positions are visited old-to-new, every child has already been assigned its new
/// position by the time its parent is copied, which is exactly what preserves the age
/// invariant across compaction. Dead (unmarked) nodes are simply skipped.
fn compact(pool: &mut MemoryPool) -> Vec<NodeIndex> {
    let old_len = pool.len();
    let mut forwarding = vec![NodeIndex::UNDEFINED_MARKER; old_len as usize];
    forwarding[0] = NodeIndex::at(0);

    let mut fresh = Vec::with_capacity(old_len as usize);
    fresh.push(Node::TERMINAL);

    for position in 1..old_len {
        let node = *pool.get(position);
        if !node.is_marked() {
            continue;
        }
        let remapped = node.remap(&forwarding);
        let new_position = fresh.len() as u32;
        fresh.push(remapped);
        forwarding[position as usize] = NodeIndex::at(new_position);
    }

    pool.replace_all(fresh);
    forwarding
}

/// Run a full collection: mark, propagate, compact, then rebuild the unique table and
/// handle table against the forwarding map. If the retained fraction of the (unchanged)
/// capacity exceeds [`gc_load_increase`], the pool is doubled and the caches are resized
/// to track it (or just cleared, if `dynamic_cache` is off); otherwise the caches are
/// simply cleared in place, since every previously cached `NodeIndex` may now be stale.
pub(crate) fn collect(
    pool: &mut MemoryPool,
    unique_table: &mut UniqueTable,
    handle_table: &mut HandleTable,
    caches: &mut OperationCaches,
    config: &ManagerConfig,
) -> GcReport {
    let live_before = pool.len();

    mark(pool, handle_table);
    let forwarding = compact(pool);
    handle_table.rebuild(&forwarding);

    let live_after = pool.len();
    let capacity_before_grow = pool.capacity();
    let retained = f64::from(live_after) / f64::from(capacity_before_grow);
    let grew = retained > gc_load_increase(capacity_before_grow);

    if grew {
        pool.grow();
    }
    unique_table.rebuild(unique_table.capacity().max(pool.capacity()), pool);
    if grew && config.dynamic_cache {
        caches.resize(pool.capacity());
    } else {
        caches.clear();
    }

    GcReport {
        live_before,
        live_after,
        capacity: pool.capacity(),
        grew,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ManagerId;
    use crate::node::Variable;

    /// Builds a tiny pool/table set with one garbage node (never marked) and one live
    /// chain, then checks that collection keeps the live chain reachable at a compacted
    /// position while dropping the garbage node entirely.
    #[test]
    fn collect_drops_unreachable_nodes_and_keeps_live_ones() {
        let mut pool = MemoryPool::new(16);
        let mut unique_table = UniqueTable::new(16);
        let mut handle_table = HandleTable::new(ManagerId::for_test(0));
        let mut caches = OperationCaches::new(16, 4);
        let config = ManagerConfig::default();

        // Garbage: allocated but never referenced by a handle.
        let _garbage = unique_table
            .get_or_add(&mut pool, Variable::new(5), NodeIndex::FALSE, NodeIndex::TRUE)
            .unwrap();

        // Live chain: v1 node pointing down to a v0 node, both kept alive by one handle
        // to the v1 node.
        let v0 = unique_table
            .get_or_add(&mut pool, Variable::new(0), NodeIndex::FALSE, NodeIndex::TRUE)
            .unwrap();
        let v1 = unique_table
            .get_or_add(&mut pool, Variable::new(1), NodeIndex::FALSE, v0)
            .unwrap();
        let handle = handle_table.get_or_add(v1);

        assert_eq!(4, pool.len()); // terminal + garbage + v0 + v1

        let report = collect(&mut pool, &mut unique_table, &mut handle_table, &mut caches, &config);

        assert_eq!(4, report.live_before);
        assert_eq!(3, report.live_after); // terminal + v0 + v1 survive, garbage dropped
        assert_eq!(3, pool.len());

        // The handle's index was updated in place to the post-compaction position.
        let node = pool.get(handle.index().get_position());
        assert_eq!(Variable::new(1), node.variable());
        assert_eq!(Variable::new(0), pool.get(node.high().get_position()).variable());
    }
}
