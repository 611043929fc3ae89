use std::rc::{Rc, Weak};

use fxhash::FxHashMap;

use crate::handle::{Handle, HandleInner};
use crate::manager::ManagerId;
use crate::memory_pool::MemoryPool;
use crate::node_index::NodeIndex;

/// Maps every [`NodeIndex`] ever handed out as a [`Handle`] to a weak reference to that
/// handle, guaranteeing at most one live handle object per index.
///
/// Unlike `UniqueTable`, entries here are not actively removed when their weak reference
/// dies — between garbage collections they are simply skipped over by `mark_all_live`.
/// `rebuild` (called right after compaction) is what actually drops dead entries and
/// remaps live ones to their post-compaction positions, which keeps the table from
/// growing without bound across a long-running session.
pub(crate) struct HandleTable {
    manager: ManagerId,
    entries: FxHashMap<u32, Weak<HandleInner>>,
}

impl HandleTable {
    pub(crate) fn new(manager: ManagerId) -> HandleTable {
        HandleTable {
            manager,
            entries: FxHashMap::default(),
        }
    }

    /// Return the existing live handle for `index`, or register and return a fresh one.
    pub(crate) fn get_or_add(&mut self, index: NodeIndex) -> Handle {
        if let Some(weak) = self.entries.get(&index.into_raw()) {
            if let Some(rc) = weak.upgrade() {
                return Handle(rc);
            }
        }
        let handle = Handle::new(self.manager, index);
        self.entries.insert(index.into_raw(), Rc::downgrade(&handle.0));
        handle
    }

    /// Mark every node still reachable through a live handle. Called as GC phase 1.
    /// Position `0` (the terminal) is never marked — it is never collected.
    pub(crate) fn mark_all_live(&self, pool: &mut MemoryPool) {
        for weak in self.entries.values() {
            if let Some(rc) = weak.upgrade() {
                let position = rc.index().get_position();
                if position != 0 {
                    pool.get_mut(position).set_mark(true);
                }
            }
        }
    }

    /// Rebuild the table after compaction: live handles are re-keyed under their new
    /// (forwarded) index and have their stored index updated in place; dead or
    /// unreachable entries are dropped.
    pub(crate) fn rebuild(&mut self, forwarding: &[NodeIndex]) {
        let mut fresh = FxHashMap::default();
        for weak in self.entries.values() {
            let Some(rc) = weak.upgrade() else { continue };
            let old = rc.index();
            let old_position = old.get_position();
            if old_position != 0 && forwarding[old_position as usize].is_undefined_marker() {
                // Not reached during mark/sweep (should not happen for a live handle,
                // but fail safe by dropping the stale entry rather than reinserting it).
                continue;
            }
            let new_position = if old_position == 0 {
                0
            } else {
                forwarding[old_position as usize].get_position()
            };
            let new_index = NodeIndex::new(new_position, old.is_complemented());
            rc.set_index(new_index);
            fresh.insert(new_index.into_raw(), Weak::clone(weak));
        }
        self.entries = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_index_returns_same_handle() {
        let manager = ManagerId::for_test(0);
        let mut table = HandleTable::new(manager);
        let a = table.get_or_add(NodeIndex::at(5));
        let b = table.get_or_add(NodeIndex::at(5));
        assert!(Rc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn dropped_handle_can_be_recreated_fresh() {
        let manager = ManagerId::for_test(0);
        let mut table = HandleTable::new(manager);
        {
            let _a = table.get_or_add(NodeIndex::at(5));
        }
        let b = table.get_or_add(NodeIndex::at(5));
        assert_eq!(NodeIndex::at(5), b.index());
    }
}
