use std::cell::Cell;
use std::rc::Rc;

use crate::manager::ManagerId;
use crate::node_index::NodeIndex;

/// The internals behind a [`Handle`], shared by every clone of it.
///
/// `index` is a `Cell` rather than a plain field because the garbage collector rewrites
/// it in place during compaction — a `Handle` always designates the same *function*,
/// never a fixed memory position.
pub(crate) struct HandleInner {
    manager: ManagerId,
    index: Cell<NodeIndex>,
}

impl HandleInner {
    #[inline]
    pub(crate) fn index(&self) -> NodeIndex {
        self.index.get()
    }

    #[inline]
    pub(crate) fn set_index(&self, index: NodeIndex) {
        self.index.set(index);
    }
}

/// An externally owned reference to a Boolean function living in some [`crate::manager::Manager`].
///
/// A `Handle` does not own its node — the manager does. It registers external interest in
/// a node with the manager's [`crate::handle_table::HandleTable`]; once every `Handle`
/// referencing a node is dropped, that node becomes eligible for collection. Handles may
/// be freely cloned and shared; clones are cheap reference-counted pointers to the same
/// registration, matching the "weak reference, one live handle per index" contract the
/// `HandleTable` enforces internally.
#[derive(Clone)]
pub struct Handle(pub(crate) Rc<HandleInner>);

impl Handle {
    pub(crate) fn new(manager: ManagerId, index: NodeIndex) -> Handle {
        Handle(Rc::new(HandleInner {
            manager,
            index: Cell::new(index),
        }))
    }

    #[inline]
    pub fn manager_id(&self) -> ManagerId {
        self.0.manager
    }

    #[inline]
    pub fn index(&self) -> NodeIndex {
        self.0.index.get()
    }

    #[inline]
    pub(crate) fn set_index(&self, index: NodeIndex) {
        self.0.index.set(index);
    }

    #[inline]
    pub fn is_true(&self) -> bool {
        self.index().is_true()
    }

    #[inline]
    pub fn is_false(&self) -> bool {
        self.index().is_false()
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.index().is_constant()
    }
}

/// Two functions are semantically equal exactly when their handles' `NodeIndex` values
/// are equal (the canonical form guarantees this), provided they come from the same
/// manager. Handles from different managers are simply unequal rather than an error —
/// `Manager` methods are where cross-manager use is rejected with `Error::ManagerMismatch`.
impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.manager_id() == other.manager_id() && self.index() == other.index()
    }
}
impl Eq for Handle {}

impl std::hash::Hash for Handle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.manager_id().hash(state);
        self.index().hash(state);
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handle")
            .field(&self.manager_id())
            .field(&self.index())
            .finish()
    }
}
