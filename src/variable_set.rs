use crate::error::{Error, Result};
use crate::manager::ManagerId;
use crate::node::Variable;

/// An immutable, sorted set of variable ids — the consumed contract spec.md §3/§6
/// describes for `Manager::exists`/`forall`'s quantified variable argument.
///
/// This is the minimal surface the core needs from the (out-of-scope) variable
/// convenience layer: membership tests, a maximum index for the Factory's early-cutoff
/// check (§4.6.3), and a cacheable identity so that two sets with identical members
/// hash-cons to the same `OperationCaches` key. Sets are minted by the manager that will
/// consume them ([`crate::manager::Manager::variable_set`]) so that `id` can double as a
/// small dense integer (it is folded into a [`crate::node_index::NodeIndex`]-shaped cache
/// key alongside `Operator::Exists`) and so a set from a different manager is rejected
/// with `Error::ManagerMismatch` rather than silently misinterpreted.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VariableSet {
    id: u32,
    manager: ManagerId,
    members: Vec<Variable>,
}

impl VariableSet {
    /// Build a set from an iterator of raw variable ids.
    ///
    /// Fails with `Error::InvalidArgument` if `variables` contains a duplicate id
    /// (spec.md §7: "duplicate variable in a variable set" is an `InvalidArgument` case,
    /// checked before any side effect).
    pub(crate) fn new(id: u32, manager: ManagerId, variables: impl IntoIterator<Item = u32>) -> Result<VariableSet> {
        let mut members: Vec<Variable> = variables.into_iter().map(Variable::new).collect();
        members.sort_unstable();
        if let Some(w) = members.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::InvalidArgument(format!(
                "duplicate variable {} in variable set",
                u32::from(w[0])
            )));
        }
        Ok(VariableSet { id, manager, members })
    }

    pub(crate) fn empty(id: u32, manager: ManagerId) -> VariableSet {
        VariableSet { id, manager, members: Vec::new() }
    }

    #[inline]
    pub fn manager_id(&self) -> ManagerId {
        self.manager
    }

    #[inline]
    pub(crate) fn cache_id(&self) -> u32 {
        self.id
    }

    /// `contains(variable_id)` per spec.md §6's consumed contract.
    #[inline]
    pub fn contains(&self, variable_id: u32) -> bool {
        self.contains_variable(Variable::new(variable_id))
    }

    #[inline]
    pub(crate) fn contains_variable(&self, variable: Variable) -> bool {
        self.members.binary_search(&variable).is_ok()
    }

    /// `max_index()` per spec.md §6. The largest variable id in the set, or `None` if the
    /// set is empty.
    pub fn max_index(&self) -> Option<u32> {
        self.max_index_variable().map(u32::from)
    }

    /// Used by `Exists`'s early cutoff: a node whose variable is already above every
    /// quantified variable cannot be affected and is returned unchanged.
    pub(crate) fn max_index_variable(&self) -> Option<Variable> {
        self.members.last().copied()
    }
}
