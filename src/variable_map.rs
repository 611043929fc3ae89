use fxhash::FxHashMap;

use crate::error::{Error, Result};
use crate::manager::ManagerId;
use crate::node::Variable;

/// An immutable partial function on variable ids — the consumed contract for
/// `Manager::replace`'s substitution argument (spec.md §3/§6).
///
/// Outside its recorded domain, the map is the identity (spec.md §3: "identity outside
/// the domain"). Like [`crate::variable_set::VariableSet`], it carries a cacheable
/// identity so structurally-equal maps reuse `OperationCaches` entries, and is tagged
/// with the manager that minted it so a map from a different manager is rejected with
/// `Error::ManagerMismatch`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VariableMap {
    id: u32,
    manager: ManagerId,
    mapping: FxHashMap<Variable, Variable>,
    max_domain: Option<Variable>,
}

impl VariableMap {
    /// Build a map from `(from, to)` pairs.
    ///
    /// Fails with `Error::InvalidArgument` if the mapping is not injective (two domain
    /// variables mapped to the same target), per spec.md §3's stated invariant and §7's
    /// "mismatched types in a variable map" family of `InvalidArgument` cases.
    pub(crate) fn new(
        id: u32,
        manager: ManagerId,
        pairs: impl IntoIterator<Item = (u32, u32)>,
    ) -> Result<VariableMap> {
        let mapping: FxHashMap<Variable, Variable> = pairs
            .into_iter()
            .map(|(from, to)| (Variable::new(from), Variable::new(to)))
            .collect();

        let mut targets: Vec<Variable> = mapping.values().copied().collect();
        targets.sort_unstable();
        if let Some(w) = targets.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::InvalidArgument(format!(
                "variable map is not injective: two variables map to {}",
                u32::from(w[0])
            )));
        }

        let max_domain = mapping.keys().copied().max();
        Ok(VariableMap { id, manager, mapping, max_domain })
    }

    pub(crate) fn identity(id: u32, manager: ManagerId) -> VariableMap {
        VariableMap {
            id,
            manager,
            mapping: FxHashMap::default(),
            max_domain: None,
        }
    }

    #[inline]
    pub fn manager_id(&self) -> ManagerId {
        self.manager
    }

    #[inline]
    pub(crate) fn cache_id(&self) -> u32 {
        self.id
    }

    /// `get(variable_id)` per spec.md §6's consumed contract: the image of `variable_id`,
    /// or `variable_id` itself if it is outside the domain.
    #[inline]
    pub fn get(&self, variable_id: u32) -> u32 {
        u32::from(self.get_variable(Variable::new(variable_id)))
    }

    #[inline]
    pub(crate) fn get_variable(&self, variable: Variable) -> Variable {
        self.mapping.get(&variable).copied().unwrap_or(variable)
    }

    /// `max_domain()` per spec.md §6. The largest variable in the map's domain.
    pub fn max_domain(&self) -> Option<u32> {
        self.max_domain_variable().map(u32::from)
    }

    /// Used by `Replace`'s early cutoff: a node whose variable is above every mapped
    /// variable is returned unchanged, since it (and everything below it) is fixed by
    /// the identity.
    pub(crate) fn max_domain_variable(&self) -> Option<Variable> {
        self.max_domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_outside_domain() {
        let map = VariableMap::new(1, ManagerId::for_test(0), [(0, 5)]).unwrap();
        assert_eq!(5, map.get(0));
        assert_eq!(7, map.get(7));
        assert_eq!(Some(0), map.max_domain());
    }

    #[test]
    fn pure_identity_has_no_domain() {
        let map = VariableMap::identity(0, ManagerId::for_test(0));
        assert_eq!(None, map.max_domain());
        assert_eq!(3, map.get(3));
    }

    #[test]
    fn non_injective_mapping_is_rejected() {
        let result = VariableMap::new(0, ManagerId::for_test(0), [(0, 9), (1, 9)]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
