use fxhash::FxHashMap;

use crate::error::{Error, Result};

/// A satisfying assignment returned by [`crate::manager::Manager::sat`].
///
/// Variables never encountered while descending to the witness are don't-cares and are
/// simply absent from the recorded map — querying one of them is a [`Error::LookupMiss`]
/// (spec.md §7), not a silent default, since "don't-care" and "false" are different things.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Assignment {
    values: FxHashMap<u32, bool>,
}

impl Assignment {
    pub(crate) fn new() -> Assignment {
        Assignment { values: FxHashMap::default() }
    }

    pub(crate) fn insert(&mut self, variable: u32, value: bool) {
        self.values.insert(variable, value);
    }

    /// The value assigned to `variable_id`, or `Error::LookupMiss` if `variable_id` was a
    /// don't-care (never assigned while building the witness).
    pub fn get(&self, variable_id: u32) -> Result<bool> {
        self.values.get(&variable_id).copied().ok_or(Error::LookupMiss(variable_id))
    }

    pub fn contains(&self, variable_id: u32) -> bool {
        self.values.contains_key(&variable_id)
    }
}
