//! A canonical, maximally-shared binary decision diagram manager.
//!
//! Boolean functions are represented as complement-edged, reduced, ordered binary decision
//! diagrams living in a single shared node pool. Structurally identical nodes are hash-consed
//! to the same pool position, so structural equality of two functions is pointer equality of
//! their underlying node index, and a mark-sweep-compact collector reclaims nodes that no
//! external [`Handle`] still references.
//!
//! The [`Manager`] is the public entry point: it owns the node pool, the unique table, the
//! handle table and the operation caches, and exposes `and`/`or`/`not`/`xor`/`iff`/`implies`/
//! `ite`, quantification (`exists`/`forall`), substitution (`replace`), and counting/witness
//! extraction (`sat_count`/`sat`).
//!
//! Variable convenience layers (bitvectors, variable ordering policies), the ZDD reduction
//! rule, and the compressed-node (CBDD) variant are deliberately out of scope — this crate is
//! the core manager they would all be built on top of.

mod assignment;
mod caches;
mod config;
mod error;
mod factory;
mod gc;
mod handle;
mod handle_table;
mod manager;
mod memory_pool;
mod node;
mod node_index;
mod unique_table;
mod variable_map;
mod variable_set;

pub use assignment::Assignment;
pub use config::{ManagerConfig, ManagerConfigBuilder};
pub use error::{Error, Result};
pub use handle::Handle;
pub use manager::{Manager, ManagerId, ManagerStats};
pub use variable_map::VariableMap;
pub use variable_set::VariableSet;

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> Manager {
        Manager::new(ManagerConfig::builder().initial_nodes(16).build().unwrap())
    }

    #[test]
    fn not_is_involutive() {
        let mut m = manager();
        let a = m.variable(0).unwrap();
        let not_a = m.not(&a).unwrap();
        let not_not_a = m.not(&not_a).unwrap();
        assert_eq!(a, not_not_a);
    }

    #[test]
    fn constants_always_have_node_count_one() {
        let mut m = manager();
        let t = m.constant(true);
        let f = m.constant(false);
        assert_eq!(1, m.node_count(&t).unwrap());
        assert_eq!(1, m.node_count(&f).unwrap());
    }

    #[test]
    fn mixing_handles_across_managers_is_rejected() {
        let mut m1 = manager();
        let mut m2 = manager();
        let a = m1.variable(0).unwrap();
        let b = m2.variable(0).unwrap();
        assert!(matches!(m1.and(&a, &b), Err(Error::ManagerMismatch { .. })));
    }
}
