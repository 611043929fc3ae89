//! Boundary behaviors from spec.md §8: pool resize, GC retention of live functions, and
//! cross-manager handle rejection.

use bdd_manager::{Error, Manager, ManagerConfig};

/// Building far more nodes than the tiny initial pool holds must not crash, and every
/// handle taken along the way must keep designating the same function afterwards.
#[test]
fn building_past_initial_capacity_triggers_a_resize_without_losing_functions() {
    let mut m = Manager::new(ManagerConfig::builder().initial_nodes(16).build().unwrap());
    let vars: Vec<_> = (0..12u32).map(|v| m.variable(v).unwrap()).collect();

    let mut running = vars[0].clone();
    let mut snapshots = vec![running.clone()];
    for v in &vars[1..] {
        running = m.xor(&running, v).unwrap();
        snapshots.push(running.clone());
    }

    // Re-deriving each prefix xor-chain must still hash-cons to the very same handle's
    // index, proving the earlier handles survived the pool growth untouched.
    let mut rebuilt = vars[0].clone();
    assert_eq!(snapshots[0], rebuilt);
    for (i, v) in vars[1..].iter().enumerate() {
        rebuilt = m.xor(&rebuilt, v).unwrap();
        assert_eq!(snapshots[i + 1], rebuilt);
    }
}

/// A GC'd-away function, when recomputed, gets a fresh index (it is rebuilt from
/// scratch); a function that stayed live across the collection keeps designating the
/// same node throughout.
#[test]
fn collected_functions_are_rebuilt_fresh_but_live_functions_are_untouched() {
    let mut m = Manager::new(
        ManagerConfig::builder()
            .initial_nodes(16)
            .gc_min_cutoff(16)
            .build()
            .unwrap(),
    );
    let a = m.variable(0).unwrap();
    let b = m.variable(1).unwrap();

    // Kept alive across the whole test.
    let live = m.and(&a, &b).unwrap();
    let live_index_before = live.index();

    // Garbage: built, then dropped, with nothing else referencing its node.
    {
        let c = m.variable(2).unwrap();
        let d = m.variable(3).unwrap();
        let _garbage = m.xor(&c, &d).unwrap();
    }

    // Churn enough fresh nodes (while the garbage above has no surviving handle) to push
    // the pool past the 90%-of-capacity trigger at least once.
    for i in 4..40u32 {
        let v = m.variable(i).unwrap();
        let _ = m.and(&live, &v).unwrap();
    }

    assert_eq!(live_index_before, live.index());
}

/// Handles minted by one manager are rejected (not silently reinterpreted) by another.
#[test]
fn handles_from_different_managers_are_rejected() {
    let mut m1 = Manager::new(ManagerConfig::builder().initial_nodes(16).build().unwrap());
    let mut m2 = Manager::new(ManagerConfig::builder().initial_nodes(16).build().unwrap());

    let a = m1.variable(0).unwrap();
    let b = m2.variable(0).unwrap();

    assert!(matches!(m1.and(&a, &b), Err(Error::ManagerMismatch { .. })));
    assert!(matches!(m2.not(&a), Err(Error::ManagerMismatch { .. })));

    let set = m2.variable_set([0]).unwrap();
    assert!(matches!(m1.exists(&a, &set), Err(Error::ManagerMismatch { .. })));

    let map = m2.variable_map([(0, 1)]).unwrap();
    assert!(matches!(m1.replace(&a, &map), Err(Error::ManagerMismatch { .. })));
}

/// A negative `cache_ratio` is rejected at construction time, before any pool is built.
#[test]
fn negative_cache_ratio_is_an_invalid_argument() {
    let result = ManagerConfig::builder().cache_ratio(-4).build();
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

/// A variable the witness never had to decide (a don't-care) is a `LookupMiss`, not a
/// silent default value — `f = a` over variables `{a, b}` is satisfied with `a = true`
/// regardless of `b`, so `b` never appears in the recorded assignment.
#[test]
fn querying_a_dont_care_variable_in_a_witness_is_a_lookup_miss() {
    let mut m = Manager::new(ManagerConfig::builder().initial_nodes(16).build().unwrap());
    let a = m.variable(0).unwrap();
    let _b = m.variable(1).unwrap();

    let witness = m.sat(&a).unwrap().expect("a is satisfiable");
    assert_eq!(Ok(true), witness.get(0));
    assert!(matches!(witness.get(1), Err(Error::LookupMiss(1))));
}

/// A duplicate variable in a `VariableSet` is rejected before `exists`/`forall` ever run.
#[test]
fn duplicate_variable_in_a_variable_set_is_an_invalid_argument() {
    let mut m = Manager::new(ManagerConfig::builder().initial_nodes(16).build().unwrap());
    assert!(matches!(m.variable_set([2, 5, 2]), Err(Error::InvalidArgument(_))));
}

/// A non-injective `VariableMap` is rejected before `replace` ever runs.
#[test]
fn non_injective_variable_map_is_an_invalid_argument() {
    let mut m = Manager::new(ManagerConfig::builder().initial_nodes(16).build().unwrap());
    assert!(matches!(m.variable_map([(0, 9), (1, 9)]), Err(Error::InvalidArgument(_))));
}
