//! Property-style law checks over small random formulas (spec.md §8).
//!
//! The "random formula" generator is a small hand-rolled xorshift, not a property-testing
//! crate — the teacher never pulls one in, and a fixed seed keeps every run of this suite
//! reproducible without a shrinking/reporting harness.

use bdd_manager::{Handle, Manager, ManagerConfig};

struct Xorshift32(u32);

impl Xorshift32 {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: u32) -> u32 {
        self.next() % bound
    }
}

const VARIABLE_COUNT: u32 = 8;

fn manager() -> Manager {
    Manager::new(ManagerConfig::builder().initial_nodes(256).build().unwrap())
}

fn variables(m: &mut Manager) -> Vec<Handle> {
    (0..VARIABLE_COUNT).map(|v| m.variable(v).unwrap()).collect()
}

/// Build a random formula over `vars`, recursing at most `depth` levels before falling back
/// to a single variable reference.
fn random_formula(m: &mut Manager, vars: &[Handle], rng: &mut Xorshift32, depth: u32) -> Handle {
    if depth == 0 || rng.below(4) == 0 {
        let v = &vars[rng.below(vars.len() as u32) as usize];
        return v.clone();
    }
    let left = random_formula(m, vars, rng, depth - 1);
    let right = random_formula(m, vars, rng, depth - 1);
    match rng.below(5) {
        0 => m.and(&left, &right).unwrap(),
        1 => m.or(&left, &right).unwrap(),
        2 => m.xor(&left, &right).unwrap(),
        3 => m.iff(&left, &right).unwrap(),
        _ => {
            let negated = m.not(&left).unwrap();
            m.or(&negated, &right).unwrap()
        }
    }
}

fn random_formulas(seed: u32, count: usize) -> (Manager, Vec<Handle>, Vec<Handle>) {
    let mut m = manager();
    let vars = variables(&mut m);
    let mut rng = Xorshift32(seed);
    let formulas = (0..count)
        .map(|_| random_formula(&mut m, &vars, &mut rng, 4))
        .collect();
    (m, vars, formulas)
}

#[test]
fn and_or_are_idempotent() {
    let (mut m, _vars, formulas) = random_formulas(0xC0FF_EE01, 64);
    for f in &formulas {
        assert_eq!(*f, m.and(f, f).unwrap());
        assert_eq!(*f, m.or(f, f).unwrap());
    }
}

#[test]
fn and_or_iff_are_commutative() {
    let (mut m, _vars, formulas) = random_formulas(0xC0FF_EE02, 64);
    for pair in formulas.chunks(2) {
        let (f, g) = (&pair[0], &pair[1]);
        assert_eq!(m.and(f, g).unwrap(), m.and(g, f).unwrap());
        assert_eq!(m.or(f, g).unwrap(), m.or(g, f).unwrap());
        assert_eq!(m.iff(f, g).unwrap(), m.iff(g, f).unwrap());
    }
}

#[test]
fn and_is_associative() {
    let (mut m, _vars, formulas) = random_formulas(0xC0FF_EE03, 60);
    for triple in formulas.chunks(3) {
        if triple.len() < 3 {
            continue;
        }
        let (f, g, h) = (&triple[0], &triple[1], &triple[2]);
        let fg = m.and(f, g).unwrap();
        let left = m.and(&fg, h).unwrap();
        let gh = m.and(g, h).unwrap();
        let right = m.and(f, &gh).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn and_distributes_over_or() {
    let (mut m, _vars, formulas) = random_formulas(0xC0FF_EE04, 60);
    for triple in formulas.chunks(3) {
        if triple.len() < 3 {
            continue;
        }
        let (f, g, h) = (&triple[0], &triple[1], &triple[2]);
        let g_or_h = m.or(g, h).unwrap();
        let left = m.and(f, &g_or_h).unwrap();
        let fg = m.and(f, g).unwrap();
        let fh = m.and(f, h).unwrap();
        let right = m.or(&fg, &fh).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn de_morgan_holds() {
    let (mut m, _vars, formulas) = random_formulas(0xC0FF_EE05, 64);
    for pair in formulas.chunks(2) {
        let (f, g) = (&pair[0], &pair[1]);
        let and_fg = m.and(f, g).unwrap();
        let left = m.not(&and_fg).unwrap();
        let not_f = m.not(f).unwrap();
        let not_g = m.not(g).unwrap();
        let right = m.or(&not_f, &not_g).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn ite_expansion_holds() {
    let (mut m, _vars, formulas) = random_formulas(0xC0FF_EE06, 60);
    for triple in formulas.chunks(3) {
        if triple.len() < 3 {
            continue;
        }
        let (f, g, h) = (&triple[0], &triple[1], &triple[2]);
        let left = m.ite(f, g, h).unwrap();
        let f_implies_g = m.implies(f, g).unwrap();
        let not_f = m.not(f).unwrap();
        let not_f_implies_h = m.implies(&not_f, h).unwrap();
        let right = m.and(&f_implies_g, &not_f_implies_h).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn implies_is_contrapositive() {
    let (mut m, _vars, formulas) = random_formulas(0xC0FF_EE07, 64);
    for pair in formulas.chunks(2) {
        let (f, g) = (&pair[0], &pair[1]);
        let left = m.implies(f, g).unwrap();
        let not_g = m.not(g).unwrap();
        let not_f = m.not(f).unwrap();
        let right = m.implies(&not_g, &not_f).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn replace_round_trip_through_a_fresh_variable_is_identity() {
    let mut m = manager();
    let vars = variables(&mut m);
    let mut rng = Xorshift32(0xC0FF_EE08);
    // Keep variable 7 unused by the formula itself so it is a genuinely fresh swap target.
    let usable = &vars[0..7];
    let f = random_formula(&mut m, usable, &mut rng, 4);

    let a_to_b = m.variable_map([(0, 7)]).unwrap();
    let b_to_a = m.variable_map([(7, 0)]).unwrap();
    let swapped = m.replace(&f, &a_to_b).unwrap();
    let back = m.replace(&swapped, &b_to_a).unwrap();
    assert_eq!(f, back);
}

/// `exists(f ∧ v, {v})` is the standard quantifier-elimination definition of "`f` restricted
/// to `v = true`" (spec.md §8), and its dual with `¬v` is "`f` restricted to `v = false`".
/// Checking both against the Shannon expansion `f == ite(v, f|v=1, f|v=0)` verifies `exists`
/// against a law that does not mention `exists` itself.
#[test]
fn exists_restriction_satisfies_shannon_expansion() {
    let mut m = manager();
    let vars = variables(&mut m);
    let mut rng = Xorshift32(0xC0FF_EE09);
    for _ in 0..20 {
        let f = random_formula(&mut m, &vars, &mut rng, 4);
        let v = rng.below(VARIABLE_COUNT);
        let set = m.variable_set([v]).unwrap();
        let id_v = m.variable(v).unwrap();

        let f_and_v = m.and(&f, &id_v).unwrap();
        let restrict_true = m.exists(&f_and_v, &set).unwrap();

        let not_id_v = m.not(&id_v).unwrap();
        let f_and_not_v = m.and(&f, &not_id_v).unwrap();
        let restrict_false = m.exists(&f_and_not_v, &set).unwrap();

        let reconstructed = m.ite(&id_v, &restrict_true, &restrict_false).unwrap();
        assert_eq!(f, reconstructed);
    }
}
