use std::marker::PhantomData;
use std::sync::atomic::{AtomicU16, Ordering};

use crate::assignment::Assignment;
use crate::caches::{OperationCaches, Operator};
use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::factory::{NodeFactory, StandardFactory};
use crate::gc;
use crate::handle::Handle;
use crate::handle_table::HandleTable;
use crate::memory_pool::MemoryPool;
use crate::node::{Node, Variable};
use crate::node_index::NodeIndex;
use crate::unique_table::UniqueTable;
use crate::variable_map::VariableMap;
use crate::variable_set::VariableSet;

/// Identifies which [`Manager`] a [`Handle`], [`VariableSet`] or [`VariableMap`] belongs
/// to, so that mixing values from two managers fails loudly (`Error::ManagerMismatch`)
/// rather than silently reinterpreting one manager's pool positions as another's.
///
/// Assigned from a process-wide counter (spec.md §9) rather than, say, the pool's address,
/// so ids stay stable and small even across managers that are created and dropped.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ManagerId(u16);

static NEXT_MANAGER_ID: AtomicU16 = AtomicU16::new(0);

impl ManagerId {
    fn fresh() -> ManagerId {
        ManagerId(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn for_test(id: u16) -> ManagerId {
        ManagerId(id)
    }
}

/// Diagnostic snapshot returned by [`Manager::stats`] — counters useful for logging and
/// tests, not consulted by the manager's own algorithms.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ManagerStats {
    pub pool_len: u32,
    pub pool_capacity: u32,
    pub unique_table_len: u32,
    pub variable_count: u32,
}

/// A canonical, maximally-shared binary decision diagram manager (spec.md §1).
///
/// Owns the memory pool, unique table, handle table and operation caches that back every
/// [`Handle`] it has ever handed out. Generic over the [`NodeFactory`] that supplies the
/// variant-specific reduction rule and level function; the only variant implemented here
/// is the standard one (see [`StandardFactory`]).
pub struct Manager<F: NodeFactory = StandardFactory> {
    id: ManagerId,
    config: ManagerConfig,
    pool: MemoryPool,
    unique_table: UniqueTable,
    handle_table: HandleTable,
    caches: OperationCaches,
    variable_count: u32,
    next_contract_id: u32,
    _factory: PhantomData<F>,
}

impl Manager<StandardFactory> {
    /// Build a manager with the standard BDD reduction rule, sized per `config`.
    pub fn new(config: ManagerConfig) -> Manager<StandardFactory> {
        let id = ManagerId::fresh();
        let pool = MemoryPool::new(config.initial_nodes);
        let unique_table = UniqueTable::new(config.initial_nodes);
        let caches = OperationCaches::new(config.initial_nodes, config.cache_ratio);
        log::debug!("manager {:?} created with {} initial nodes", id, config.initial_nodes);
        Manager {
            id,
            config,
            pool,
            unique_table,
            handle_table: HandleTable::new(id),
            caches,
            variable_count: 0,
            next_contract_id: 0,
            _factory: PhantomData,
        }
    }
}

impl<F: NodeFactory> Manager<F> {
    pub fn id(&self) -> ManagerId {
        self.id
    }

    fn check_handle(&self, handle: &Handle) -> Result<()> {
        if handle.manager_id() != self.id {
            return Err(Error::ManagerMismatch {
                expected: self.id,
                found: handle.manager_id(),
            });
        }
        Ok(())
    }

    fn check_variable_set(&self, set: &VariableSet) -> Result<()> {
        if set.manager_id() != self.id {
            return Err(Error::ManagerMismatch {
                expected: self.id,
                found: set.manager_id(),
            });
        }
        Ok(())
    }

    fn check_variable_map(&self, map: &VariableMap) -> Result<()> {
        if map.manager_id() != self.id {
            return Err(Error::ManagerMismatch {
                expected: self.id,
                found: map.manager_id(),
            });
        }
        Ok(())
    }

    /// Mint a [`VariableSet`] tagged for this manager, for use with [`Manager::exists`]
    /// and [`Manager::forall`]. Fails with `Error::InvalidArgument` if `variables` contains
    /// a duplicate (spec.md §7).
    pub fn variable_set(&mut self, variables: impl IntoIterator<Item = u32>) -> Result<VariableSet> {
        let id = self.next_contract_id;
        self.next_contract_id += 1;
        VariableSet::new(id, self.id, variables)
    }

    pub fn empty_variable_set(&mut self) -> VariableSet {
        let id = self.next_contract_id;
        self.next_contract_id += 1;
        VariableSet::empty(id, self.id)
    }

    /// Mint a [`VariableMap`] tagged for this manager, for use with [`Manager::replace`].
    /// Fails with `Error::InvalidArgument` if `pairs` is not injective (spec.md §3/§7).
    pub fn variable_map(&mut self, pairs: impl IntoIterator<Item = (u32, u32)>) -> Result<VariableMap> {
        let id = self.next_contract_id;
        self.next_contract_id += 1;
        VariableMap::new(id, self.id, pairs)
    }

    pub fn identity_variable_map(&mut self) -> VariableMap {
        let id = self.next_contract_id;
        self.next_contract_id += 1;
        VariableMap::identity(id, self.id)
    }

    /// Allocate the function "`variable`" itself (low = false, high = true), growing the
    /// tracked variable count if `variable` has not been used before.
    pub fn variable(&mut self, variable: u32) -> Result<Handle> {
        self.check_for_collection();
        if variable + 1 > self.variable_count {
            self.variable_count = variable + 1;
        }
        let index = self.allocate(Variable::new(variable), NodeIndex::FALSE, NodeIndex::TRUE)?;
        Ok(self.handle_table.get_or_add(index))
    }

    pub fn constant(&mut self, value: bool) -> Handle {
        let index = if value { NodeIndex::TRUE } else { NodeIndex::FALSE };
        self.handle_table.get_or_add(index)
    }

    // -- Allocate (spec.md §4.4) ------------------------------------------------------

    fn allocate(&mut self, variable: Variable, low: NodeIndex, high: NodeIndex) -> Result<NodeIndex> {
        if let Some(reduced) = F::reduce(low, high) {
            return Ok(reduced);
        }
        let (low, high, flip) = if low.is_complemented() {
            (low.flip(), high.flip(), true)
        } else {
            (low, high, false)
        };
        if self.unique_table.should_grow() {
            self.grow_unique_table();
        }
        self.ensure_pool_capacity();
        let index = self
            .unique_table
            .get_or_add(&mut self.pool, variable, low, high)
            .ok_or_else(|| Error::ResourceExhausted(format!("pool exhausted at {} nodes", self.pool.len())))?;
        Ok(if flip { index.flip() } else { index })
    }

    fn grow_unique_table(&mut self) {
        self.unique_table.rebuild(self.unique_table.capacity() * 2, &self.pool);
    }

    /// Double the pool and resize (or clear) the caches if it was already at capacity.
    /// Unlike the unique table (whose own bucket count tracks its own entry count), the
    /// pool and the caches grow together — `OperationCaches` is sized as a fraction of
    /// the pool's capacity (spec.md §4.5) and every key it holds is a `NodeIndex` that
    /// only remains meaningful for the pool generation it was computed against.
    fn ensure_pool_capacity(&mut self) {
        if self.pool.is_full() {
            self.pool.grow();
            if self.config.dynamic_cache {
                self.caches.resize(self.pool.capacity());
            } else {
                self.caches.clear();
            }
            log::debug!(
                "manager {:?} pool grown to {} capacity",
                self.id,
                self.pool.capacity()
            );
        }
    }

    #[inline]
    fn cofactor(idx: NodeIndex, node: &Node) -> (NodeIndex, NodeIndex) {
        if idx.is_complemented() {
            (node.low().flip(), node.high().flip())
        } else {
            (node.low(), node.high())
        }
    }

    fn level_of(&self, idx: NodeIndex) -> u64 {
        if idx.is_constant() {
            u64::MAX
        } else {
            F::level(self.pool.get(idx.get_position()))
        }
    }

    // -- Garbage collection gate (spec.md §4.7/§4.8) -----------------------------------

    /// Called at the top of every public operation. Runs a mark-sweep-compact pass when
    /// the pool has grown large enough (`gc_min_cutoff`) and is nearly full (90% load).
    fn check_for_collection(&mut self) {
        let len = self.pool.len();
        if len >= self.config.gc_min_cutoff && f64::from(len) >= 0.90 * f64::from(self.pool.capacity()) {
            self.collect();
        }
    }

    /// Run one mark-sweep-compact pass (spec.md §4.8). Infallible: GC never fails, it
    /// only ever frees pool positions that no live `Handle` still designates.
    fn collect(&mut self) {
        let report = gc::collect(
            &mut self.pool,
            &mut self.unique_table,
            &mut self.handle_table,
            &mut self.caches,
            &self.config,
        );
        let message = format!(
            "manager {:?} gc: {} -> {} live nodes (capacity {}), pool {}",
            self.id,
            report.live_before,
            report.live_after,
            report.capacity,
            if report.grew { "grew" } else { "unchanged" }
        );
        if self.config.print_debug {
            log::info!("{message}");
        } else {
            log::debug!("{message}");
        }
    }

    // -- Boolean operations (spec.md §4.6) ---------------------------------------------

    pub fn not(&mut self, f: &Handle) -> Result<Handle> {
        self.check_handle(f)?;
        self.check_for_collection();
        Ok(self.handle_table.get_or_add(f.index().flip()))
    }

    pub fn and(&mut self, a: &Handle, b: &Handle) -> Result<Handle> {
        self.check_handle(a)?;
        self.check_handle(b)?;
        self.check_for_collection();
        let index = self.apply(Operator::And, a.index(), b.index())?;
        Ok(self.handle_table.get_or_add(index))
    }

    pub fn iff(&mut self, a: &Handle, b: &Handle) -> Result<Handle> {
        self.check_handle(a)?;
        self.check_handle(b)?;
        self.check_for_collection();
        let index = self.apply(Operator::Iff, a.index(), b.index())?;
        Ok(self.handle_table.get_or_add(index))
    }

    /// `or(a, b) = ¬(¬a ∧ ¬b)` — a derived combinator, not a dedicated cache entry.
    pub fn or(&mut self, a: &Handle, b: &Handle) -> Result<Handle> {
        self.check_handle(a)?;
        self.check_handle(b)?;
        self.check_for_collection();
        let index = self.apply(Operator::And, a.index().flip(), b.index().flip())?.flip();
        Ok(self.handle_table.get_or_add(index))
    }

    /// `xor(a, b) = ¬(a ⇔ b)`.
    pub fn xor(&mut self, a: &Handle, b: &Handle) -> Result<Handle> {
        self.check_handle(a)?;
        self.check_handle(b)?;
        self.check_for_collection();
        let index = self.apply(Operator::Iff, a.index(), b.index())?.flip();
        Ok(self.handle_table.get_or_add(index))
    }

    /// `implies(a, b) = or(¬a, b)`.
    pub fn implies(&mut self, a: &Handle, b: &Handle) -> Result<Handle> {
        self.check_handle(a)?;
        self.check_handle(b)?;
        self.check_for_collection();
        let index = self.apply(Operator::And, a.index(), b.index().flip())?.flip();
        Ok(self.handle_table.get_or_add(index))
    }

    fn terminal_rule(op: Operator, x: NodeIndex, y: NodeIndex) -> Option<NodeIndex> {
        let same_position_opposite_complement =
            x.get_position() == y.get_position() && x.is_complemented() != y.is_complemented();
        match op {
            Operator::And => {
                if x.is_true() {
                    Some(y)
                } else if y.is_true() {
                    Some(x)
                } else if x.is_false() || y.is_false() {
                    Some(NodeIndex::FALSE)
                } else if x == y {
                    Some(x)
                } else if same_position_opposite_complement {
                    Some(NodeIndex::FALSE)
                } else {
                    None
                }
            }
            Operator::Iff => {
                if x.is_false() {
                    Some(y.flip())
                } else if y.is_false() {
                    Some(x.flip())
                } else if x.is_true() {
                    Some(y)
                } else if y.is_true() {
                    Some(x)
                } else if x == y {
                    Some(NodeIndex::TRUE)
                } else if same_position_opposite_complement {
                    Some(NodeIndex::FALSE)
                } else {
                    None
                }
            }
            Operator::Exists | Operator::Replace => unreachable!("terminal_rule is only used for And/Iff"),
        }
    }

    /// Shared recursive structure behind `and`/`iff`: terminal rules, a cache lookup, and
    /// a descent that always recurses on the operand(s) with the smallest level so the
    /// result is built top-down in variable order (spec.md §4.6.1).
    fn apply(&mut self, op: Operator, x: NodeIndex, y: NodeIndex) -> Result<NodeIndex> {
        if let Some(result) = Self::terminal_rule(op, x, y) {
            return Ok(result);
        }
        if let Some(result) = self.caches.binary.get(op, x, y) {
            return Ok(result);
        }

        let x_level = self.level_of(x);
        let y_level = self.level_of(y);
        let x_node = *self.pool.get(x.get_position());
        let y_node = *self.pool.get(y.get_position());

        let result = if x_level < y_level {
            let (x_low, x_high) = Self::cofactor(x, &x_node);
            let lo = self.apply(op, x_low, y)?;
            let hi = self.apply(op, x_high, y)?;
            self.allocate(x_node.variable(), lo, hi)?
        } else if y_level < x_level {
            let (y_low, y_high) = Self::cofactor(y, &y_node);
            let lo = self.apply(op, x, y_low)?;
            let hi = self.apply(op, x, y_high)?;
            self.allocate(y_node.variable(), lo, hi)?
        } else {
            let (x_low, x_high) = Self::cofactor(x, &x_node);
            let (y_low, y_high) = Self::cofactor(y, &y_node);
            let lo = self.apply(op, x_low, y_low)?;
            let hi = self.apply(op, x_high, y_high)?;
            self.allocate(x_node.variable(), lo, hi)?
        };

        self.caches.binary.insert(op, x, y, result);
        Ok(result)
    }

    /// `ite(f, g, h)` — if-then-else (spec.md §4.6.2).
    pub fn ite(&mut self, f: &Handle, g: &Handle, h: &Handle) -> Result<Handle> {
        self.check_handle(f)?;
        self.check_handle(g)?;
        self.check_handle(h)?;
        self.check_for_collection();
        let index = self.ite_rec(f.index(), g.index(), h.index())?;
        Ok(self.handle_table.get_or_add(index))
    }

    fn ite_rec(&mut self, f: NodeIndex, g: NodeIndex, h: NodeIndex) -> Result<NodeIndex> {
        if f.is_true() {
            return Ok(g);
        }
        if f.is_false() {
            return Ok(h);
        }
        if g == h {
            return Ok(g);
        }
        if g.is_true() && h.is_false() {
            return Ok(f);
        }
        if g.is_false() && h.is_true() {
            return Ok(f.flip());
        }

        if let Some(result) = self.caches.ite.get(f, g, h) {
            return Ok(result);
        }

        let f_level = self.level_of(f);
        let g_level = self.level_of(g);
        let h_level = self.level_of(h);
        let top_level = f_level.min(g_level).min(h_level);

        let f_node = *self.pool.get(f.get_position());
        let g_node = *self.pool.get(g.get_position());
        let h_node = *self.pool.get(h.get_position());

        let (f_low, f_high) = if f_level == top_level { Self::cofactor(f, &f_node) } else { (f, f) };
        let (g_low, g_high) = if g_level == top_level { Self::cofactor(g, &g_node) } else { (g, g) };
        let (h_low, h_high) = if h_level == top_level { Self::cofactor(h, &h_node) } else { (h, h) };

        let lo = self.ite_rec(f_low, g_low, h_low)?;
        let hi = self.ite_rec(f_high, g_high, h_high)?;
        let top_variable = if f_level == top_level {
            f_node.variable()
        } else if g_level == top_level {
            g_node.variable()
        } else {
            h_node.variable()
        };
        let result = self.allocate(top_variable, lo, hi)?;

        self.caches.ite.insert(f, g, h, result);
        Ok(result)
    }

    // -- Exists / forall (spec.md §4.6.3) ----------------------------------------------

    pub fn exists(&mut self, f: &Handle, variables: &VariableSet) -> Result<Handle> {
        self.check_handle(f)?;
        self.check_variable_set(variables)?;
        self.check_for_collection();
        let index = self.exists_rec(f.index(), variables)?;
        Ok(self.handle_table.get_or_add(index))
    }

    pub fn forall(&mut self, f: &Handle, variables: &VariableSet) -> Result<Handle> {
        self.check_handle(f)?;
        self.check_variable_set(variables)?;
        self.check_for_collection();
        let index = self.exists_rec(f.index().flip(), variables)?.flip();
        Ok(self.handle_table.get_or_add(index))
    }

    fn exists_rec(&mut self, f: NodeIndex, variables: &VariableSet) -> Result<NodeIndex> {
        if f.is_constant() {
            return Ok(f);
        }
        let node = *self.pool.get(f.get_position());
        match variables.max_index_variable() {
            Some(max) if node.variable() <= max => {}
            _ => return Ok(f),
        }

        let set_key = NodeIndex::at(variables.cache_id());
        if let Some(result) = self.caches.binary.get(Operator::Exists, f, set_key) {
            return Ok(result);
        }

        let (low, high) = Self::cofactor(f, &node);
        let lo = self.exists_rec(low, variables)?;
        let hi = self.exists_rec(high, variables)?;
        let result = if variables.contains_variable(node.variable()) {
            self.apply(Operator::And, lo.flip(), hi.flip())?.flip()
        } else {
            self.allocate(node.variable(), lo, hi)?
        };

        self.caches.binary.insert(Operator::Exists, f, set_key, result);
        Ok(result)
    }

    // -- Replace (spec.md §4.6.4) -------------------------------------------------------

    pub fn replace(&mut self, f: &Handle, map: &VariableMap) -> Result<Handle> {
        self.check_handle(f)?;
        self.check_variable_map(map)?;
        self.check_for_collection();
        let index = self.replace_rec(f.index(), map)?;
        Ok(self.handle_table.get_or_add(index))
    }

    fn replace_rec(&mut self, f: NodeIndex, map: &VariableMap) -> Result<NodeIndex> {
        if f.is_constant() {
            return Ok(f);
        }
        let node = *self.pool.get(f.get_position());
        match map.max_domain_variable() {
            Some(max) if node.variable() <= max => {}
            _ => return Ok(f),
        }

        let map_key = NodeIndex::at(map.cache_id());
        if let Some(result) = self.caches.binary.get(Operator::Replace, f, map_key) {
            return Ok(result);
        }

        let (low, high) = Self::cofactor(f, &node);
        let lo = self.replace_rec(low, map)?;
        let hi = self.replace_rec(high, map)?;
        let target = map.get_variable(node.variable());
        let target_level = u64::from(u32::from(target));
        let result = self.insert_ordered(target_level, target, lo, hi)?;

        self.caches.binary.insert(Operator::Replace, f, map_key, result);
        Ok(result)
    }

    /// Build a node at `target_level`/`target_variable` with children `lo`/`hi`, repairing
    /// the variable order if substitution has pushed either child's own top variable to or
    /// above `target_level`. In that case the offending child is Shannon-expanded at its
    /// own top level and the construction recurses one level shallower, exactly mirroring
    /// `apply`'s "pass through the operand that hasn't reached its level yet" recursion —
    /// this is the order-repair spec.md §4.6.4 describes.
    fn insert_ordered(&mut self, target_level: u64, target_variable: Variable, lo: NodeIndex, hi: NodeIndex) -> Result<NodeIndex> {
        let lo_level = self.level_of(lo);
        let hi_level = self.level_of(hi);
        if target_level < lo_level && target_level < hi_level {
            return self.allocate(target_variable, lo, hi);
        }

        let split_level = lo_level.min(hi_level);
        debug_assert!(split_level <= target_level);
        let split_variable = Variable::new(split_level as u32);

        let (lo_lo, lo_hi) = if lo_level == split_level {
            let node = *self.pool.get(lo.get_position());
            Self::cofactor(lo, &node)
        } else {
            (lo, lo)
        };
        let (hi_lo, hi_hi) = if hi_level == split_level {
            let node = *self.pool.get(hi.get_position());
            Self::cofactor(hi, &node)
        } else {
            (hi, hi)
        };

        let new_lo = self.insert_ordered(target_level, target_variable, lo_lo, hi_lo)?;
        let new_hi = self.insert_ordered(target_level, target_variable, lo_hi, hi_hi)?;
        self.allocate(split_variable, new_lo, new_hi)
    }

    // -- Satisfaction (spec.md §4.6.5/§4.6.6) -------------------------------------------

    /// Find one satisfying assignment, or `None` if `f` is unsatisfiable. Variables never
    /// encountered while descending to a `true` leaf are don't-cares and are absent from
    /// the returned assignment.
    pub fn sat(&mut self, f: &Handle) -> Result<Option<Assignment>> {
        self.check_handle(f)?;
        self.check_for_collection();
        let mut current = f.index();
        if current.is_false() {
            return Ok(None);
        }
        let mut assignment = Assignment::new();
        while !current.is_constant() {
            let node = *self.pool.get(current.get_position());
            let (low, high) = Self::cofactor(current, &node);
            if high.is_false() {
                assignment.insert(u32::from(node.variable()), false);
                current = low;
            } else {
                assignment.insert(u32::from(node.variable()), true);
                current = high;
            }
        }
        debug_assert!(current.is_true());
        Ok(Some(assignment))
    }

    /// Count satisfying assignments over the currently allocated variable universe
    /// (spec.md §4.6.6, §8 invariant 6).
    pub fn sat_count(&mut self, f: &Handle) -> Result<f64> {
        self.check_handle(f)?;
        self.check_for_collection();
        let index = f.index();
        if index.is_constant() {
            return Ok(if index.is_true() { 2f64.powi(self.variable_count as i32) } else { 0.0 });
        }
        let raw = self.sat_count_raw(index);
        let node = self.pool.get(index.get_position());
        Ok(2f64.powi(u32::from(node.variable()) as i32) * raw)
    }

    fn sat_count_child_level(&self, idx: NodeIndex) -> i32 {
        if idx.is_constant() {
            self.variable_count as i32
        } else {
            u32::from(self.pool.get(idx.get_position()).variable()) as i32
        }
    }

    fn sat_count_raw(&mut self, idx: NodeIndex) -> f64 {
        if idx.is_true() {
            return 1.0;
        }
        if idx.is_false() {
            return 0.0;
        }
        if let Some(cached) = self.caches.sat_count.get(idx) {
            return cached;
        }
        let node = *self.pool.get(idx.get_position());
        let v = u32::from(node.variable()) as i32;
        let (low, high) = Self::cofactor(idx, &node);
        let low_level = self.sat_count_child_level(low);
        let high_level = self.sat_count_child_level(high);
        let result = 2f64.powi(low_level - v - 1) * self.sat_count_raw(low) + 2f64.powi(high_level - v - 1) * self.sat_count_raw(high);
        self.caches.sat_count.insert(idx, result);
        result
    }

    /// Count distinct pool positions reachable from `f`, including the shared terminal
    /// (spec.md §8 invariant 7: both constants report a node count of 1).
    pub fn node_count(&self, f: &Handle) -> Result<usize> {
        self.check_handle(f)?;
        let mut visited = fxhash::FxHashSet::default();
        let mut stack = vec![f.index()];
        while let Some(idx) = stack.pop() {
            let position = idx.get_position();
            if !visited.insert(position) {
                continue;
            }
            if position == 0 {
                continue;
            }
            let node = self.pool.get(position);
            stack.push(node.low());
            stack.push(node.high());
        }
        Ok(visited.len())
    }

    pub fn display(&self, f: &Handle) -> Result<String> {
        self.check_handle(f)?;
        Ok(self.display_rec(f.index()))
    }

    fn display_rec(&self, idx: NodeIndex) -> String {
        if idx.is_constant() {
            return if idx.is_true() { "true".to_string() } else { "false".to_string() };
        }
        let node = self.pool.get(idx.get_position());
        let (low, high) = Self::cofactor(idx, node);
        format!("({} ? {} : {})", u32::from(node.variable()), self.display_rec(high), self.display_rec(low))
    }

    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            pool_len: self.pool.len(),
            pool_capacity: self.pool.capacity(),
            unique_table_len: self.unique_table.len(),
            variable_count: self.variable_count,
        }
    }
}
