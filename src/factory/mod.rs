mod standard;

pub(crate) use standard::StandardFactory;

use crate::node::Node;
use crate::node_index::NodeIndex;

/// The variant-specific capability set spec.md §4.6/§9 calls the "Factory": the one place
/// where a BDD-shaped manager and a ZDD/CBDD-shaped manager would actually differ.
///
/// The reference design has the Factory hold a non-owning back-pointer to its Manager and
/// call back into `Allocate`/`Apply` during recursion. In Rust that cyclic reference is
/// naturally expressed the other way around: `Manager<F: NodeFactory>` is generic over the
/// capability set and calls `F::reduce`/`F::level` as plain associated functions while it
/// runs the shared recursion (`apply`/`ite`/`exists`/`replace`/`sat_count`/`sat`) itself —
/// there is no separate value to hold a pointer to. This crate implements only the
/// standard BDD reduction rule ([`StandardFactory`]); the trait exists so a ZDD or CBDD
/// variant (explicitly out of scope here, per spec.md §1) could be added by implementing
/// it again rather than forking the manager.
pub(crate) trait NodeFactory {
    /// `Reduce(node) -> Option<NodeIndex>`: if `low`/`high` describe a node that should be
    /// elided under this variant's reduction rule, return the index it collapses to.
    /// Standard BDDs elide `low == high`; ZDDs (not implemented here) would instead elide
    /// `high == false`.
    fn reduce(low: NodeIndex, high: NodeIndex) -> Option<NodeIndex>;

    /// `Level(idx, node) -> level`: the position in the variable order used to decide
    /// recursion order. Terminal nodes return a level above every real variable so that
    /// descending comparisons in `apply`/`ite`/`exists`/`replace` terminate at them
    /// naturally, without a separate "is terminal" branch in the hot recursive path.
    fn level(node: &Node) -> u64;
}
