use super::NodeFactory;
use crate::node::Node;
use crate::node_index::NodeIndex;

/// The standard BDD reduction rule (spec.md §4.6): a node is redundant, and thus elided,
/// exactly when its two children are identical.
pub(crate) struct StandardFactory;

impl NodeFactory for StandardFactory {
    #[inline]
    fn reduce(low: NodeIndex, high: NodeIndex) -> Option<NodeIndex> {
        if low == high {
            Some(low)
        } else {
            None
        }
    }

    #[inline]
    fn level(node: &Node) -> u64 {
        if node.is_terminal() {
            u64::MAX
        } else {
            u64::from(u32::from(node.variable()))
        }
    }
}
