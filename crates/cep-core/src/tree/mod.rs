mod build;
mod eval;
pub mod node;

pub use node::{Node, NodeId, NodeKind, PartialMatch};

/// An evaluation tree: an arena of [`Node`]s plus the id of the root.
///
/// Nodes own each other by index rather than by pointer (see
/// [`node::Node`]'s docs) so the tree can be mutated — new partial matches
/// pushed at any node, stale ones evicted at any node — without fighting
/// the borrow checker over shared parent/child ownership.
pub struct Tree {
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

impl Tree {
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.nodes.iter().enumerate().filter_map(|(id, node)| match &node.kind {
            NodeKind::Leaf { event_type } => Some((id, event_type.as_str())),
            NodeKind::Internal { .. } => None,
        })
    }

    pub fn root_matches(&self) -> &[PartialMatch] {
        &self.nodes[self.root].partial_matches
    }
}
