use crate::blueprint::Blueprint;
use crate::error::CepResult;
use crate::pattern::{Pattern, TopOp};

use super::node::{merge_reorder, Node, NodeId};
use super::Tree;

impl Tree {
    /// Build an evaluation tree for `pattern` shaped by `blueprint`.
    ///
    /// Each internal node's condition is `pattern.condition.project`ed onto
    /// just the leaf names that node covers, so a predicate over names
    /// `{a, b}` is checked as soon as both are bound rather than deferred
    /// to the root. `is_seq` is only meaningful when `pattern.top_op` is
    /// [`TopOp::Seq`]: it marks every internal node, since sequence order
    /// is a property of the whole composition, not of any one join.
    pub fn build(pattern: &Pattern, blueprint: &Blueprint) -> CepResult<Tree> {
        blueprint.validate(pattern.args.len())?;
        let normalized = blueprint.clone().into_pairs();
        let mut nodes = Vec::new();
        let is_seq = matches!(pattern.top_op, TopOp::Seq);
        let root = Self::build_recursive(&normalized, pattern, is_seq, &mut nodes);
        Ok(Tree { nodes, root })
    }

    fn build_recursive(
        blueprint: &Blueprint,
        pattern: &Pattern,
        is_seq: bool,
        nodes: &mut Vec<Node>,
    ) -> NodeId {
        match blueprint {
            Blueprint::Leaf(idx) => {
                let leaf_desc = &pattern.args[*idx];
                let node = Node::leaf(
                    *idx,
                    leaf_desc.event_type.clone(),
                    leaf_desc.name.clone(),
                    pattern.window,
                );
                nodes.push(node);
                nodes.len() - 1
            }
            Blueprint::Pair(l, r) => {
                let left = Self::build_recursive(l, pattern, is_seq, nodes);
                let right = Self::build_recursive(r, pattern, is_seq, nodes);
                let reorder = merge_reorder(&nodes[left].reorder, &nodes[right].reorder);
                let names = reorder.iter().map(|(_, name)| name.clone()).collect::<Vec<_>>();
                let condition = pattern.condition.project(&names);
                let node = Node::internal(left, right, reorder, condition, pattern.window, is_seq);
                nodes.push(node);
                let id = nodes.len() - 1;
                nodes[left].parent = Some(id);
                nodes[right].parent = Some(id);
                id
            }
            Blueprint::Order(_) => {
                unreachable!("Blueprint::into_pairs eliminates Order before recursion")
            }
        }
    }
}
