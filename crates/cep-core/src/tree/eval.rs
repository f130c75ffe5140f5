use std::sync::Arc;

use crate::error::{CepError, CepResult};
use crate::event::Event;

use super::node::{NodeId, NodeKind, PartialMatch};
use super::Tree;

impl Tree {
    /// Feed one event to `leaf_id` and return every complete match (a
    /// partial match that reached the root) it produced.
    ///
    /// Propagation is synchronous and depth-first: a new partial match at a
    /// node is immediately tried against every compatible partial match
    /// already sitting at its sibling, and each resulting join is pushed
    /// one level higher in turn. This collapses the original's per-node
    /// unhandled-match queue into direct recursive calls, which is
    /// equivalent here because a single evaluation tree is only ever
    /// driven by one thread.
    pub fn handle_event(&mut self, leaf_id: NodeId, event: Event) -> CepResult<Vec<PartialMatch>> {
        if let NodeKind::Leaf { event_type } = &self.nodes[leaf_id].kind {
            if event_type != &event.event_type {
                return Err(CepError::WrongEventType {
                    expected: event_type.clone(),
                    actual: event.event_type.clone(),
                });
            }
        }

        let event = Arc::new(event);
        let now = event.timestamp;
        self.nodes[leaf_id].evict_expired(now);
        let pm = PartialMatch::leaf(event);
        self.nodes[leaf_id].partial_matches.push(pm.clone());

        let mut matches = Vec::new();
        self.propagate(leaf_id, pm, &mut matches);
        Ok(matches)
    }

    fn propagate(&mut self, source_id: NodeId, pm: PartialMatch, out: &mut Vec<PartialMatch>) {
        let parent_id = match self.nodes[source_id].parent {
            Some(p) => p,
            None => {
                out.push(pm);
                return;
            }
        };
        let (left_id, right_id) = match self.nodes[parent_id].kind {
            NodeKind::Internal { left, right } => (left, right),
            NodeKind::Leaf { .. } => unreachable!("a node's parent is always internal"),
        };
        let is_left = left_id == source_id;
        let sibling_id = if is_left { right_id } else { left_id };

        self.nodes[sibling_id].evict_expired(pm.last_date);
        let candidates = self.nodes[sibling_id].partial_matches.clone();

        let window = self.nodes[parent_id].window;
        let is_seq = self.nodes[parent_id].is_seq;
        let names = self.nodes[parent_id].names();
        let condition = self.nodes[parent_id].condition.clone();
        let left_reorder = self.nodes[left_id].reorder.clone();
        let right_reorder = self.nodes[right_id].reorder.clone();

        for candidate in &candidates {
            let (left_pm, right_pm) = if is_left { (&pm, candidate) } else { (candidate, &pm) };
            let merged = PartialMatch::merge(left_pm, &left_reorder, right_pm, &right_reorder);
            if is_seq && !sequence_ordered(&merged.events) {
                continue;
            }
            if !window.contains(merged.first_date, merged.last_date) {
                continue;
            }
            let binding = merged.binding(&names);
            if !condition.eval(&binding) {
                continue;
            }
            self.nodes[parent_id].partial_matches.push(merged.clone());
            self.propagate(parent_id, merged, out);
        }
    }

    /// Evict stale partial matches at every node against `now`, without
    /// feeding a new event. Used when closing a pattern's stream, so
    /// nothing lingers pinned in memory past its window.
    pub fn evict_all(&mut self, now: i64) {
        for node in &mut self.nodes {
            node.evict_expired(now);
        }
    }
}

/// `events` must be non-decreasing in `(timestamp, counter)` once laid out
/// in declaration order (spec §8 property 1: for a SEQ pattern, `e_i`'s
/// `(timestamp, counter)` is non-decreasing in `i`). `merge` already
/// interleaves by `original_index`, so `events` here is exactly that
/// declaration-ordered sequence regardless of which two subtrees were
/// joined to produce it — a bushy split like `{0,2}|{1,3}` is checked as
/// `ts0 <= ts1 <= ts2 <= ts3`, not as a boundary check between the two
/// sides of whichever join produced it.
fn sequence_ordered(events: &[Arc<Event>]) -> bool {
    events
        .windows(2)
        .all(|pair| (pair[0].timestamp, pair[0].counter) <= (pair[1].timestamp, pair[1].counter))
}
