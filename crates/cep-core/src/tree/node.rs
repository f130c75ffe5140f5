use std::sync::Arc;

use crate::event::Event;
use crate::formula::Formula;
use crate::pattern::Window;

/// Index of a [`Node`] inside a [`super::Tree`]'s arena.
pub type NodeId = usize;

/// A set of events bound to names, still open to further extension as it
/// rises through the tree.
///
/// `first_date`/`last_date` are cached from the constituent events so the
/// window check at each node is O(1) rather than a re-scan.
#[derive(Debug, Clone)]
pub struct PartialMatch {
    pub events: Vec<Arc<Event>>,
    pub first_date: i64,
    pub last_date: i64,
}

impl PartialMatch {
    pub fn leaf(event: Arc<Event>) -> Self {
        let ts = event.timestamp;
        Self {
            events: vec![event],
            first_date: ts,
            last_date: ts,
        }
    }

    /// Combine two partial matches from a node's left and right children.
    ///
    /// `left`/`right`'s events are each stored in their own node's `reorder`
    /// order (original declaration index, ascending); `left_reorder`/
    /// `right_reorder` are those two nodes' `reorder` lists, which is what
    /// lets this interleave the two event lists by `original_index` rather
    /// than just concatenating them — a node's reorder is always the
    /// index-sorted merge of its children's reorders, so the result stays
    /// declaration-ordered all the way to the root regardless of which
    /// optimizer shaped the tree.
    pub fn merge(
        left: &PartialMatch,
        left_reorder: &[(usize, String)],
        right: &PartialMatch,
        right_reorder: &[(usize, String)],
    ) -> PartialMatch {
        let mut events = Vec::with_capacity(left.events.len() + right.events.len());
        let (mut li, mut ri) = (0, 0);
        while li < left_reorder.len() && ri < right_reorder.len() {
            if left_reorder[li].0 < right_reorder[ri].0 {
                events.push(left.events[li].clone());
                li += 1;
            } else {
                events.push(right.events[ri].clone());
                ri += 1;
            }
        }
        events.extend(left.events[li..].iter().cloned());
        events.extend(right.events[ri..].iter().cloned());
        PartialMatch {
            first_date: left.first_date.min(right.first_date),
            last_date: left.last_date.max(right.last_date),
            events,
        }
    }

    /// Binding of leaf name to event, in `names` order (which must match
    /// the order events were merged in).
    pub fn binding<'a>(&'a self, names: &[String]) -> std::collections::HashMap<String, &'a Event> {
        names
            .iter()
            .cloned()
            .zip(self.events.iter().map(|e| e.as_ref()))
            .collect()
    }
}

/// Merge two `reorder` lists, each already sorted ascending by original
/// declaration index, into one sorted list — the index-sorted merge spec
/// requires of every internal node's reorder.
pub(super) fn merge_reorder(left: &[(usize, String)], right: &[(usize, String)]) -> Vec<(usize, String)> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut li, mut ri) = (0, 0);
    while li < left.len() && ri < right.len() {
        if left[li].0 < right[ri].0 {
            merged.push(left[li].clone());
            li += 1;
        } else {
            merged.push(right[ri].clone());
            ri += 1;
        }
    }
    merged.extend_from_slice(&left[li..]);
    merged.extend_from_slice(&right[ri..]);
    merged
}

#[derive(Debug)]
pub enum NodeKind {
    Leaf { event_type: String },
    Internal { left: NodeId, right: NodeId },
}

/// One node of the evaluation tree.
///
/// Nodes are arena-owned (see [`super::Tree`]); a node refers to its
/// parent and children by [`NodeId`] rather than by pointer, which is what
/// lets the tree be mutated freely under the borrow checker without
/// `Rc<RefCell<_>>`.
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// This subtree's reorder: `(original_index, name)` pairs sorted
    /// ascending by `original_index`, per spec's "a node's reorder equals
    /// the index-sorted merge of its two children's reorder lists". A leaf
    /// seeds this with its own single `(original_index, name)`; an internal
    /// node's reorder is the index-sorted merge of its children's (see
    /// [`merge_reorder`]), so the root's reorder is always `0, 1, …, n-1` —
    /// true declaration order — independent of how an optimizer shaped or
    /// permuted the tree underneath it.
    pub reorder: Vec<(usize, String)>,
    pub condition: Formula,
    pub window: Window,
    pub is_seq: bool,
    pub partial_matches: Vec<PartialMatch>,
}

impl Node {
    pub fn leaf(original_index: usize, event_type: String, name: String, window: Window) -> Self {
        Self {
            kind: NodeKind::Leaf { event_type },
            parent: None,
            reorder: vec![(original_index, name)],
            condition: Formula::True,
            window,
            is_seq: false,
            partial_matches: Vec::new(),
        }
    }

    pub fn internal(
        left: NodeId,
        right: NodeId,
        reorder: Vec<(usize, String)>,
        condition: Formula,
        window: Window,
        is_seq: bool,
    ) -> Self {
        Self {
            kind: NodeKind::Internal { left, right },
            parent: None,
            reorder,
            condition,
            window,
            is_seq,
            partial_matches: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// This subtree's covered leaf names, in declaration order (spec §6:
    /// "events bound to args[0], …, args[n-1] in original declaration
    /// order" — which the root's `reorder` always satisfies).
    pub fn names(&self) -> Vec<String> {
        self.reorder.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Drop partial matches that can no longer extend into a complete,
    /// in-window match given the current stream time `now` — mirrors
    /// `updatePartialMatchesToDate`'s eviction by `firstDate`.
    pub fn evict_expired(&mut self, now: i64) {
        let window = self.window;
        self.partial_matches
            .retain(|pm| window.contains(pm.first_date, now));
    }
}
