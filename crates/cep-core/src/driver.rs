use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, trace};

use crate::blueprint::Blueprint;
use crate::error::CepResult;
use crate::event::Stream;
use crate::pattern::Pattern;
use crate::tree::{NodeId, Tree};

/// A complete match: one event bound to each name in the originating
/// [`Pattern`], in that pattern's leaf order.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub names: Vec<String>,
    pub events: Vec<Arc<crate::event::Event>>,
}

impl PatternMatch {
    pub fn get(&self, name: &str) -> Option<&crate::event::Event> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.events[i].as_ref())
    }
}

/// Sending half of a pattern's match output channel.
#[derive(Clone)]
pub struct MatchSink(Sender<PatternMatch>);

/// Receiving half of a pattern's match output channel. Cheaply cloneable
/// (crossbeam's receiver is multi-consumer), so several readers can drain
/// the same pattern's matches independently.
#[derive(Clone)]
pub struct MatchSource(Receiver<PatternMatch>);

impl MatchSource {
    pub fn recv(&self) -> Option<PatternMatch> {
        self.0.recv().ok()
    }

    pub fn try_iter(&self) -> impl Iterator<Item = PatternMatch> + '_ {
        self.0.try_iter()
    }
}

pub fn match_channel() -> (MatchSink, MatchSource) {
    let (tx, rx) = unbounded();
    (MatchSink(tx), MatchSource(rx))
}

/// Drives a single evaluation [`Tree`] against its input [`Stream`],
/// pushing complete matches out through a [`MatchSink`].
///
/// One driver corresponds to one pattern. [`crate::worker`] in the
/// `cep-worker` crate runs each driver on its own OS thread; the driver
/// itself is single-threaded and knows nothing about concurrency beyond
/// the channels it reads from and writes to.
pub struct EvaluationDriver {
    tree: Tree,
    leaf_by_type: HashMap<String, Vec<NodeId>>,
    elapsed: Arc<Mutex<Option<Duration>>>,
}

impl EvaluationDriver {
    pub fn new(pattern: &Pattern, blueprint: &Blueprint) -> CepResult<Self> {
        let tree = Tree::build(pattern, blueprint)?;
        let mut leaf_by_type: HashMap<String, Vec<NodeId>> = HashMap::new();
        for (id, event_type) in tree.leaves() {
            leaf_by_type.entry(event_type.to_string()).or_default().push(id);
        }
        Ok(Self {
            tree,
            leaf_by_type,
            elapsed: Arc::new(Mutex::new(None)),
        })
    }

    /// Total wall-clock time spent inside [`Self::run`] so far, if it has
    /// started. Safe to read from another thread while `run` is in
    /// progress — mirrors the source evaluator's thread-safe elapsed-time
    /// getter.
    pub fn elapsed(&self) -> Option<Duration> {
        *self.elapsed.lock().unwrap()
    }

    /// A clone of the shared elapsed-time handle, for a caller that is
    /// about to move this driver onto another thread and still wants to
    /// read [`Self::elapsed`]'s value from the thread it stays on.
    pub fn elapsed_handle(&self) -> Arc<Mutex<Option<Duration>>> {
        Arc::clone(&self.elapsed)
    }

    /// Drain `input` until it closes, feeding each event to every leaf
    /// registered for its event type and forwarding complete matches to
    /// `sink`. Events whose type matches no leaf are dropped silently —
    /// the stream may carry event types outside this pattern.
    pub fn run(&mut self, input: &Stream, sink: &MatchSink) -> CepResult<()> {
        let start = Instant::now();
        while let Some(event) = input.pop() {
            let leaf_ids = match self.leaf_by_type.get(&event.event_type) {
                Some(ids) => ids.clone(),
                None => {
                    trace!(event_type = %event.event_type, "no leaf registered, dropping");
                    continue;
                }
            };
            for leaf_id in leaf_ids {
                let matches = self.tree.handle_event(leaf_id, event.clone())?;
                if matches.is_empty() {
                    continue;
                }
                let names = self.tree.nodes[self.tree.root].names();
                for pm in matches {
                    debug!(count = pm.events.len(), "pattern match");
                    let _ = sink.0.send(PatternMatch {
                        names: names.clone(),
                        events: pm.events,
                    });
                }
            }
            *self.elapsed.lock().unwrap() = Some(start.elapsed());
        }
        self.tree.evict_all(i64::MAX);
        *self.elapsed.lock().unwrap() = Some(start.elapsed());
        Ok(())
    }
}
