use std::sync::Arc;
use std::time::Duration;

use cep_core::blueprint::Blueprint;
use cep_core::driver::MatchSource;
use cep_core::error::CepResult;
use cep_core::event::{Event, Stream};
use cep_core::optimizer::Optimizer;
use cep_core::pattern::Pattern;
use tracing::info;

use crate::worker::PatternWorker;

/// Single-process façade running several patterns against one shared
/// event source.
///
/// Each submitted pattern gets its own [`Stream`] and its own
/// [`PatternWorker`] thread; [`CepEngine::push_event`] broadcasts one
/// event to every pattern's stream. This plays the role the original's
/// single input loop handing events out to every registered algorithm
/// played, just pre-fanned-out per pattern instead of duplicating a
/// recorded buffer on demand.
pub struct CepEngine {
    streams: Vec<Arc<Stream>>,
    workers: Vec<PatternWorker>,
}

impl CepEngine {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            workers: Vec::new(),
        }
    }

    /// Attach a new pattern: plan its evaluation tree (via `optimizer`, or
    /// [`Optimizer::Trivial`] if none is given) and start its worker
    /// thread. Returns the handle its matches will arrive on.
    pub fn submit(
        &mut self,
        name: impl Into<String>,
        pattern: Pattern,
        optimizer: Option<Optimizer>,
    ) -> CepResult<MatchSource> {
        let blueprint = optimizer.unwrap_or(Optimizer::Trivial).plan(&pattern)?;
        self.submit_with_blueprint(name, pattern, blueprint)
    }

    /// Attach a pattern with an already-computed [`Blueprint`], bypassing
    /// the optimizer dispatch in [`Self::submit`] — used when the caller
    /// already planned the tree, for example reusing a blueprint chosen
    /// offline against a sample stream.
    pub fn submit_with_blueprint(
        &mut self,
        name: impl Into<String>,
        pattern: Pattern,
        blueprint: Blueprint,
    ) -> CepResult<MatchSource> {
        let name = name.into();
        let stream = Arc::new(Stream::new());
        let worker = PatternWorker::spawn(name.clone(), pattern, blueprint, Arc::clone(&stream))?;
        info!(pattern = %name, "pattern submitted");

        let matches = worker.matches().clone();
        self.streams.push(stream);
        self.workers.push(worker);
        Ok(matches)
    }

    /// Total wall-clock time the named pattern's worker has spent
    /// evaluating so far, or `None` if no pattern with that name was
    /// submitted.
    pub fn elapsed(&self, name: &str) -> Option<Duration> {
        self.workers.iter().find(|w| w.name() == name)?.elapsed()
    }

    /// Broadcast `event` to every submitted pattern's stream.
    pub fn push_event(&self, event: Event) {
        for stream in &self.streams {
            stream.push(event.clone());
        }
    }

    /// Close every pattern's input stream and block until all worker
    /// threads drain and exit.
    pub fn close(self) -> CepResult<()> {
        for stream in &self.streams {
            stream.close();
        }
        for worker in self.workers {
            worker.join()?;
        }
        Ok(())
    }
}

impl Default for CepEngine {
    fn default() -> Self {
        Self::new()
    }
}
