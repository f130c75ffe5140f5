use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cep_core::blueprint::Blueprint;
use cep_core::driver::{match_channel, EvaluationDriver, MatchSource};
use cep_core::error::CepResult;
use cep_core::event::Stream;
use cep_core::pattern::Pattern;
use tracing::{error, info, info_span};

/// One pattern evaluated on its own OS thread.
///
/// Every pattern in the engine is single-threaded internally — a tree is
/// never shared across threads — and gets exactly one dedicated thread
/// that blocks reading its input [`Stream`]. This is a deliberate
/// departure from an async worker pool: the evaluation core's arena-tree
/// mutation is entirely synchronous and unboxed, so there is no
/// `.await` point anywhere inside a single pattern's hot path for an
/// executor to interleave around, and thread-per-pattern keeps that
/// simple instead of threading a runtime handle through the core crate.
pub struct PatternWorker {
    name: String,
    handle: JoinHandle<CepResult<()>>,
    matches: MatchSource,
    elapsed: Arc<Mutex<Option<Duration>>>,
}

impl PatternWorker {
    /// Build the evaluation tree for `pattern`/`blueprint` and spawn it on
    /// a new thread, which will block on `input` until the stream closes.
    /// `input` is `Arc`-shared rather than owned outright so the caller
    /// (see [`crate::engine::CepEngine`]) can keep pushing events into it
    /// from outside the worker thread.
    pub fn spawn(name: impl Into<String>, pattern: Pattern, blueprint: Blueprint, input: Arc<Stream>) -> CepResult<Self> {
        let name = name.into();
        let mut driver = EvaluationDriver::new(&pattern, &blueprint)?;
        let (sink, source) = match_channel();
        let elapsed = driver.elapsed_handle();

        let thread_name = name.clone();
        let handle = thread::Builder::new()
            .name(format!("cep-pattern-{thread_name}"))
            .spawn(move || {
                let span = info_span!("pattern", name = %thread_name);
                let _enter = span.enter();
                info!("pattern worker started");
                let result = driver.run(&input, &sink);
                match &result {
                    Ok(()) => info!("pattern worker drained input and closed"),
                    Err(e) => error!(error = %e, "pattern worker failed"),
                }
                result
            })
            .expect("spawning a pattern worker thread");

        Ok(Self { name, handle, matches: source, elapsed })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self) -> &MatchSource {
        &self.matches
    }

    /// Total wall-clock time the pattern's evaluation thread has spent
    /// draining its input so far, if it has started. Read through the
    /// handle cloned out of [`EvaluationDriver`] before the driver itself
    /// moved onto that thread.
    pub fn elapsed(&self) -> Option<Duration> {
        *self.elapsed.lock().unwrap()
    }

    /// Block until this pattern's worker thread exits (its input stream
    /// closed and it drained), returning whatever error it surfaced.
    pub fn join(self) -> CepResult<()> {
        self.handle
            .join()
            .unwrap_or_else(|_| panic!("pattern worker {} panicked", self.name))
    }
}
