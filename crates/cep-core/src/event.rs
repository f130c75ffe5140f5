use std::collections::HashMap;
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::value::Value;

/// A single timestamped occurrence, immutable after construction.
///
/// Timestamps are monotonic in stream order; ties are broken by `counter`,
/// a stream-assigned sequence number, which gives a total order wherever
/// timestamps alone do not (the sequence guard in [`crate::tree`] relies on
/// this pair).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub payload: HashMap<String, Value>,
    pub event_type: String,
    pub timestamp: i64,
    pub counter: u64,
}

impl Event {
    pub fn new(event_type: impl Into<String>, timestamp: i64, counter: u64) -> Self {
        Self {
            payload: HashMap::new(),
            event_type: event_type.into(),
            timestamp,
            counter,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.payload.insert(name.into(), value);
        self
    }
}

enum StreamMsg {
    Event(Event),
    Close,
}

/// An ordered, blocking, closable FIFO of events.
///
/// Producers push events and `close()` from one thread; a consumer (or
/// several, independently, via [`Stream::duplicate`]) blocks on `pop()`.
/// `duplicate()` snapshots everything pushed so far into a fresh, already
/// populated stream — used for the offline statistics pass over a sample of
/// the input (see [`crate::stats`]), where the original source is read again
/// without disturbing the live consumer.
pub struct Stream {
    sender: Sender<StreamMsg>,
    receiver: Receiver<StreamMsg>,
    recorded: Mutex<Vec<Event>>,
    next_counter: Mutex<u64>,
}

impl Stream {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            recorded: Mutex::new(Vec::new()),
            next_counter: Mutex::new(0),
        }
    }

    /// Push an event, assigning it the next stream counter.
    pub fn push(&self, mut event: Event) {
        {
            let mut next = self.next_counter.lock().unwrap();
            event.counter = *next;
            *next += 1;
        }
        self.recorded.lock().unwrap().push(event.clone());
        let _ = self.sender.send(StreamMsg::Event(event));
    }

    /// Push an event whose counter was already assigned by the caller
    /// (used by CSV ingestion, which derives counters from line order).
    pub fn push_with_counter(&self, event: Event) {
        self.recorded.lock().unwrap().push(event.clone());
        let _ = self.sender.send(StreamMsg::Event(event));
    }

    /// Blocking pop. Returns `None` once the stream has been closed and
    /// drained.
    pub fn pop(&self) -> Option<Event> {
        match self.receiver.recv() {
            Ok(StreamMsg::Event(e)) => Some(e),
            Ok(StreamMsg::Close) | Err(_) => None,
        }
    }

    /// Close the stream. Idempotent enough for single-producer use: the
    /// close sentinel is sent once.
    pub fn close(&self) {
        let _ = self.sender.send(StreamMsg::Close);
    }

    /// Snapshot-duplicate every event pushed so far into a fresh, closed
    /// stream, for an offline statistics pass.
    pub fn duplicate(&self) -> Stream {
        let dup = Stream::new();
        for event in self.recorded.lock().unwrap().iter() {
            dup.push_with_counter(event.clone());
        }
        dup.close();
        dup
    }

    /// Iterate the events recorded so far without consuming the live
    /// channel — used by statistics collection which needs random access
    /// (first/last timestamp, per-type counts).
    pub fn recorded(&self) -> Vec<Event> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}
