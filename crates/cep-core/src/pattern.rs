use std::collections::HashMap;
use std::time::Duration;

use crate::formula::Formula;

/// One leaf of a pattern: an event type bound to a name used by the
/// pattern's condition and referenced in output bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafDesc {
    pub event_type: String,
    pub name: String,
}

impl LeafDesc {
    pub fn new(event_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            name: name.into(),
        }
    }
}

/// Top-level composition operator for a pattern's leaves.
///
/// `Seq` requires its operand matches to occur in leaf order (each match's
/// event strictly later than the previous); `And` imposes no order beyond
/// what the window and condition enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopOp {
    Seq,
    And,
}

/// The sliding window a pattern's matches must fit inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window {
    Bounded(Duration),
    Unbounded,
}

impl Window {
    pub fn contains(&self, first_date: i64, last_date: i64) -> bool {
        match self {
            Window::Unbounded => true,
            Window::Bounded(d) => (last_date - first_date) <= d.as_millis() as i64,
        }
    }
}

/// Statistics supplied (or withheld) to an optimizer for ordering/shaping
/// the evaluation tree — of exactly one kind at a time, mirroring the
/// source's `setAdditionalStatistics`, which accepts either a frequency
/// dict or a `(selectivity, arrival_rates)` pair but never both.
///
/// `selectivity_matrix[i][j]` is the fraction of (i, j) event pairs
/// expected to survive the condition restricted to `{i, j}`; diagonal
/// entries are the unary selectivity of leaf `i` alone. `arrival_rates[i]`
/// is leaf `i`'s expected events-per-unit-time. `Frequency` is the
/// cheaper alternative some optimizers (ascending-frequency) need: a raw
/// `event_type -> count` map, with no pairwise sampling.
#[derive(Debug, Clone, PartialEq)]
pub enum Statistics {
    None,
    Frequency(HashMap<String, u64>),
    Selectivity {
        selectivity_matrix: Vec<Vec<f64>>,
        arrival_rates: Vec<f64>,
    },
}

/// A pattern to evaluate: which event types compose it, under which
/// operator, subject to which condition and window, plus any statistics an
/// optimizer may use to choose an evaluation order/shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub top_op: TopOp,
    pub args: Vec<LeafDesc>,
    pub condition: Formula,
    pub window: Window,
    pub statistics: Statistics,
}

impl Pattern {
    pub fn new(top_op: TopOp, args: Vec<LeafDesc>, condition: Formula, window: Window) -> Self {
        Self {
            top_op,
            args,
            condition,
            window,
            statistics: Statistics::None,
        }
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = statistics;
        self
    }

    /// Attach selectivity-matrix + arrival-rate statistics, as an
    /// optimizer that needs pairwise selectivity would require.
    pub fn with_selectivity_and_rates(self, selectivity_matrix: Vec<Vec<f64>>, arrival_rates: Vec<f64>) -> Self {
        self.with_statistics(Statistics::Selectivity {
            selectivity_matrix,
            arrival_rates,
        })
    }

    /// Attach a frequency-map statistics, as [`crate::optimizer::ascending_frequency`]
    /// or any caller that only needs relative event-type volume would use.
    pub fn with_frequency_map(self, frequency: HashMap<String, u64>) -> Self {
        self.with_statistics(Statistics::Frequency(frequency))
    }

    pub fn name_at(&self, index: usize) -> &str {
        &self.args[index].name
    }
}
