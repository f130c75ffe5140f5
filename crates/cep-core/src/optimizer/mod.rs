pub mod ascending_frequency;
pub mod dp_bushy;
pub mod dp_left_deep;
pub mod greedy;
pub mod iterative_improvement;
pub mod trivial;
pub mod zstream;

use crate::blueprint::Blueprint;
use crate::error::{CepError, CepResult};
use crate::pattern::{Pattern, Statistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Swap,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOrder {
    Greedy,
    Random { seed: u64 },
}

/// Which strategy to use for turning a [`Pattern`] into an evaluation
/// [`Blueprint`].
///
/// A closed enum rather than a `dyn Optimizer` trait object, matching the
/// rest of the tree/condition model: every strategy the original exposes
/// is known up front, so dispatch is an exhaustive match instead of
/// dynamic dispatch through a vtable.
#[derive(Debug, Clone)]
pub enum Optimizer {
    /// Left-deep chain in the pattern's original leaf order. No
    /// statistics required.
    Trivial,
    /// Left-deep chain ordered by ascending arrival rate.
    AscendingFrequency,
    /// Left-deep chain built by repeatedly picking the cheapest next leaf.
    Greedy,
    /// Left-deep chain, optimal order found by subset dynamic programming.
    DpLeftDeep,
    /// Local search (swap or circle moves) starting from a greedy or
    /// random order.
    IterativeImprovement {
        start: StartOrder,
        move_kind: MoveKind,
        max_iterations: usize,
    },
    /// Optimal bushy (not necessarily left-deep) tree shape found by
    /// subset dynamic programming over disjoint bipartitions.
    DpBushy,
    /// Optimal bushy tree restricted to contiguous splits of a fixed
    /// order, found by interval dynamic programming. `seeded_by_greedy`
    /// chooses that order via [`greedy::order`] rather than the
    /// pattern's original leaf order.
    ZStream { seeded_by_greedy: bool },
}

impl Optimizer {
    pub fn plan(&self, pattern: &Pattern) -> CepResult<Blueprint> {
        match self {
            Optimizer::Trivial => Ok(trivial::plan(pattern)),
            Optimizer::AscendingFrequency => ascending_frequency::plan(pattern),
            Optimizer::Greedy => greedy::plan(pattern),
            Optimizer::DpLeftDeep => dp_left_deep::plan(pattern),
            Optimizer::IterativeImprovement {
                start,
                move_kind,
                max_iterations,
            } => iterative_improvement::plan(pattern, *start, *move_kind, *max_iterations),
            Optimizer::DpBushy => dp_bushy::plan(pattern),
            Optimizer::ZStream { seeded_by_greedy } => zstream::plan(pattern, *seeded_by_greedy),
        }
    }
}

pub(crate) fn require_statistics(pattern: &Pattern) -> CepResult<(&Vec<Vec<f64>>, &Vec<f64>)> {
    match &pattern.statistics {
        Statistics::Selectivity {
            selectivity_matrix,
            arrival_rates,
        } => Ok((selectivity_matrix, arrival_rates)),
        Statistics::None => Err(CepError::MissingStatistics),
    }
}
