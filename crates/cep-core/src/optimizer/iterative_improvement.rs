use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::blueprint::Blueprint;
use crate::error::CepResult;
use crate::pattern::Pattern;
use crate::stats::{order_cost, window_factor};

use super::{greedy, require_statistics, MoveKind, StartOrder};

/// Local search over left-deep orders: starting from a greedy or random
/// order, repeatedly apply a random move (pairwise swap, or three-way
/// rotation — "circle" — of positions) and keep it only if it lowers
/// [`order_cost`]. Runs for a fixed number of iterations; there is no
/// convergence test, matching the source algorithm's iteration-budget
/// termination. `StartOrder::Random` is intentionally not reproducible
/// run-to-run unless the caller pins its seed, the same caveat the
/// original's random-restart variant carries.
pub fn plan(
    pattern: &Pattern,
    start: StartOrder,
    move_kind: MoveKind,
    max_iterations: usize,
) -> CepResult<Blueprint> {
    let (selectivity, arrival_rates) = require_statistics(pattern)?;
    let window = window_factor(pattern.window);
    let n = pattern.args.len();

    let (mut rng, mut order) = match start {
        StartOrder::Greedy => (StdRng::seed_from_u64(0), greedy::order(pattern)?),
        StartOrder::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut order: Vec<usize> = (0..n).collect();
            for i in (1..order.len()).rev() {
                let j = rng.gen_range(0..=i);
                order.swap(i, j);
            }
            (rng, order)
        }
    };

    if n < 2 {
        return Ok(Blueprint::Order(order));
    }

    let mut best_cost = order_cost(&order, selectivity, arrival_rates, window);
    for _ in 0..max_iterations {
        let candidate = match move_kind {
            MoveKind::Swap => {
                let mut candidate = order.clone();
                let i = rng.gen_range(0..n);
                let j = rng.gen_range(0..n);
                candidate.swap(i, j);
                candidate
            }
            MoveKind::Circle => {
                if n < 3 {
                    let mut candidate = order.clone();
                    candidate.swap(0, 1);
                    candidate
                } else {
                    let mut positions = [0usize; 3];
                    positions[0] = rng.gen_range(0..n);
                    loop {
                        positions[1] = rng.gen_range(0..n);
                        if positions[1] != positions[0] {
                            break;
                        }
                    }
                    loop {
                        positions[2] = rng.gen_range(0..n);
                        if positions[2] != positions[0] && positions[2] != positions[1] {
                            break;
                        }
                    }
                    let mut candidate = order.clone();
                    let a = order[positions[0]];
                    let b = order[positions[1]];
                    let c = order[positions[2]];
                    candidate[positions[0]] = c;
                    candidate[positions[1]] = a;
                    candidate[positions[2]] = b;
                    candidate
                }
            }
        };

        let cost = order_cost(&candidate, selectivity, arrival_rates, window);
        if cost < best_cost {
            best_cost = cost;
            order = candidate;
        }
    }

    Ok(Blueprint::Order(order))
}
