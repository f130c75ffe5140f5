use crate::blueprint::Blueprint;
use crate::error::CepResult;
use crate::pattern::Pattern;

use crate::stats::window_factor;

use super::require_statistics;

/// Optimal left-deep order by subset dynamic programming: `dp[mask]`
/// holds the cheapest way to have already bound exactly the leaves in
/// `mask`, as `(total_cost, running_selectivity_product, last_leaf)`.
/// Extending `mask` by one leaf only needs that running product, not the
/// whole history, since the cost contributed by each new leaf is its own
/// weight times its pairwise selectivity with everything already bound.
pub fn plan(pattern: &Pattern) -> CepResult<Blueprint> {
    Ok(Blueprint::Order(order(pattern)?))
}

pub fn order(pattern: &Pattern) -> CepResult<Vec<usize>> {
    let (selectivity, arrival_rates) = require_statistics(pattern)?;
    let window = window_factor(pattern.window);
    let n = pattern.args.len();
    let full = (1usize << n) - 1;

    // dp[mask] = Some((cost, running_product, last_leaf))
    let mut dp: Vec<Option<(f64, f64, usize)>> = vec![None; 1 << n];
    dp[0] = Some((0.0, 1.0, usize::MAX));

    for mask in 1..=full {
        let mut best: Option<(f64, f64, usize)> = None;
        for last in 0..n {
            if mask & (1 << last) == 0 {
                continue;
            }
            let prev_mask = mask & !(1 << last);
            let Some((prev_cost, prev_product, _)) = dp[prev_mask] else {
                continue;
            };
            let mut running = prev_product * selectivity[last][last] * arrival_rates[last] * window;
            let mut other = prev_mask;
            while other != 0 {
                let j = other.trailing_zeros() as usize;
                running *= selectivity[last][j];
                other &= other - 1;
            }
            let cost = prev_cost + running;
            if best.map(|(c, ..)| cost < c).unwrap_or(true) {
                best = Some((cost, running, last));
            }
        }
        dp[mask] = best;
    }

    let mut order = Vec::with_capacity(n);
    let mut mask = full;
    while mask != 0 {
        let (_, _, last) = dp[mask].expect("reachable mask always has a recorded choice");
        order.push(last);
        mask &= !(1 << last);
    }
    order.reverse();
    Ok(order)
}
