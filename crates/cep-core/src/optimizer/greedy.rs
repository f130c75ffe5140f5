use crate::blueprint::Blueprint;
use crate::error::CepResult;
use crate::pattern::Pattern;

use crate::stats::window_factor;

use super::require_statistics;

/// Build a left-deep order by repeatedly appending whichever remaining
/// leaf contributes the least additional cost given what has already been
/// chosen: its own unary weight (`selectivity[i][i] * arrival_rates[i] *
/// window`) times its pairwise selectivity with every leaf already in the
/// order.
pub fn order(pattern: &Pattern) -> CepResult<Vec<usize>> {
    let (selectivity, arrival_rates) = require_statistics(pattern)?;
    let window = window_factor(pattern.window);
    let n = pattern.args.len();
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut chosen = Vec::with_capacity(n);

    while !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_cost = f64::INFINITY;
        for (pos, &i) in remaining.iter().enumerate() {
            let mut cost = selectivity[i][i] * arrival_rates[i] * window;
            for &j in &chosen {
                cost *= selectivity[i][j];
            }
            if cost < best_cost {
                best_cost = cost;
                best_idx = pos;
            }
        }
        chosen.push(remaining.remove(best_idx));
    }
    Ok(chosen)
}

pub fn plan(pattern: &Pattern) -> CepResult<Blueprint> {
    Ok(Blueprint::Order(order(pattern)?))
}
