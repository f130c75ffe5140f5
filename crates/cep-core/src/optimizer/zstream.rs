use crate::blueprint::Blueprint;
use crate::error::CepResult;
use crate::pattern::Pattern;

use crate::stats::window_factor;

use super::{greedy, require_statistics};

struct Entry {
    cost: f64,
    weight: f64,
    blueprint: Blueprint,
}

/// Optimal tree restricted to contiguous splits of a fixed leaf order, by
/// interval dynamic programming: `dp[i][j]` is the best shape over
/// `order[i..=j]`, built from `dp[i][k]` and `dp[k+1][j]` for every split
/// point `k`. Unlike [`super::dp_bushy`], this only considers splits that
/// keep each side contiguous in `order`, trading shape optimality for a
/// cheaper `O(n^3)` search.
///
/// `seeded_by_greedy` selects `order` via [`greedy::order`]; otherwise the
/// pattern's original leaf order is used.
pub fn plan(pattern: &Pattern, seeded_by_greedy: bool) -> CepResult<Blueprint> {
    let (selectivity, arrival_rates) = require_statistics(pattern)?;
    let window = window_factor(pattern.window);
    let order = if seeded_by_greedy {
        greedy::order(pattern)?
    } else {
        (0..pattern.args.len()).collect()
    };
    Ok(plan_for_order(&order, selectivity, arrival_rates, window))
}

fn plan_for_order(order: &[usize], selectivity: &[Vec<f64>], arrival_rates: &[f64], window: f64) -> Blueprint {
    let n = order.len();
    if n == 1 {
        return Blueprint::Leaf(order[0]);
    }

    // dp[i][j] indexed by interval length via a flat table to avoid
    // fighting the borrow checker over a triangular Vec<Vec<Option<Entry>>>.
    let mut dp: Vec<Option<Entry>> = (0..n * n).map(|_| None).collect();
    let idx = |i: usize, j: usize| i * n + j;

    for (i, &leaf) in order.iter().enumerate() {
        let weight = selectivity[leaf][leaf] * arrival_rates[leaf] * window;
        dp[idx(i, i)] = Some(Entry {
            cost: weight,
            weight,
            blueprint: Blueprint::Leaf(leaf),
        });
    }

    for len in 2..=n {
        for i in 0..=(n - len) {
            let j = i + len - 1;
            let mut best: Option<Entry> = None;
            for k in i..j {
                let (left, right) = (&dp[idx(i, k)], &dp[idx(k + 1, j)]);
                if let (Some(left), Some(right)) = (left, right) {
                    let leaves_left = &order[i..=k];
                    let leaves_right = &order[k + 1..=j];
                    let cross: f64 = leaves_left
                        .iter()
                        .flat_map(|&a| leaves_right.iter().map(move |&b| selectivity[a][b]))
                        .product();
                    let combined_weight = left.weight * right.weight * cross;
                    let cost = left.cost + right.cost + combined_weight;
                    if best.as_ref().map(|b| cost < b.cost).unwrap_or(true) {
                        best = Some(Entry {
                            cost,
                            weight: combined_weight,
                            blueprint: Blueprint::Pair(
                                Box::new(left.blueprint.clone()),
                                Box::new(right.blueprint.clone()),
                            ),
                        });
                    }
                }
            }
            dp[idx(i, j)] = best;
        }
    }

    dp[idx(0, n - 1)]
        .take()
        .expect("the full interval always has a recorded shape")
        .blueprint
}
