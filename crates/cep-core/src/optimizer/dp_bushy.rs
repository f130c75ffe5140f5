use crate::blueprint::Blueprint;
use crate::error::CepResult;
use crate::pattern::Pattern;

use crate::stats::window_factor;

use super::require_statistics;

/// `dp[mask]` for the optimal bushy shape over exactly the leaves in
/// `mask`: its cost, its combined weight (used by a parent bipartition to
/// price joining this subtree against its sibling), and the shape itself.
struct Entry {
    cost: f64,
    weight: f64,
    blueprint: Blueprint,
}

/// Optimal bushy (not-necessarily-left-deep) tree by subset dynamic
/// programming: for every subset of leaves, try every way of splitting it
/// into two nonempty disjoint halves and keep the cheapest combination.
///
/// To enumerate each bipartition exactly once, the lowest set bit of
/// `mask` is fixed into the left half `a`; every other subset of `mask`
/// containing that bit, paired with its complement, is a distinct
/// bipartition.
pub fn plan(pattern: &Pattern) -> CepResult<Blueprint> {
    let (selectivity, arrival_rates) = require_statistics(pattern)?;
    let window = window_factor(pattern.window);
    let n = pattern.args.len();
    let full = (1usize << n) - 1;

    let mut dp: Vec<Option<Entry>> = (0..1usize << n).map(|_| None).collect();
    for i in 0..n {
        let weight = selectivity[i][i] * arrival_rates[i] * window;
        dp[1 << i] = Some(Entry {
            cost: weight,
            weight,
            blueprint: Blueprint::Leaf(i),
        });
    }

    for mask in 1..=full {
        if mask.count_ones() < 2 {
            continue;
        }
        let witness = mask & mask.wrapping_neg();
        let mut best: Option<Entry> = None;

        // Enumerate every subset of `mask` that contains `witness`, by
        // walking submasks of the remaining bits and OR-ing `witness` back
        // in — the standard submask-with-a-fixed-bit trick.
        let other_bits = mask ^ witness;
        let mut sub = other_bits;
        loop {
            let a = sub | witness;
            let b = mask ^ a;
            if b != 0 {
                if let (Some(left), Some(right)) = (dp[a].as_ref(), dp[b].as_ref()) {
                    let leaves_a = leaf_indices(&left.blueprint);
                    let leaves_b = leaf_indices(&right.blueprint);
                    let cross: f64 = leaves_a
                        .iter()
                        .flat_map(|&i| leaves_b.iter().map(move |&j| selectivity[i][j]))
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
            if sub == 0 {
                break;
            }
            sub = (sub - 1) & other_bits;
        }

        dp[mask] = best;
    }

    let entry = dp[full].take().expect("full mask always has a recorded shape");
    Ok(entry.blueprint)
}

fn leaf_indices(blueprint: &Blueprint) -> Vec<usize> {
    let mut out = Vec::new();
    collect(blueprint, &mut out);
    out
}

fn collect(blueprint: &Blueprint, out: &mut Vec<usize>) {
    match blueprint {
        Blueprint::Leaf(i) => out.push(*i),
        Blueprint::Pair(l, r) => {
            collect(l, out);
            collect(r, out);
        }
        Blueprint::Order(order) => out.extend(order.iter().copied()),
    }
}
