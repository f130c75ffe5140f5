use std::collections::HashMap;

use crate::event::Stream;
use crate::formula::Formula;
use crate::pattern::{LeafDesc, Statistics, Window};

/// Count occurrences of each leaf's event type in a recorded stream,
/// keyed by leaf index.
pub fn occurrence_counts(args: &[LeafDesc], stream: &Stream) -> Vec<u64> {
    let events = stream.recorded();
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for event in &events {
        *counts.entry(event.event_type.as_str()).or_insert(0) += 1;
    }
    args.iter()
        .map(|leaf| *counts.get(leaf.event_type.as_str()).unwrap_or(&0))
        .collect()
}

/// Arrival rate (events per millisecond of stream span) for each leaf.
pub fn arrival_rates(args: &[LeafDesc], stream: &Stream) -> Vec<f64> {
    let events = stream.recorded();
    let span = match (events.first(), events.last()) {
        (Some(first), Some(last)) => ((last.timestamp - first.timestamp).max(1)) as f64,
        _ => 1.0,
    };
    occurrence_counts(args, stream)
        .into_iter()
        .map(|count| count as f64 / span)
        .collect()
}

/// Estimate the selectivity of `condition` restricted to the pair
/// `(args[i], args[j])`, by sampling pairs from the recorded stream and
/// measuring the fraction that satisfy the projected condition. The
/// diagonal (`i == j`) is the unary selectivity: the fraction of
/// individual events of that type which satisfy whatever unary
/// restriction of `condition` applies to just that name.
pub fn selectivity_matrix(args: &[LeafDesc], condition: &Formula, stream: &Stream) -> Vec<Vec<f64>> {
    let n = args.len();
    let events = stream.recorded();
    let mut by_type: HashMap<&str, Vec<&crate::event::Event>> = HashMap::new();
    for event in &events {
        by_type.entry(event.event_type.as_str()).or_default().push(event);
    }

    let mut matrix = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            let names = if i == j {
                vec![args[i].name.clone()]
            } else {
                vec![args[i].name.clone(), args[j].name.clone()]
            };
            let projected = condition.project(&names);
            let empty_i = Vec::new();
            let empty_j = Vec::new();
            let events_i = by_type.get(args[i].event_type.as_str()).unwrap_or(&empty_i);
            let events_j = by_type.get(args[j].event_type.as_str()).unwrap_or(&empty_j);
            matrix[i][j] = sample_selectivity(&projected, &args[i].name, events_i, &args[j].name, events_j);
        }
    }
    matrix
}

fn sample_selectivity(
    condition: &Formula,
    name_i: &str,
    events_i: &[&crate::event::Event],
    name_j: &str,
    events_j: &[&crate::event::Event],
) -> f64 {
    if matches!(condition, Formula::True) {
        return 1.0;
    }
    if events_i.is_empty() || events_j.is_empty() {
        return 1.0;
    }
    let mut total = 0usize;
    let mut satisfied = 0usize;
    for a in events_i {
        for b in events_j {
            let mut binding = HashMap::new();
            binding.insert(name_i.to_string(), *a);
            binding.insert(name_j.to_string(), *b);
            total += 1;
            if condition.eval(&binding) {
                satisfied += 1;
            }
        }
    }
    if total == 0 {
        1.0
    } else {
        satisfied as f64 / total as f64
    }
}

/// Collect both halves of a [`Statistics::Selectivity`] from a sample
/// stream, as the offline step an optimizer's caller runs once before
/// choosing a [`crate::blueprint::Blueprint`].
pub fn collect_statistics(args: &[LeafDesc], condition: &Formula, sample: &Stream) -> Statistics {
    Statistics::Selectivity {
        selectivity_matrix: selectivity_matrix(args, condition, sample),
        arrival_rates: arrival_rates(args, sample),
    }
}

/// Collect a [`Statistics::Frequency`] map (`event_type -> count`) from a
/// sample stream — the cheaper statistics kind, with no pairwise sampling,
/// for callers (e.g. [`crate::optimizer::ascending_frequency`]) that only
/// need relative event-type volume rather than a full selectivity matrix.
pub fn collect_frequency_map(sample: &Stream) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for event in sample.recorded() {
        *counts.entry(event.event_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// A pattern's window, converted into the `w` factor spec §4.7's cost
/// formulas multiply into each leaf's per-binding weight. A bounded window
/// contributes its own width in seconds — a wider window lets more pairs
/// of events survive together, raising the expected number of partial
/// matches the same way a higher arrival rate or selectivity would. An
/// unbounded window has no finite width to contribute; treating it as a
/// neutral `1.0` keeps cost comparisons across optimizers well-defined
/// instead of everything going to infinity together.
pub fn window_factor(window: Window) -> f64 {
    match window {
        Window::Bounded(d) => d.as_secs_f64(),
        Window::Unbounded => 1.0,
    }
}

/// Cost of evaluating `order` (a permutation of leaf indices) left-deep,
/// as in the source `calculateOrderCostFunction`: the cost of binding the
/// `k`-th leaf in the order is its own unary selectivity times its
/// arrival rate times the window factor `w` times the product of its
/// pairwise selectivities with every leaf already bound, and the order's
/// total cost is the sum of partial-product costs across all prefixes.
pub fn order_cost(order: &[usize], selectivity: &[Vec<f64>], arrival_rates: &[f64], window: f64) -> f64 {
    let mut total = 0.0;
    let mut running_product = 1.0;
    for (k, &i) in order.iter().enumerate() {
        running_product *= selectivity[i][i] * arrival_rates[i] * window;
        for &j in &order[..k] {
            running_product *= selectivity[i][j];
        }
        total += running_product;
    }
    total
}

/// Recursive tree-shaped counterpart of [`order_cost`]: a leaf costs its
/// own arrival rate times its window factor, and an internal node costs
/// the sum of its children's costs plus the product of both children's
/// unary selectivities and arrival rates scaled by their cross
/// selectivity — mirroring `calculateTreeCostFunctionHelper`'s per-subtree
/// (cost, selectivity, probability) accumulation.
pub fn tree_cost(
    blueprint: &crate::blueprint::Blueprint,
    selectivity: &[Vec<f64>],
    arrival_rates: &[f64],
    window: f64,
) -> f64 {
    tree_cost_helper(blueprint, selectivity, arrival_rates, window).0
}

/// Returns `(cost, combined_selectivity_weight)` for the subtree.
fn tree_cost_helper(
    blueprint: &crate::blueprint::Blueprint,
    selectivity: &[Vec<f64>],
    arrival_rates: &[f64],
    window: f64,
) -> (f64, f64) {
    match blueprint {
        crate::blueprint::Blueprint::Leaf(i) => {
            let weight = selectivity[*i][*i] * arrival_rates[*i] * window;
            (weight, weight)
        }
        crate::blueprint::Blueprint::Pair(l, r) => {
            let (left_cost, left_weight) = tree_cost_helper(l, selectivity, arrival_rates, window);
            let (right_cost, right_weight) = tree_cost_helper(r, selectivity, arrival_rates, window);
            let leaves_l = leaf_indices(l);
            let leaves_r = leaf_indices(r);
            let cross: f64 = leaves_l
                .iter()
                .flat_map(|&i| leaves_r.iter().map(move |&j| selectivity[i][j]))
                .product();
            let combined_weight = left_weight * right_weight * cross;
            (left_cost + right_cost + combined_weight, combined_weight)
        }
        crate::blueprint::Blueprint::Order(order) => {
            (order_cost(order, selectivity, arrival_rates, window), 1.0)
        }
    }
}

fn leaf_indices(blueprint: &crate::blueprint::Blueprint) -> Vec<usize> {
    let mut out = Vec::new();
    collect(blueprint, &mut out);
    out
}

fn collect(blueprint: &crate::blueprint::Blueprint, out: &mut Vec<usize>) {
    match blueprint {
        crate::blueprint::Blueprint::Leaf(i) => out.push(*i),
        crate::blueprint::Blueprint::Pair(l, r) => {
            collect(l, out);
            collect(r, out);
        }
        crate::blueprint::Blueprint::Order(order) => out.extend(order.iter().copied()),
    }
}
