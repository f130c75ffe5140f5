use crate::blueprint::Blueprint;
use crate::error::{CepError, CepResult};
use crate::pattern::{Pattern, Statistics};

/// Left-deep chain ordered by ascending arrival rate: rarer event types
/// bind first, pruning the partial-match set as early as possible.
///
/// Unlike the other statistics-driven optimizers, this only needs
/// relative event-type volume, so it accepts either statistics kind: a
/// full [`Statistics::Selectivity`]'s `arrival_rates`, or the cheaper
/// [`Statistics::Frequency`] map (raw counts stand in for rates, since
/// only their relative order matters here).
pub fn plan(pattern: &Pattern) -> CepResult<Blueprint> {
    let rates = leaf_rates(pattern)?;
    let mut order: Vec<usize> = (0..pattern.args.len()).collect();
    order.sort_by(|&a, &b| rates[a].partial_cmp(&rates[b]).unwrap());
    Ok(Blueprint::Order(order))
}

fn leaf_rates(pattern: &Pattern) -> CepResult<Vec<f64>> {
    match &pattern.statistics {
        Statistics::Selectivity { arrival_rates, .. } => Ok(arrival_rates.clone()),
        Statistics::Frequency(counts) => Ok(pattern
            .args
            .iter()
            .map(|leaf| *counts.get(&leaf.event_type).unwrap_or(&0) as f64)
            .collect()),
        Statistics::None => Err(CepError::MissingStatistics),
    }
}
