use crate::domain::Sample;
use crate::numerics::deterministic_argsort;

/// Interior indices whose magnitude is strictly below both neighbours.
pub(crate) fn local_minima(samples: &[Sample]) -> Vec<usize> {
    if samples.len() < 3 {
        return Vec::new();
    }

    (1..samples.len() - 1)
        .filter(|&index| {
            let magnitude = samples[index].magnitude;
            magnitude < samples[index - 1].magnitude && magnitude < samples[index + 1].magnitude
        })
        .collect()
}

/// Greedy depth-first thinning: deepest candidates are kept first and any
/// candidate closer than `min_spacing` samples to a kept one is dropped.
///
/// The result is in selection order (deepest first).
pub(crate) fn select_deepest(
    samples: &[Sample],
    candidates: &[usize],
    min_spacing: usize,
) -> Vec<usize> {
    let depths: Vec<f64> = candidates
        .iter()
        .map(|&index| samples[index].magnitude)
        .collect();

    let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
    for position in deterministic_argsort(&depths) {
        let index = candidates[position];
        if kept
            .iter()
            .all(|&other| index.abs_diff(other) >= min_spacing)
        {
            kept.push(index);
        }
    }
    kept
}
