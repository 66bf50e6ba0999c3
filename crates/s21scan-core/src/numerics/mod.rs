use crate::common::FrequencyWindow;
use crate::common::constants::PARAMETER_MATCH_TOLERANCE;
use crate::domain::Sample;

/// Indices of `values` ordered ascending, ties broken by index.
pub fn deterministic_argsort(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_unstable_by(|lhs, rhs| {
        values[*lhs]
            .total_cmp(&values[*rhs])
            .then_with(|| lhs.cmp(rhs))
    });
    indices
}

/// Vertex of the parabola through three samples in (frequency, magnitude)
/// space.
///
/// Returns `None` when the fit is degenerate: repeated frequencies or zero
/// curvature (collinear points).
pub fn parabolic_vertex(left: Sample, centre: Sample, right: Sample) -> Option<Sample> {
    let h_left = left.frequency - centre.frequency;
    let h_right = right.frequency - centre.frequency;
    let d_left = left.magnitude - centre.magnitude;
    let d_right = right.magnitude - centre.magnitude;

    let denominator = h_left * h_right * (h_right - h_left);
    if denominator == 0.0 {
        return None;
    }

    let curvature = (d_right * h_left - d_left * h_right) / denominator;
    if curvature == 0.0 || !curvature.is_finite() {
        return None;
    }
    let slope = (d_left * h_right * h_right - d_right * h_left * h_left) / denominator;

    let offset = -slope / (2.0 * curvature);
    let vertex = Sample::new(
        centre.frequency + offset,
        centre.magnitude - slope * slope / (4.0 * curvature),
    );
    (vertex.frequency.is_finite() && vertex.magnitude.is_finite()).then_some(vertex)
}

/// Frequency at which the segment `inner -> outer` passes through `level`.
///
/// The caller guarantees `outer.magnitude > level >= inner.magnitude`, so the
/// segment is never flat.
pub fn interpolate_level_crossing(inner: Sample, outer: Sample, level: f64) -> f64 {
    let ratio = (level - inner.magnitude) / (outer.magnitude - inner.magnitude);
    inner.frequency + (outer.frequency - inner.frequency) * ratio
}

/// Parameter values from text headers compare equal within a tight absolute
/// slack scaled by magnitude.
pub fn values_match(lhs: f64, rhs: f64) -> bool {
    let scale = lhs.abs().max(rhs.abs()).max(1.0);
    (lhs - rhs).abs() <= PARAMETER_MATCH_TOLERANCE * scale
}

/// Sorted distinct values under [`values_match`].
pub fn distinct_values(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|next, kept| values_match(*next, *kept));
    sorted
}

pub fn windowed_samples(samples: &[Sample], window: Option<FrequencyWindow>) -> Vec<Sample> {
    match window {
        Some(window) => samples
            .iter()
            .copied()
            .filter(|sample| window.contains(sample.frequency))
            .collect(),
        None => samples.to_vec(),
    }
}
