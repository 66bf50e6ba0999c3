use crate::domain::{CrossingSide, FeatureRejection, ResonanceFeature, Sample};
use crate::numerics::{interpolate_level_crossing, parabolic_vertex};

/// Sub-sample estimate of the minimum at `index`. Boundary indices and
/// degenerate fits keep the raw sample.
pub(crate) fn refine_minimum(samples: &[Sample], index: usize) -> Sample {
    if index == 0 || index + 1 >= samples.len() {
        return samples[index];
    }

    parabolic_vertex(samples[index - 1], samples[index], samples[index + 1])
        .unwrap_or(samples[index])
}

/// Builds the feature around candidate `index`: refined minimum plus the
/// nearest `threshold_db` crossings on each side.
pub(crate) fn locate_feature(
    samples: &[Sample],
    index: usize,
    threshold_db: f64,
) -> Result<ResonanceFeature, FeatureRejection> {
    let resonance = refine_minimum(samples, index);
    let level = resonance.magnitude + threshold_db;

    let left = (0..index)
        .rev()
        .find(|&outer| samples[outer].magnitude > level && samples[outer + 1].magnitude <= level)
        .map(|outer| crossing_sample(samples[outer + 1], samples[outer], level))
        .ok_or(FeatureRejection::MissingCrossing {
            side: CrossingSide::Left,
            level_db: level,
        })?;

    let right = (index + 1..samples.len())
        .find(|&outer| samples[outer].magnitude > level && samples[outer - 1].magnitude <= level)
        .map(|outer| crossing_sample(samples[outer - 1], samples[outer], level))
        .ok_or(FeatureRejection::MissingCrossing {
            side: CrossingSide::Right,
            level_db: level,
        })?;

    ResonanceFeature::new(left, resonance, right)
}

fn crossing_sample(inner: Sample, outer: Sample, level: f64) -> Sample {
    Sample::new(interpolate_level_crossing(inner, outer, level), level)
}

#[cfg(test)]
mod tests {
    use super::{locate_feature, refine_minimum};
    use crate::domain::{CrossingSide, FeatureRejection, Sample};

    fn single_dip() -> Vec<Sample> {
        vec![
            Sample::new(1.0, -1.0),
            Sample::new(1.5, -1.0),
            Sample::new(2.0, -15.0),
            Sample::new(2.5, -1.0),
            Sample::new(3.0, -1.0),
        ]
    }

    #[test]
    fn boundary_candidates_are_not_refined() {
        let samples = single_dip();
        assert_eq!(refine_minimum(&samples, 0), samples[0]);
        assert_eq!(refine_minimum(&samples, 4), samples[4]);
    }

    #[test]
    fn flat_neighbourhood_falls_back_to_raw_sample() {
        let samples = vec![
            Sample::new(1.0, -3.0),
            Sample::new(2.0, -3.0),
            Sample::new(3.0, -3.0),
        ];
        assert_eq!(refine_minimum(&samples, 1), samples[1]);
    }

    #[test]
    fn crossings_are_interpolated_at_threshold_level() {
        let feature = locate_feature(&single_dip(), 2, 3.0).expect("dip should resolve");

        let left = feature.left_crossing();
        let right = feature.right_crossing();
        assert!((left.frequency - (1.5 + 0.5 * 11.0 / 14.0)).abs() < 1.0e-12);
        assert!((right.frequency - (2.0 + 0.5 * 3.0 / 14.0)).abs() < 1.0e-12);
        assert_eq!(left.magnitude, -12.0);
        assert_eq!(right.magnitude, -12.0);
        assert!((feature.resonance().frequency - 2.0).abs() < 1.0e-12);
        assert!((feature.resonance().magnitude + 15.0).abs() < 1.0e-12);
    }

    #[test]
    fn dip_running_into_the_sweep_edge_is_rejected() {
        let samples = vec![
            Sample::new(1.0, -14.5),
            Sample::new(1.5, -14.8),
            Sample::new(2.0, -15.0),
            Sample::new(2.5, -1.0),
        ];
        let rejection = locate_feature(&samples, 2, 3.0).expect_err("left side never rises");
        assert!(matches!(
            rejection,
            FeatureRejection::MissingCrossing {
                side: CrossingSide::Left,
                ..
            }
        ));
    }
}
