//! Resonance dip extraction.
//!
//! Candidates are strict local minima, thinned deepest-first, refined with a
//! three-point parabola, bounded by interpolated `threshold_db` crossings and
//! finally screened for physical plausibility. Results are only meaningful
//! for frequency-ascending samples; unsorted input is processed as-is and
//! logged.
//!
//! An empty result is a valid outcome ("no resonance in this record"), never
//! an error. Callers that need a resonance decide that for themselves.

mod candidates;
mod crossing;
mod validity;

use super::FeatureExtractor;
use crate::common::ExtractionConfig;
use crate::common::constants::{MIN_SAMPLES_FOR_FEATURES, PARALLEL_RECORD_THRESHOLD};
use crate::domain::{Record, ResonanceFeature, Sample};
use crate::numerics::windowed_samples;
use rayon::prelude::*;
use std::borrow::Cow;
use tracing::{debug, warn};

use candidates::{local_minima, select_deepest};
use crossing::locate_feature;
use validity::check_validity;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DipExtractor {
    config: ExtractionConfig,
}

impl DipExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Validated features ordered by ascending resonance frequency.
    pub fn extract_features(&self, samples: &[Sample]) -> Vec<ResonanceFeature> {
        let windowed;
        let samples = match self.config.window {
            Some(window) => {
                windowed = windowed_samples(samples, Some(window));
                windowed.as_slice()
            }
            None => samples,
        };

        if samples.len() < MIN_SAMPLES_FOR_FEATURES {
            debug!(
                sample_count = samples.len(),
                "too few samples for resonance extraction"
            );
            return Vec::new();
        }

        if !samples
            .windows(2)
            .all(|pair| pair[0].frequency <= pair[1].frequency)
        {
            warn!("samples are not frequency-ascending; resonance features may be wrong");
        }

        let candidates = local_minima(samples);
        let selected = select_deepest(samples, &candidates, self.config.min_spacing);

        let mut features: Vec<ResonanceFeature> = selected
            .into_iter()
            .filter_map(|index| {
                let outcome = locate_feature(samples, index, self.config.threshold_db).and_then(
                    |feature| check_validity(&feature, &self.config.validity).map(|()| feature),
                );
                match outcome {
                    Ok(feature) => Some(feature),
                    Err(rejection) => {
                        debug!(
                            index,
                            frequency_ghz = samples[index].frequency,
                            %rejection,
                            "dropping resonance candidate"
                        );
                        None
                    }
                }
            })
            .collect();

        features.sort_by(|lhs, rhs| {
            lhs.resonance_frequency()
                .total_cmp(&rhs.resonance_frequency())
        });
        features
    }

    /// Features for a record through its compute-once cache.
    pub fn record_features<'r>(&self, record: &'r Record) -> Cow<'r, [ResonanceFeature]> {
        record.features_with(&self.config, |samples| self.extract_features(samples))
    }

    /// Extracts every record, in parallel once there are enough of them.
    /// Output order follows `records`.
    pub fn extract_records<'r>(&self, records: &'r [Record]) -> Vec<Cow<'r, [ResonanceFeature]>> {
        if records.len() >= PARALLEL_RECORD_THRESHOLD {
            records
                .par_iter()
                .map(|record| self.record_features(record))
                .collect()
        } else {
            records
                .iter()
                .map(|record| self.record_features(record))
                .collect()
        }
    }
}

impl FeatureExtractor for DipExtractor {
    fn extract(&self, samples: &[Sample]) -> Vec<ResonanceFeature> {
        self.extract_features(samples)
    }

    fn features_for<'r>(&self, record: &'r Record) -> Cow<'r, [ResonanceFeature]> {
        self.record_features(record)
    }
}

#[cfg(test)]
mod tests {
    use super::DipExtractor;
    use crate::common::{ExtractionConfig, FrequencyWindow, ValidityCriteria};
    use crate::domain::{ParameterSet, Record, Sample};

    /// Lorentzian-like notches on a 0 dB floor, sampled every 10 MHz.
    fn notch_curve(notches: &[(f64, f64, f64)]) -> Vec<Sample> {
        (0..=400)
            .map(|step| {
                let frequency = 1.0 + 0.01 * step as f64;
                let magnitude = notches
                    .iter()
                    .map(|&(centre, depth, half_width)| {
                        let x = (frequency - centre) / half_width;
                        -depth / (1.0 + x * x)
                    })
                    .sum::<f64>();
                Sample::new(frequency, magnitude)
            })
            .collect()
    }

    #[test]
    fn two_notches_come_back_in_frequency_order() {
        let samples = notch_curve(&[(3.6, 12.0, 0.03), (2.2, 25.0, 0.04)]);
        let features = DipExtractor::default().extract_features(&samples);

        assert_eq!(features.len(), 2);
        assert!((features[0].resonance_frequency() - 2.2).abs() < 0.005);
        assert!((features[1].resonance_frequency() - 3.6).abs() < 0.005);
        assert!(features[0].resonance().magnitude < features[1].resonance().magnitude);
    }

    #[test]
    fn refined_minimum_lands_between_grid_points() {
        let samples = notch_curve(&[(2.503, 20.0, 0.05)]);
        let features = DipExtractor::default().extract_features(&samples);

        assert_eq!(features.len(), 1);
        let f0 = features[0].resonance_frequency();
        assert!((f0 - 2.503).abs() < 0.002, "refined f0 was {f0}");
        assert!((f0 - 2.50).abs() > 1.0e-6, "refinement should move off the grid");
    }

    #[test]
    fn flat_curve_yields_no_features() {
        let samples = notch_curve(&[]);
        assert!(DipExtractor::default().extract_features(&samples).is_empty());
    }

    #[test]
    fn fewer_than_three_samples_yield_no_features() {
        let extractor = DipExtractor::default();
        assert!(extractor.extract_features(&[]).is_empty());
        assert!(
            extractor
                .extract_features(&[Sample::new(1.0, -1.0), Sample::new(2.0, -9.0)])
                .is_empty()
        );
    }

    #[test]
    fn window_restricts_detection_range() {
        let samples = notch_curve(&[(2.2, 25.0, 0.04), (3.6, 12.0, 0.03)]);
        let extractor = DipExtractor::new(ExtractionConfig {
            window: Some(FrequencyWindow::new(3.0, 4.0)),
            ..ExtractionConfig::default()
        });

        let features = extractor.extract_features(&samples);
        assert_eq!(features.len(), 1);
        assert!((features[0].resonance_frequency() - 3.6).abs() < 0.005);
    }

    #[test]
    fn broad_valley_is_filtered_unless_criteria_are_loosened() {
        let samples = notch_curve(&[(3.0, 10.0, 0.4)]);
        assert!(DipExtractor::default().extract_features(&samples).is_empty());

        let loose = DipExtractor::new(ExtractionConfig {
            validity: ValidityCriteria {
                max_bandwidth_ratio: 1.0,
                ..ValidityCriteria::default()
            },
            ..ExtractionConfig::default()
        });
        assert_eq!(loose.extract_features(&samples).len(), 1);
    }

    #[test]
    fn record_extraction_is_cached_and_ordered() {
        let records: Vec<Record> = (0..10)
            .map(|step| {
                let mut config = ParameterSet::new();
                config.insert("er".to_string(), 1.0 + step as f64);
                let centre = 3.0 - 0.05 * step as f64;
                Record::new(config, notch_curve(&[(centre, 20.0, 0.04)]))
            })
            .collect();

        let extractor = DipExtractor::default();
        let features = extractor.extract_records(&records);
        assert_eq!(features.len(), records.len());
        for (step, record_features) in features.iter().enumerate() {
            let expected = 3.0 - 0.05 * step as f64;
            assert_eq!(record_features.len(), 1);
            assert!((record_features[0].resonance_frequency() - expected).abs() < 0.005);
            assert!(records[step].derived().is_some());
        }
    }
}
