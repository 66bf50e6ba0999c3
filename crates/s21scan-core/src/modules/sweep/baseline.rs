use crate::domain::{Record, ScanError, SweepResult};
use crate::modules::FeatureExtractor;
use crate::numerics::values_match;
use serde::Serialize;

/// Reference condition for shift and sensitivity columns: the record whose
/// axis value equals the requested baseline, with its band frequencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    pub axis_value: f64,
    pub record_index: usize,
    /// Resonance frequency in GHz per band, ascending.
    pub frequencies_ghz: Vec<f64>,
}

impl Baseline {
    /// Frequency of 1-based `band`, if the baseline carries that band.
    pub fn band_frequency(&self, band: usize) -> Option<f64> {
        band.checked_sub(1)
            .and_then(|index| self.frequencies_ghz.get(index))
            .copied()
    }

    pub fn band_count(&self) -> usize {
        self.frequencies_ghz.len()
    }
}

/// Finds the baseline record among `slice` (indices into `records`).
///
/// Never falls back to another row: a missing baseline record and a baseline
/// record without resonances are both errors.
pub fn resolve_baseline<E>(
    records: &[Record],
    slice: &[usize],
    axis: &str,
    baseline_value: f64,
    extractor: &E,
) -> SweepResult<Baseline>
where
    E: FeatureExtractor + ?Sized,
{
    let (record_index, axis_value) = slice
        .iter()
        .copied()
        .find_map(|index| {
            records[index]
                .parameter(axis)
                .filter(|&value| values_match(value, baseline_value))
                .map(|value| (index, value))
        })
        .ok_or_else(|| {
            ScanError::baseline_not_found(
                "SWEEP.BASELINE_NOT_FOUND",
                format!(
                    "no record with {} = {} in the sweep slice; cannot compute shift or sensitivity",
                    axis, baseline_value
                ),
            )
        })?;

    let features = extractor.features_for(&records[record_index]);
    if features.is_empty() {
        return Err(ScanError::no_resonance(
            "SWEEP.BASELINE_NO_RESONANCE",
            format!(
                "baseline record {} = {} has no resonance dips",
                axis, baseline_value
            ),
        ));
    }

    // The stored value is the record's own, so its row has an exact zero delta.
    Ok(Baseline {
        axis_value,
        record_index,
        frequencies_ghz: features
            .iter()
            .map(|feature| feature.resonance_frequency())
            .collect(),
    })
}
