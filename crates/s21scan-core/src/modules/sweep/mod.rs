//! Sweep aggregation: find the axes of a parameter sweep, cut a clean 1-D
//! slice along one of them and tabulate resonance metrics per record.

mod baseline;
mod table;

pub use baseline::{Baseline, resolve_baseline};
pub use table::{
    BAND_BASELINE_SUFFIXES, BAND_COUNT_COLUMN, BAND_METRIC_SUFFIXES, SweepRow, SweepTable,
    band_column, window_column,
};

use super::FeatureExtractor;
use super::metrics::{
    UndefinedSensitivity, absolute_frequency_shift_mhz, frequency_shift_mhz,
    inverse_quality_factor, quality_factor, sensitivity, window_size,
};
use crate::common::SweepSettings;
use crate::common::constants::{MIN_SWEEP_ROWS, PARALLEL_RECORD_THRESHOLD};
use crate::domain::{ParameterSet, Record, ResonanceFeature, ScanError, SweepResult};
use crate::numerics::{distinct_values, values_match};
use rayon::prelude::*;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Which header parameters vary across a collection of records.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParameterOverview {
    pub record_count: usize,
    /// Parameters with more than one distinct value, sorted values.
    pub sweep_axes: BTreeMap<String, Vec<f64>>,
    /// Parameters present in some records but not others.
    pub partial: BTreeSet<String>,
    /// Parameters carried by every record with a single value.
    pub controls: ParameterSet,
}

impl ParameterOverview {
    /// Classifies every parameter name. A name missing from some records
    /// counts "absent" as one more distinct value.
    pub fn from_records(records: &[Record]) -> Self {
        let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for record in records {
            for (name, value) in record.config() {
                values.entry(name.as_str()).or_default().push(*value);
            }
        }

        let mut overview = Self {
            record_count: records.len(),
            ..Self::default()
        };
        for (name, raw) in values {
            let present = raw.len();
            let distinct = distinct_values(raw);
            let absent = usize::from(present < records.len());
            if present < records.len() {
                overview.partial.insert(name.to_string());
            }
            if distinct.len() + absent > 1 {
                overview.sweep_axes.insert(name.to_string(), distinct);
            } else if let Some(&value) = distinct.first() {
                overview.controls.insert(name.to_string(), value);
            }
        }
        overview
    }

    pub fn is_sweep_axis(&self, name: &str) -> bool {
        self.sweep_axes.contains_key(name)
    }

    /// Values of `axis` plus the parameters held fixed and those that still
    /// vary alongside it.
    pub fn axis_overview(&self, axis: &str) -> Option<AxisOverview> {
        let values = self.sweep_axes.get(axis)?;
        Some(AxisOverview {
            axis: axis.to_string(),
            values: values.clone(),
            fixed: self.controls.clone(),
            co_varying: self
                .sweep_axes
                .keys()
                .filter(|name| name.as_str() != axis)
                .cloned()
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOverview {
    pub axis: String,
    pub values: Vec<f64>,
    pub fixed: ParameterSet,
    /// Other sweep axes; each must be pinned before slicing along `axis`.
    pub co_varying: Vec<String>,
}

/// What to tabulate: the axis, caller-pinned controls and an optional
/// baseline value for shift and sensitivity.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRequest {
    pub axis: String,
    pub controls: ParameterSet,
    pub baseline: Option<f64>,
}

impl SweepRequest {
    /// Request without controls or baseline.
    pub fn new(axis: impl Into<String>) -> Self {
        Self {
            axis: axis.into(),
            controls: ParameterSet::new(),
            baseline: None,
        }
    }

    /// Request whose baseline defaults to `settings.baseline_value` when the
    /// axis is permittivity-like.
    pub fn with_settings(axis: impl Into<String>, settings: &SweepSettings) -> Self {
        let axis = axis.into();
        let baseline = settings
            .is_permittivity_axis(&axis)
            .then_some(settings.baseline_value);
        Self {
            baseline,
            ..Self::new(axis)
        }
    }

    pub fn control(mut self, name: impl Into<String>, value: f64) -> Self {
        self.controls.insert(name.into(), value);
        self
    }

    pub fn baseline(mut self, baseline: Option<f64>) -> Self {
        self.baseline = baseline;
        self
    }
}

/// Indices of the records forming the 1-D slice along `request.axis`,
/// ascending by axis value.
pub fn select_slice(
    records: &[Record],
    overview: &ParameterOverview,
    request: &SweepRequest,
) -> SweepResult<Vec<usize>> {
    let axis = request.axis.as_str();
    if !overview.is_sweep_axis(axis) {
        return Err(ScanError::insufficient_data(
            "SWEEP.UNKNOWN_AXIS",
            format!(
                "'{}' is not a sweep axis; varying parameters: [{}]",
                axis,
                join_names(overview.sweep_axes.keys())
            ),
        ));
    }
    if request.controls.contains_key(axis) {
        return Err(ScanError::config(
            "SWEEP.AXIS_PINNED",
            format!("sweep axis '{}' cannot also be pinned as a control", axis),
        ));
    }

    let unresolved: Vec<&String> = overview
        .sweep_axes
        .keys()
        .filter(|name| name.as_str() != axis && !request.controls.contains_key(name.as_str()))
        .collect();
    if !unresolved.is_empty() {
        return Err(ScanError::unresolved_control(
            "SWEEP.UNRESOLVED_CONTROL",
            format!(
                "parameters [{}] also vary; pin each with a control value to isolate '{}'",
                join_names(unresolved),
                axis
            ),
        ));
    }

    let mut controls = overview.controls.clone();
    controls.extend(request.controls.iter().map(|(k, v)| (k.clone(), *v)));

    let mut slice: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let value = record.parameter(axis)?;
            controls
                .iter()
                .all(|(name, expected)| {
                    record
                        .parameter(name)
                        .is_some_and(|actual| values_match(actual, *expected))
                })
                .then_some((index, value))
        })
        .collect();

    if slice.len() < MIN_SWEEP_ROWS {
        return Err(ScanError::insufficient_data(
            "SWEEP.INSUFFICIENT_ROWS",
            format!(
                "sweep over '{}' needs at least {} matching records, found {}",
                axis,
                MIN_SWEEP_ROWS,
                slice.len()
            ),
        ));
    }

    slice.sort_by(|lhs, rhs| lhs.1.total_cmp(&rhs.1));
    Ok(slice.into_iter().map(|(index, _)| index).collect())
}

fn join_names<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds [`SweepTable`]s from records with a pluggable feature extractor.
#[derive(Debug, Clone)]
pub struct SweepAggregator<E> {
    extractor: E,
}

impl<E> SweepAggregator<E>
where
    E: FeatureExtractor + Sync,
{
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn overview(&self, records: &[Record]) -> ParameterOverview {
        ParameterOverview::from_records(records)
    }

    pub fn build_table(&self, records: &[Record], request: &SweepRequest) -> SweepResult<SweepTable> {
        let overview = self.overview(records);
        let slice = select_slice(records, &overview, request)?;
        let axis = request.axis.as_str();

        let baseline = request
            .baseline
            .map(|value| resolve_baseline(records, &slice, axis, value, &self.extractor))
            .transpose()?;

        let features = self.slice_features(records, &slice);
        let bands = features.iter().map(|features| features.len()).max().unwrap_or(0);

        let parameters: Vec<String> = slice
            .iter()
            .flat_map(|&index| records[index].config().keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns = table::table_columns(axis, bands, baseline.is_some(), &parameters);

        let rows = slice
            .iter()
            .zip(&features)
            .map(|(&index, features)| {
                self.build_row(&records[index], index, axis, features, baseline.as_ref())
            })
            .collect::<SweepResult<Vec<_>>>()?;

        info!(
            axis,
            rows = rows.len(),
            bands,
            baseline = ?baseline.as_ref().map(|baseline| baseline.axis_value),
            "built sweep table"
        );

        Ok(SweepTable {
            axis: axis.to_string(),
            columns,
            rows,
            baseline,
        })
    }

    fn slice_features<'r>(
        &self,
        records: &'r [Record],
        slice: &[usize],
    ) -> Vec<Cow<'r, [ResonanceFeature]>> {
        if slice.len() >= PARALLEL_RECORD_THRESHOLD {
            slice
                .par_iter()
                .map(|&index| self.extractor.features_for(&records[index]))
                .collect()
        } else {
            slice
                .iter()
                .map(|&index| self.extractor.features_for(&records[index]))
                .collect()
        }
    }

    fn build_row(
        &self,
        record: &Record,
        record_index: usize,
        axis: &str,
        features: &[ResonanceFeature],
        baseline: Option<&Baseline>,
    ) -> SweepResult<SweepRow> {
        let axis_value = record.parameter(axis).unwrap_or(f64::NAN);
        let mut cells: BTreeMap<String, f64> = record
            .config()
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        cells.insert(BAND_COUNT_COLUMN.to_string(), features.len() as f64);

        for (position, feature) in features.iter().enumerate() {
            let band = position + 1;
            let mut put = |suffix: &str, value: f64| {
                cells.insert(band_column(band, suffix), value);
            };
            put("f1_f", feature.left_crossing().frequency);
            put("f1_s21", feature.left_crossing().magnitude);
            put("f0_f", feature.resonance().frequency);
            put("f0_s21", feature.resonance().magnitude);
            put("f2_f", feature.right_crossing().frequency);
            put("f2_s21", feature.right_crossing().magnitude);
            put("bw", feature.span_ghz());
            put("q", quality_factor(feature)?);
            put("inv_q", inverse_quality_factor(feature)?);

            let Some(baseline) = baseline else {
                continue;
            };
            match baseline.band_frequency(band) {
                Some(baseline_ghz) => {
                    let shift = frequency_shift_mhz(feature, baseline_ghz);
                    put("shift_MHz", shift);
                    put(
                        "abs_shift_MHz",
                        absolute_frequency_shift_mhz(feature, baseline_ghz),
                    );
                    put(
                        "sensitivity",
                        sensitivity(shift, axis_value, baseline.axis_value, baseline_ghz, false)
                            .unwrap_or(UndefinedSensitivity::sentinel()),
                    );
                    put(
                        "sensitivity_norm",
                        sensitivity(shift, axis_value, baseline.axis_value, baseline_ghz, true)
                            .unwrap_or(UndefinedSensitivity::sentinel()),
                    );
                }
                None => {
                    warn!(
                        axis,
                        axis_value,
                        band,
                        baseline_bands = baseline.band_count(),
                        "band has no baseline counterpart; shift and sensitivity left undefined"
                    );
                    for suffix in BAND_BASELINE_SUFFIXES {
                        put(suffix, f64::NAN);
                    }
                }
            }
        }

        for (position, pair) in features.windows(2).enumerate() {
            cells.insert(window_column(position + 1), window_size(&pair[0], &pair[1]));
        }

        Ok(SweepRow {
            record_index,
            axis_value,
            band_count: features.len(),
            cells,
        })
    }
}
