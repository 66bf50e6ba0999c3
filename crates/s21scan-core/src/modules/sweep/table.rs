use super::baseline::Baseline;
use serde::Serialize;
use std::collections::BTreeMap;

pub const BAND_COUNT_COLUMN: &str = "band_count";

/// Per-band column suffixes, in table order.
pub const BAND_METRIC_SUFFIXES: [&str; 9] = [
    "f1_f", "f1_s21", "f0_f", "f0_s21", "f2_f", "f2_s21", "bw", "q", "inv_q",
];

/// Per-band suffixes that only exist when the table has a baseline.
pub const BAND_BASELINE_SUFFIXES: [&str; 4] = [
    "shift_MHz",
    "abs_shift_MHz",
    "sensitivity",
    "sensitivity_norm",
];

/// `band{band}_{suffix}` with a 1-based band index.
pub fn band_column(band: usize, suffix: &str) -> String {
    format!("band{band}_{suffix}")
}

/// Spacing between band `lower` and band `lower + 1`.
pub fn window_column(lower: usize) -> String {
    format!("window_band{}_{}", lower, lower + 1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub record_index: usize,
    pub axis_value: f64,
    pub band_count: usize,
    pub cells: BTreeMap<String, f64>,
}

impl SweepRow {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.cells.get(column).copied()
    }
}

/// One row per record of a 1-D sweep slice, ascending by axis value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepTable {
    pub axis: String,
    pub columns: Vec<String>,
    pub rows: Vec<SweepRow>,
    pub baseline: Option<Baseline>,
}

impl SweepTable {
    /// Values of `column` down the table; NaN where a row has no cell.
    pub fn column(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.get(column).unwrap_or(f64::NAN))
            .collect()
    }

    pub fn max_band_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.band_count)
            .max()
            .unwrap_or_default()
    }

    /// Row cells in column order, NaN-filled.
    pub fn row_values<'a>(&'a self, row: &'a SweepRow) -> impl Iterator<Item = f64> + 'a {
        self.columns
            .iter()
            .map(move |column| row.get(column).unwrap_or(f64::NAN))
    }
}

/// Column list for a table with `bands` bands, optional baseline columns and
/// trailing record parameters.
pub(super) fn table_columns(
    axis: &str,
    bands: usize,
    with_baseline: bool,
    parameters: &[String],
) -> Vec<String> {
    let mut columns = vec![axis.to_string(), BAND_COUNT_COLUMN.to_string()];
    for band in 1..=bands {
        columns.extend(
            BAND_METRIC_SUFFIXES
                .iter()
                .map(|suffix| band_column(band, suffix)),
        );
        if with_baseline {
            columns.extend(
                BAND_BASELINE_SUFFIXES
                    .iter()
                    .map(|suffix| band_column(band, suffix)),
            );
        }
    }
    columns.extend((1..bands).map(window_column));
    columns.extend(
        parameters
            .iter()
            .filter(|name| name.as_str() != axis)
            .cloned(),
    );
    columns
}
