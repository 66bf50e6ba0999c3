//! Renderers for sweep tables, per-record feature listings and record
//! exports. Text output is fixed-width; CSV goes through the `csv` crate and
//! JSON through `serde_json` (non-finite values become `null`).

use super::metrics::quality_factor;
use super::sweep::SweepTable;
use crate::domain::{ParameterSet, Record, ResonanceFeature, ScanError, ScanResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const TEXT_COLUMN_WIDTH: usize = 14;
const TEXT_PRECISION: usize = 6;

pub fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

/// One extracted band of one record, flattened for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub record_index: usize,
    pub band: usize,
    pub parameters: ParameterSet,
    pub f1_ghz: f64,
    pub f0_ghz: f64,
    pub f2_ghz: f64,
    pub f0_s21_db: f64,
    pub depth_db: f64,
    pub bandwidth_ghz: f64,
    pub q: f64,
}

const FEATURE_COLUMNS: [&str; 9] = [
    "record", "band", "f1_f", "f0_f", "f2_f", "f0_s21", "depth_db", "bw", "q",
];

impl FeatureRow {
    fn values(&self) -> [f64; 7] {
        [
            self.f1_ghz,
            self.f0_ghz,
            self.f2_ghz,
            self.f0_s21_db,
            self.depth_db,
            self.bandwidth_ghz,
            self.q,
        ]
    }
}

pub fn feature_rows(
    record_index: usize,
    record: &Record,
    features: &[ResonanceFeature],
) -> ScanResult<Vec<FeatureRow>> {
    features
        .iter()
        .enumerate()
        .map(|(position, feature)| {
            Ok(FeatureRow {
                record_index,
                band: position + 1,
                parameters: record.config().clone(),
                f1_ghz: feature.left_crossing().frequency,
                f0_ghz: feature.resonance_frequency(),
                f2_ghz: feature.right_crossing().frequency,
                f0_s21_db: feature.resonance().magnitude,
                depth_db: feature.depth_db(),
                bandwidth_ghz: feature.span_ghz(),
                q: quality_factor(feature)?,
            })
        })
        .collect()
}

pub fn render_text_table(table: &SweepTable) -> String {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .map(|column| column.len().max(TEXT_COLUMN_WIDTH))
        .collect();

    let mut out = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| format!("{column:>width$}"))
        .collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    for row in &table.rows {
        let cells: Vec<String> = table
            .row_values(row)
            .zip(&widths)
            .map(|(value, &width)| format_fixed_f64(value, width, TEXT_PRECISION))
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

pub fn render_csv(table: &SweepTable) -> ScanResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns).map_err(csv_error)?;
    for row in &table.rows {
        writer
            .write_record(table.row_values(row).map(format_csv_value))
            .map_err(csv_error)?;
    }
    finish_csv(writer)
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> ScanResult<String> {
    serde_json::to_string_pretty(value).map_err(|source| {
        ScanError::internal(
            "INTERNAL.JSON_RENDER",
            format!("failed to render JSON output: {source}"),
        )
    })
}

pub fn render_feature_text(rows: &[FeatureRow]) -> String {
    let mut out = FEATURE_COLUMNS
        .iter()
        .map(|column| format!("{column:>TEXT_COLUMN_WIDTH$}"))
        .collect::<Vec<_>>()
        .join(" ");
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:>TEXT_COLUMN_WIDTH$} {:>TEXT_COLUMN_WIDTH$}",
            row.record_index, row.band
        ));
        for value in row.values() {
            out.push(' ');
            out.push_str(&format_fixed_f64(value, TEXT_COLUMN_WIDTH, TEXT_PRECISION));
        }
        out.push('\n');
    }
    out
}

pub fn render_feature_csv(rows: &[FeatureRow]) -> ScanResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FEATURE_COLUMNS).map_err(csv_error)?;
    for row in rows {
        let mut record = vec![row.record_index.to_string(), row.band.to_string()];
        record.extend(row.values().into_iter().map(format_csv_value));
        writer.write_record(&record).map_err(csv_error)?;
    }
    finish_csv(writer)
}

/// Flattens records into `data.csv` (one line per sample), `meta.csv` (one
/// line per record) and `config.csv` (one line per header parameter).
///
/// Record ids are 1-based. A table with no lines is left out.
pub fn export_record_tables(
    records: &[Record],
    display_name: &str,
) -> ScanResult<BTreeMap<&'static str, String>> {
    let mut data = csv::Writer::from_writer(Vec::new());
    let mut meta = csv::Writer::from_writer(Vec::new());
    let mut config = csv::Writer::from_writer(Vec::new());
    data.write_record(["file", "result_id", "x", "y"])
        .map_err(csv_error)?;
    meta.write_record(["file", "result_id", "x_label", "y_label", "points"])
        .map_err(csv_error)?;
    config
        .write_record(["file", "result_id", "parameter", "value"])
        .map_err(csv_error)?;

    let mut has_samples = false;
    let mut has_parameters = false;
    for (index, record) in records.iter().enumerate() {
        let result_id = (index + 1).to_string();
        for sample in record.samples() {
            has_samples = true;
            data.write_record([
                display_name,
                result_id.as_str(),
                sample.frequency.to_string().as_str(),
                sample.magnitude.to_string().as_str(),
            ])
            .map_err(csv_error)?;
        }

        let (x_label, y_label) = record
            .axis_labels()
            .map(|labels| (labels.x_label.as_str(), labels.y_label.as_str()))
            .unwrap_or(("", ""));
        meta.write_record([
            display_name,
            result_id.as_str(),
            x_label,
            y_label,
            record.sample_count().to_string().as_str(),
        ])
        .map_err(csv_error)?;

        for (name, value) in record.config() {
            has_parameters = true;
            config
                .write_record([
                    display_name,
                    result_id.as_str(),
                    name.as_str(),
                    value.to_string().as_str(),
                ])
                .map_err(csv_error)?;
        }
    }

    let mut outputs = BTreeMap::new();
    if has_samples {
        outputs.insert("data.csv", finish_csv(data)?);
    }
    if !records.is_empty() {
        outputs.insert("meta.csv", finish_csv(meta)?);
    }
    if has_parameters {
        outputs.insert("config.csv", finish_csv(config)?);
    }
    Ok(outputs)
}

fn format_csv_value(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> ScanResult<String> {
    let bytes = writer.into_inner().map_err(|error| {
        ScanError::internal(
            "INTERNAL.CSV_RENDER",
            format!("failed to flush CSV output: {}", error.error()),
        )
    })?;
    String::from_utf8(bytes).map_err(|error| {
        ScanError::internal(
            "INTERNAL.CSV_RENDER",
            format!("CSV output is not UTF-8: {error}"),
        )
    })
}

fn csv_error(error: csv::Error) -> ScanError {
    ScanError::internal(
        "INTERNAL.CSV_RENDER",
        format!("failed to write CSV row: {error}"),
    )
}
