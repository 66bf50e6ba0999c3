//! Reader for swept S-parameter text exports.
//!
//! ```text
//! #Parameters = {er=2; tan_delta=0.02; size=10}
//! #"Frequency / GHz"	"S2,1 (2) [Magnitude]"
//! #----------------------
//! 1.000	-0.52
//! ```
//!
//! Each `#Parameters` header opens a new record. Quoted `#"..."` lines carry
//! the axis labels, any other `#` line is a comment, and data lines hold two
//! whitespace separated numbers.

use crate::domain::{AxisLabels, ParameterSet, ParserResult, Record, Sample, ScanError};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const PARAMETERS_PREFIX: &str = "#Parameters";
const LABELS_PREFIX: &str = "#\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub source_line: usize,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedMeasurement {
    pub records: Vec<Record>,
    pub skipped_lines: Vec<SkippedLine>,
}

#[derive(Debug, Default)]
struct RecordBuilder {
    config: ParameterSet,
    axis_labels: Option<AxisLabels>,
    samples: Vec<Sample>,
}

impl RecordBuilder {
    fn finish(self) -> Record {
        let record = Record::new(self.config, self.samples);
        match self.axis_labels {
            Some(labels) => record.with_axis_labels(labels),
            None => record,
        }
    }
}

pub fn parse_measurement_text(source: &str) -> ParserResult<ParsedMeasurement> {
    let mut records = Vec::new();
    let mut skipped_lines = Vec::new();
    let mut current: Option<RecordBuilder> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let source_line = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(PARAMETERS_PREFIX) {
            if let Some(finished) = current.take() {
                records.push(finished.finish());
            }
            current = Some(RecordBuilder {
                config: parse_parameter_header(line, source_line)?,
                ..RecordBuilder::default()
            });
            continue;
        }

        if line.starts_with(LABELS_PREFIX) {
            if let Some(builder) = current.as_mut() {
                builder.axis_labels = parse_axis_labels(&line[1..]);
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let Some(builder) = current.as_mut() else {
            debug!(source_line, "ignoring data line before the first parameter header");
            continue;
        };

        match parse_data_line(line) {
            Some(sample) => builder.samples.push(sample),
            None => {
                warn!(source_line, line, "skipping malformed data line");
                skipped_lines.push(SkippedLine {
                    source_line,
                    raw: raw_line.to_string(),
                });
            }
        }
    }

    if let Some(finished) = current.take() {
        records.push(finished.finish());
    }

    Ok(ParsedMeasurement {
        records,
        skipped_lines,
    })
}

pub fn load_measurement_file(path: impl AsRef<Path>) -> ParserResult<ParsedMeasurement> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| {
        ScanError::io_system(
            "IO.MEASUREMENT_READ",
            format!("failed to read measurement file '{}': {}", path.display(), source),
        )
    })?;
    parse_measurement_text(&String::from_utf8_lossy(&bytes))
}

fn parse_parameter_header(line: &str, source_line: usize) -> ParserResult<ParameterSet> {
    let body = line
        .split_once('{')
        .and_then(|(_, rest)| rest.rsplit_once('}'))
        .map(|(body, _)| body)
        .ok_or_else(|| {
            ScanError::parse(
                "INPUT.PARAMETER_HEADER",
                format!(
                    "parameter header at line {} is missing its '{{...}}' body",
                    source_line
                ),
            )
        })?;

    let mut config = ParameterSet::new();
    for item in body.split(';') {
        let Some((name, value)) = item.split_once('=') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        let parsed = value.parse::<f64>().map_err(|_| {
            ScanError::parse(
                "INPUT.PARAMETER_VALUE",
                format!(
                    "parameter '{}' at line {} has non-numeric value '{}'",
                    name, source_line, value
                ),
            )
        })?;
        if name.is_empty() {
            return Err(ScanError::parse(
                "INPUT.PARAMETER_NAME",
                format!("unnamed parameter at line {}", source_line),
            ));
        }
        config.insert(name.to_string(), parsed);
    }

    Ok(config)
}

fn parse_axis_labels(line: &str) -> Option<AxisLabels> {
    let cleaned = line.replace('"', "");
    let mut labels = cleaned
        .split('\t')
        .map(str::trim)
        .filter(|label| !label.is_empty());
    let x_label = labels.next()?;
    let y_label = labels.next().unwrap_or_default();
    Some(AxisLabels::new(x_label, y_label))
}

fn parse_data_line(line: &str) -> Option<Sample> {
    let mut tokens = line.split_whitespace();
    let frequency = tokens.next()?.parse::<f64>().ok()?;
    let magnitude = tokens.next()?.parse::<f64>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(Sample::new(frequency, magnitude))
}
