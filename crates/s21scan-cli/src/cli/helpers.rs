use super::CliError;
use anyhow::Context;
use s21scan_core::common::{AnalysisConfig, AnalysisConfigError, FrequencyWindow, load_analysis_config};
use s21scan_core::domain::ScanError;
use s21scan_core::modules::serialization::write_text_artifact;
use s21scan_core::parser::{ParsedMeasurement, load_measurement_file};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub(super) enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

pub(super) fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, CliError> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    load_analysis_config(path).map_err(|error| {
        let scan_error = match &error {
            AnalysisConfigError::Read { .. } => {
                ScanError::io_system("IO.CONFIG_READ", error.to_string())
            }
            AnalysisConfigError::Parse { .. } | AnalysisConfigError::Invalid { .. } => {
                ScanError::config("INPUT.ANALYSIS_CONFIG", error.to_string())
            }
        };
        CliError::Scan(scan_error)
    })
}

/// Parses the measurement file and insists on at least one record.
pub(super) fn load_records(path: &Path) -> Result<ParsedMeasurement, CliError> {
    let parsed = load_measurement_file(path)?;
    if !parsed.skipped_lines.is_empty() {
        warn!(
            file = %path.display(),
            skipped = parsed.skipped_lines.len(),
            "ignored malformed data lines"
        );
    }
    if parsed.records.is_empty() {
        return Err(CliError::Scan(ScanError::insufficient_data(
            "INPUT.NO_RECORDS",
            format!(
                "'{}' contains no '#Parameters' blocks",
                path.display()
            ),
        )));
    }
    debug!(file = %path.display(), records = parsed.records.len(), "loaded measurement file");
    Ok(parsed)
}

pub(super) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `MIN:MAX` in GHz.
pub(super) fn parse_window(raw: &str) -> Result<FrequencyWindow, String> {
    let (min, max) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected MIN:MAX in GHz, got '{raw}'"))?;
    let window = FrequencyWindow::new(parse_number(min)?, parse_number(max)?);
    window.validate()?;
    Ok(window)
}

/// `NAME=VALUE`, pinning one control parameter.
pub(super) fn parse_control(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("control '{raw}' has an empty name"));
    }
    Ok((name.to_string(), parse_number(value)?))
}

fn parse_number(raw: &str) -> Result<f64, String> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("'{raw}' is not a finite number"))
}

/// Writes `content` to `output` (creating parent directories) or stdout.
pub(super) fn emit(output: Option<&Path>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })?;
            }
            write_text_artifact(path, content)
                .with_context(|| format!("failed to write output '{}'", path.display()))?;
            Ok(())
        }
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{display_name, parse_control, parse_window};
    use s21scan_core::common::FrequencyWindow;
    use std::path::Path;

    #[test]
    fn window_argument_parses_min_and_max() {
        assert_eq!(parse_window("2.5:4"), Ok(FrequencyWindow::new(2.5, 4.0)));
        assert!(parse_window("4:2").is_err());
        assert!(parse_window("4").is_err());
        assert!(parse_window("a:2").is_err());
    }

    #[test]
    fn control_argument_parses_name_and_value() {
        assert_eq!(parse_control("size=12"), Ok(("size".to_string(), 12.0)));
        assert_eq!(
            parse_control(" tan_delta = 0.02 "),
            Ok(("tan_delta".to_string(), 0.02))
        );
        assert!(parse_control("=1").is_err());
        assert!(parse_control("size").is_err());
        assert!(parse_control("size=inf").is_err());
    }

    #[test]
    fn display_name_is_the_file_name() {
        assert_eq!(display_name(Path::new("/data/run/sweep.txt")), "sweep.txt");
    }
}
