use super::CliError;
use super::helpers::*;
use anyhow::Context;
use s21scan_core::common::{AnalysisConfig, ExtractionConfig, FrequencyWindow};
use s21scan_core::domain::{ParameterSet, ScanError};
use s21scan_core::modules::serialization::{
    FeatureRow, export_record_tables, feature_rows, render_csv, render_feature_csv,
    render_feature_text, render_json, render_text_table, write_text_artifact,
};
use s21scan_core::modules::sweep::ParameterOverview;
use s21scan_core::modules::{DipExtractor, SweepAggregator, SweepRequest};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct OverviewArgs {
    /// Measurement text file
    file: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ExtractArgs {
    /// Measurement text file
    file: PathBuf,

    /// Crossing level above the refined minimum, in dB
    #[arg(long)]
    threshold_db: Option<f64>,

    /// Minimum sample distance between kept dips
    #[arg(long)]
    min_spacing: Option<usize>,

    /// Restrict detection to MIN:MAX GHz
    #[arg(long, value_parser = parse_window)]
    window: Option<FrequencyWindow>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct SweepArgs {
    /// Measurement text file
    file: PathBuf,

    /// Parameter swept along the table rows
    #[arg(long)]
    axis: String,

    /// Axis value of the reference record for shift and sensitivity
    #[arg(long, conflicts_with = "no_baseline")]
    baseline: Option<f64>,

    /// Skip shift and sensitivity even for permittivity axes
    #[arg(long)]
    no_baseline: bool,

    /// Pin a co-varying parameter, NAME=VALUE (repeatable)
    #[arg(long = "control", value_name = "NAME=VALUE", value_parser = parse_control)]
    controls: Vec<(String, f64)>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ExportArgs {
    /// Measurement text file
    file: PathBuf,

    /// Directory receiving data.csv, meta.csv and config.csv
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(Serialize)]
struct RecordSummary<'a> {
    index: usize,
    parameters: &'a ParameterSet,
    points: usize,
    x_label: Option<&'a str>,
    y_label: Option<&'a str>,
}

#[derive(Serialize)]
struct OverviewReport<'a> {
    file: String,
    records: Vec<RecordSummary<'a>>,
    overview: ParameterOverview,
}

pub(super) fn run_overview_command(args: OverviewArgs) -> Result<i32, CliError> {
    let parsed = load_records(&args.file)?;
    let records = &parsed.records;
    let report = OverviewReport {
        file: display_name(&args.file),
        records: records
            .iter()
            .enumerate()
            .map(|(index, record)| RecordSummary {
                index,
                parameters: record.config(),
                points: record.sample_count(),
                x_label: record.axis_labels().map(|labels| labels.x_label.as_str()),
                y_label: record.axis_labels().map(|labels| labels.y_label.as_str()),
            })
            .collect(),
        overview: ParameterOverview::from_records(records),
    };

    if args.json {
        emit(None, &(render_json(&report)? + "\n"))?;
    } else {
        emit(None, &render_overview_text(&report))?;
    }
    Ok(0)
}

fn render_overview_text(report: &OverviewReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {} records", report.file, report.records.len());
    for record in &report.records {
        let parameters = record
            .parameters
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "[{}] {} | points={}", record.index, parameters, record.points);
    }

    let _ = writeln!(out, "sweep axes:");
    for (axis, values) in &report.overview.sweep_axes {
        let values = values
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let partial = if report.overview.partial.contains(axis) {
            " (missing in some records)"
        } else {
            ""
        };
        let _ = writeln!(out, "  {axis}: {values}{partial}");
    }
    let _ = writeln!(out, "controls:");
    for (name, value) in &report.overview.controls {
        let _ = writeln!(out, "  {name} = {value}");
    }
    out
}

pub(super) fn run_extract_command(
    args: ExtractArgs,
    config: AnalysisConfig,
) -> Result<i32, CliError> {
    let settings = ExtractionConfig {
        threshold_db: args.threshold_db.unwrap_or(config.extraction.threshold_db),
        min_spacing: args.min_spacing.unwrap_or(config.extraction.min_spacing),
        window: args.window.or(config.extraction.window),
        validity: config.extraction.validity,
    };
    settings
        .validate()
        .map_err(|reason| CliError::Scan(ScanError::config("INPUT.EXTRACTION_FLAGS", reason)))?;

    let parsed = load_records(&args.file)?;
    let extractor = DipExtractor::new(settings);
    let features = extractor.extract_records(&parsed.records);

    let mut rows: Vec<FeatureRow> = Vec::new();
    for (index, (record, record_features)) in parsed.records.iter().zip(&features).enumerate() {
        rows.extend(feature_rows(index, record, record_features)?);
    }
    let empty = features.iter().filter(|features| features.is_empty()).count();
    info!(
        records = parsed.records.len(),
        features = rows.len(),
        records_without_resonance = empty,
        "extracted resonance dips"
    );

    let rendered = match args.format {
        OutputFormat::Text => render_feature_text(&rows),
        OutputFormat::Csv => render_feature_csv(&rows)?,
        OutputFormat::Json => render_json(&rows)? + "\n",
    };
    emit(args.output.as_deref(), &rendered)?;
    Ok(0)
}

pub(super) fn run_sweep_command(args: SweepArgs, config: AnalysisConfig) -> Result<i32, CliError> {
    let mut request = SweepRequest::with_settings(args.axis, &config.sweep);
    if args.baseline.is_some() {
        request = request.baseline(args.baseline);
    }
    if args.no_baseline {
        request = request.baseline(None);
    }
    for (name, value) in args.controls {
        request = request.control(name, value);
    }

    let parsed = load_records(&args.file)?;
    let aggregator = SweepAggregator::new(DipExtractor::new(config.extraction));
    let table = aggregator.build_table(&parsed.records, &request)?;

    let rendered = match args.format {
        OutputFormat::Text => render_text_table(&table),
        OutputFormat::Csv => render_csv(&table)?,
        OutputFormat::Json => render_json(&table)? + "\n",
    };
    emit(args.output.as_deref(), &rendered)?;
    Ok(0)
}

pub(super) fn run_export_command(args: ExportArgs) -> Result<i32, CliError> {
    let parsed = load_records(&args.file)?;
    let tables = export_record_tables(&parsed.records, &display_name(&args.file))?;

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "failed to create export directory '{}'",
            args.output_dir.display()
        )
    })?;
    for (name, content) in &tables {
        let path = args.output_dir.join(name);
        write_text_artifact(&path, content)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(0)
}
