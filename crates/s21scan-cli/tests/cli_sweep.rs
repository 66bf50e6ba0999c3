use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Permittivity sweep with one notch per block; `er` steps of 1 shift the
/// notch by `shift_ghz`.
fn write_sweep(path: &Path, er_values: &[f64], shift_ghz: f64) {
    let mut text = String::new();
    for &er in er_values {
        let centre = 3.0 + shift_ghz * (er - 1.0);
        writeln!(text, "#Parameters = {{er={er}; tan_delta=0.02}}").expect("write");
        writeln!(text, "#\"Frequency / GHz\"\t\"S2,1 (2) [Magnitude]\"").expect("write");
        writeln!(text, "#----------------------").expect("write");
        for step in 0..=200 {
            let frequency = 2.0 + 0.01 * step as f64;
            let x = (frequency - centre) / 0.05;
            writeln!(text, "{:.6}\t{:.9}", frequency, -20.0 / (1.0 + x * x)).expect("write");
        }
    }
    fs::write(path, text).expect("fixture should be written");
}

fn s21scan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s21scan"))
        .args(args)
        .env_remove("S21SCAN_LOG")
        .output()
        .expect("binary should run")
}

#[test]
fn sweep_json_reports_shift_and_scaled_sensitivity() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = temp.path().join("sweep.txt");
    write_sweep(&input, &[1.0, 2.0, 3.0], 0.05);

    let output = s21scan(&[
        "sweep",
        input.to_str().expect("utf-8 path"),
        "--axis",
        "er",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["axis"], "er");
    assert_eq!(report["baseline"]["axis_value"], 1.0);

    let rows = report["rows"].as_array().expect("rows should be an array");
    assert_eq!(rows.len(), 3);
    assert!(rows[0]["cells"]["band1_sensitivity"].is_null());

    let shift = rows[1]["cells"]["band1_shift_MHz"]
        .as_f64()
        .expect("shift should be numeric");
    assert!((shift - 50.0).abs() < 1.0e-3, "shift was {shift}");
    let sensitivity = rows[1]["cells"]["band1_sensitivity"]
        .as_f64()
        .expect("sensitivity should be numeric");
    assert!((sensitivity - 5.0).abs() < 1.0e-4);
}

#[test]
fn sweep_csv_is_written_to_the_output_path() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = temp.path().join("sweep.txt");
    let table = temp.path().join("out/table.csv");
    write_sweep(&input, &[1.0, 2.0], 0.05);

    let output = s21scan(&[
        "sweep",
        input.to_str().expect("utf-8 path"),
        "--axis",
        "er",
        "--no-baseline",
        "--format",
        "csv",
        "--output",
        table.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let csv = fs::read_to_string(&table).expect("table should be written");
    let header = csv.lines().next().expect("header line");
    assert!(header.starts_with("er,band_count,band1_f1_f,band1_f1_s21,band1_f0_f"));
    assert!(!header.contains("shift"));
    assert!(header.ends_with(",tan_delta"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn missing_baseline_exits_with_input_validation_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = temp.path().join("sweep.txt");
    write_sweep(&input, &[2.0, 3.0], 0.05);

    let output = s21scan(&["sweep", input.to_str().expect("utf-8 path"), "--axis", "er"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: [SWEEP.BASELINE_NOT_FOUND]"));
    assert!(stderr.contains("FATAL EXIT CODE: 2"));
}

#[test]
fn missing_input_file_exits_with_io_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let missing = temp.path().join("absent.txt");
    let output = s21scan(&["overview", missing.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = s21scan(&["sweep", "--bogus"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[INPUT.CLI_USAGE]"));
}

#[test]
fn overview_json_lists_axes_and_controls() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = temp.path().join("sweep.txt");
    write_sweep(&input, &[1.0, 2.0, 4.0], 0.05);

    let output = s21scan(&["overview", input.to_str().expect("utf-8 path"), "--json"]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["file"], "sweep.txt");
    assert_eq!(report["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(report["records"][0]["points"], 201);
    assert_eq!(report["overview"]["sweep_axes"]["er"], serde_json::json!([1.0, 2.0, 4.0]));
    assert_eq!(report["overview"]["controls"]["tan_delta"], 0.02);
}

#[test]
fn extract_honours_config_file_and_flag_overrides() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = temp.path().join("sweep.txt");
    let config = temp.path().join("analysis.json");
    write_sweep(&input, &[1.0, 2.0], 0.05);
    fs::write(
        &config,
        r#"{ "extraction": { "window": { "minGhz": 3.5, "maxGhz": 4.0 } } }"#,
    )
    .expect("config should be written");

    let windowed = s21scan(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "extract",
        input.to_str().expect("utf-8 path"),
        "--format",
        "json",
    ]);
    assert!(windowed.status.success());
    let rows: Value = serde_json::from_slice(&windowed.stdout).expect("stdout should be JSON");
    assert_eq!(rows.as_array().map(Vec::len), Some(0));

    let overridden = s21scan(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "extract",
        input.to_str().expect("utf-8 path"),
        "--window",
        "2.5:3.5",
        "--format",
        "json",
    ]);
    assert!(overridden.status.success());
    let rows: Value = serde_json::from_slice(&overridden.stdout).expect("stdout should be JSON");
    let rows = rows.as_array().expect("rows should be an array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["record_index"], 1);
    let f0 = rows[1]["f0_ghz"].as_f64().expect("f0 should be numeric");
    assert!((f0 - 3.05).abs() < 1.0e-3);
}

#[test]
fn export_writes_three_tables() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = temp.path().join("sweep.txt");
    let out_dir = temp.path().join("export");
    write_sweep(&input, &[1.0, 2.0], 0.05);

    let output = s21scan(&[
        "export",
        input.to_str().expect("utf-8 path"),
        "--output-dir",
        out_dir.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());

    let data = fs::read_to_string(out_dir.join("data.csv")).expect("data.csv should exist");
    assert_eq!(data.lines().count(), 1 + 2 * 201);
    let meta = fs::read_to_string(out_dir.join("meta.csv")).expect("meta.csv should exist");
    assert!(meta.contains("sweep.txt,2,Frequency / GHz,\"S2,1 (2) [Magnitude]\",201"));
    let config = fs::read_to_string(out_dir.join("config.csv")).expect("config.csv should exist");
    assert!(config.contains("sweep.txt,1,er,1\n"));
    assert!(config.contains("sweep.txt,2,tan_delta,0.02\n"));
}
