//! Fixed numeric conventions shared by the extraction and metric layers.
//!
//! Frequencies are carried in GHz and magnitudes in dB throughout the crate.

/// GHz to MHz, used when reporting resonance shifts.
pub const GHZ_TO_MHZ: f64 = 1.0e3;

/// Reporting scale applied to every sensitivity value.
///
/// Sensitivities are tabulated as `0.1 * |shift_MHz| / delta` so that values
/// line up with spreadsheet-era reports; the unscaled rate is available from
/// `modules::metrics::sensitivity_mhz_per_unit`.
pub const SENSITIVITY_REPORT_SCALE: f64 = 0.1;

pub const MIN_SAMPLES_FOR_FEATURES: usize = 3;
pub const MIN_SWEEP_ROWS: usize = 2;

pub const DEFAULT_THRESHOLD_DB: f64 = 3.0;
pub const DEFAULT_MIN_SPACING: usize = 5;
pub const DEFAULT_MAX_BANDWIDTH_RATIO: f64 = 0.1;
pub const DEFAULT_MIN_DEPTH_DB: f64 = 3.0;
pub const DEFAULT_MAX_ASYMMETRY_RATIO: f64 = 5.0;

/// Crossing magnitudes sit exactly at `minimum + threshold`, so the depth
/// check compares within this slack.
pub const DEPTH_TOLERANCE_DB: f64 = 1.0e-9;

pub const DEFAULT_BASELINE_VALUE: f64 = 1.0;
pub const PERMITTIVITY_AXES: [&str; 3] = ["er", "eps_r", "epsilon_r"];

/// Absolute slack when matching parameter values read from text files.
pub const PARAMETER_MATCH_TOLERANCE: f64 = 1.0e-12;

/// Below this many records the sweep extracts serially.
pub const PARALLEL_RECORD_THRESHOLD: usize = 8;
