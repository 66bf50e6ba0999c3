//! Analysis configuration: extraction thresholds, validity rules and sweep
//! baseline conventions, loadable from a JSON file with every field optional.

use super::constants::{
    DEFAULT_BASELINE_VALUE, DEFAULT_MAX_ASYMMETRY_RATIO, DEFAULT_MAX_BANDWIDTH_RATIO,
    DEFAULT_MIN_DEPTH_DB, DEFAULT_MIN_SPACING, DEFAULT_THRESHOLD_DB, PERMITTIVITY_AXES,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub extraction: ExtractionConfig,
    pub sweep: SweepSettings,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.extraction.validate()?;
        if !self.sweep.baseline_value.is_finite() {
            return Err(format!(
                "sweep.baselineValue must be finite, got {}",
                self.sweep.baseline_value
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionConfig {
    pub threshold_db: f64,
    pub min_spacing: usize,
    pub window: Option<FrequencyWindow>,
    pub validity: ValidityCriteria,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            threshold_db: DEFAULT_THRESHOLD_DB,
            min_spacing: DEFAULT_MIN_SPACING,
            window: None,
            validity: ValidityCriteria::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.threshold_db.is_finite() && self.threshold_db > 0.0) {
            return Err(format!(
                "extraction.thresholdDb must be a positive number, got {}",
                self.threshold_db
            ));
        }
        if self.min_spacing == 0 {
            return Err("extraction.minSpacing must be at least 1 sample".to_string());
        }
        if let Some(window) = self.window {
            window.validate()?;
        }
        self.validity.validate()
    }
}

/// Inclusive frequency window in GHz applied before dip detection.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyWindow {
    pub min_ghz: f64,
    pub max_ghz: f64,
}

impl FrequencyWindow {
    pub fn new(min_ghz: f64, max_ghz: f64) -> Self {
        Self { min_ghz, max_ghz }
    }

    pub fn contains(&self, frequency_ghz: f64) -> bool {
        frequency_ghz >= self.min_ghz && frequency_ghz <= self.max_ghz
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_ghz.is_finite() && self.max_ghz.is_finite()) || self.min_ghz > self.max_ghz
        {
            return Err(format!(
                "frequency window [{}, {}] GHz is empty or not finite",
                self.min_ghz, self.max_ghz
            ));
        }
        Ok(())
    }
}

/// Physical plausibility rules a dip must satisfy to count as a resonance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidityCriteria {
    /// Largest accepted `bandwidth / f0`; wider dips are broad valleys.
    pub max_bandwidth_ratio: f64,
    /// Smallest accepted `left_crossing.magnitude - minimum` in dB.
    pub min_depth_db: f64,
    /// Largest accepted ratio between the two half-bandwidths.
    pub max_asymmetry_ratio: f64,
}

impl Default for ValidityCriteria {
    fn default() -> Self {
        Self {
            max_bandwidth_ratio: DEFAULT_MAX_BANDWIDTH_RATIO,
            min_depth_db: DEFAULT_MIN_DEPTH_DB,
            max_asymmetry_ratio: DEFAULT_MAX_ASYMMETRY_RATIO,
        }
    }
}

impl ValidityCriteria {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_bandwidth_ratio > 0.0) {
            return Err(format!(
                "validity.maxBandwidthRatio must be positive, got {}",
                self.max_bandwidth_ratio
            ));
        }
        if self.min_depth_db.is_nan() {
            return Err("validity.minDepthDb must be a number".to_string());
        }
        if !(self.max_asymmetry_ratio >= 1.0) {
            return Err(format!(
                "validity.maxAsymmetryRatio must be at least 1, got {}",
                self.max_asymmetry_ratio
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SweepSettings {
    /// Axis value of the reference record for shift and sensitivity.
    pub baseline_value: f64,
    /// Axes that get a baseline without being asked for one.
    pub permittivity_axes: Vec<String>,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            baseline_value: DEFAULT_BASELINE_VALUE,
            permittivity_axes: PERMITTIVITY_AXES.iter().map(|axis| axis.to_string()).collect(),
        }
    }
}

impl SweepSettings {
    pub fn is_permittivity_axis(&self, axis: &str) -> bool {
        self.permittivity_axes
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(axis))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisConfigError {
    #[error("failed to read analysis config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse analysis config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid analysis config '{}': {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

pub fn load_analysis_config(
    config_path: impl AsRef<Path>,
) -> Result<AnalysisConfig, AnalysisConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| AnalysisConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: AnalysisConfig =
        serde_json::from_str(&source).map_err(|source| AnalysisConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
    config
        .validate()
        .map_err(|reason| AnalysisConfigError::Invalid {
            path: config_path.to_path_buf(),
            reason,
        })?;
    Ok(config)
}
