pub mod errors;
mod feature;

pub use errors::{
    ExitStatus, ParserResult, ScanError, ScanErrorCategory, ScanErrorKind, ScanResult,
    SweepResult,
};
pub use feature::{CrossingSide, FeatureRejection, ResonanceFeature};

use crate::common::ExtractionConfig;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Parameter name to value, as carried in a block header.
pub type ParameterSet = BTreeMap<String, f64>;

/// One point of an S2,1 curve: frequency in GHz, magnitude in dB.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Sample {
    pub frequency: f64,
    pub magnitude: f64,
}

impl Sample {
    pub const fn new(frequency: f64, magnitude: f64) -> Self {
        Self {
            frequency,
            magnitude,
        }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((frequency, magnitude): (f64, f64)) -> Self {
        Self::new(frequency, magnitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AxisLabels {
    pub x_label: String,
    pub y_label: String,
}

impl AxisLabels {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            x_label: x_label.into(),
            y_label: y_label.into(),
        }
    }
}

/// Features extracted from a record together with the settings that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatures {
    settings: ExtractionConfig,
    features: Vec<ResonanceFeature>,
}

impl DerivedFeatures {
    pub fn settings(&self) -> &ExtractionConfig {
        &self.settings
    }

    pub fn features(&self) -> &[ResonanceFeature] {
        &self.features
    }

    /// False when extraction ran and found nothing worth keeping.
    pub fn band_valid(&self) -> bool {
        !self.features.is_empty()
    }
}

/// One measurement block: header parameters, optional axis labels and the
/// frequency-ascending samples.
///
/// Samples are fixed at construction. The only interior state is the
/// extracted-feature cache, which is filled at most once.
#[derive(Debug, Clone)]
pub struct Record {
    config: ParameterSet,
    axis_labels: Option<AxisLabels>,
    samples: Vec<Sample>,
    derived: OnceLock<DerivedFeatures>,
}

impl Record {
    pub fn new(config: ParameterSet, samples: Vec<Sample>) -> Self {
        Self {
            config,
            axis_labels: None,
            samples,
            derived: OnceLock::new(),
        }
    }

    pub fn with_axis_labels(mut self, axis_labels: AxisLabels) -> Self {
        self.axis_labels = Some(axis_labels);
        self
    }

    pub fn config(&self) -> &ParameterSet {
        &self.config
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.config.get(name).copied()
    }

    pub fn axis_labels(&self) -> Option<&AxisLabels> {
        self.axis_labels.as_ref()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_frequency_sorted(&self) -> bool {
        self.samples
            .windows(2)
            .all(|pair| pair[0].frequency <= pair[1].frequency)
    }

    pub fn derived(&self) -> Option<&DerivedFeatures> {
        self.derived.get()
    }

    /// Returns the features for `settings`, running `extract` at most once
    /// per record. A request with settings other than the cached ones is
    /// computed fresh and leaves the cache untouched.
    pub fn features_with<F>(&self, settings: &ExtractionConfig, extract: F) -> Cow<'_, [ResonanceFeature]>
    where
        F: Fn(&[Sample]) -> Vec<ResonanceFeature>,
    {
        let derived = self.derived.get_or_init(|| DerivedFeatures {
            settings: *settings,
            features: extract(&self.samples),
        });

        if derived.settings == *settings {
            Cow::Borrowed(&derived.features)
        } else {
            Cow::Owned(extract(&self.samples))
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.axis_labels == other.axis_labels
            && self.samples == other.samples
    }
}
