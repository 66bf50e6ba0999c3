//! Engineering metrics derived from resonance features.
//!
//! Frequencies come in GHz; shifts are reported in MHz. Sensitivity has a
//! single definition used everywhere in the crate:
//!
//! ```text
//! delta       = value - baseline_value            (units of the swept parameter)
//! rate        = |shift_MHz| / delta               (MHz per unit)
//! normalized  = rate / baseline_f0_GHz            (optional)
//! reported    = 0.1 * rate_or_normalized
//! ```

use crate::common::constants::{GHZ_TO_MHZ, SENSITIVITY_REPORT_SCALE};
use crate::domain::{ResonanceFeature, ScanError, ScanResult};

/// 3 dB bandwidth in GHz. A non-positive span is an invalid feature.
pub fn bandwidth(feature: &ResonanceFeature) -> ScanResult<f64> {
    let span = feature.span_ghz();
    if span > 0.0 {
        Ok(span)
    } else {
        Err(ScanError::invalid_feature(
            "METRIC.NON_POSITIVE_BANDWIDTH",
            format!(
                "resonance at {} GHz has non-positive bandwidth {} GHz",
                feature.resonance_frequency(),
                span
            ),
        ))
    }
}

pub fn quality_factor(feature: &ResonanceFeature) -> ScanResult<f64> {
    Ok(feature.resonance_frequency() / bandwidth(feature)?)
}

pub fn inverse_quality_factor(feature: &ResonanceFeature) -> ScanResult<f64> {
    Ok(bandwidth(feature)? / feature.resonance_frequency())
}

/// Spacing in GHz between two bands of the same record, `upper - lower`.
pub fn window_size(lower: &ResonanceFeature, upper: &ResonanceFeature) -> f64 {
    upper.resonance_frequency() - lower.resonance_frequency()
}

/// Signed resonance shift in MHz relative to `baseline_ghz`.
pub fn frequency_shift_mhz(feature: &ResonanceFeature, baseline_ghz: f64) -> f64 {
    (feature.resonance_frequency() - baseline_ghz) * GHZ_TO_MHZ
}

pub fn absolute_frequency_shift_mhz(feature: &ResonanceFeature, baseline_ghz: f64) -> f64 {
    frequency_shift_mhz(feature, baseline_ghz).abs()
}

/// Sensitivity requested at zero parameter delta, i.e. on the baseline row.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("sensitivity is undefined at zero parameter delta (value {value} equals baseline)")]
pub struct UndefinedSensitivity {
    pub value: f64,
}

impl UndefinedSensitivity {
    /// Cell value written where sensitivity is undefined.
    pub const fn sentinel() -> f64 {
        f64::NAN
    }
}

impl From<UndefinedSensitivity> for ScanError {
    fn from(error: UndefinedSensitivity) -> Self {
        ScanError::new(
            crate::domain::ScanErrorKind::UndefinedSensitivity,
            "METRIC.UNDEFINED_SENSITIVITY",
            error.to_string(),
        )
    }
}

/// Unscaled shift rate in MHz per unit of the swept parameter, optionally
/// divided by the baseline resonance frequency in GHz.
pub fn sensitivity_mhz_per_unit(
    shift_mhz: f64,
    value: f64,
    baseline_value: f64,
    baseline_f0_ghz: f64,
    normalize: bool,
) -> Result<f64, UndefinedSensitivity> {
    let delta = value - baseline_value;
    if delta == 0.0 {
        return Err(UndefinedSensitivity { value });
    }

    let rate = shift_mhz.abs() / delta;
    Ok(if normalize {
        rate / baseline_f0_ghz
    } else {
        rate
    })
}

/// Reported sensitivity: [`sensitivity_mhz_per_unit`] times the fixed
/// reporting scale.
pub fn sensitivity(
    shift_mhz: f64,
    value: f64,
    baseline_value: f64,
    baseline_f0_ghz: f64,
    normalize: bool,
) -> Result<f64, UndefinedSensitivity> {
    sensitivity_mhz_per_unit(shift_mhz, value, baseline_value, baseline_f0_ghz, normalize)
        .map(|rate| rate * SENSITIVITY_REPORT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::{
        UndefinedSensitivity, absolute_frequency_shift_mhz, bandwidth, frequency_shift_mhz,
        inverse_quality_factor, quality_factor, sensitivity, sensitivity_mhz_per_unit,
        window_size,
    };
    use crate::domain::{ResonanceFeature, Sample, ScanError, ScanErrorKind};

    fn feature(left: f64, centre: f64, right: f64) -> ResonanceFeature {
        ResonanceFeature::new(
            Sample::new(left, -12.0),
            Sample::new(centre, -15.0),
            Sample::new(right, -12.0),
        )
        .expect("feature should be ordered")
    }

    #[test]
    fn bandwidth_and_quality_factor_follow_crossings() {
        let feature = feature(1.9, 2.0, 2.1);
        let bw = bandwidth(&feature).expect("bandwidth should be positive");
        assert!((bw - 0.2).abs() < 1.0e-12);

        let q = quality_factor(&feature).expect("q should be defined");
        let inverse = inverse_quality_factor(&feature).expect("inverse q should be defined");
        assert!((q - 10.0).abs() < 1.0e-9);
        assert!((q * inverse - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn window_and_shift_are_signed() {
        let lower = feature(1.9, 2.0, 2.1);
        let upper = feature(3.4, 3.5, 3.6);
        assert!((window_size(&lower, &upper) - 1.5).abs() < 1.0e-12);
        assert!((window_size(&upper, &lower) + 1.5).abs() < 1.0e-12);

        assert!((frequency_shift_mhz(&lower, 2.05) + 50.0).abs() < 1.0e-9);
        assert!((absolute_frequency_shift_mhz(&lower, 2.05) - 50.0).abs() < 1.0e-9);
    }

    #[test]
    fn fifty_megahertz_per_unit_reports_with_fixed_scale() {
        let baseline = feature(2.9, 3.0, 3.1);
        let shifted = feature(2.95, 3.05, 3.15);
        let shift = frequency_shift_mhz(&shifted, baseline.resonance_frequency());
        assert!((shift - 50.0).abs() < 1.0e-9);

        let rate = sensitivity_mhz_per_unit(shift, 2.0, 1.0, 3.0, false)
            .expect("delta is non-zero");
        assert!((rate - 50.0).abs() < 1.0e-9);

        let normalized = sensitivity_mhz_per_unit(shift, 2.0, 1.0, 3.0, true)
            .expect("delta is non-zero");
        assert!((normalized - 50.0 / 3.0).abs() < 1.0e-9);

        let reported = sensitivity(shift, 2.0, 1.0, 3.0, false).expect("delta is non-zero");
        assert!((reported - 5.0).abs() < 1.0e-9);
    }

    #[test]
    fn negative_shift_uses_magnitude_and_keeps_delta_sign() {
        let rate = sensitivity_mhz_per_unit(-80.0, 3.0, 1.0, 2.0, false).expect("delta is 2");
        assert!((rate - 40.0).abs() < 1.0e-12);

        let below = sensitivity_mhz_per_unit(-80.0, 0.5, 1.0, 2.0, false).expect("delta is -0.5");
        assert!((below + 160.0).abs() < 1.0e-12);
    }

    #[test]
    fn baseline_row_sensitivity_is_undefined_with_nan_sentinel() {
        let error = sensitivity(0.0, 1.0, 1.0, 3.0, true).expect_err("zero delta");
        assert_eq!(error, UndefinedSensitivity { value: 1.0 });
        assert!(UndefinedSensitivity::sentinel().is_nan());

        let scan_error: ScanError = error.into();
        assert_eq!(scan_error.kind(), ScanErrorKind::UndefinedSensitivity);
        assert_eq!(scan_error.exit_code(), 4);
    }
}
