use super::Sample;
use serde::Serialize;

/// Why a candidate dip did not become a [`ResonanceFeature`].
///
/// Rejections are local to one candidate: the record keeps its other
/// features and extraction carries on.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum FeatureRejection {
    #[error("no {side} crossing of {level_db:.3} dB before the edge of the sweep")]
    MissingCrossing { side: CrossingSide, level_db: f64 },
    #[error(
        "crossings out of order: left {left_ghz} GHz, resonance {resonance_ghz} GHz, right {right_ghz} GHz"
    )]
    CrossingOrder {
        left_ghz: f64,
        resonance_ghz: f64,
        right_ghz: f64,
    },
    #[error("non-positive bandwidth {bandwidth_ghz} GHz")]
    NonPositiveBandwidth { bandwidth_ghz: f64 },
    #[error("bandwidth ratio {ratio:.4} exceeds {limit}; broad valley, not a resonance")]
    BroadValley { ratio: f64, limit: f64 },
    #[error("dip depth {depth_db:.3} dB is below {limit_db} dB")]
    Shallow { depth_db: f64, limit_db: f64 },
    #[error("half-bandwidth asymmetry {ratio:.3} exceeds {limit}")]
    Asymmetric { ratio: f64, limit: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingSide {
    Left,
    Right,
}

impl std::fmt::Display for CrossingSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// One resonance dip: the refined minimum and the two points where the
/// curve climbs back through `minimum + threshold_db`.
///
/// Invariant: `left_crossing.frequency < resonance.frequency <
/// right_crossing.frequency`, enforced by [`ResonanceFeature::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResonanceFeature {
    left_crossing: Sample,
    resonance: Sample,
    right_crossing: Sample,
}

impl ResonanceFeature {
    pub fn new(
        left_crossing: Sample,
        resonance: Sample,
        right_crossing: Sample,
    ) -> Result<Self, FeatureRejection> {
        let ordered = left_crossing.frequency < resonance.frequency
            && resonance.frequency < right_crossing.frequency;
        if !ordered {
            return Err(FeatureRejection::CrossingOrder {
                left_ghz: left_crossing.frequency,
                resonance_ghz: resonance.frequency,
                right_ghz: right_crossing.frequency,
            });
        }

        Ok(Self {
            left_crossing,
            resonance,
            right_crossing,
        })
    }

    pub fn left_crossing(&self) -> Sample {
        self.left_crossing
    }

    pub fn resonance(&self) -> Sample {
        self.resonance
    }

    pub fn right_crossing(&self) -> Sample {
        self.right_crossing
    }

    pub fn resonance_frequency(&self) -> f64 {
        self.resonance.frequency
    }

    pub fn span_ghz(&self) -> f64 {
        self.right_crossing.frequency - self.left_crossing.frequency
    }

    pub fn left_half_width(&self) -> f64 {
        self.resonance.frequency - self.left_crossing.frequency
    }

    pub fn right_half_width(&self) -> f64 {
        self.right_crossing.frequency - self.resonance.frequency
    }

    pub fn depth_db(&self) -> f64 {
        self.left_crossing.magnitude - self.resonance.magnitude
    }
}
