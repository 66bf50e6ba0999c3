use crate::common::ValidityCriteria;
use crate::common::constants::DEPTH_TOLERANCE_DB;
use crate::domain::{FeatureRejection, ResonanceFeature};

pub(crate) fn check_validity(
    feature: &ResonanceFeature,
    criteria: &ValidityCriteria,
) -> Result<(), FeatureRejection> {
    let bandwidth = feature.span_ghz();
    if !(bandwidth > 0.0) {
        return Err(FeatureRejection::NonPositiveBandwidth {
            bandwidth_ghz: bandwidth,
        });
    }

    let ratio = bandwidth / feature.resonance_frequency();
    if ratio > criteria.max_bandwidth_ratio {
        return Err(FeatureRejection::BroadValley {
            ratio,
            limit: criteria.max_bandwidth_ratio,
        });
    }

    let depth = feature.depth_db();
    if depth + DEPTH_TOLERANCE_DB < criteria.min_depth_db {
        return Err(FeatureRejection::Shallow {
            depth_db: depth,
            limit_db: criteria.min_depth_db,
        });
    }

    let left = feature.left_half_width();
    let right = feature.right_half_width();
    let asymmetry = left.max(right) / left.min(right);
    if asymmetry > criteria.max_asymmetry_ratio {
        return Err(FeatureRejection::Asymmetric {
            ratio: asymmetry,
            limit: criteria.max_asymmetry_ratio,
        });
    }

    Ok(())
}
