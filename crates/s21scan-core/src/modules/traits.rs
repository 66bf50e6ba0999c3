use crate::domain::{Record, ResonanceFeature, Sample};
use std::borrow::Cow;

/// Turns one record's samples into resonance features.
///
/// The sweep aggregator only talks to this trait, so alternative detectors
/// (or canned features in tests) can stand in for the dip extractor.
pub trait FeatureExtractor {
    fn extract(&self, samples: &[Sample]) -> Vec<ResonanceFeature>;

    fn features_for<'r>(&self, record: &'r Record) -> Cow<'r, [ResonanceFeature]> {
        Cow::Owned(self.extract(record.samples()))
    }
}
