pub mod dips;
pub mod metrics;
pub mod serialization;
pub mod sweep;

mod traits;

pub use dips::DipExtractor;
pub use sweep::{SweepAggregator, SweepRequest, SweepTable};
pub use traits::FeatureExtractor;
