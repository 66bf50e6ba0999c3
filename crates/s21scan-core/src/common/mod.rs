pub mod config;
pub mod constants;

pub use config::{
    AnalysisConfig, AnalysisConfigError, ExtractionConfig, FrequencyWindow, SweepSettings,
    ValidityCriteria, load_analysis_config,
};
