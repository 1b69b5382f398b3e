//! ECG Signal Quality
//!
//! Scores a recording on SNR, baseline wander, powerline interference,
//! missing data, clipping and ADC saturation, and maps the composite score
//! to a quality category with recommendations.

mod assessor;
pub mod config;
mod report;

pub use assessor::SignalQualityAssessor;
pub use config::{QualityConfig, QualityDeductions, QualityThresholds};
pub use report::{
    BaselineWanderMetrics, BasicStats, ClippingMetrics, MissingDataMetrics, PowerlineMetrics,
    QualityCategory, QualityReport, SaturationMetrics, SnrMetrics,
};
