//! Beat Detection
//!
//! R-peak detection over the squared-derivative energy envelope and
//! fixed-window beat template extraction.

pub mod config;
mod detector;
pub mod peaks;
mod template;

pub use config::{BeatDetectorConfig, TemplateConfig};
pub use detector::{BeatDetector, BeatSet};
pub use peaks::find_peaks;
pub use template::{BeatTemplateExtractor, TemplateSet};
