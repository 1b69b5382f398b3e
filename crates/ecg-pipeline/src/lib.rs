//! ECG Analysis Pipeline
//!
//! Library surface over every stage: preprocessing, beat detection,
//! templates, artifacts, quality, features and augmentation. The free
//! functions run with default settings; [`EcgPipeline`] carries a layered
//! [`PipelineConfig`] and adds whole-recording analysis and batch workers.

pub mod config;
mod error;
pub mod logging;
mod pipeline;

pub use crate::config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use logging::{init_logging, LoggingConfig};
pub use pipeline::{EcgPipeline, SignalAnalysis};

pub use artifact_detector::{ArtifactKind, ArtifactReport, ArtifactSegment};
pub use augmentation::{AugmentationKind, NoiseKind, ValidationReport};
pub use beat_detector::{BeatSet, TemplateSet};
pub use feature_engine::{DegenerateFlags, FeatureGroup, FeatureVector, RhythmAssessment, RhythmClass};
pub use signal_core::{EcgError, Signal};
pub use signal_quality::{QualityCategory, QualityReport};

use artifact_detector::ArtifactDetector;
use augmentation::AugmentationEngine;
use beat_detector::{BeatDetector, BeatTemplateExtractor};
use feature_engine::FeatureExtractor;
use signal_core::SignalPreprocessor;
use signal_quality::SignalQualityAssessor;

/// Bandpass and baseline removal with default settings
pub fn preprocess(signal: &Signal) -> Result<Signal> {
    Ok(SignalPreprocessor::default().preprocess(signal)?)
}

pub fn detect_beats(signal: &Signal) -> BeatSet {
    BeatDetector::default().detect(signal)
}

pub fn extract_templates(signal: &Signal, beats: &BeatSet) -> TemplateSet {
    BeatTemplateExtractor::default().extract(signal, beats)
}

pub fn detect_artifacts(signal: &Signal) -> Result<ArtifactReport> {
    Ok(ArtifactDetector::default().detect(signal)?)
}

pub fn remove_artifacts(signal: &Signal, report: &ArtifactReport) -> Result<Signal> {
    Ok(ArtifactDetector::default().remove(signal, report)?)
}

pub fn assess_quality(signal: &Signal) -> Result<QualityReport> {
    Ok(SignalQualityAssessor::default().assess(signal)?)
}

pub fn extract_features(signal: &Signal, beats: &BeatSet) -> FeatureVector {
    FeatureExtractor::default().extract(signal, beats)
}

/// Apply the named transforms in order; an empty list returns the input
pub fn augment(signal: &Signal, methods: &[&str], intensity: f64) -> Result<Signal> {
    Ok(AugmentationEngine::default().augment(signal, methods, intensity)?)
}

pub fn validate_augmentation(original: &Signal, augmented: &Signal) -> Result<ValidationReport> {
    Ok(AugmentationEngine::default().validate(original, augmented)?)
}
