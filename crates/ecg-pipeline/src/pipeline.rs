//! Configured pipeline over every analysis stage

use crate::config::PipelineConfig;
use crate::error::Result;
use artifact_detector::{ArtifactDetector, ArtifactReport};
use augmentation::{AugmentationEngine, ValidationReport};
use beat_detector::{BeatDetector, BeatSet, BeatTemplateExtractor, TemplateSet};
use feature_engine::{classify_rhythm, FeatureExtractor, FeatureVector, RhythmAssessment};
use rayon::prelude::*;
use serde::Serialize;
use signal_core::{Signal, SignalPreprocessor};
use signal_quality::{QualityReport, SignalQualityAssessor};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything `analyze` derives from one recording
#[derive(Debug, Clone, Serialize)]
pub struct SignalAnalysis {
    pub preprocessed: Signal,
    pub beats: BeatSet,
    pub rhythm: RhythmAssessment,
    pub artifacts: ArtifactReport,
    pub quality: QualityReport,
    pub features: FeatureVector,
}

impl SignalAnalysis {
    pub fn heart_rate_bpm(&self) -> Option<f64> {
        self.beats.heart_rate_bpm()
    }
}

/// Stage instances built once from a [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct EcgPipeline {
    config: PipelineConfig,
    preprocessor: SignalPreprocessor,
    detector: BeatDetector,
    templates: BeatTemplateExtractor,
    artifacts: ArtifactDetector,
    quality: SignalQualityAssessor,
    features: FeatureExtractor,
    augmentation: AugmentationEngine,
}

impl Default for EcgPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl EcgPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            preprocessor: SignalPreprocessor::new(config.preprocess.clone()),
            detector: BeatDetector::new(config.beats.clone()),
            templates: BeatTemplateExtractor::new(config.features.templates.clone()),
            artifacts: ArtifactDetector::new(config.artifacts.clone()),
            quality: SignalQualityAssessor::new(config.quality.clone()),
            features: FeatureExtractor::new(config.features.clone()),
            augmentation: AugmentationEngine::new(config.augmentation.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn preprocess(&self, signal: &Signal) -> Result<Signal> {
        Ok(self.preprocessor.preprocess(signal)?)
    }

    pub fn detect_beats(&self, signal: &Signal) -> BeatSet {
        self.detector.detect(signal)
    }

    pub fn extract_templates(&self, signal: &Signal, beats: &BeatSet) -> TemplateSet {
        self.templates.extract(signal, beats)
    }

    pub fn detect_artifacts(&self, signal: &Signal) -> Result<ArtifactReport> {
        Ok(self.artifacts.detect(signal)?)
    }

    pub fn remove_artifacts(&self, signal: &Signal, report: &ArtifactReport) -> Result<Signal> {
        Ok(self.artifacts.remove(signal, report)?)
    }

    pub fn assess_quality(&self, signal: &Signal) -> Result<QualityReport> {
        Ok(self.quality.assess(signal)?)
    }

    pub fn extract_features(&self, signal: &Signal, beats: &BeatSet) -> FeatureVector {
        self.features.extract(signal, beats)
    }

    pub fn augment<S: AsRef<str>>(
        &self,
        signal: &Signal,
        methods: &[S],
        intensity: f64,
    ) -> Result<Signal> {
        Ok(self.augmentation.augment(signal, methods, intensity)?)
    }

    pub fn validate_augmentation(
        &self,
        original: &Signal,
        augmented: &Signal,
    ) -> Result<ValidationReport> {
        Ok(self.augmentation.validate(original, augmented)?)
    }

    /// Preprocess, then run the beat/feature and artifact/quality branches
    /// concurrently on the preprocessed signal
    pub fn analyze(&self, signal: &Signal) -> Result<SignalAnalysis> {
        let started = Instant::now();
        let preprocessed = self.preprocess(signal)?;

        let ((beats, rhythm, features), checks) = rayon::join(
            || {
                let beats = self.detect_beats(&preprocessed);
                let rhythm = classify_rhythm(&beats);
                let features = self.extract_features(&preprocessed, &beats);
                (beats, rhythm, features)
            },
            || -> Result<(ArtifactReport, QualityReport)> {
                Ok((
                    self.detect_artifacts(&preprocessed)?,
                    self.assess_quality(&preprocessed)?,
                ))
            },
        );
        let (artifacts, quality) = checks?;

        if !quality.is_acceptable() {
            warn!(
                "Signal quality {} ({:.1}), failed checks: {:?}",
                quality.category,
                quality.overall_score,
                quality.failed_checks()
            );
        }
        debug!(
            "Analyzed {} samples in {:?}: {} beats, {} features, primary artifact {}",
            signal.len(),
            started.elapsed(),
            beats.len(),
            features.len(),
            artifacts.summary.primary_label()
        );

        Ok(SignalAnalysis {
            preprocessed,
            beats,
            rhythm,
            artifacts,
            quality,
            features,
        })
    }

    /// Analyze every signal in parallel; results follow input order
    pub fn analyze_batch(&self, signals: &[Signal]) -> Vec<Result<SignalAnalysis>> {
        info!("Analyzing batch of {} signals", signals.len());
        let results: Vec<Result<SignalAnalysis>> =
            signals.par_iter().map(|s| self.analyze(s)).collect();
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!("{} of {} signals failed analysis", failed, signals.len());
        }
        results
    }

    /// Preprocess and extract features for every signal; fails on the first
    /// signal that cannot be preprocessed
    pub fn extract_features_batch(&self, signals: &[Signal]) -> Result<Vec<FeatureVector>> {
        info!("Extracting features for {} signals", signals.len());
        signals
            .par_iter()
            .map(|signal| -> Result<FeatureVector> {
                let preprocessed = self.preprocess(signal)?;
                let beats = self.detect_beats(&preprocessed);
                Ok(self.extract_features(&preprocessed, &beats))
            })
            .collect()
    }

    /// Originals plus `per_signal` random augmentations each
    pub fn generate_dataset(
        &self,
        signals: &[Signal],
        per_signal: usize,
        intensity: f64,
    ) -> Result<Vec<Signal>> {
        Ok(self.augmentation.generate_dataset(
            signals,
            per_signal,
            intensity,
            self.config.augmentation.seed,
        )?)
    }
}
