//! Feature Vector Assembly

use crate::config::FeatureConfig;
use crate::error::Result;
use crate::interval::IntervalFeatures;
use crate::morphology::MorphologyFeatures;
use crate::nonlinear::NonlinearFeatures;
use crate::spectral::SpectralFeatures;
use crate::statistics::StatisticalFeatures;
use crate::temporal::TemporalFeatures;
use crate::waveform::WaveformFeatures;
use beat_detector::{BeatSet, BeatTemplateExtractor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use signal_core::{Signal, SpectrumAnalyzer};
use std::fmt;
use tracing::{debug, warn};

/// Feature families, in extraction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    Temporal,
    Spectral,
    Statistical,
    Morphological,
    Nonlinear,
    Interval,
    Waveform,
}

impl FeatureGroup {
    pub const ALL: [FeatureGroup; 7] = [
        FeatureGroup::Temporal,
        FeatureGroup::Spectral,
        FeatureGroup::Statistical,
        FeatureGroup::Morphological,
        FeatureGroup::Nonlinear,
        FeatureGroup::Interval,
        FeatureGroup::Waveform,
    ];

    /// Name prefix shared by every feature of the group
    pub fn prefix(&self) -> &'static str {
        match self {
            FeatureGroup::Temporal => "temporal_",
            FeatureGroup::Spectral => "spectral_",
            FeatureGroup::Statistical => "statistical_",
            FeatureGroup::Morphological => "morph_",
            FeatureGroup::Nonlinear => "nonlinear_",
            FeatureGroup::Interval => "interval_",
            FeatureGroup::Waveform => "waveform_",
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches('_'))
    }
}

/// Groups that fell back to default values for lack of beats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateFlags {
    pub morphology: bool,
    pub intervals: bool,
    pub waveform: bool,
}

impl DegenerateFlags {
    pub fn any(&self) -> bool {
        self.morphology || self.intervals || self.waveform
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub name: String,
    pub group: FeatureGroup,
    pub value: f64,
}

/// Ordered feature map for ML export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    entries: Vec<FeatureEntry>,
    /// Samples in the analyzed signal
    pub signal_length: usize,
    pub sampling_rate_hz: u32,
    pub degenerate: DegenerateFlags,
}

impl FeatureVector {
    pub fn new(signal_length: usize, sampling_rate_hz: u32) -> Self {
        Self {
            entries: Vec::new(),
            signal_length,
            sampling_rate_hz,
            degenerate: DegenerateFlags::default(),
        }
    }

    /// Append a feature; non-finite values are stored as 0.0
    pub fn push(&mut self, group: FeatureGroup, name: impl Into<String>, value: f64) {
        let name = name.into();
        let value = if value.is_finite() {
            value
        } else {
            debug!("Feature {} was {}, storing 0.0", name, value);
            0.0
        };
        self.entries.push(FeatureEntry { name, group, value });
    }

    pub fn extend<N, I>(&mut self, group: FeatureGroup, entries: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, f64)>,
    {
        for (name, value) in entries {
            self.push(group, name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value)
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.value).collect()
    }

    pub fn group(&self, group: FeatureGroup) -> impl Iterator<Item = &FeatureEntry> {
        self.entries.iter().filter(move |e| e.group == group)
    }

    /// Comma-separated feature names
    pub fn csv_header(&self) -> String {
        self.names().collect::<Vec<_>>().join(",")
    }

    /// Comma-separated values in header order
    pub fn csv_row(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.value.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Compact binary encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(postcard::from_bytes(bytes)?)
    }
}

/// Extracts the seven feature groups from a preprocessed signal
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract all groups with an RNG seeded from the configuration
    pub fn extract(&self, signal: &Signal, beats: &BeatSet) -> FeatureVector {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.extract_with_rng(signal, beats, &mut rng)
    }

    /// Extract all groups drawing sampled estimators from `rng`
    ///
    /// `beats` must index into `signal`. Too few beats never fail: the
    /// affected groups take their default values and are flagged.
    pub fn extract_with_rng<R: Rng + ?Sized>(
        &self,
        signal: &Signal,
        beats: &BeatSet,
        rng: &mut R,
    ) -> FeatureVector {
        let values = signal.finite_samples();
        let fs = signal.fs();
        let mut vector = FeatureVector::new(values.len(), signal.sampling_rate_hz());

        vector.extend(
            FeatureGroup::Temporal,
            TemporalFeatures::compute(&values, fs).entries(),
        );

        let mut analyzer = SpectrumAnalyzer::new(fs);
        vector.extend(
            FeatureGroup::Spectral,
            SpectralFeatures::compute(&mut analyzer, &values, self.config.welch_segment)
                .entries(),
        );

        vector.extend(
            FeatureGroup::Statistical,
            StatisticalFeatures::compute(&values).entries(),
        );

        let templates =
            BeatTemplateExtractor::new(self.config.templates.clone()).extract(signal, beats);
        let morphology_ready =
            beats.len() >= self.config.min_morphology_beats && templates.is_sufficient();
        let morphology = if morphology_ready {
            MorphologyFeatures::compute(&templates, fs)
        } else {
            vector.degenerate.morphology = true;
            MorphologyFeatures::default()
        };
        vector.extend(FeatureGroup::Morphological, morphology.entries());

        vector.extend(
            FeatureGroup::Nonlinear,
            NonlinearFeatures::compute(&values, rng).entries(),
        );

        if beats.is_degenerate() {
            vector.degenerate.intervals = true;
        }
        vector.extend(
            FeatureGroup::Interval,
            IntervalFeatures::compute(beats).entries(),
        );

        let waveform = if beats.is_degenerate() {
            vector.degenerate.waveform = true;
            WaveformFeatures::degenerate(self.config.mse_max_scale)
        } else {
            WaveformFeatures::compute(
                &values,
                &templates,
                morphology_ready,
                self.config.mse_max_scale,
            )
        };
        vector.extend(FeatureGroup::Waveform, waveform.entries());

        if vector.degenerate.any() {
            warn!(
                "Feature extraction with {} beats fell back to defaults: {:?}",
                beats.len(),
                vector.degenerate
            );
        }
        debug!(
            "Extracted {} features from {} samples ({} beats, {} templates)",
            vector.len(),
            values.len(),
            beats.len(),
            templates.len()
        );
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beat_detector::BeatDetector;
    use signal_core::synthetic;

    fn pulse_signal() -> (Signal, BeatSet) {
        let signal = synthetic::pulse_train(500, 10.0, 72.0).unwrap();
        let beats = BeatDetector::default().detect(&signal);
        (signal, beats)
    }

    #[test]
    fn test_feature_extraction() {
        let (signal, beats) = pulse_signal();
        let features = FeatureExtractor::default().extract(&signal, &beats);

        assert_eq!(features.len(), 91);
        assert!(!features.degenerate.any());
        assert_eq!(features.signal_length, 5000);
        assert!(features.values().iter().all(|v| v.is_finite()));
        let hr = features.get("interval_mean_heart_rate").unwrap();
        assert!((hr - 72.0).abs() < 3.0, "heart rate {}", hr);
    }

    #[test]
    fn test_names_carry_group_prefix() {
        let (signal, beats) = pulse_signal();
        let features = FeatureExtractor::default().extract(&signal, &beats);
        for entry in features.entries() {
            assert!(
                entry.name.starts_with(entry.group.prefix()),
                "{} not in {}",
                entry.name,
                entry.group
            );
        }
        // Groups appear in extraction order
        let order: Vec<FeatureGroup> = features.entries().iter().map(|e| e.group).collect();
        let mut sorted = order.clone();
        sorted.sort_by_key(|g| FeatureGroup::ALL.iter().position(|x| x == g));
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let (signal, beats) = pulse_signal();
        let extractor = FeatureExtractor::default();
        assert_eq!(extractor.extract(&signal, &beats), extractor.extract(&signal, &beats));
    }

    #[test]
    fn test_zero_signal_flags_degenerate() {
        let signal = Signal::new(vec![0.0; 2500], 500).unwrap();
        let beats = BeatSet::empty(500);
        let features = FeatureExtractor::default().extract(&signal, &beats);

        assert!(features.degenerate.morphology);
        assert!(features.degenerate.intervals);
        assert!(features.degenerate.waveform);
        assert_eq!(features.len(), 91);
        assert!(features.values().iter().all(|v| v.is_finite()));
        assert_eq!(features.get("morph_qt_interval"), Some(400.0));
        assert_eq!(features.get("morph_template_correlation"), Some(1.0));
        assert_eq!(features.get("waveform_mse_scale5"), Some(0.0));
    }

    #[test]
    fn test_too_few_templates_flags_morphology() {
        let signal = synthetic::pulse_train(500, 6.0, 60.0).unwrap();
        // First and last windows cross the signal ends, leaving one template
        let beats = BeatSet::from_indices(vec![100, 1500, 2900], 500);
        let features = FeatureExtractor::default().extract(&signal, &beats);

        assert!(features.degenerate.morphology);
        assert!(!features.degenerate.waveform);
        assert_eq!(features.get("morph_template_correlation"), Some(1.0));
        assert_eq!(features.get("morph_qrs_duration"), Some(100.0));
        assert_eq!(features.get("morph_qt_interval"), Some(400.0));
        assert_eq!(features.get("waveform_symmetry"), Some(0.0));
        assert_eq!(features.get("waveform_regularity"), Some(0.0));
    }

    #[test]
    fn test_non_finite_stored_as_zero() {
        let mut vector = FeatureVector::new(10, 500);
        vector.push(FeatureGroup::Temporal, "temporal_mean", f64::NAN);
        vector.push(FeatureGroup::Temporal, "temporal_std", f64::INFINITY);
        assert_eq!(vector.values(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_csv_export() {
        let mut vector = FeatureVector::new(10, 500);
        vector.push(FeatureGroup::Temporal, "temporal_mean", 1.5);
        vector.push(FeatureGroup::Interval, "interval_mean_rr", 800.0);
        assert_eq!(vector.csv_header(), "temporal_mean,interval_mean_rr");
        assert_eq!(vector.csv_row(), "1.5,800");
    }

    #[test]
    fn test_binary_roundtrip() {
        let (signal, beats) = pulse_signal();
        let features = FeatureExtractor::default().extract(&signal, &beats);
        let bytes = features.to_bytes().unwrap();
        assert_eq!(FeatureVector::from_bytes(&bytes).unwrap(), features);
        assert!(features.to_json().unwrap().contains("\"morph_r_amplitude\""));
    }
}
