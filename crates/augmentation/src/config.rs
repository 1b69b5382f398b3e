//! Augmentation and validation settings

use serde::{Deserialize, Serialize};

/// Acceptance limits for an augmented signal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Welch segment length for the spectral comparison
    pub welch_segment: usize,

    /// Largest mean shift, as a fraction of the original std
    pub max_mean_shift: f64,

    pub min_correlation: f64,

    pub min_spectral_similarity: f64,

    /// Largest heart rate change still counted as preserved (bpm)
    pub max_heart_rate_difference: f64,

    /// Scores above this are valid
    pub validity_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            welch_segment: 256,
            max_mean_shift: 0.2,
            min_correlation: 0.7,
            min_spectral_similarity: 0.6,
            max_heart_rate_difference: 10.0,
            validity_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationConfig {
    /// Seed for `augment`; dataset generation takes its own
    pub seed: u64,

    /// Methods applied when none are named
    pub default_methods: Vec<String>,

    pub validation: ValidationConfig,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            default_methods: vec![
                "noise_injection".to_string(),
                "time_warping".to_string(),
                "amplitude_scaling".to_string(),
            ],
            validation: ValidationConfig::default(),
        }
    }
}
