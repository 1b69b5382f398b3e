//! Feature extraction settings

use beat_detector::TemplateConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Seed for the sampled estimators (correlation dimension)
    pub seed: u64,

    /// Largest multiscale-entropy scale
    pub mse_max_scale: usize,

    /// Upper bound on the Welch segment length
    pub welch_segment: usize,

    /// Beats required for morphological features
    pub min_morphology_beats: usize,

    /// Beat windows used by the morphology and waveform groups
    pub templates: TemplateConfig,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            mse_max_scale: 5,
            welch_segment: 1024,
            min_morphology_beats: 3,
            templates: TemplateConfig::default(),
        }
    }
}
