//! Beat detection configuration

use serde::{Deserialize, Serialize};

/// R-peak detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatDetectorConfig {
    /// Moving-window integration length (milliseconds)
    pub integration_window_ms: f64,

    /// Detection threshold as a fraction of the integrated maximum
    pub threshold_ratio: f64,

    /// Minimum spacing between accepted beats (milliseconds)
    pub refractory_ms: f64,
}

impl Default for BeatDetectorConfig {
    fn default() -> Self {
        Self {
            integration_window_ms: 150.0,
            threshold_ratio: 0.5,
            refractory_ms: 300.0,
        }
    }
}

/// Beat window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Window start before the R peak (milliseconds)
    pub pre_r_ms: f64,

    /// Window end after the R peak (milliseconds)
    pub post_r_ms: f64,

    /// Templates needed before morphology is trusted
    pub min_templates: usize,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            pre_r_ms: 300.0,
            post_r_ms: 500.0,
            min_templates: 3,
        }
    }
}
