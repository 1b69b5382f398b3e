//! Fixed-window beat templates around detected R peaks

use crate::config::TemplateConfig;
use crate::detector::BeatSet;
use serde::{Deserialize, Serialize};
use signal_core::{samples_for_ms, Signal};
use tracing::debug;

/// Aligned beat windows and their sample-wise summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateSet {
    /// One window per usable beat
    pub templates: Vec<Vec<f64>>,
    /// Sample-wise mean of `templates`
    pub canonical: Vec<f64>,
    /// Sample-wise population standard deviation of `templates`
    pub variability: Vec<f64>,
    /// Position of the R peak inside each window
    pub r_offset: usize,
    /// Templates required for `is_sufficient`
    pub min_templates: usize,
}

impl TemplateSet {
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Enough beats for morphological analysis
    pub fn is_sufficient(&self) -> bool {
        !self.templates.is_empty() && self.templates.len() >= self.min_templates
    }

    /// All templates concatenated in beat order
    pub fn flattened(&self) -> Vec<f64> {
        self.templates.iter().flatten().copied().collect()
    }

    /// Canonical beat repeated once per template
    pub fn canonical_tiled(&self) -> Vec<f64> {
        self.templates
            .iter()
            .flat_map(|_| self.canonical.iter().copied())
            .collect()
    }
}

/// Slices beat windows out of a signal
#[derive(Debug, Clone, Default)]
pub struct BeatTemplateExtractor {
    config: TemplateConfig,
}

impl BeatTemplateExtractor {
    pub fn new(config: TemplateConfig) -> Self {
        Self { config }
    }

    /// Extract windows of [-pre, +post) around each beat. Beats whose window
    /// would cross either end of the signal are skipped.
    pub fn extract(&self, signal: &Signal, beats: &BeatSet) -> TemplateSet {
        let rate = signal.sampling_rate_hz();
        let pre = samples_for_ms(rate, self.config.pre_r_ms);
        let post = samples_for_ms(rate, self.config.post_r_ms);
        let samples = signal.samples();
        let n = samples.len();

        let templates: Vec<Vec<f64>> = beats
            .indices()
            .iter()
            .filter(|&&r| r >= pre && r + post <= n)
            .map(|&r| samples[r - pre..r + post].to_vec())
            .collect();

        let skipped = beats.len() - templates.len();
        if skipped > 0 {
            debug!("Skipped {} boundary-truncated beats", skipped);
        }

        let width = pre + post;
        let (canonical, variability) = summarize(&templates, width);
        TemplateSet {
            templates,
            canonical,
            variability,
            r_offset: pre,
            min_templates: self.config.min_templates,
        }
    }
}

fn summarize(templates: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    if templates.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let count = templates.len() as f64;
    let mut mean = vec![0.0; width];
    for template in templates {
        for (m, v) in mean.iter_mut().zip(template.iter()) {
            *m += v / count;
        }
    }
    let mut var = vec![0.0; width];
    for template in templates {
        for ((s, v), m) in var.iter_mut().zip(template.iter()).zip(mean.iter()) {
            *s += (v - m) * (v - m) / count;
        }
    }
    (mean, var.into_iter().map(f64::sqrt).collect())
}
