//! Derivative-energy R-peak detector

use crate::config::BeatDetectorConfig;
use crate::peaks::find_peaks;
use serde::{Deserialize, Serialize};
use signal_core::{samples_for_ms, Signal};
use tracing::debug;

/// Detected R-peak positions, strictly increasing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatSet {
    indices: Vec<usize>,
    sampling_rate_hz: u32,
}

impl BeatSet {
    /// Build a set from arbitrary indices (sorted, duplicates removed)
    pub fn from_indices(mut indices: Vec<usize>, sampling_rate_hz: u32) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self {
            indices,
            sampling_rate_hz,
        }
    }

    pub fn empty(sampling_rate_hz: u32) -> Self {
        Self {
            indices: Vec::new(),
            sampling_rate_hz,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn sampling_rate_hz(&self) -> u32 {
        self.sampling_rate_hz
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Fewer than two beats: no RR interval can be formed
    pub fn is_degenerate(&self) -> bool {
        self.indices.len() < 2
    }

    /// Successive R-R intervals in milliseconds
    pub fn rr_intervals_ms(&self) -> Vec<f64> {
        if self.sampling_rate_hz == 0 {
            return Vec::new();
        }
        let fs = self.sampling_rate_hz as f64;
        self.indices
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64 / fs * 1000.0)
            .collect()
    }

    pub fn mean_rr_ms(&self) -> Option<f64> {
        let rr = self.rr_intervals_ms();
        if rr.is_empty() {
            None
        } else {
            Some(rr.iter().sum::<f64>() / rr.len() as f64)
        }
    }

    /// Mean heart rate from the mean RR interval
    pub fn heart_rate_bpm(&self) -> Option<f64> {
        self.mean_rr_ms()
            .filter(|rr| *rr > 0.0)
            .map(|rr| 60_000.0 / rr)
    }
}

/// R-peak detector: differentiate, square, integrate, threshold
#[derive(Debug, Clone, Default)]
pub struct BeatDetector {
    config: BeatDetectorConfig,
}

impl BeatDetector {
    pub fn new(config: BeatDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BeatDetectorConfig {
        &self.config
    }

    /// Detect R peaks. Never fails; flat or tiny inputs give an empty set.
    pub fn detect(&self, signal: &Signal) -> BeatSet {
        let rate = signal.sampling_rate_hz();
        let samples = signal.finite_samples();
        if samples.len() < 3 {
            return BeatSet::empty(rate);
        }

        let energy: Vec<f64> = samples
            .windows(2)
            .map(|w| {
                let d = w[1] - w[0];
                d * d
            })
            .collect();

        let window = samples_for_ms(rate, self.config.integration_window_ms).max(1);
        let integrated = moving_average_same(&energy, window);

        let peak_energy = integrated.iter().copied().fold(0.0, f64::max);
        let threshold = self.config.threshold_ratio * peak_energy;
        let distance = samples_for_ms(rate, self.config.refractory_ms).max(1);

        let peaks = find_peaks(&integrated, Some(threshold), distance);
        debug!(
            "Detected {} beats in {} samples (threshold {:.3e}, window {})",
            peaks.len(),
            samples.len(),
            threshold,
            window
        );
        BeatSet {
            indices: peaks,
            sampling_rate_hz: rate,
        }
    }
}

/// Centred moving average, zero beyond the edges, output length = input length
fn moving_average_same(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &v in values {
        acc += v;
        prefix.push(acc);
    }
    let before = window / 2;
    let after = (window - 1) / 2;
    (0..n)
        .map(|k| {
            let lo = k.saturating_sub(before);
            let hi = (k + after + 1).min(n);
            (prefix[hi] - prefix[lo]) / window as f64
        })
        .collect()
}
