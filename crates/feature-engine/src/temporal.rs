//! Time-domain features

use beat_detector::find_peaks;
use signal_core::{stats, Moments};

/// Minimum spacing between amplitude peaks (seconds)
const PEAK_SPACING_SECS: f64 = 0.2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalFeatures {
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    /// Sign changes per sample
    pub zero_crossing_rate: f64,
    pub energy: f64,
    pub power: f64,
    pub peak_count: usize,
    pub peak_mean_amplitude: f64,
    pub peak_std_amplitude: f64,
}

impl TemporalFeatures {
    pub fn compute(values: &[f64], fs: f64) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let moments = Moments::compute(values);
        let energy: f64 = values.iter().map(|v| v * v).sum();

        let distance = (PEAK_SPACING_SECS * fs) as usize;
        let peaks: Vec<f64> = find_peaks(values, None, distance)
            .into_iter()
            .map(|i| values[i])
            .collect();

        Self {
            mean: moments.mean,
            std_dev: moments.std_dev,
            variance: moments.variance,
            skewness: moments.skewness,
            kurtosis: moments.kurtosis,
            zero_crossing_rate: sign_changes(values) as f64 / values.len() as f64,
            energy,
            power: energy / values.len() as f64,
            peak_count: peaks.len(),
            peak_mean_amplitude: stats::mean(&peaks),
            peak_std_amplitude: stats::std_dev(&peaks),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("temporal_mean", self.mean),
            ("temporal_std", self.std_dev),
            ("temporal_variance", self.variance),
            ("temporal_skewness", self.skewness),
            ("temporal_kurtosis", self.kurtosis),
            ("temporal_zero_crossing_rate", self.zero_crossing_rate),
            ("temporal_energy", self.energy),
            ("temporal_power", self.power),
            ("temporal_peak_count", self.peak_count as f64),
            ("temporal_peak_mean_amplitude", self.peak_mean_amplitude),
            ("temporal_peak_std_amplitude", self.peak_std_amplitude),
        ]
    }
}

/// Positions where the sign (-1, 0, +1) differs from the previous sample
fn sign_changes(values: &[f64]) -> usize {
    values
        .windows(2)
        .filter(|w| sign(w[0]) != sign(w[1]))
        .count()
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}
