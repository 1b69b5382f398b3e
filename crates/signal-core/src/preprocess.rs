//! ECG preprocessing: band-limiting and baseline removal

use crate::butterworth::{ButterworthFilter, FilterBand};
use crate::error::Result;
use crate::median::medfilt;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Butterworth order of the bandpass stage
    pub filter_order: usize,
    /// Lower cutoff (Hz)
    pub low_cutoff_hz: f64,
    /// Upper cutoff (Hz), clamped below Nyquist
    pub high_cutoff_hz: f64,
    /// Subtract a one-second running median after filtering
    pub remove_baseline: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            filter_order: 3,
            low_cutoff_hz: 0.5,
            high_cutoff_hz: 40.0,
            remove_baseline: true,
        }
    }
}

/// Bandpass plus median-baseline preprocessor
#[derive(Debug, Clone, Default)]
pub struct SignalPreprocessor {
    config: PreprocessConfig,
}

impl SignalPreprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Zero-phase bandpass, then subtract a median filter spanning
    /// `sampling_rate + 1` samples
    pub fn preprocess(&self, signal: &Signal) -> Result<Signal> {
        let fs = signal.fs();
        let high = clamp_below_nyquist(self.config.high_cutoff_hz, fs);
        let filter = ButterworthFilter::design(
            self.config.filter_order,
            FilterBand::Bandpass(self.config.low_cutoff_hz, high),
            fs,
        )?;

        let filtered = filter.filtfilt(&signal.finite_samples())?;

        let cleaned = if self.config.remove_baseline {
            let kernel = signal.sampling_rate_hz() as usize + 1;
            let baseline = medfilt(&filtered, kernel);
            filtered
                .iter()
                .zip(baseline.iter())
                .map(|(x, b)| x - b)
                .collect()
        } else {
            filtered
        };

        debug!(
            "Preprocessed {} samples at {} Hz (band {}-{} Hz)",
            signal.len(),
            signal.sampling_rate_hz(),
            self.config.low_cutoff_hz,
            high
        );
        signal.with_samples(cleaned)
    }
}

/// Clamp a cutoff to 95 % of Nyquist, logging when it moves
pub fn clamp_below_nyquist(cutoff_hz: f64, fs: f64) -> f64 {
    let limit = 0.95 * fs / 2.0;
    if cutoff_hz >= fs / 2.0 {
        warn!(
            "Cutoff {} Hz is at or above Nyquist for {} Hz, clamping to {:.2} Hz",
            cutoff_hz, fs, limit
        );
        limit
    } else {
        cutoff_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcgError;
    use std::f64::consts::PI;

    #[test]
    fn test_removes_offset_and_drift() {
        let fs = 500.0;
        let samples: Vec<f64> = (0..5000)
            .map(|i| {
                let t = i as f64 / fs;
                2.0 + 0.5 * (2.0 * PI * 0.1 * t).sin() + (2.0 * PI * 10.0 * t).sin()
            })
            .collect();
        let signal = Signal::new(samples, 500).unwrap();
        let out = SignalPreprocessor::default().preprocess(&signal).unwrap();
        assert_eq!(out.len(), signal.len());
        let mean = crate::stats::mean(&out.samples()[500..4500]);
        assert!(mean.abs() < 0.05);
    }

    #[test]
    fn test_too_short_fails() {
        let signal = Signal::new(vec![0.0; 20], 500).unwrap();
        let err = SignalPreprocessor::default().preprocess(&signal).unwrap_err();
        assert!(matches!(err, EcgError::InsufficientData { .. }));
    }

    #[test]
    fn test_low_rate_clamps_upper_cutoff() {
        let signal = Signal::new(vec![0.0; 1000], 50).unwrap();
        let out = SignalPreprocessor::default().preprocess(&signal).unwrap();
        assert!(out.samples().iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_non_finite_zero_filled() {
        let mut samples = vec![0.0; 1000];
        samples[10] = f64::NAN;
        let signal = Signal::new(samples, 250).unwrap();
        let out = SignalPreprocessor::default().preprocess(&signal).unwrap();
        assert!(out.samples().iter().all(|v| v.is_finite()));
    }
}
