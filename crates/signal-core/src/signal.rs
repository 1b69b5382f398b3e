//! Sampled ECG signal container

use crate::error::{EcgError, Result};
use serde::{Deserialize, Serialize};

/// A single-lead ECG recording: samples plus sampling rate
///
/// Signals are immutable; every processing stage returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSignal")]
pub struct Signal {
    samples: Vec<f64>,
    sampling_rate_hz: u32,
}

#[derive(Deserialize)]
struct RawSignal {
    samples: Vec<f64>,
    sampling_rate_hz: u32,
}

impl TryFrom<RawSignal> for Signal {
    type Error = EcgError;

    fn try_from(raw: RawSignal) -> Result<Self> {
        Signal::new(raw.samples, raw.sampling_rate_hz)
    }
}

impl Signal {
    /// Create a signal, rejecting empty data and a zero sampling rate
    pub fn new(samples: Vec<f64>, sampling_rate_hz: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(EcgError::EmptySignal);
        }
        if sampling_rate_hz == 0 {
            return Err(EcgError::InvalidSamplingRate(sampling_rate_hz));
        }
        Ok(Self {
            samples,
            sampling_rate_hz,
        })
    }

    /// Build a new signal at the same rate from processed samples
    pub fn with_samples(&self, samples: Vec<f64>) -> Result<Self> {
        Self::new(samples, self.sampling_rate_hz)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn sampling_rate_hz(&self) -> u32 {
        self.sampling_rate_hz
    }

    /// Sampling rate as a float, for frequency arithmetic
    pub fn fs(&self) -> f64 {
        self.sampling_rate_hz as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed signal
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.fs()
    }

    /// Number of samples spanning `ms` milliseconds, truncated
    pub fn samples_for_ms(&self, ms: f64) -> usize {
        samples_for_ms(self.sampling_rate_hz, ms)
    }

    /// Count of NaN and infinite samples
    pub fn non_finite_count(&self) -> usize {
        self.samples.iter().filter(|v| !v.is_finite()).count()
    }

    /// Copy of the samples with NaN/Inf replaced by zero
    pub fn finite_samples(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|&v| if v.is_finite() { v } else { 0.0 })
            .collect()
    }

    /// Fail unless `other` has the same length and sampling rate
    pub fn ensure_aligned(&self, other: &Signal) -> Result<()> {
        if other.len() != self.len() {
            return Err(EcgError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        if other.sampling_rate_hz != self.sampling_rate_hz {
            return Err(EcgError::InvalidParameter(format!(
                "sampling rate {} Hz does not match {} Hz",
                other.sampling_rate_hz, self.sampling_rate_hz
            )));
        }
        Ok(())
    }
}

/// Number of samples spanning `ms` milliseconds at `rate_hz`, truncated
pub fn samples_for_ms(rate_hz: u32, ms: f64) -> usize {
    (rate_hz as f64 * ms / 1000.0).max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Signal::new(vec![], 500), Err(EcgError::EmptySignal));
    }

    #[test]
    fn test_rejects_zero_rate() {
        assert_eq!(
            Signal::new(vec![1.0], 0),
            Err(EcgError::InvalidSamplingRate(0))
        );
    }

    #[test]
    fn test_duration_and_windows() {
        let signal = Signal::new(vec![0.0; 5000], 500).unwrap();
        assert!((signal.duration_secs() - 10.0).abs() < 1e-12);
        assert_eq!(signal.samples_for_ms(150.0), 75);
        assert_eq!(signal.samples_for_ms(300.0), 150);
    }

    #[test]
    fn test_finite_samples_zero_fill() {
        let signal = Signal::new(vec![1.0, f64::NAN, f64::INFINITY, 2.0], 100).unwrap();
        assert_eq!(signal.non_finite_count(), 2);
        assert_eq!(signal.finite_samples(), vec![1.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Signal =
            serde_json::from_str(r#"{"samples":[0.1,0.2],"sampling_rate_hz":250}"#).unwrap();
        assert_eq!(ok.len(), 2);

        let bad = serde_json::from_str::<Signal>(r#"{"samples":[],"sampling_rate_hz":250}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_alignment() {
        let a = Signal::new(vec![0.0; 10], 100).unwrap();
        let b = Signal::new(vec![0.0; 12], 100).unwrap();
        assert!(matches!(
            a.ensure_aligned(&b),
            Err(EcgError::LengthMismatch { expected: 10, actual: 12 })
        ));
    }
}
