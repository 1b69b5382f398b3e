//! Validity scoring of augmented signals against their source

use crate::config::ValidationConfig;
use beat_detector::BeatDetector;
use serde::{Deserialize, Serialize};
use signal_core::{stats, Result, Signal, SpectrumAnalyzer};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Augmented mean minus original mean
    pub mean_difference: f64,
    pub std_difference: f64,
    pub correlation: f64,
    /// 1 - mean relative PSD difference over bins where both are positive
    pub spectral_similarity: f64,
    /// Absolute heart rate change (bpm); `None` if either side has no beats
    pub heart_rate_difference: Option<f64>,
    pub heart_rate_preserved: bool,
    /// Quarter point per passed check
    pub validity_score: f64,
    pub is_valid: bool,
}

/// Compare an augmented signal with its original
///
/// Both signals must have the same length and sampling rate.
pub fn validate(
    original: &Signal,
    augmented: &Signal,
    config: &ValidationConfig,
    detector: &BeatDetector,
) -> Result<ValidationReport> {
    original.ensure_aligned(augmented)?;
    let a = original.finite_samples();
    let b = augmented.finite_samples();

    let original_std = stats::std_dev(&a);
    let mean_difference = stats::mean(&b) - stats::mean(&a);
    let std_difference = stats::std_dev(&b) - original_std;
    let correlation = stats::pearson(&a, &b);
    let spectral_similarity = spectral_similarity(&a, &b, original.fs(), config.welch_segment);

    let heart_rate_difference = match (
        beat_rate(original, detector),
        beat_rate(augmented, detector),
    ) {
        (Some(before), Some(after)) => Some((after - before).abs()),
        _ => None,
    };
    let heart_rate_preserved =
        heart_rate_difference.is_some_and(|d| d < config.max_heart_rate_difference);

    let checks = [
        mean_difference.abs() < config.max_mean_shift * original_std,
        correlation > config.min_correlation,
        spectral_similarity > config.min_spectral_similarity,
        heart_rate_preserved,
    ];
    let validity_score = 0.25 * checks.iter().filter(|passed| **passed).count() as f64;

    debug!(
        "Augmentation validity {:.2} (corr {:.3}, spectral {:.3}, hr diff {:?})",
        validity_score, correlation, spectral_similarity, heart_rate_difference
    );
    Ok(ValidationReport {
        mean_difference,
        std_difference,
        correlation,
        spectral_similarity,
        heart_rate_difference,
        heart_rate_preserved,
        validity_score,
        is_valid: validity_score > config.validity_threshold,
    })
}

/// Beats per minute from the raw beat count over the recording length
fn beat_rate(signal: &Signal, detector: &BeatDetector) -> Option<f64> {
    let beats = detector.detect(signal);
    if beats.is_empty() {
        return None;
    }
    Some(beats.len() as f64 / signal.duration_secs() * 60.0)
}

fn spectral_similarity(original: &[f64], augmented: &[f64], fs: f64, nperseg: usize) -> f64 {
    let mut analyzer = SpectrumAnalyzer::new(fs);
    let reference = analyzer.welch(original, nperseg);
    let candidate = analyzer.welch(augmented, nperseg);

    let ratios: Vec<f64> = reference
        .frequencies
        .iter()
        .zip(reference.power.iter())
        .map(|(f, po)| (*po, candidate.interpolate_at(*f)))
        .filter(|(po, pa)| *po > 0.0 && *pa > 0.0)
        .map(|(po, pa)| (po - pa).abs() / (po + pa))
        .collect();
    if ratios.is_empty() {
        return 0.0;
    }
    1.0 - stats::mean(&ratios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use signal_core::synthetic;

    fn check(original: &Signal, augmented: &Signal) -> ValidationReport {
        validate(
            original,
            augmented,
            &ValidationConfig::default(),
            &BeatDetector::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_identical_signals_fully_valid() {
        let signal = synthetic::pulse_train(500, 10.0, 60.0).unwrap();
        let report = check(&signal, &signal);
        assert_relative_eq!(report.correlation, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.spectral_similarity, 1.0, epsilon = 1e-9);
        assert_eq!(report.heart_rate_difference, Some(0.0));
        assert_eq!(report.validity_score, 1.0);
        assert!(report.is_valid);
    }

    #[test]
    fn test_inverted_signal_fails_correlation() {
        let signal = synthetic::pulse_train(500, 10.0, 60.0).unwrap();
        let inverted = signal
            .with_samples(signal.samples().iter().map(|v| -v).collect())
            .unwrap();
        let report = check(&signal, &inverted);
        assert!(report.correlation < 0.0);
        assert!(report.validity_score <= 0.75);
    }

    #[test]
    fn test_flat_signal_has_no_heart_rate() {
        let flat = Signal::new(vec![0.0; 1000], 500).unwrap();
        let report = check(&flat, &flat);
        assert_eq!(report.heart_rate_difference, None);
        assert!(!report.heart_rate_preserved);
        assert_eq!(report.spectral_similarity, 0.0);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let a = Signal::new(vec![0.0; 100], 500).unwrap();
        let b = Signal::new(vec![0.0; 90], 500).unwrap();
        assert!(validate(&a, &b, &ValidationConfig::default(), &BeatDetector::default()).is_err());
    }
}
