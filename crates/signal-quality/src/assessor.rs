//! Composite quality scoring

use crate::config::QualityConfig;
use crate::report::{
    recommendations, BaselineWanderMetrics, BasicStats, ClippingMetrics, MissingDataMetrics,
    PowerlineMetrics, QualityCategory, QualityReport, SaturationMetrics, SnrMetrics,
};
use signal_core::{
    clamp_below_nyquist, stats, ButterworthFilter, FilterBand, Moments, Result, Signal,
    SpectrumAnalyzer,
};
use tracing::{debug, warn};

const SNR_BAND_HZ: (f64, f64) = (0.5, 40.0);
const SNR_FILTER_ORDER: usize = 3;
const WANDER_CUTOFF_HZ: f64 = 0.5;
const WANDER_FILTER_ORDER: usize = 2;
const WANDER_MAX_FREQ_HZ: f64 = 2.0;
const MAINS_HZ: (f64, f64) = (50.0, 60.0);
const WELCH_MAX_SEGMENT: usize = 1024;
const FLATLINE_EPSILON: f64 = 1e-10;
const NOISE_FLOOR: f64 = 1e-20;
const SNR_CEILING_DB: f64 = 100.0;

/// 16-bit ADC emulation
const ADC_SCALE: f64 = 1000.0;
const ADC_MAX: f64 = 32767.0;
const ADC_MIN: f64 = -32768.0;
const ADC_SATURATION_MARGIN: f64 = 0.95;

/// Scores a recording against [`QualityThresholds`](crate::QualityThresholds)
#[derive(Debug, Clone, Default)]
pub struct SignalQualityAssessor {
    config: QualityConfig,
}

impl SignalQualityAssessor {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Assess a raw recording
    ///
    /// Non-finite samples are counted as missing data, then zero-filled for
    /// the filter-based metrics. Fails when the recording is shorter than the
    /// filter padding.
    pub fn assess(&self, signal: &Signal) -> Result<QualityReport> {
        let missing_data = self.missing_data(signal.samples());

        let samples = signal.finite_samples();
        let fs = signal.fs();

        let basic_stats = basic_stats(&samples);
        let snr = self.snr(&samples, fs)?;
        let baseline_wander = self.baseline_wander(&samples, fs)?;
        let powerline = self.powerline(&samples, fs);
        let clipping = self.clipping(&samples);
        let saturation = self.saturation(&samples);

        let deductions = &self.config.deductions;
        let mut score = 100.0;
        if !snr.adequate {
            score -= deductions.snr;
        }
        if !baseline_wander.acceptable {
            score -= deductions.baseline_wander;
        }
        if powerline.interference {
            score -= deductions.powerline;
        }
        if missing_data.missing {
            score -= deductions.missing_data;
        }
        if clipping.clipped {
            score -= deductions.clipping;
        }
        if saturation.saturated {
            score -= deductions.saturation;
        }
        let overall_score = f64::max(score, 0.0);
        let category = QualityCategory::from_score(overall_score);

        debug!(
            "Quality: score={:.1} ({}), snr={:.1} dB, wander={:.3}, powerline={:.3}",
            overall_score, category, snr.snr_db, baseline_wander.amplitude, powerline.ratio
        );
        if overall_score < 60.0 {
            warn!("Signal quality below analysis threshold: {:.1}", overall_score);
        }

        Ok(QualityReport {
            basic_stats,
            snr,
            baseline_wander,
            recommendations: recommendations(overall_score, &powerline, &missing_data),
            powerline,
            missing_data,
            clipping,
            saturation,
            overall_score,
            category,
        })
    }

    fn snr(&self, samples: &[f64], fs: f64) -> Result<SnrMetrics> {
        let filter = ButterworthFilter::design(
            SNR_FILTER_ORDER,
            FilterBand::Bandpass(SNR_BAND_HZ.0, clamp_below_nyquist(SNR_BAND_HZ.1, fs)),
            fs,
        )?;
        let filtered = filter.filtfilt(samples)?;
        let noise: Vec<f64> = samples
            .iter()
            .zip(filtered.iter())
            .map(|(x, f)| x - f)
            .collect();

        let signal_power = stats::power(&filtered);
        let noise_power = stats::power(&noise);
        let snr_db = if noise_power <= NOISE_FLOOR {
            SNR_CEILING_DB
        } else if signal_power <= 0.0 {
            // Nothing survives the pass band; treat as pure noise
            -SNR_CEILING_DB
        } else {
            10.0 * (signal_power / noise_power).log10()
        };

        Ok(SnrMetrics {
            snr_db,
            signal_power,
            noise_power,
            adequate: snr_db >= self.config.thresholds.min_snr_db,
        })
    }

    fn baseline_wander(&self, samples: &[f64], fs: f64) -> Result<BaselineWanderMetrics> {
        let filter = ButterworthFilter::design(
            WANDER_FILTER_ORDER,
            FilterBand::Lowpass(WANDER_CUTOFF_HZ),
            fs,
        )?;
        let baseline = filter.filtfilt(samples)?;
        let centre = stats::mean(&baseline);
        let amplitude = baseline
            .iter()
            .map(|b| (b - centre).abs())
            .fold(0.0, f64::max);

        let frequency_hz = SpectrumAnalyzer::new(fs)
            .magnitude(&baseline)
            .dominant_below(WANDER_MAX_FREQ_HZ)
            .map(|(f, _)| f)
            .unwrap_or(0.0);

        Ok(BaselineWanderMetrics {
            amplitude,
            frequency_hz,
            acceptable: amplitude <= self.config.thresholds.max_baseline_wander,
        })
    }

    fn powerline(&self, samples: &[f64], fs: f64) -> PowerlineMetrics {
        let psd = SpectrumAnalyzer::new(fs).welch(samples, WELCH_MAX_SEGMENT.min(samples.len()));
        let bin_power = |freq: f64| psd.nearest_bin(freq).map(|i| psd.power[i]).unwrap_or(0.0);
        let power_50hz = bin_power(MAINS_HZ.0);
        let power_60hz = bin_power(MAINS_HZ.1);

        let total = psd.total();
        let ratio = if total > 0.0 {
            (power_50hz + power_60hz) / total
        } else {
            0.0
        };

        PowerlineMetrics {
            power_50hz,
            power_60hz,
            ratio,
            interference: ratio > self.config.thresholds.max_powerline_ratio,
        }
    }

    fn missing_data(&self, samples: &[f64]) -> MissingDataMetrics {
        let nan_count = samples.iter().filter(|v| v.is_nan()).count();
        let inf_count = samples.iter().filter(|v| v.is_infinite()).count();
        let missing_fraction = (nan_count + inf_count) as f64 / samples.len().max(1) as f64;

        MissingDataMetrics {
            nan_count,
            inf_count,
            missing_fraction,
            flatline_segments: count_flatline_runs(samples),
            missing: missing_fraction > self.config.thresholds.max_missing_fraction,
        }
    }

    fn clipping(&self, samples: &[f64]) -> ClippingMetrics {
        let limit = self.config.thresholds.clip_limit_mv;
        let high_clip_count = samples.iter().filter(|v| **v > limit).count();
        let low_clip_count = samples.iter().filter(|v| **v < -limit).count();
        let clip_fraction = (high_clip_count + low_clip_count) as f64 / samples.len().max(1) as f64;

        ClippingMetrics {
            high_clip_count,
            low_clip_count,
            clip_fraction,
            clipped: clip_fraction > self.config.thresholds.max_clipping_fraction,
        }
    }

    fn saturation(&self, samples: &[f64]) -> SaturationMetrics {
        let moments = Moments::compute(samples);
        if moments.std_dev <= 0.0 {
            return SaturationMetrics::default();
        }
        let upper = ADC_SATURATION_MARGIN * ADC_MAX;
        let lower = ADC_SATURATION_MARGIN * ADC_MIN;
        let saturated_count = samples
            .iter()
            .map(|v| (v - moments.mean) / moments.std_dev * ADC_SCALE)
            .filter(|scaled| *scaled >= upper || *scaled <= lower)
            .count();
        let saturation_fraction = saturated_count as f64 / samples.len() as f64;

        SaturationMetrics {
            saturated_count,
            saturation_fraction,
            saturated: saturation_fraction > self.config.thresholds.max_saturation_fraction,
        }
    }
}

fn basic_stats(samples: &[f64]) -> BasicStats {
    let moments = Moments::compute(samples);
    let min = stats::min(samples);
    let max = stats::max(samples);
    BasicStats {
        mean: moments.mean,
        std_dev: moments.std_dev,
        min,
        max,
        range: max - min,
        rms: stats::rms(samples),
        skewness: moments.skewness,
        kurtosis: moments.kurtosis,
    }
}

/// Runs of consecutive unchanged differences, counting runs of length > 1
fn count_flatline_runs(samples: &[f64]) -> usize {
    let mut runs = 0;
    let mut run_len = 0usize;
    for pair in samples.windows(2) {
        if (pair[1] - pair[0]).abs() < FLATLINE_EPSILON {
            run_len += 1;
        } else {
            if run_len > 1 {
                runs += 1;
            }
            run_len = 0;
        }
    }
    if run_len > 1 {
        runs += 1;
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use signal_core::synthetic::{gaussian_noise, two_tone};
    use std::f64::consts::PI;

    fn clean_signal() -> Signal {
        let mut rng = StdRng::seed_from_u64(7);
        two_tone(500, 10.0, 0.0, &mut rng).unwrap()
    }

    #[test]
    fn test_clean_signal_excellent() {
        let report = SignalQualityAssessor::default().assess(&clean_signal()).unwrap();
        assert_eq!(report.category, QualityCategory::Excellent);
        assert_eq!(report.overall_score, 100.0);
        assert!(report.snr.adequate);
        assert!(report.failed_checks().is_empty());
        assert_eq!(
            report.recommendations,
            vec!["Signal quality is acceptable for clinical analysis."]
        );
    }

    #[test]
    fn test_score_non_increasing_with_noise() {
        let base = clean_signal();
        let mut rng = StdRng::seed_from_u64(42);
        let noise = gaussian_noise(base.len(), 1.0, &mut rng);
        let assessor = SignalQualityAssessor::default();

        let mut previous = f64::INFINITY;
        for level in [0.0, 0.05, 0.2, 1.0, 5.0] {
            let noisy: Vec<f64> = base
                .samples()
                .iter()
                .zip(noise.iter())
                .map(|(s, n)| s + level * n)
                .collect();
            let report = assessor.assess(&base.with_samples(noisy).unwrap()).unwrap();
            assert!(
                report.overall_score <= previous,
                "score rose at noise level {}",
                level
            );
            previous = report.overall_score;
        }
        assert!(previous < 100.0);
    }

    #[test]
    fn test_missing_data_counted_and_zero_filled() {
        let mut samples = clean_signal().into_samples();
        for v in samples.iter_mut().take(100) {
            *v = f64::NAN;
        }
        samples[200] = f64::INFINITY;
        let signal = Signal::new(samples, 500).unwrap();
        let report = SignalQualityAssessor::default().assess(&signal).unwrap();

        assert_eq!(report.missing_data.nan_count, 100);
        assert_eq!(report.missing_data.inf_count, 1);
        assert!(report.missing_data.missing);
        assert!(report.snr.snr_db.is_finite());
        assert!(report.basic_stats.mean.is_finite());
        assert!(report.recommendations.iter().any(|r| r.contains("electrode connections")));
    }

    #[test]
    fn test_powerline_interference() {
        let samples: Vec<f64> = (0..5000)
            .map(|i| {
                let t = i as f64 / 500.0;
                (2.0 * PI * t).sin() + 0.8 * (2.0 * PI * 50.0 * t).sin()
            })
            .collect();
        let signal = Signal::new(samples, 500).unwrap();
        let report = SignalQualityAssessor::default().assess(&signal).unwrap();
        assert!(report.powerline.interference);
        assert!(report.powerline.power_50hz > report.powerline.power_60hz);
        assert!(report.failed_checks().contains(&"powerline"));
    }

    #[test]
    fn test_clipping_detected() {
        let mut samples = clean_signal().into_samples();
        for v in samples.iter_mut().step_by(20) {
            *v = 8.0;
        }
        let signal = Signal::new(samples, 500).unwrap();
        let report = SignalQualityAssessor::default().assess(&signal).unwrap();
        assert_eq!(report.clipping.high_clip_count, 250);
        assert!(report.clipping.clipped);
    }

    #[test]
    fn test_zero_signal_has_no_nan() {
        let signal = Signal::new(vec![0.0; 2000], 500).unwrap();
        let report = SignalQualityAssessor::default().assess(&signal).unwrap();
        assert_eq!(report.snr.snr_db, 100.0);
        assert_eq!(report.saturation.saturated_count, 0);
        assert_eq!(report.missing_data.flatline_segments, 1);
        assert!(report.overall_score.is_finite());
    }

    #[test]
    fn test_flatline_runs() {
        assert_eq!(count_flatline_runs(&[1.0, 1.0, 2.0]), 0);
        assert_eq!(count_flatline_runs(&[1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]), 2);
        assert_eq!(count_flatline_runs(&[]), 0);
    }

    #[test]
    fn test_low_sampling_rate_assessed() {
        let fs = 60.0;
        let samples: Vec<f64> = (0..1200)
            .map(|i| (2.0 * PI * 1.2 * i as f64 / fs).sin())
            .collect();
        let signal = Signal::new(samples, 60).unwrap();
        let report = SignalQualityAssessor::default().assess(&signal).unwrap();
        assert!(report.snr.snr_db.is_finite());
        assert!(report.overall_score.is_finite());
    }

    #[test]
    fn test_too_short_for_filters() {
        let signal = Signal::new(vec![0.1; 10], 500).unwrap();
        let err = SignalQualityAssessor::default().assess(&signal).unwrap_err();
        assert!(matches!(err, signal_core::EcgError::InsufficientData { .. }));
    }
}
