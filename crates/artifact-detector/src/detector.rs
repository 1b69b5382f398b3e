//! Six-way ECG artifact detector

use crate::config::ArtifactConfig;
use crate::report::{
    ArtifactFinding, ArtifactKind, ArtifactReport, ArtifactSegment, ArtifactSummary,
    BaselineWander, ElectrodePops, Electrosurgical, MotionArtifacts, MuscleNoise,
    PowerlineInterference, PowerlineLine,
};
use signal_core::{
    clamp_below_nyquist, samples_for_ms, stats, ButterworthFilter, FilterBand, Result, Signal,
    SpectrumAnalyzer,
};
use tracing::{debug, info};

/// Runs every artifact detector over a signal and ranks the results
#[derive(Debug, Clone, Default)]
pub struct ArtifactDetector {
    config: ArtifactConfig,
}

impl ArtifactDetector {
    pub fn new(config: ArtifactConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    /// Detect all artifact kinds and summarize them
    pub fn detect(&self, signal: &Signal) -> Result<ArtifactReport> {
        let samples = signal.finite_samples();
        let mut report = ArtifactReport::default();
        for kind in ArtifactKind::ALL {
            let finding = self.detect_kind(kind, &samples, signal.sampling_rate_hz())?;
            report.absorb(finding);
        }
        report.summary = self.summarize(&report, signal);
        info!(
            "Artifact scan: {} flagged samples, primary {}",
            report.summary.total_artifacts,
            report.summary.primary_label()
        );
        Ok(report)
    }

    /// Run a single detector
    pub fn detect_kind(
        &self,
        kind: ArtifactKind,
        samples: &[f64],
        rate_hz: u32,
    ) -> Result<ArtifactFinding> {
        let finding = match kind {
            ArtifactKind::Motion => ArtifactFinding::Motion(self.detect_motion(samples, rate_hz)?),
            ArtifactKind::ElectrodePop => {
                ArtifactFinding::ElectrodePop(self.detect_electrode_pops(samples, rate_hz))
            }
            ArtifactKind::MuscleNoise => {
                ArtifactFinding::MuscleNoise(self.detect_muscle_noise(samples, rate_hz)?)
            }
            ArtifactKind::BaselineWander => {
                ArtifactFinding::BaselineWander(self.detect_baseline_wander(samples, rate_hz)?)
            }
            ArtifactKind::Powerline => {
                ArtifactFinding::Powerline(self.detect_powerline(samples, rate_hz))
            }
            ArtifactKind::Electrosurgical => {
                ArtifactFinding::Electrosurgical(self.detect_electrosurgical(samples, rate_hz)?)
            }
        };
        Ok(finding)
    }

    fn detect_motion(&self, samples: &[f64], rate_hz: u32) -> Result<MotionArtifacts> {
        let cfg = &self.config.motion;
        let fs = rate_hz as f64;
        let (lo, hi) = cfg.band_hz;
        let filtered = ButterworthFilter::design(
            cfg.filter_order,
            FilterBand::Bandpass(lo, clamp_below_nyquist(hi, fs)),
            fs,
        )?
        .filtfilt(samples)?;

        let indices: Vec<usize> = (0..filtered.len())
            .filter(|&i| filtered[i].abs() > cfg.amplitude_threshold)
            .collect();
        let segments = self.segments(ArtifactKind::Motion, &indices, rate_hz, |i| {
            filtered[i].abs()
        });
        let amplitude_mean = mean_at(&indices, |i| filtered[i].abs());

        Ok(MotionArtifacts {
            count: segments.len(),
            total_duration_secs: indices.len() as f64 / fs,
            amplitude_mean,
            indices,
            segments,
        })
    }

    fn detect_electrode_pops(&self, samples: &[f64], rate_hz: u32) -> ElectrodePops {
        let cfg = &self.config.electrode_pop;
        let derivative = stats::diff(samples);
        let threshold = cfg.sigma_multiplier * stats::std_dev(&derivative);
        let min_gap = samples_for_ms(rate_hz, cfg.min_gap_ms);

        let mut indices: Vec<usize> = Vec::new();
        for (i, d) in derivative.iter().enumerate() {
            if d.abs() <= threshold {
                continue;
            }
            match indices.last() {
                Some(&last) if i - last <= min_gap => {}
                _ => indices.push(i),
            }
        }

        let segments = indices
            .iter()
            .map(|&i| ArtifactSegment {
                kind: ArtifactKind::ElectrodePop,
                start: i,
                end: i + 1,
                severity: derivative[i].abs(),
            })
            .collect();
        let minutes = samples.len() as f64 / rate_hz as f64 / 60.0;

        ElectrodePops {
            count: indices.len(),
            amplitude_mean: mean_at(&indices, |i| derivative[i].abs()),
            rate_per_minute: if minutes > 0.0 {
                indices.len() as f64 / minutes
            } else {
                0.0
            },
            indices,
            segments,
        }
    }

    fn detect_muscle_noise(&self, samples: &[f64], rate_hz: u32) -> Result<MuscleNoise> {
        let cfg = &self.config.muscle;
        let fs = rate_hz as f64;
        let (lo, hi) = cfg.band_hz;
        let hi = clamp_below_nyquist(hi, fs);
        if lo >= hi {
            debug!("Muscle band {}-{} Hz unavailable at {} Hz", lo, hi, fs);
            return Ok(MuscleNoise::default());
        }
        let filtered = ButterworthFilter::design(cfg.filter_order, FilterBand::Bandpass(lo, hi), fs)?
            .filtfilt(samples)?;

        // RMS of the window starting at each sample; the final window's worth
        // of positions stays at zero
        let window = samples_for_ms(rate_hz, cfg.rms_window_ms).max(1);
        let n = filtered.len();
        let mut rms = vec![0.0; n];
        if n > window {
            let mut sum_sq: f64 = filtered[..window].iter().map(|v| v * v).sum();
            for i in 0..n - window {
                rms[i] = (sum_sq.max(0.0) / window as f64).sqrt();
                sum_sq += filtered[i + window] * filtered[i + window] - filtered[i] * filtered[i];
            }
        }

        let indices: Vec<usize> = (0..n).filter(|&i| rms[i] > cfg.rms_threshold).collect();
        let segments = self.segments(ArtifactKind::MuscleNoise, &indices, rate_hz, |i| rms[i]);

        Ok(MuscleNoise {
            count: segments.len(),
            total_duration_secs: indices.len() as f64 / fs,
            rms_mean: mean_at(&indices, |i| rms[i]),
            indices,
            segments,
        })
    }

    fn detect_baseline_wander(&self, samples: &[f64], rate_hz: u32) -> Result<BaselineWander> {
        let cfg = &self.config.wander;
        let fs = rate_hz as f64;
        let baseline = ButterworthFilter::design(
            cfg.filter_order,
            FilterBand::Lowpass(clamp_below_nyquist(cfg.cutoff_hz, fs)),
            fs,
        )?
        .filtfilt(samples)?;

        let amplitude = stats::max(&baseline) - stats::min(&baseline);

        let psd = SpectrumAnalyzer::new(fs).welch(&baseline, cfg.welch_segment);
        let (dominant_frequency_hz, dominant_power) =
            psd.dominant_below(cfg.cutoff_hz).unwrap_or((0.0, 0.0));

        Ok(BaselineWander {
            amplitude,
            excessive: amplitude > cfg.amplitude_threshold,
            dominant_frequency_hz,
            dominant_power,
            low_band_power: psd.band_power(f64::NEG_INFINITY, cfg.cutoff_hz),
        })
    }

    fn detect_powerline(&self, samples: &[f64], rate_hz: u32) -> PowerlineInterference {
        let cfg = &self.config.powerline;
        let psd = SpectrumAnalyzer::new(rate_hz as f64).welch(samples, cfg.welch_segment);
        let total = psd.total();

        let lines = cfg
            .frequencies_hz
            .iter()
            .map(|&frequency_hz| {
                let power = psd.nearest_bin(frequency_hz).map(|i| psd.power[i]).unwrap_or(0.0);
                let ratio = if total > 0.0 { power / total } else { 0.0 };
                PowerlineLine {
                    frequency_hz,
                    power,
                    ratio,
                    interference: ratio > cfg.ratio_threshold,
                }
            })
            .collect();
        PowerlineInterference { lines }
    }

    fn detect_electrosurgical(&self, samples: &[f64], rate_hz: u32) -> Result<Electrosurgical> {
        let cfg = &self.config.electrosurgical;
        let fs = rate_hz as f64;
        if cfg.cutoff_hz >= fs / 2.0 {
            debug!("No band above {} Hz at {} Hz sampling", cfg.cutoff_hz, fs);
            return Ok(Electrosurgical::default());
        }
        let high = ButterworthFilter::design(cfg.filter_order, FilterBand::Highpass(cfg.cutoff_hz), fs)?
            .filtfilt(samples)?;

        let power = stats::power(&high);
        let total = stats::power(samples);
        let ratio = if total > 0.0 { power / total } else { 0.0 };
        Ok(Electrosurgical {
            power,
            ratio,
            flagged: ratio > cfg.ratio_threshold,
        })
    }

    fn segments(
        &self,
        kind: ArtifactKind,
        indices: &[usize],
        rate_hz: u32,
        severity_at: impl Fn(usize) -> f64,
    ) -> Vec<ArtifactSegment> {
        let max_gap = samples_for_ms(rate_hz, self.config.segment_gap_ms);
        group_consecutive(indices, max_gap)
            .into_iter()
            .map(|run| ArtifactSegment {
                kind,
                start: run[0],
                end: run[run.len() - 1],
                severity: mean_at(run, &severity_at),
            })
            .collect()
    }

    fn summarize(&self, report: &ArtifactReport, signal: &Signal) -> ArtifactSummary {
        let total_artifacts = report.motion.indices.len()
            + report.electrode_pops.indices.len()
            + report.muscle_noise.indices.len();
        let artifact_duration_secs = total_artifacts as f64 / signal.fs();
        let signal_quality_percentage =
            (100.0 * (1.0 - artifact_duration_secs / signal.duration_secs())).max(0.0);

        let scores: Vec<(ArtifactKind, f64)> = ArtifactKind::ALL
            .iter()
            .map(|&kind| (kind, report.score(kind, &self.config.weights)))
            .collect();

        // First maximum wins ties
        let primary_artifact = scores
            .iter()
            .fold(None, |best: Option<(ArtifactKind, f64)>, &(kind, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((kind, score)),
            })
            .filter(|(_, score)| *score > 0.0)
            .map(|(kind, _)| kind);

        ArtifactSummary {
            total_artifacts,
            artifact_duration_secs,
            signal_quality_percentage,
            primary_artifact,
            scores,
        }
    }
}

/// Split sorted indices into runs whose successive gaps are at most `max_gap`
pub fn group_consecutive(indices: &[usize], max_gap: usize) -> Vec<&[usize]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=indices.len() {
        if i == indices.len() || indices[i] - indices[i - 1] > max_gap {
            if i > start {
                runs.push(&indices[start..i]);
            }
            start = i;
        }
    }
    runs
}

fn mean_at(indices: &[usize], value_at: impl Fn(usize) -> f64) -> f64 {
    if indices.is_empty() {
        0.0
    } else {
        indices.iter().map(|&i| value_at(i)).sum::<f64>() / indices.len() as f64
    }
}
