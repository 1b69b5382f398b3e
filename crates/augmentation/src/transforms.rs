//! The augmentation transforms
//!
//! Every transform takes finite samples, the sampling rate, an intensity in
//! `[0, 1]` and an RNG, and returns a new buffer of the same length.
//! Amplitudes are relative to the input's standard deviation or RMS, so a
//! flat input stays flat under the additive transforms.

use crate::kind::{AugmentationKind, NoiseKind};
use crate::spline::NaturalCubicSpline;
use beat_detector::BeatDetector;
use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use signal_core::spectrum::hann_symmetric;
use signal_core::stats::{self, linspace};
use signal_core::{
    clamp_below_nyquist, synthetic, ButterworthFilter, FilterBand, Result, Signal,
    SpectrumAnalyzer,
};
use std::f64::consts::PI;
use tracing::debug;

/// Run one transform
pub fn apply<R: Rng + ?Sized>(
    kind: AugmentationKind,
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let out = match kind {
        AugmentationKind::NoiseInjection(noise) => {
            noise_injection(samples, rate_hz, noise, intensity, rng)
        }
        AugmentationKind::TimeWarping => time_warp(samples, intensity, rng),
        AugmentationKind::AmplitudeScaling => amplitude_scale(samples, intensity, rng),
        AugmentationKind::TimeShift => time_shift(samples, intensity, rng),
        AugmentationKind::FrequencyWarping => frequency_warp(samples, rate_hz, intensity, rng),
        AugmentationKind::BaselineWander => baseline_wander(samples, rate_hz, intensity, rng),
        AugmentationKind::PowerlineNoise => powerline_noise(samples, rate_hz, intensity, rng),
        AugmentationKind::ElectrodeMotion => electrode_motion(samples, rate_hz, intensity, rng),
        AugmentationKind::MuscleArtifact => muscle_artifact(samples, rate_hz, intensity, rng)?,
        AugmentationKind::SignalDropout => signal_dropout(samples, rate_hz, intensity, rng),
        AugmentationKind::BeatPerturbation => {
            beat_perturbation(samples, rate_hz, intensity, rng)?
        }
        AugmentationKind::LeadMixing => lead_mixing(samples, rate_hz, intensity, rng)?,
        AugmentationKind::StSegmentShift => st_segment_shift(samples, rate_hz, intensity, rng)?,
        AugmentationKind::TWaveAlteration => t_wave_alteration(samples, rate_hz, intensity, rng)?,
    };
    Ok(out)
}

fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}

fn normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Random event start leaving `reserve` samples of room at the end
fn random_start<R: Rng + ?Sized>(rng: &mut R, len: usize, reserve: usize) -> usize {
    rng.random_range(0..len.saturating_sub(reserve).max(1))
}

fn secs(rate_hz: u32, seconds: f64) -> usize {
    (seconds * rate_hz as f64) as usize
}

/// Circular shift; positive `shift` moves samples to later indices
fn roll(values: &[f64], shift: i64) -> Vec<f64> {
    let mut out = values.to_vec();
    if out.is_empty() {
        return out;
    }
    let k = shift.rem_euclid(out.len() as i64) as usize;
    out.rotate_right(k);
    out
}

fn r_peaks(samples: &[f64], rate_hz: u32) -> Result<Vec<usize>> {
    let signal = Signal::new(samples.to_vec(), rate_hz)?;
    Ok(BeatDetector::default().detect(&signal).indices().to_vec())
}

pub fn noise_injection<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    kind: NoiseKind,
    intensity: f64,
    rng: &mut R,
) -> Vec<f64> {
    let n = samples.len();
    let signal_power = stats::power(samples);
    let noise = match kind {
        NoiseKind::Gaussian => {
            synthetic::gaussian_noise(n, intensity * 0.1 * signal_power.sqrt(), rng)
        }
        NoiseKind::Colored => {
            let white = synthetic::gaussian_noise(n, 1.0, rng);
            let mut analyzer = SpectrumAnalyzer::new(rate_hz as f64);
            let mut spectrum = analyzer.forward(&white);
            for (k, bin) in spectrum.iter_mut().enumerate() {
                // Frequency in cycles per sample, negative half mirrored
                let f = if k <= (n - 1) / 2 {
                    k as f64 / n as f64
                } else {
                    (k as f64 - n as f64) / n as f64
                };
                let gain = if k == 0 { 0.0 } else { 1.0 / (1.0 + f.abs()) };
                *bin *= gain;
            }
            let colored = analyzer.inverse_real(spectrum);
            let scale =
                intensity * 0.2 * (signal_power / (stats::power(&colored) + 1e-10)).sqrt();
            colored.into_iter().map(|v| v * scale).collect()
        }
        NoiseKind::Impulse => {
            let mut noise = vec![0.0; n];
            let spikes = ((intensity * 10.0) as usize).min(n);
            let amplitude = intensity * 2.0 * stats::std_dev(samples);
            let half_width = secs(rate_hz, 0.01) / 2;
            for idx in index::sample(rng, n, spikes).into_iter() {
                let start = idx.saturating_sub(half_width);
                let end = (idx + half_width).min(n);
                let window = hann_symmetric(end - start);
                for (v, w) in noise[start..end].iter_mut().zip(window) {
                    *v += amplitude * w;
                }
            }
            noise
        }
    };
    samples.iter().zip(noise).map(|(s, e)| s + e).collect()
}

/// Resample along a smooth random time axis
pub fn time_warp<R: Rng + ?Sized>(samples: &[f64], intensity: f64, rng: &mut R) -> Vec<f64> {
    let n = samples.len();
    let knot_count = 3 + (intensity * 5.0) as usize;
    let mut positions: Vec<f64> = (0..knot_count).map(|_| uniform(rng)).collect();
    positions.sort_by(f64::total_cmp);
    let offsets: Vec<f64> = (0..knot_count)
        .map(|_| normal(rng) * intensity * 0.3)
        .collect();

    let (Some(warp), Some(interp)) = (
        NaturalCubicSpline::new(&positions, &offsets),
        NaturalCubicSpline::through_samples(samples),
    ) else {
        return samples.to_vec();
    };
    let last = (n - 1) as f64;
    linspace(0.0, 1.0, n)
        .into_iter()
        .map(|x| interp.evaluate((x + warp.evaluate(x)).clamp(0.0, 1.0) * last))
        .collect()
}

/// Global gain times a smooth five-point gain envelope
pub fn amplitude_scale<R: Rng + ?Sized>(samples: &[f64], intensity: f64, rng: &mut R) -> Vec<f64> {
    let global = 1.0 + (uniform(rng) - 0.5) * intensity * 0.5;
    let control = linspace(0.0, 1.0, 5);
    let gains: Vec<f64> = (0..5).map(|_| 1.0 + normal(rng) * intensity * 0.3).collect();
    let Some(envelope) = NaturalCubicSpline::new(&control, &gains) else {
        return samples.to_vec();
    };
    samples
        .iter()
        .zip(linspace(0.0, 1.0, samples.len()))
        .map(|(s, x)| s * global * envelope.evaluate(x))
        .collect()
}

/// Circular shift by up to 20 % of the length
pub fn time_shift<R: Rng + ?Sized>(samples: &[f64], intensity: f64, rng: &mut R) -> Vec<f64> {
    let max_shift = (intensity * 0.2 * samples.len() as f64) as i64;
    let shift = if max_shift > 0 {
        rng.random_range(-max_shift..max_shift)
    } else {
        0
    };
    roll(samples, shift)
}

/// Stretch or compress the spectrum by up to ±25 % (full intensity)
///
/// The one-sided spectrum is resampled with cubic splines and mirrored into a
/// Hermitian spectrum so the inverse transform is real.
pub fn frequency_warp<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Vec<f64> {
    let n = samples.len();
    let factor = 1.0 + (uniform(rng) - 0.5) * intensity * 0.5;
    if n < 4 {
        return samples.to_vec();
    }
    let mut analyzer = SpectrumAnalyzer::new(rate_hz as f64);
    let spectrum = analyzer.forward(samples);
    let half = n / 2;
    let re: Vec<f64> = spectrum[..=half].iter().map(|c| c.re).collect();
    let im: Vec<f64> = spectrum[..=half].iter().map(|c| c.im).collect();
    let (Some(re), Some(im)) = (
        NaturalCubicSpline::through_samples(&re),
        NaturalCubicSpline::through_samples(&im),
    ) else {
        return samples.to_vec();
    };

    let mut warped = spectrum;
    for k in 0..=half {
        let at = k as f64 * factor;
        let (r, i) = if at > half as f64 {
            (0.0, 0.0)
        } else {
            (re.evaluate(at), im.evaluate(at))
        };
        warped[k].re = r;
        warped[k].im = i;
    }
    warped[0].im = 0.0;
    if n % 2 == 0 {
        warped[half].im = 0.0;
    }
    for k in half + 1..n {
        warped[k] = warped[n - k].conj();
    }
    analyzer.inverse_real(warped)
}

/// Respiratory sinusoid plus slow drifts
pub fn baseline_wander<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Vec<f64> {
    let fs = rate_hz as f64;
    let std = stats::std_dev(samples);

    let resp_freq = 0.2 + uniform(rng) * 0.3;
    let resp_amp = intensity * 0.3 * std;
    let drift_freq = 0.05 + uniform(rng) * 0.05;
    let drift_amp = intensity * 0.15 * std;
    let drift_phase = uniform(rng) * 2.0 * PI;
    let slow: Vec<(f64, f64, f64)> = (0..3)
        .map(|_| {
            let freq = 0.01 + uniform(rng) * 0.09;
            let amp = intensity * 0.1 * uniform(rng) * std;
            let phase = uniform(rng) * 2.0 * PI;
            (freq, amp, phase)
        })
        .collect();

    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let t = i as f64 / fs;
            let mut baseline = resp_amp * (2.0 * PI * resp_freq * t).sin()
                + drift_amp * (2.0 * PI * drift_freq * t + drift_phase).sin();
            for (freq, amp, phase) in &slow {
                baseline += amp * (2.0 * PI * freq * t + phase).sin();
            }
            s + baseline
        })
        .collect()
}

/// 50 or 60 Hz hum with 2nd/3rd harmonics below Nyquist and slight AM
pub fn powerline_noise<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Vec<f64> {
    let fs = rate_hz as f64;
    let mains = if uniform(rng) > 0.5 { 50.0 } else { 60.0 };
    let amplitude = intensity * 0.1 * stats::std_dev(samples);

    let mut tones = vec![(mains, amplitude, uniform(rng) * 2.0 * PI)];
    for harmonic in [2.0, 3.0] {
        if mains * harmonic < fs / 2.0 {
            tones.push((mains * harmonic, amplitude * 0.3 / harmonic, uniform(rng) * 2.0 * PI));
        }
    }

    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let t = i as f64 / fs;
            let hum: f64 = tones
                .iter()
                .map(|(freq, amp, phase)| amp * (2.0 * PI * freq * t + phase).sin())
                .sum();
            s + hum * (1.0 + 0.01 * (2.0 * PI * 0.5 * t).sin())
        })
        .collect()
}

/// Baseline steps of 50-200 ms followed by exponential recovery
pub fn electrode_motion<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Vec<f64> {
    let n = samples.len();
    let std = stats::std_dev(samples);
    let mut out = samples.to_vec();

    let events = (1.0 + intensity * 4.0) as usize;
    for _ in 0..events {
        let start = random_start(rng, n, secs(rate_hz, 0.1));
        let duration = secs(rate_hz, 0.05 + uniform(rng) * 0.15);
        let end = (start + duration).min(n);
        let step = intensity * 0.5 * std * normal(rng);
        for v in &mut out[start..end] {
            *v += step;
        }

        let recovery_end = (end + 2 * duration).min(n);
        let decay = linspace(0.0, 5.0, recovery_end - end);
        for (v, x) in out[end..recovery_end].iter_mut().zip(decay) {
            *v += step * (-x).exp();
        }
    }
    out
}

/// Hann-windowed bursts of 20-100 Hz band-limited noise
const MUSCLE_BAND_HZ: (f64, f64) = (20.0, 100.0);

pub fn muscle_artifact<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let n = samples.len();
    let fs = rate_hz as f64;
    let std = stats::std_dev(samples);
    let high = clamp_below_nyquist(MUSCLE_BAND_HZ.1, fs);
    if high <= MUSCLE_BAND_HZ.0 {
        debug!("No muscle band below Nyquist at {} Hz", rate_hz);
        return Ok(samples.to_vec());
    }
    let filter = ButterworthFilter::design(3, FilterBand::Bandpass(MUSCLE_BAND_HZ.0, high), fs)?;
    let mut out = samples.to_vec();

    let bursts = (3.0 + intensity * 7.0) as usize;
    for _ in 0..bursts {
        let start = random_start(rng, n, secs(rate_hz, 0.2));
        let duration = secs(rate_hz, 0.02 + uniform(rng) * 0.08);
        let end = (start + duration).min(n);
        let len = end - start;
        if len == 0 {
            continue;
        }

        // Short bursts are cut from a longer filtered draw
        let draw = synthetic::gaussian_noise(len.max(filter.pad_len() + 1), 1.0, rng);
        let mut burst = filter.filtfilt(&draw)?;
        burst.truncate(len);
        let scale = intensity * 0.2 * std / (stats::std_dev(&burst) + 1e-10);
        for ((v, b), w) in out[start..end].iter_mut().zip(burst).zip(hann_symmetric(len)) {
            *v += b * scale * w;
        }
    }
    Ok(out)
}

/// Flatline segments of 10-50 ms at the local mean, cross-faded at the edges
pub fn signal_dropout<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Vec<f64> {
    let n = samples.len();
    let mut out = samples.to_vec();

    let dropouts = (intensity * 3.0) as usize;
    for _ in 0..dropouts {
        let start = random_start(rng, n, secs(rate_hz, 0.05));
        let duration = secs(rate_hz, 0.01 + uniform(rng) * 0.04);
        let end = (start + duration).min(n);
        if end <= start {
            continue;
        }
        let level = stats::mean(&out[start..end]);
        out[start..end].fill(level);

        let fade = (duration / 4).min(10);
        let weight = |i: usize| (i + 1) as f64 / (fade + 1) as f64;
        if start > fade {
            for i in 0..fade {
                let idx = start - fade + i;
                out[idx] += weight(i) * (level - out[idx]);
            }
        }
        if end + fade < n {
            for i in 0..fade {
                let idx = end + i;
                out[idx] += (1.0 - weight(i)) * (level - out[idx]);
            }
        }
    }
    out
}

/// Randomly rescale, shift or reshape individual beats
pub fn beat_perturbation<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let peaks = r_peaks(samples, rate_hz)?;
    let mut out = samples.to_vec();
    if peaks.len() < 2 {
        return Ok(out);
    }
    let n = samples.len();
    let fs = rate_hz as f64;
    let before = secs(rate_hz, 0.25);
    let after = secs(rate_hz, 0.4);
    let qrs_half = secs(rate_hz, 0.05);

    for peak in peaks {
        if uniform(rng) >= intensity * 0.7 {
            continue;
        }
        if peak < before || peak + after > n {
            continue;
        }
        let range = peak - before..peak + after;
        let mut beat = out[range.clone()].to_vec();
        let len = beat.len();

        match rng.random_range(0..3) {
            0 => {
                let factor = 1.0 + (uniform(rng) - 0.5) * intensity * 0.8;
                for v in &mut beat[before - qrs_half..before + qrs_half] {
                    *v *= factor;
                }
            }
            1 => {
                let shift = ((uniform(rng) - 0.5) * intensity * 0.1 * len as f64) as i64;
                let mut shifted = roll(&beat, shift);
                let k = shift.unsigned_abs() as usize;
                if shift > 0 {
                    shifted[..k].fill(beat[0]);
                } else if shift < 0 {
                    shifted[len - k..].fill(beat[len - 1]);
                }
                beat = shifted;
            }
            _ => {
                let wavelets = 1 + (uniform(rng) * 2.0) as usize;
                for _ in 0..wavelets {
                    let pos = rng.random_range(0..len);
                    let width = (0.02 * fs + uniform(rng) * 0.03 * fs) as usize;
                    let amp = intensity * 0.3 * stats::std_dev(&beat) * normal(rng);
                    let start = pos.saturating_sub(width / 2);
                    let end = (pos + width / 2).min(len);
                    // Mexican hat
                    for (v, x) in beat[start..end].iter_mut().zip(linspace(-3.0, 3.0, width)) {
                        *v += amp * (1.0 - x * x) * (-x * x / 2.0).exp();
                    }
                }
            }
        }
        out[range].copy_from_slice(&beat);
    }
    Ok(out)
}

/// Blend in a smoothed, delayed, rescaled pseudo second lead
pub fn lead_mixing<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let fs = rate_hz as f64;
    let std = stats::std_dev(samples);
    let smoothed = ButterworthFilter::design(
        3,
        FilterBand::Lowpass(clamp_below_nyquist(40.0, fs)),
        fs,
    )?
    .filtfilt(samples)?;

    let shift = ((uniform(rng) - 0.5) * intensity * 0.01 * fs) as i64;
    let gain = 0.3 + uniform(rng) * 0.4;
    let mut second = roll(&smoothed, shift);
    for v in &mut second {
        *v = *v * gain + normal(rng) * 0.1 * std;
    }

    let mix = 0.7 + (uniform(rng) - 0.5) * intensity * 0.4;
    Ok(samples
        .iter()
        .zip(second)
        .map(|(a, b)| mix * a + (1.0 - mix) * b)
        .collect())
}

/// Ramp the 80-120 ms segment after some R peaks up or down
pub fn st_segment_shift<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let peaks = r_peaks(samples, rate_hz)?;
    let mut out = samples.to_vec();
    if peaks.len() < 2 {
        return Ok(out);
    }
    let n = samples.len();
    let std = stats::std_dev(samples);

    for peak in peaks {
        if uniform(rng) >= intensity * 0.5 {
            continue;
        }
        let start = (peak + secs(rate_hz, 0.08)).min(n);
        let end = (peak + secs(rate_hz, 0.12)).min(n);
        if end <= start {
            continue;
        }
        let shift = (uniform(rng) - 0.5) * intensity * 0.5 * std;
        for (v, ramp) in out[start..end].iter_mut().zip(linspace(0.0, 1.0, end - start)) {
            *v += shift * ramp;
        }
    }
    Ok(out)
}

/// Invert, flatten or peak the 200-400 ms window after some R peaks
pub fn t_wave_alteration<R: Rng + ?Sized>(
    samples: &[f64],
    rate_hz: u32,
    intensity: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let peaks = r_peaks(samples, rate_hz)?;
    let mut out = samples.to_vec();
    if peaks.len() < 2 {
        return Ok(out);
    }
    let n = samples.len();

    for peak in peaks {
        if uniform(rng) >= intensity * 0.4 {
            continue;
        }
        let start = (peak + secs(rate_hz, 0.2)).min(n);
        let end = (peak + secs(rate_hz, 0.4)).min(n);
        if end <= start {
            continue;
        }
        let wave = &mut out[start..end];
        match rng.random_range(0..3) {
            0 => {
                let factor = -(0.5 + uniform(rng) * 0.5);
                wave.iter_mut().for_each(|v| *v *= factor);
            }
            1 => {
                let factor = 0.2 + uniform(rng) * 0.3;
                wave.iter_mut().for_each(|v| *v *= factor);
            }
            _ => {
                let spread = 2.0 * (0.5 + uniform(rng));
                let bump: Vec<f64> = linspace(-3.0, 3.0, wave.len())
                    .into_iter()
                    .map(|x| (-x * x / spread).exp())
                    .collect();
                let peak_bump = stats::max(&bump);
                for (v, b) in wave.iter_mut().zip(bump) {
                    *v *= 1.0 + intensity * b / peak_bump;
                }
            }
        }
    }
    Ok(out)
}
