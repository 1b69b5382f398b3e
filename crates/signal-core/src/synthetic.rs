//! Deterministic synthetic ECG generators for demos and tests

use crate::error::Result;
use crate::signal::Signal;
use crate::stats::linspace;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

/// Gaussian-wave beat shape, amplitudes in mV and widths in seconds
#[derive(Debug, Clone, Copy)]
pub struct BeatShape {
    pub r_amplitude: f64,
    pub r_width: f64,
    pub p_amplitude: f64,
    pub p_offset: f64,
    pub t_amplitude: f64,
    pub t_offset: f64,
}

impl Default for BeatShape {
    fn default() -> Self {
        Self {
            r_amplitude: 1.0,
            r_width: 0.01,
            p_amplitude: 0.15,
            p_offset: -0.16,
            t_amplitude: 0.3,
            t_offset: 0.3,
        }
    }
}

/// Regular rhythm at `bpm`; the first R wave sits half an RR interval in
pub fn pulse_train(rate_hz: u32, duration_secs: f64, bpm: f64) -> Result<Signal> {
    pulse_train_with_shape(rate_hz, duration_secs, bpm, BeatShape::default())
}

pub fn pulse_train_with_shape(
    rate_hz: u32,
    duration_secs: f64,
    bpm: f64,
    shape: BeatShape,
) -> Result<Signal> {
    let fs = rate_hz as f64;
    let n = (duration_secs * fs).round().max(0.0) as usize;
    let rr = 60.0 / bpm;
    let mut beat_times = Vec::new();
    let mut t = rr / 2.0;
    while t < duration_secs {
        beat_times.push(t);
        t += rr;
    }

    let gaussian = |t: f64, centre: f64, width: f64| {
        let z = (t - centre) / width;
        (-0.5 * z * z).exp()
    };

    let samples = (0..n)
        .map(|i| {
            let t = i as f64 / fs;
            beat_times
                .iter()
                .filter(|&&b| (t - b).abs() < 0.6)
                .map(|&b| {
                    shape.r_amplitude * gaussian(t, b, shape.r_width)
                        + shape.p_amplitude * gaussian(t, b + shape.p_offset, 0.02)
                        + shape.t_amplitude * gaussian(t, b + shape.t_offset, 0.04)
                })
                .sum()
        })
        .collect();
    Signal::new(samples, rate_hz)
}

/// Two-tone test signal `sin(2*pi*t) + 0.5*sin(2*pi*5*t)` plus Gaussian noise
pub fn two_tone<R: Rng + ?Sized>(
    rate_hz: u32,
    duration_secs: f64,
    noise_std: f64,
    rng: &mut R,
) -> Result<Signal> {
    let n = (duration_secs * rate_hz as f64).round().max(0.0) as usize;
    let samples = linspace(0.0, duration_secs, n)
        .into_iter()
        .map(|t| {
            let noise: f64 = StandardNormal.sample(rng);
            (2.0 * PI * t).sin() + 0.5 * (2.0 * PI * 5.0 * t).sin() + noise_std * noise
        })
        .collect();
    Signal::new(samples, rate_hz)
}

/// Composite demo ECG: 1 Hz P/T sinusoid, QRS bursts gated once per second,
/// 0.2 Hz wander, 50 Hz mains hum and Gaussian noise (std 0.03)
pub fn sample_ecg<R: Rng + ?Sized>(
    rate_hz: u32,
    duration_secs: f64,
    rng: &mut R,
) -> Result<Signal> {
    let n = (duration_secs * rate_hz as f64).round().max(0.0) as usize;
    let samples = linspace(0.0, duration_secs, n)
        .into_iter()
        .map(|t| {
            let phase = t % 1.0 - 0.3;
            let noise: f64 = StandardNormal.sample(rng);
            0.5 * (2.0 * PI * t).sin()
                + (2.0 * PI * 5.0 * t).sin() * (-phase * phase / 0.02).exp()
                + 0.1 * (2.0 * PI * 0.2 * t).sin()
                + 0.05 * (2.0 * PI * 50.0 * t).sin()
                + 0.03 * noise
        })
        .collect();
    Signal::new(samples, rate_hz)
}

/// `n` independent standard-normal draws scaled by `std`
pub fn gaussian_noise<R: Rng + ?Sized>(n: usize, std: f64, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let z: f64 = StandardNormal.sample(rng);
            std * z
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pulse_train_peaks() {
        let signal = pulse_train(500, 10.0, 60.0).unwrap();
        assert_eq!(signal.len(), 5000);
        // R peak at 0.5 s
        assert!((signal.samples()[250] - 1.0).abs() < 0.05);
        assert!(signal.samples()[400].abs() < 0.5);
    }

    #[test]
    fn test_two_tone_deterministic() {
        let a = two_tone(500, 1.0, 0.1, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = two_tone(500, 1.0, 0.1, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_ecg_shape() {
        let signal = sample_ecg(500, 5.0, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(signal.len(), 2500);
        assert!(signal.samples().iter().all(|v| v.is_finite()));
        let peak = signal.samples().iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak > 0.8 && peak < 2.0, "peak {}", peak);
    }
}
