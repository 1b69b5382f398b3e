//! FFT-based spectral estimation

use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// One-sided spectrum on a uniform frequency grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerSpectrum {
    /// Bin centre frequencies (Hz), ascending
    pub frequencies: Vec<f64>,
    /// Power (or magnitude) per bin
    pub power: Vec<f64>,
}

impl PowerSpectrum {
    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    /// Sum over all bins
    pub fn total(&self) -> f64 {
        self.power.iter().sum()
    }

    /// Index of the bin closest to `freq`
    pub fn nearest_bin(&self, freq: f64) -> Option<usize> {
        self.frequencies
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - freq).abs().total_cmp(&(b.1 - freq).abs()))
            .map(|(i, _)| i)
    }

    /// Power summed over `lo <= f <= hi`
    pub fn band_power(&self, lo: f64, hi: f64) -> f64 {
        self.bins_in(lo, hi).map(|(_, p)| p).sum()
    }

    /// `(frequency, power)` pairs with `lo <= f <= hi`
    pub fn bins_in(&self, lo: f64, hi: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .zip(self.power.iter())
            .filter(move |(f, _)| **f >= lo && **f <= hi)
            .map(|(f, p)| (*f, *p))
    }

    /// Strongest bin at or below `max_freq`, first one on ties
    pub fn dominant_below(&self, max_freq: f64) -> Option<(f64, f64)> {
        self.bins_in(f64::NEG_INFINITY, max_freq)
            .fold(None, |best: Option<(f64, f64)>, (f, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((f, p)),
            })
    }

    /// Linear interpolation of the spectrum at `freq`, clamped to the ends
    pub fn interpolate_at(&self, freq: f64) -> f64 {
        let n = self.frequencies.len();
        if n == 0 {
            return 0.0;
        }
        if freq <= self.frequencies[0] {
            return self.power[0];
        }
        if freq >= self.frequencies[n - 1] {
            return self.power[n - 1];
        }
        let upper = self.frequencies.partition_point(|f| *f < freq);
        let lower = upper - 1;
        let (f0, f1) = (self.frequencies[lower], self.frequencies[upper]);
        let t = if f1 > f0 { (freq - f0) / (f1 - f0) } else { 0.0 };
        self.power[lower] + t * (self.power[upper] - self.power[lower])
    }
}

/// Spectrum analyzer that caches FFT plans between calls
pub struct SpectrumAnalyzer {
    planner: FftPlanner<f64>,
    sample_rate: f64,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            planner: FftPlanner::new(),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Welch power spectral density
    ///
    /// Periodic Hann window, 50 % overlap, per-segment mean removal,
    /// one-sided density scaling. `nperseg` is capped at the input length.
    pub fn welch(&mut self, signal: &[f64], nperseg: usize) -> PowerSpectrum {
        let n = signal.len();
        let nperseg = nperseg.min(n);
        if nperseg == 0 {
            return PowerSpectrum::default();
        }
        let step = nperseg - nperseg / 2;
        let window = hann_periodic(nperseg);
        let window_energy: f64 = window.iter().map(|w| w * w).sum();
        let scale = if window_energy > 0.0 {
            1.0 / (self.sample_rate * window_energy)
        } else {
            0.0
        };

        let bins = nperseg / 2 + 1;
        let fft = self.planner.plan_fft_forward(nperseg);
        let mut accumulated = vec![0.0; bins];
        let mut segments = 0usize;
        let mut start = 0;
        while start + nperseg <= n {
            let segment = &signal[start..start + nperseg];
            let mean = segment.iter().sum::<f64>() / nperseg as f64;
            let mut buffer: Vec<Complex<f64>> = segment
                .iter()
                .zip(window.iter())
                .map(|(&v, &w)| Complex::new((v - mean) * w, 0.0))
                .collect();
            fft.process(&mut buffer);
            for (acc, c) in accumulated.iter_mut().zip(buffer.iter()) {
                *acc += c.norm_sqr() * scale;
            }
            segments += 1;
            start += step;
        }

        let has_nyquist = nperseg % 2 == 0;
        let power: Vec<f64> = accumulated
            .iter()
            .enumerate()
            .map(|(k, &p)| {
                let p = p / segments as f64;
                let interior = k > 0 && !(has_nyquist && k == bins - 1);
                if interior {
                    2.0 * p
                } else {
                    p
                }
            })
            .collect();

        PowerSpectrum {
            frequencies: self.bin_frequencies(bins, nperseg),
            power,
        }
    }

    /// Magnitude of the real FFT (no window, no scaling)
    pub fn magnitude(&mut self, signal: &[f64]) -> PowerSpectrum {
        let n = signal.len();
        if n == 0 {
            return PowerSpectrum::default();
        }
        let mut buffer = to_complex(signal);
        self.planner.plan_fft_forward(n).process(&mut buffer);
        let bins = n / 2 + 1;
        PowerSpectrum {
            frequencies: self.bin_frequencies(bins, n),
            power: buffer.iter().take(bins).map(|c| c.norm()).collect(),
        }
    }

    /// Full complex forward FFT
    pub fn forward(&mut self, signal: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer = to_complex(signal);
        if !buffer.is_empty() {
            self.planner.plan_fft_forward(buffer.len()).process(&mut buffer);
        }
        buffer
    }

    /// Inverse FFT, normalized by length, returning the real part
    pub fn inverse_real(&mut self, mut spectrum: Vec<Complex<f64>>) -> Vec<f64> {
        let n = spectrum.len();
        if n == 0 {
            return Vec::new();
        }
        self.planner.plan_fft_inverse(n).process(&mut spectrum);
        spectrum.iter().map(|c| c.re / n as f64).collect()
    }

    fn bin_frequencies(&self, bins: usize, n: usize) -> Vec<f64> {
        let resolution = self.sample_rate / n as f64;
        (0..bins).map(|k| k as f64 * resolution).collect()
    }
}

fn to_complex(signal: &[f64]) -> Vec<Complex<f64>> {
    signal.iter().map(|&v| Complex::new(v, 0.0)).collect()
}

/// Periodic Hann window (FFT convention)
pub fn hann_periodic(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Symmetric Hann window, zero at both ends
pub fn hann_symmetric(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..n)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
            .collect(),
    }
}

/// Welch PSD with a throwaway analyzer
pub fn welch(signal: &[f64], fs: f64, nperseg: usize) -> PowerSpectrum {
    SpectrumAnalyzer::new(fs).welch(signal, nperseg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, n: usize, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_welch_peak_at_sine_frequency() {
        let fs = 500.0;
        let psd = welch(&sine(50.0, fs, 5000, 1.0), fs, 1024);
        assert_eq!(psd.len(), 513);
        let (freq, _) = psd.dominant_below(fs / 2.0).unwrap();
        assert!((freq - 50.0).abs() < 0.5);
    }

    #[test]
    fn test_welch_density_integrates_to_variance() {
        let fs = 500.0;
        let signal = sine(40.0, fs, 8192, 2.0);
        let psd = welch(&signal, fs, 1024);
        let df = fs / 1024.0;
        let integrated = psd.total() * df;
        // Sine variance is A^2 / 2
        assert!((integrated - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_welch_short_input_caps_segment() {
        let psd = welch(&[1.0, 2.0, 3.0, 4.0], 100.0, 1024);
        assert_eq!(psd.len(), 3);
        assert!(psd.power.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_magnitude_dominant_frequency() {
        let fs = 100.0;
        let mut analyzer = SpectrumAnalyzer::new(fs);
        let spectrum = analyzer.magnitude(&sine(2.0, fs, 256, 1.0));
        let (freq, _) = spectrum.dominant_below(10.0).unwrap();
        assert!((freq - 2.0).abs() < 1.0);
    }

    #[test]
    fn test_forward_inverse_identity() {
        let mut analyzer = SpectrumAnalyzer::new(100.0);
        let signal = sine(3.0, 100.0, 64, 1.5);
        let spectrum = analyzer.forward(&signal);
        let restored = analyzer.inverse_real(spectrum);
        for (a, b) in signal.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_interpolate_and_nearest() {
        let spectrum = PowerSpectrum {
            frequencies: vec![0.0, 1.0, 2.0],
            power: vec![0.0, 10.0, 20.0],
        };
        assert_eq!(spectrum.interpolate_at(1.5), 15.0);
        assert_eq!(spectrum.interpolate_at(5.0), 20.0);
        assert_eq!(spectrum.nearest_bin(1.4), Some(1));
        assert_eq!(spectrum.band_power(1.0, 2.0), 30.0);
    }

    #[test]
    fn test_empty_signal() {
        let mut analyzer = SpectrumAnalyzer::new(100.0);
        assert!(analyzer.welch(&[], 256).is_empty());
        assert!(analyzer.magnitude(&[]).is_empty());
    }
}
