//! Frequency-domain features from the Welch PSD

use signal_core::{stats, PowerSpectrum, SpectrumAnalyzer};

/// Frequency band definitions (Hz), bounds inclusive
#[derive(Debug, Clone, Copy)]
pub struct FrequencyBands {
    pub ulf: (f64, f64),
    pub vlf: (f64, f64),
    pub lf: (f64, f64),
    pub hf: (f64, f64),
    /// Diagnostic ECG band
    pub ecg: (f64, f64),
}

impl Default for FrequencyBands {
    fn default() -> Self {
        Self {
            ulf: (0.0, 0.003),
            vlf: (0.003, 0.04),
            lf: (0.04, 0.15),
            hf: (0.15, 0.4),
            ecg: (0.5, 40.0),
        }
    }
}

/// Absolute and relative power of one band
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandPower {
    pub power: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectralFeatures {
    pub ulf: BandPower,
    pub vlf: BandPower,
    pub lf: BandPower,
    pub hf: BandPower,
    pub ecg: BandPower,
    pub centroid: f64,
    pub spread: f64,
    /// Geometric over arithmetic mean of the PSD
    pub flatness: f64,
    /// Frequency below which 85% of the power lies
    pub rolloff: f64,
    pub dominant_frequency: f64,
    pub dominant_power: f64,
}

const ROLLOFF_FRACTION: f64 = 0.85;

impl SpectralFeatures {
    pub fn compute(analyzer: &mut SpectrumAnalyzer, values: &[f64], max_segment: usize) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let psd = analyzer.welch(values, max_segment.min(values.len()));
        Self::from_psd(&psd, &FrequencyBands::default())
    }

    pub fn from_psd(psd: &PowerSpectrum, bands: &FrequencyBands) -> Self {
        let total = psd.total();
        let band = |(lo, hi): (f64, f64)| {
            let power = psd.band_power(lo, hi);
            BandPower {
                power,
                ratio: if total > 0.0 { power / total } else { 0.0 },
            }
        };

        let mut features = Self {
            ulf: band(bands.ulf),
            vlf: band(bands.vlf),
            lf: band(bands.lf),
            hf: band(bands.hf),
            ecg: band(bands.ecg),
            ..Default::default()
        };

        if total > 0.0 {
            let centroid = weighted_sum(psd, |f| f) / total;
            features.centroid = centroid;
            features.spread = (weighted_sum(psd, |f| (f - centroid).powi(2)) / total).sqrt();
            features.flatness = flatness(&psd.power);
            features.rolloff = rolloff(psd, total);
        }

        if let Some(idx) = stats::argmax(&psd.power) {
            features.dominant_frequency = psd.frequencies[idx];
            features.dominant_power = psd.power[idx];
        }
        features
    }

    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("spectral_power_ulf", self.ulf.power),
            ("spectral_power_ratio_ulf", self.ulf.ratio),
            ("spectral_power_vlf", self.vlf.power),
            ("spectral_power_ratio_vlf", self.vlf.ratio),
            ("spectral_power_lf", self.lf.power),
            ("spectral_power_ratio_lf", self.lf.ratio),
            ("spectral_power_hf", self.hf.power),
            ("spectral_power_ratio_hf", self.hf.ratio),
            ("spectral_power_ecg", self.ecg.power),
            ("spectral_power_ratio_ecg", self.ecg.ratio),
            ("spectral_centroid", self.centroid),
            ("spectral_spread", self.spread),
            ("spectral_flatness", self.flatness),
            ("spectral_rolloff", self.rolloff),
            ("spectral_dominant_frequency", self.dominant_frequency),
            ("spectral_dominant_power", self.dominant_power),
        ]
    }
}

fn weighted_sum(psd: &PowerSpectrum, f: impl Fn(f64) -> f64) -> f64 {
    psd.frequencies
        .iter()
        .zip(psd.power.iter())
        .map(|(freq, p)| f(*freq) * p)
        .sum()
}

/// Zero bins pull the geometric mean, and the flatness, to zero
fn flatness(power: &[f64]) -> f64 {
    if power.is_empty() || power.iter().any(|p| *p <= 0.0) {
        return 0.0;
    }
    let n = power.len() as f64;
    let log_mean = power.iter().map(|p| p.ln()).sum::<f64>() / n;
    let arithmetic = power.iter().sum::<f64>() / n;
    log_mean.exp() / arithmetic
}

fn rolloff(psd: &PowerSpectrum, total: f64) -> f64 {
    let mut cumulative = 0.0;
    for (freq, p) in psd.frequencies.iter().zip(psd.power.iter()) {
        cumulative += p;
        if cumulative / total >= ROLLOFF_FRACTION {
            return *freq;
        }
    }
    0.0
}
