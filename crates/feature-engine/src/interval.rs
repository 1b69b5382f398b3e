//! RR-interval (heart rate variability) features and rhythm assessment

use crate::histogram::Histogram;
use beat_detector::BeatSet;
use serde::{Deserialize, Serialize};
use signal_core::stats;
use std::f64::consts::{PI, SQRT_2};

/// Successive-difference threshold for pNN50 (ms)
const NN50_MS: f64 = 50.0;
/// Intervals needed before TINN is reported
const TINN_MIN_INTERVALS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalFeatures {
    pub mean_rr: f64,
    pub std_rr: f64,
    pub cv_rr: f64,
    pub rmssd: f64,
    pub sdsd: f64,
    /// Fraction of successive differences above 50 ms
    pub pnn50: f64,
    pub triangular_index: f64,
    pub tinn: f64,
    pub sd1: f64,
    pub sd2: f64,
    pub poincare_area: f64,
    pub sd2_sd1_ratio: f64,
    pub beat_count: usize,
    pub mean_heart_rate: f64,
}

impl IntervalFeatures {
    /// All zero for a degenerate beat set
    pub fn compute(beats: &BeatSet) -> Self {
        if beats.is_degenerate() {
            return Self::default();
        }
        let rr = beats.rr_intervals_ms();
        let mean_rr = stats::mean(&rr);
        let std_rr = stats::std_dev(&rr);

        let diffs = stats::diff(&rr);
        let rmssd = stats::rms(&diffs);
        let nn50 = diffs.iter().filter(|d| d.abs() > NN50_MS).count();
        let pnn50 = if diffs.is_empty() {
            0.0
        } else {
            nn50 as f64 / diffs.len() as f64
        };

        let histogram = Histogram::auto(&rr);
        let density_sum: f64 = histogram.density.iter().sum();
        let triangular_index = if density_sum > 0.0 {
            stats::max(&histogram.density) / density_sum
        } else {
            0.0
        };

        let (sd1, sd2) = poincare(&rr);
        Self {
            mean_rr,
            std_rr,
            cv_rr: if mean_rr > 0.0 { std_rr / mean_rr } else { 0.0 },
            rmssd,
            sdsd: stats::std_dev(&diffs),
            pnn50,
            triangular_index,
            tinn: tinn(&rr),
            sd1,
            sd2,
            poincare_area: PI * sd1 * sd2,
            sd2_sd1_ratio: if sd1 > 0.0 { sd2 / sd1 } else { 0.0 },
            beat_count: beats.len(),
            mean_heart_rate: beats.heart_rate_bpm().unwrap_or(0.0),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("interval_mean_rr", self.mean_rr),
            ("interval_std_rr", self.std_rr),
            ("interval_cv_rr", self.cv_rr),
            ("interval_rmssd", self.rmssd),
            ("interval_sdsd", self.sdsd),
            ("interval_pnn50", self.pnn50),
            ("interval_triangular_index", self.triangular_index),
            ("interval_tinn", self.tinn),
            ("interval_sd1", self.sd1),
            ("interval_sd2", self.sd2),
            ("interval_poincare_area", self.poincare_area),
            ("interval_sd2_sd1_ratio", self.sd2_sd1_ratio),
            ("interval_beat_count", self.beat_count as f64),
            ("interval_mean_heart_rate", self.mean_heart_rate),
        ]
    }
}

/// Poincaré SD1/SD2 from consecutive interval pairs
fn poincare(rr: &[f64]) -> (f64, f64) {
    if rr.len() < 2 {
        return (0.0, 0.0);
    }
    let (across, along): (Vec<f64>, Vec<f64>) = rr
        .windows(2)
        .map(|w| ((w[0] - w[1]) / SQRT_2, (w[0] + w[1]) / SQRT_2))
        .unzip();
    (stats::std_dev(&across), stats::std_dev(&along))
}

/// Width of the histogram around its mode where density stays above half the peak
fn tinn(rr: &[f64]) -> f64 {
    if rr.len() < TINN_MIN_INTERVALS {
        return 0.0;
    }
    let histogram = Histogram::auto(rr);
    let Some(mode) = histogram.mode_bin() else {
        return 0.0;
    };
    let half = histogram.density[mode] * 0.5;

    let mut left = mode;
    while left > 0 && histogram.density[left] > half {
        left -= 1;
    }
    let mut right = mode;
    while right < histogram.bins() - 1 && histogram.density[right] > half {
        right += 1;
    }
    histogram.edges[right] - histogram.edges[left]
}

/// Rhythm class from RR variability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhythmClass {
    Regular,
    SinusWithVariation,
    SuspectedAtrialFibrillation,
    Insufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhythmAssessment {
    pub class: RhythmClass,
    /// RR coefficient of variation
    pub rr_cv: f64,
    pub confidence: f64,
}

/// Screening thresholds on the RR coefficient of variation
const AF_CV: f64 = 0.15;
const REGULAR_CV: f64 = 0.05;

/// Classify the rhythm of a beat set by RR irregularity
///
/// This is a screening heuristic, not a diagnosis.
pub fn classify_rhythm(beats: &BeatSet) -> RhythmAssessment {
    if beats.is_degenerate() {
        return RhythmAssessment {
            class: RhythmClass::Insufficient,
            rr_cv: 0.0,
            confidence: 0.0,
        };
    }
    let rr = beats.rr_intervals_ms();
    let mean = stats::mean(&rr);
    let rr_cv = if mean > 0.0 {
        stats::std_dev(&rr) / mean
    } else {
        0.0
    };
    let class = if rr_cv > AF_CV {
        RhythmClass::SuspectedAtrialFibrillation
    } else if rr_cv < REGULAR_CV {
        RhythmClass::Regular
    } else {
        RhythmClass::SinusWithVariation
    };
    RhythmAssessment {
        class,
        rr_cv,
        confidence: (rr_cv * 5.0).min(1.0),
    }
}
