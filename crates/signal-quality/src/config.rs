//! Quality thresholds and score deductions

use serde::{Deserialize, Serialize};

/// Acceptance thresholds for each quality metric
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Minimum signal-to-noise ratio (dB)
    pub min_snr_db: f64,

    /// Maximum baseline excursion from its mean (mV)
    pub max_baseline_wander: f64,

    /// Maximum 50/60 Hz share of total spectral power
    pub max_powerline_ratio: f64,

    /// Maximum fraction of NaN/Inf samples
    pub max_missing_fraction: f64,

    /// Maximum fraction of samples outside the clip limit
    pub max_clipping_fraction: f64,

    /// Maximum fraction of samples at ADC saturation
    pub max_saturation_fraction: f64,

    /// Normal ECG amplitude limit (mV)
    pub clip_limit_mv: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_snr_db: 20.0,
            max_baseline_wander: 0.1,
            max_powerline_ratio: 0.05,
            max_missing_fraction: 0.01,
            max_clipping_fraction: 0.02,
            max_saturation_fraction: 0.01,
            clip_limit_mv: 5.0,
        }
    }
}

impl QualityThresholds {
    /// Tighter limits for diagnostic-grade recordings
    pub fn strict() -> Self {
        Self {
            min_snr_db: 25.0,
            max_baseline_wander: 0.05,
            max_powerline_ratio: 0.02,
            ..Default::default()
        }
    }

    /// Looser limits for ambulatory recordings
    pub fn lenient() -> Self {
        Self {
            min_snr_db: 12.0,
            max_baseline_wander: 0.3,
            max_powerline_ratio: 0.1,
            ..Default::default()
        }
    }
}

/// Points removed from 100 per failed check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityDeductions {
    pub snr: f64,
    pub baseline_wander: f64,
    pub powerline: f64,
    pub missing_data: f64,
    pub clipping: f64,
    pub saturation: f64,
}

impl Default for QualityDeductions {
    fn default() -> Self {
        Self {
            snr: 20.0,
            baseline_wander: 15.0,
            powerline: 10.0,
            missing_data: 20.0,
            clipping: 15.0,
            saturation: 20.0,
        }
    }
}

/// Signal quality assessor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub thresholds: QualityThresholds,
    pub deductions: QualityDeductions,
}
