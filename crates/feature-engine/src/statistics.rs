//! Distribution and shape features

use signal_core::{medfilt, stats, Moments};

/// Kernel of the median filter used to split signal from noise
const SNR_MEDIAN_KERNEL: usize = 51;
const SNR_CEILING_DB: f64 = 100.0;

/// Statistical features for a signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticalFeatures {
    /// 10th, 25th, 50th, 75th and 90th percentiles
    pub percentiles: [f64; 5],
    pub range: f64,
    /// Interquartile range
    pub iqr: f64,
    /// Mean absolute deviation around the mean
    pub mad: f64,
    pub rms: f64,
    /// Peak |x| over RMS
    pub crest_factor: f64,
    /// RMS over mean |x|
    pub shape_factor: f64,
    /// Peak |x| over mean |x|
    pub impulse_factor: f64,
    /// Peak |x| over squared mean sqrt|x|
    pub clearance_factor: f64,
    pub third_moment: f64,
    pub fourth_moment: f64,
    /// Median-filter residual SNR estimate (dB)
    pub estimated_snr: f64,
}

const PERCENTILES: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

impl StatisticalFeatures {
    /// Compute statistical features from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let percentiles = PERCENTILES.map(|q| stats::percentile_sorted(&sorted, q));

        let moments = Moments::compute(values);
        let rms = stats::rms(values);
        let peak = values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()));
        let mean_abs = values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64;
        let mean_sqrt = values.iter().map(|v| v.abs().sqrt()).sum::<f64>() / values.len() as f64;

        let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };

        Self {
            percentiles,
            range: sorted[sorted.len() - 1] - sorted[0],
            iqr: percentiles[3] - percentiles[1],
            mad: stats::mean_abs_deviation(values),
            rms,
            crest_factor: ratio(peak, rms),
            shape_factor: ratio(rms, mean_abs),
            impulse_factor: ratio(peak, mean_abs),
            clearance_factor: ratio(peak, mean_sqrt * mean_sqrt),
            third_moment: moments.m3,
            fourth_moment: moments.m4,
            estimated_snr: estimate_snr(values),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("statistical_percentile_10", self.percentiles[0]),
            ("statistical_percentile_25", self.percentiles[1]),
            ("statistical_percentile_50", self.percentiles[2]),
            ("statistical_percentile_75", self.percentiles[3]),
            ("statistical_percentile_90", self.percentiles[4]),
            ("statistical_range", self.range),
            ("statistical_iqr", self.iqr),
            ("statistical_mad", self.mad),
            ("statistical_rms", self.rms),
            ("statistical_crest_factor", self.crest_factor),
            ("statistical_shape_factor", self.shape_factor),
            ("statistical_impulse_factor", self.impulse_factor),
            ("statistical_clearance_factor", self.clearance_factor),
            ("statistical_third_moment", self.third_moment),
            ("statistical_fourth_moment", self.fourth_moment),
            ("statistical_estimated_snr", self.estimated_snr),
        ]
    }
}

fn estimate_snr(values: &[f64]) -> f64 {
    let smoothed = medfilt(values, SNR_MEDIAN_KERNEL);
    let noise: Vec<f64> = values
        .iter()
        .zip(smoothed.iter())
        .map(|(v, s)| v - s)
        .collect();
    let noise_power = stats::power(&noise);
    let signal_power = stats::power(&smoothed);
    if noise_power <= 0.0 {
        SNR_CEILING_DB
    } else if signal_power <= 0.0 {
        -SNR_CEILING_DB
    } else {
        10.0 * (signal_power / noise_power).log10()
    }
}
