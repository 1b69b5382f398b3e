//! Quality metrics and the composite report

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite score bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityCategory {
    Unacceptable,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            QualityCategory::Excellent
        } else if score >= 75.0 {
            QualityCategory::Good
        } else if score >= 60.0 {
            QualityCategory::Fair
        } else if score >= 40.0 {
            QualityCategory::Poor
        } else {
            QualityCategory::Unacceptable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityCategory::Excellent => "EXCELLENT",
            QualityCategory::Good => "GOOD",
            QualityCategory::Fair => "FAIR",
            QualityCategory::Poor => "POOR",
            QualityCategory::Unacceptable => "UNACCEPTABLE",
        }
    }
}

impl fmt::Display for QualityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub rms: f64,
    pub skewness: f64,
    /// Excess kurtosis
    pub kurtosis: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SnrMetrics {
    pub snr_db: f64,
    pub signal_power: f64,
    pub noise_power: f64,
    pub adequate: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineWanderMetrics {
    /// Largest excursion of the lowpassed baseline from its mean
    pub amplitude: f64,
    /// Strongest baseline component at or below 2 Hz
    pub frequency_hz: f64,
    pub acceptable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerlineMetrics {
    pub power_50hz: f64,
    pub power_60hz: f64,
    /// Share of total spectral power in the two mains bins
    pub ratio: f64,
    pub interference: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingDataMetrics {
    pub nan_count: usize,
    pub inf_count: usize,
    pub missing_fraction: f64,
    /// Runs of two or more unchanged sample-to-sample differences
    pub flatline_segments: usize,
    pub missing: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClippingMetrics {
    pub high_clip_count: usize,
    pub low_clip_count: usize,
    pub clip_fraction: f64,
    pub clipped: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SaturationMetrics {
    pub saturated_count: usize,
    pub saturation_fraction: f64,
    pub saturated: bool,
}

/// Full quality assessment of one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub basic_stats: BasicStats,
    pub snr: SnrMetrics,
    pub baseline_wander: BaselineWanderMetrics,
    pub powerline: PowerlineMetrics,
    pub missing_data: MissingDataMetrics,
    pub clipping: ClippingMetrics,
    pub saturation: SaturationMetrics,
    /// Composite score in [0, 100]
    pub overall_score: f64,
    pub category: QualityCategory,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    /// Whether the recording is usable for downstream analysis
    pub fn is_acceptable(&self) -> bool {
        self.category >= QualityCategory::Fair
    }

    /// Names of the failed checks, in scoring order
    pub fn failed_checks(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.snr.adequate {
            failed.push("snr");
        }
        if !self.baseline_wander.acceptable {
            failed.push("baseline_wander");
        }
        if self.powerline.interference {
            failed.push("powerline");
        }
        if self.missing_data.missing {
            failed.push("missing_data");
        }
        if self.clipping.clipped {
            failed.push("clipping");
        }
        if self.saturation.saturated {
            failed.push("saturation");
        }
        failed
    }
}

pub(crate) fn recommendations(
    score: f64,
    powerline: &PowerlineMetrics,
    missing: &MissingDataMetrics,
) -> Vec<String> {
    let mut recs = Vec::new();
    if score < 60.0 {
        recs.push("Signal quality is insufficient for clinical analysis.".to_string());
        recs.push("Consider re-recording with proper electrode placement.".to_string());
    }
    if powerline.interference {
        recs.push("Powerline interference detected. Check grounding.".to_string());
    }
    if missing.missing {
        recs.push("Missing data detected. Check electrode connections.".to_string());
    }
    if recs.is_empty() {
        recs.push("Signal quality is acceptable for clinical analysis.".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_bands() {
        assert_eq!(QualityCategory::from_score(100.0), QualityCategory::Excellent);
        assert_eq!(QualityCategory::from_score(90.0), QualityCategory::Excellent);
        assert_eq!(QualityCategory::from_score(89.9), QualityCategory::Good);
        assert_eq!(QualityCategory::from_score(75.0), QualityCategory::Good);
        assert_eq!(QualityCategory::from_score(60.0), QualityCategory::Fair);
        assert_eq!(QualityCategory::from_score(40.0), QualityCategory::Poor);
        assert_eq!(QualityCategory::from_score(0.0), QualityCategory::Unacceptable);
    }

    #[test]
    fn test_category_ordering() {
        assert!(QualityCategory::Excellent > QualityCategory::Good);
        assert!(QualityCategory::Poor > QualityCategory::Unacceptable);
    }

    #[test]
    fn test_recommendations() {
        let clean = recommendations(100.0, &Default::default(), &Default::default());
        assert_eq!(clean, vec!["Signal quality is acceptable for clinical analysis."]);

        let powerline = PowerlineMetrics {
            interference: true,
            ..Default::default()
        };
        let recs = recommendations(50.0, &powerline, &Default::default());
        assert_eq!(recs.len(), 3);
        assert!(recs[2].contains("grounding"));
    }
}
