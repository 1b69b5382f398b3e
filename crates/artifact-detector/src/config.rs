//! Artifact detection thresholds and scoring weights
//!
//! Defaults are empirical values, not clinically validated limits.

use serde::{Deserialize, Serialize};

/// Motion artifact detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Pass band (Hz)
    pub band_hz: (f64, f64),
    pub filter_order: usize,
    /// Absolute amplitude above which a filtered sample is flagged
    pub amplitude_threshold: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            band_hz: (0.1, 10.0),
            filter_order: 3,
            amplitude_threshold: 0.5,
        }
    }
}

/// Electrode pop detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectrodePopConfig {
    /// Spike threshold in standard deviations of the first difference
    pub sigma_multiplier: f64,
    /// Spikes closer than this to the previous one are merged (milliseconds)
    pub min_gap_ms: f64,
}

impl Default for ElectrodePopConfig {
    fn default() -> Self {
        Self {
            sigma_multiplier: 5.0,
            min_gap_ms: 50.0,
        }
    }
}

/// Muscle (EMG) noise detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MuscleConfig {
    pub band_hz: (f64, f64),
    pub filter_order: usize,
    /// Sliding RMS window (milliseconds)
    pub rms_window_ms: f64,
    pub rms_threshold: f64,
}

impl Default for MuscleConfig {
    fn default() -> Self {
        Self {
            band_hz: (20.0, 100.0),
            filter_order: 3,
            rms_window_ms: 100.0,
            rms_threshold: 0.2,
        }
    }
}

/// Baseline wander detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    pub cutoff_hz: f64,
    pub filter_order: usize,
    /// Peak-to-peak baseline amplitude considered excessive
    pub amplitude_threshold: f64,
    /// Welch segment length for the wander spectrum
    pub welch_segment: usize,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 0.5,
            filter_order: 2,
            amplitude_threshold: 0.3,
            welch_segment: 512,
        }
    }
}

/// Powerline interference detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerlineConfig {
    /// Mains frequencies to probe (Hz)
    pub frequencies_hz: Vec<f64>,
    /// Bin-to-total power ratio above which a line interferes
    pub ratio_threshold: f64,
    pub welch_segment: usize,
}

impl Default for PowerlineConfig {
    fn default() -> Self {
        Self {
            frequencies_hz: vec![50.0, 60.0],
            ratio_threshold: 0.1,
            welch_segment: 1024,
        }
    }
}

/// Electrosurgical (high-frequency) noise detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectrosurgicalConfig {
    pub cutoff_hz: f64,
    pub filter_order: usize,
    /// High-band to total power ratio above which noise is flagged
    pub ratio_threshold: f64,
}

impl Default for ElectrosurgicalConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 100.0,
            filter_order: 3,
            ratio_threshold: 1.0,
        }
    }
}

/// Weights used to rank artifact kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub motion_per_segment: f64,
    pub motion_per_second: f64,
    pub pop_per_event: f64,
    pub muscle_per_second: f64,
    pub wander_per_unit: f64,
    pub powerline_per_line: f64,
    pub electrosurgical: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            motion_per_segment: 10.0,
            motion_per_second: 5.0,
            pop_per_event: 15.0,
            muscle_per_second: 8.0,
            wander_per_unit: 20.0,
            powerline_per_line: 25.0,
            electrosurgical: 30.0,
        }
    }
}

/// Artifact removal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovalConfig {
    /// Median window around each motion sample (milliseconds)
    pub motion_window_ms: f64,
    /// Highpass applied when wander is excessive
    pub wander_highpass_hz: f64,
    pub wander_highpass_order: usize,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            motion_window_ms: 100.0,
            wander_highpass_hz: 0.5,
            wander_highpass_order: 3,
        }
    }
}

/// Full artifact detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub motion: MotionConfig,
    pub electrode_pop: ElectrodePopConfig,
    pub muscle: MuscleConfig,
    pub wander: WanderConfig,
    pub powerline: PowerlineConfig,
    pub electrosurgical: ElectrosurgicalConfig,
    pub weights: ScoreWeights,
    pub removal: RemovalConfig,
    /// Flagged samples closer than this are merged into one segment (milliseconds)
    pub segment_gap_ms: f64,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            electrode_pop: ElectrodePopConfig::default(),
            muscle: MuscleConfig::default(),
            wander: WanderConfig::default(),
            powerline: PowerlineConfig::default(),
            electrosurgical: ElectrosurgicalConfig::default(),
            weights: ScoreWeights::default(),
            removal: RemovalConfig::default(),
            segment_gap_ms: 20.0,
        }
    }
}
