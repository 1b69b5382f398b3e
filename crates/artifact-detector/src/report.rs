//! Artifact findings and the combined report

use crate::config::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Artifact categories, in tie-break order for primary selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Motion,
    ElectrodePop,
    MuscleNoise,
    BaselineWander,
    Powerline,
    Electrosurgical,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Motion,
        ArtifactKind::ElectrodePop,
        ArtifactKind::MuscleNoise,
        ArtifactKind::BaselineWander,
        ArtifactKind::Powerline,
        ArtifactKind::Electrosurgical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::Motion => "motion",
            ArtifactKind::ElectrodePop => "electrode_pops",
            ArtifactKind::MuscleNoise => "muscle_noise",
            ArtifactKind::BaselineWander => "baseline_wander",
            ArtifactKind::Powerline => "powerline",
            ArtifactKind::Electrosurgical => "electrosurgical",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contiguous flagged range, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSegment {
    pub kind: ArtifactKind,
    pub start: usize,
    pub end: usize,
    /// Mean |amplitude| (motion, pops) or mean RMS (muscle) over the range
    pub severity: f64,
}

impl ArtifactSegment {
    pub fn sample_count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionArtifacts {
    pub indices: Vec<usize>,
    pub segments: Vec<ArtifactSegment>,
    pub count: usize,
    pub total_duration_secs: f64,
    pub amplitude_mean: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectrodePops {
    /// First-difference positions of kept spikes
    pub indices: Vec<usize>,
    /// One two-sample segment per spike
    pub segments: Vec<ArtifactSegment>,
    pub count: usize,
    pub amplitude_mean: f64,
    pub rate_per_minute: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuscleNoise {
    pub indices: Vec<usize>,
    pub segments: Vec<ArtifactSegment>,
    pub count: usize,
    pub total_duration_secs: f64,
    pub rms_mean: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineWander {
    /// Peak-to-peak amplitude of the lowpassed baseline
    pub amplitude: f64,
    pub excessive: bool,
    pub dominant_frequency_hz: f64,
    pub dominant_power: f64,
    /// Baseline PSD summed at or below the cutoff
    pub low_band_power: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerlineLine {
    pub frequency_hz: f64,
    pub power: f64,
    pub ratio: f64,
    pub interference: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerlineInterference {
    pub lines: Vec<PowerlineLine>,
}

impl PowerlineInterference {
    pub fn interfering_lines(&self) -> usize {
        self.lines.iter().filter(|l| l.interference).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Electrosurgical {
    pub power: f64,
    pub ratio: f64,
    pub flagged: bool,
}

/// Output of a single detector
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactFinding {
    Motion(MotionArtifacts),
    ElectrodePop(ElectrodePops),
    MuscleNoise(MuscleNoise),
    BaselineWander(BaselineWander),
    Powerline(PowerlineInterference),
    Electrosurgical(Electrosurgical),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    /// Flagged motion, pop and muscle samples
    pub total_artifacts: usize,
    pub artifact_duration_secs: f64,
    /// Share of the recording free of flagged samples (0-100)
    pub signal_quality_percentage: f64,
    /// Highest non-zero scoring kind; `None` when nothing scored
    pub primary_artifact: Option<ArtifactKind>,
    pub scores: Vec<(ArtifactKind, f64)>,
}

impl ArtifactSummary {
    /// Primary artifact name, or `"NONE"`
    pub fn primary_label(&self) -> &'static str {
        self.primary_artifact.map(|k| k.name()).unwrap_or("NONE")
    }
}

/// Combined findings of all six detectors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub motion: MotionArtifacts,
    pub electrode_pops: ElectrodePops,
    pub muscle_noise: MuscleNoise,
    pub baseline_wander: BaselineWander,
    pub powerline: PowerlineInterference,
    pub electrosurgical: Electrosurgical,
    pub summary: ArtifactSummary,
}

impl ArtifactReport {
    pub(crate) fn absorb(&mut self, finding: ArtifactFinding) {
        match finding {
            ArtifactFinding::Motion(m) => self.motion = m,
            ArtifactFinding::ElectrodePop(p) => self.electrode_pops = p,
            ArtifactFinding::MuscleNoise(m) => self.muscle_noise = m,
            ArtifactFinding::BaselineWander(w) => self.baseline_wander = w,
            ArtifactFinding::Powerline(p) => self.powerline = p,
            ArtifactFinding::Electrosurgical(e) => self.electrosurgical = e,
        }
    }

    /// Ranking score of one kind
    pub fn score(&self, kind: ArtifactKind, weights: &ScoreWeights) -> f64 {
        match kind {
            ArtifactKind::Motion => {
                self.motion.count as f64 * weights.motion_per_segment
                    + self.motion.total_duration_secs * weights.motion_per_second
            }
            ArtifactKind::ElectrodePop => self.electrode_pops.count as f64 * weights.pop_per_event,
            ArtifactKind::MuscleNoise => {
                self.muscle_noise.total_duration_secs * weights.muscle_per_second
            }
            ArtifactKind::BaselineWander => {
                if self.baseline_wander.excessive {
                    self.baseline_wander.amplitude * weights.wander_per_unit
                } else {
                    0.0
                }
            }
            ArtifactKind::Powerline => {
                self.powerline.interfering_lines() as f64 * weights.powerline_per_line
            }
            ArtifactKind::Electrosurgical => {
                if self.electrosurgical.flagged {
                    weights.electrosurgical
                } else {
                    0.0
                }
            }
        }
    }

    /// All located segments (motion, pops, muscle) ordered by start
    pub fn segments(&self) -> Vec<ArtifactSegment> {
        let mut all: Vec<ArtifactSegment> = self
            .motion
            .segments
            .iter()
            .chain(self.electrode_pops.segments.iter())
            .chain(self.muscle_noise.segments.iter())
            .copied()
            .collect();
        all.sort_by_key(|s| (s.start, s.end));
        all
    }

    /// Segments of one kind
    pub fn segments_of(&self, kind: ArtifactKind) -> Vec<ArtifactSegment> {
        self.segments().into_iter().filter(|s| s.kind == kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_dispatch() {
        let weights = ScoreWeights::default();
        let mut report = ArtifactReport::default();
        report.motion.count = 2;
        report.motion.total_duration_secs = 1.0;
        report.electrode_pops.count = 1;
        report.baseline_wander.amplitude = 1.0;
        assert_eq!(report.score(ArtifactKind::Motion, &weights), 25.0);
        assert_eq!(report.score(ArtifactKind::ElectrodePop, &weights), 15.0);
        // Wander only counts when excessive
        assert_eq!(report.score(ArtifactKind::BaselineWander, &weights), 0.0);
        report.baseline_wander.excessive = true;
        assert_eq!(report.score(ArtifactKind::BaselineWander, &weights), 20.0);
    }

    #[test]
    fn test_primary_label() {
        let mut summary = ArtifactSummary::default();
        assert_eq!(summary.primary_label(), "NONE");
        summary.primary_artifact = Some(ArtifactKind::MuscleNoise);
        assert_eq!(summary.primary_label(), "muscle_noise");
    }

    #[test]
    fn test_segment_contains() {
        let seg = ArtifactSegment {
            kind: ArtifactKind::Motion,
            start: 10,
            end: 20,
            severity: 1.0,
        };
        assert_eq!(seg.sample_count(), 11);
        assert!(seg.contains(10) && seg.contains(20) && !seg.contains(21));
    }

    #[test]
    fn test_report_serializes() {
        let mut report = ArtifactReport::default();
        report.summary.primary_artifact = Some(ArtifactKind::ElectrodePop);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"primary_artifact\":\"electrode_pop\""));
    }
}
