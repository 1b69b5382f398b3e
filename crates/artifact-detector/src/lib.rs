//! ECG Artifact Detection
//!
//! Detects motion, electrode pops, muscle noise, baseline wander, powerline
//! interference and electrosurgical noise, ranks them, and removes the ones
//! that can be repaired in place.

pub mod config;
mod detector;
mod removal;
mod report;

pub use config::ArtifactConfig;
pub use detector::{group_consecutive, ArtifactDetector};
pub use removal::remove_artifacts;
pub use report::{
    ArtifactFinding, ArtifactKind, ArtifactReport, ArtifactSegment, ArtifactSummary,
    BaselineWander, ElectrodePops, Electrosurgical, MotionArtifacts, MuscleNoise,
    PowerlineInterference, PowerlineLine,
};

use signal_core::{Result, Signal};

impl ArtifactDetector {
    /// Remove artifacts using this detector's removal settings
    pub fn remove(&self, signal: &Signal, report: &ArtifactReport) -> Result<Signal> {
        remove_artifacts(signal, report, &self.config().removal)
    }
}
