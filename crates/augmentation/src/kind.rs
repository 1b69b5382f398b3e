//! Augmentation method names

use crate::error::AugmentationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Additive noise flavours for noise injection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// White noise at 10 % of the signal RMS (full intensity)
    #[default]
    Gaussian,
    /// 1/(1+|f|) shaped noise at 20 % of the signal RMS
    Colored,
    /// Hann-shaped 10 ms spikes, up to ten
    Impulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentationKind {
    NoiseInjection(NoiseKind),
    TimeWarping,
    AmplitudeScaling,
    TimeShift,
    FrequencyWarping,
    BaselineWander,
    PowerlineNoise,
    ElectrodeMotion,
    MuscleArtifact,
    SignalDropout,
    BeatPerturbation,
    LeadMixing,
    StSegmentShift,
    TWaveAlteration,
}

impl AugmentationKind {
    /// Every transform once, noise injection as Gaussian
    pub const ALL: [AugmentationKind; 14] = [
        AugmentationKind::NoiseInjection(NoiseKind::Gaussian),
        AugmentationKind::TimeWarping,
        AugmentationKind::AmplitudeScaling,
        AugmentationKind::TimeShift,
        AugmentationKind::FrequencyWarping,
        AugmentationKind::BaselineWander,
        AugmentationKind::PowerlineNoise,
        AugmentationKind::ElectrodeMotion,
        AugmentationKind::MuscleArtifact,
        AugmentationKind::SignalDropout,
        AugmentationKind::BeatPerturbation,
        AugmentationKind::LeadMixing,
        AugmentationKind::StSegmentShift,
        AugmentationKind::TWaveAlteration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AugmentationKind::NoiseInjection(NoiseKind::Gaussian) => "noise_injection",
            AugmentationKind::NoiseInjection(NoiseKind::Colored) => "colored_noise",
            AugmentationKind::NoiseInjection(NoiseKind::Impulse) => "impulse_noise",
            AugmentationKind::TimeWarping => "time_warping",
            AugmentationKind::AmplitudeScaling => "amplitude_scaling",
            AugmentationKind::TimeShift => "time_shift",
            AugmentationKind::FrequencyWarping => "frequency_warping",
            AugmentationKind::BaselineWander => "baseline_wander",
            AugmentationKind::PowerlineNoise => "powerline_noise",
            AugmentationKind::ElectrodeMotion => "electrode_motion",
            AugmentationKind::MuscleArtifact => "muscle_artifact",
            AugmentationKind::SignalDropout => "signal_dropout",
            AugmentationKind::BeatPerturbation => "beat_perturbation",
            AugmentationKind::LeadMixing => "lead_mixing",
            AugmentationKind::StSegmentShift => "st_segment_shift",
            AugmentationKind::TWaveAlteration => "t_wave_alteration",
        }
    }

    /// Parse a list of method names, failing on the first unknown one
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, AugmentationError> {
        names.iter().map(|name| name.as_ref().parse()).collect()
    }
}

impl FromStr for AugmentationKind {
    type Err = AugmentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim() {
            "noise_injection" | "gaussian_noise" => {
                AugmentationKind::NoiseInjection(NoiseKind::Gaussian)
            }
            "colored_noise" => AugmentationKind::NoiseInjection(NoiseKind::Colored),
            "impulse_noise" => AugmentationKind::NoiseInjection(NoiseKind::Impulse),
            "time_warping" => AugmentationKind::TimeWarping,
            "amplitude_scaling" => AugmentationKind::AmplitudeScaling,
            "time_shift" => AugmentationKind::TimeShift,
            "frequency_warping" => AugmentationKind::FrequencyWarping,
            "baseline_wander" => AugmentationKind::BaselineWander,
            "powerline_noise" => AugmentationKind::PowerlineNoise,
            "electrode_motion" => AugmentationKind::ElectrodeMotion,
            "muscle_artifact" => AugmentationKind::MuscleArtifact,
            "signal_dropout" => AugmentationKind::SignalDropout,
            "beat_perturbation" => AugmentationKind::BeatPerturbation,
            "lead_mixing" => AugmentationKind::LeadMixing,
            "st_segment_shift" => AugmentationKind::StSegmentShift,
            "t_wave_alteration" => AugmentationKind::TWaveAlteration,
            other => return Err(AugmentationError::UnknownMethod(other.to_string())),
        };
        Ok(kind)
    }
}

impl fmt::Display for AugmentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for kind in AugmentationKind::ALL {
            assert_eq!(kind.name().parse::<AugmentationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_noise_aliases() {
        assert_eq!(
            "gaussian_noise".parse::<AugmentationKind>().unwrap(),
            AugmentationKind::NoiseInjection(NoiseKind::Gaussian)
        );
        assert_eq!(
            "impulse_noise".parse::<AugmentationKind>().unwrap().name(),
            "impulse_noise"
        );
    }

    #[test]
    fn test_unknown_name() {
        let err = AugmentationKind::parse_all(&["time_shift", "warp_drive"]).unwrap_err();
        assert_eq!(err, AugmentationError::UnknownMethod("warp_drive".to_string()));
    }
}
