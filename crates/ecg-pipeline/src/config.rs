//! Layered pipeline configuration

use crate::error::Result;
use crate::logging::LoggingConfig;
use artifact_detector::ArtifactConfig;
use augmentation::AugmentationConfig;
use beat_detector::BeatDetectorConfig;
use config::{Config, Environment, File, Map};
use feature_engine::FeatureConfig;
use serde::{Deserialize, Serialize};
use signal_core::PreprocessConfig;
use signal_quality::QualityConfig;
use std::path::Path;
use tracing::debug;

/// Environment prefix; `ECG__QUALITY__THRESHOLDS__MIN_SNR_DB=25` sets
/// `quality.thresholds.min_snr_db`
pub const ENV_PREFIX: &str = "ECG";
const ENV_SEPARATOR: &str = "__";

/// Settings for every stage of the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub logging: LoggingConfig,
    pub preprocess: PreprocessConfig,
    pub beats: BeatDetectorConfig,
    pub artifacts: ArtifactConfig,
    pub quality: QualityConfig,
    pub features: FeatureConfig,
    pub augmentation: AugmentationConfig,
}

impl PipelineConfig {
    /// Defaults, overlaid by `path` (format from its extension), then by
    /// `ECG__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_sources(path, None)
    }

    /// As [`load`](Self::load), reading variables from `env` instead of the
    /// process environment when given
    pub fn from_sources(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        );
        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::fs;

    fn env(vars: &[(&str, &str)]) -> Map<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = PipelineConfig::from_sources(None, Some(Map::new())).unwrap();
        assert_eq!(config.quality.thresholds.min_snr_db, 20.0);
        assert_eq!(config.beats.refractory_ms, 300.0);
        assert_eq!(config.augmentation.seed, 42);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides_nested_fields() {
        let vars = env(&[
            ("ECG__QUALITY__THRESHOLDS__MIN_SNR_DB", "25"),
            ("ECG__BEATS__REFRACTORY_MS", "250.5"),
            ("ECG__FEATURES__SEED", "7"),
            ("ECG__LOGGING__JSON", "true"),
            ("UNRELATED", "1"),
        ]);
        let config = PipelineConfig::from_sources(None, Some(vars)).unwrap();
        assert_eq!(config.quality.thresholds.min_snr_db, 25.0);
        assert_eq!(config.beats.refractory_ms, 250.5);
        assert_eq!(config.features.seed, 7);
        assert!(config.logging.json);
        // Untouched siblings keep their defaults
        assert_eq!(config.quality.thresholds.max_baseline_wander, 0.1);
    }

    #[test]
    fn test_file_then_env() {
        let path = std::env::temp_dir().join(format!("ecg-pipeline-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[preprocess]\nhigh_cutoff_hz = 35.0\n\n[augmentation]\nseed = 11\n",
        )
        .unwrap();

        let vars = env(&[("ECG__AUGMENTATION__SEED", "12")]);
        let config = PipelineConfig::from_sources(Some(&path), Some(vars));
        fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.preprocess.high_cutoff_hz, 35.0);
        assert_eq!(config.preprocess.low_cutoff_hz, 0.5);
        assert_eq!(config.augmentation.seed, 12);
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = std::env::temp_dir().join("ecg-pipeline-does-not-exist.toml");
        let err = PipelineConfig::from_sources(Some(&path), Some(Map::new())).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
