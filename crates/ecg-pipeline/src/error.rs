//! Pipeline error types

use augmentation::AugmentationError;
use signal_core::EcgError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Signal(#[from] EcgError),

    #[error(transparent)]
    Augmentation(#[from] AugmentationError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
