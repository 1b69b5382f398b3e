//! Augmentation Error Types

use signal_core::EcgError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AugmentationError {
    /// Name does not match any known transform
    #[error("Unknown augmentation method: {0}")]
    UnknownMethod(String),

    #[error(transparent)]
    Signal(#[from] EcgError),
}

pub type Result<T> = std::result::Result<T, AugmentationError>;
