//! Feature export errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Binary encoding failed: {0}")]
    Encode(#[from] postcard::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeatureError>;
