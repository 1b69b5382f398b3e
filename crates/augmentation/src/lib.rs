//! ECG Data Augmentation
//!
//! Fourteen seeded signal transforms for growing ML training sets, a
//! validator that scores how much of the source ECG an augmented copy keeps,
//! and parallel dataset generation.

pub mod config;
mod engine;
mod error;
mod kind;
pub mod spline;
pub mod transforms;
mod validation;

pub use config::{AugmentationConfig, ValidationConfig};
pub use engine::AugmentationEngine;
pub use error::{AugmentationError, Result};
pub use kind::{AugmentationKind, NoiseKind};
pub use spline::NaturalCubicSpline;
pub use validation::{validate, ValidationReport};
