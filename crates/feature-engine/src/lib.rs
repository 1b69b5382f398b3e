//! Feature Engineering Engine
//!
//! Temporal, spectral, statistical, morphological, nonlinear, RR-interval and
//! waveform features of a preprocessed ECG, assembled into an ordered vector
//! ready for ML export.

pub mod config;
pub mod entropy;
mod error;
mod features;
mod histogram;
pub mod interval;
pub mod morphology;
pub mod nonlinear;
pub mod spectral;
mod statistics;
mod temporal;
pub mod waveform;

pub use config::FeatureConfig;
pub use error::{FeatureError, Result};
pub use features::{DegenerateFlags, FeatureEntry, FeatureExtractor, FeatureGroup, FeatureVector};
pub use histogram::Histogram;
pub use interval::{classify_rhythm, IntervalFeatures, RhythmAssessment, RhythmClass};
pub use morphology::{Fiducials, MorphologyFeatures};
pub use nonlinear::{NonlinearFeatures, RqaMeasures};
pub use spectral::{BandPower, FrequencyBands, SpectralFeatures};
pub use statistics::StatisticalFeatures;
pub use temporal::TemporalFeatures;
pub use waveform::WaveformFeatures;
