//! ECG Signal Core
//!
//! Signal container, Butterworth filtering, median filtering, spectral
//! estimation, descriptive statistics and the preprocessing stage shared by
//! every downstream analyzer.

pub mod butterworth;
mod error;
pub mod median;
mod preprocess;
mod signal;
pub mod spectrum;
pub mod stats;
pub mod synthetic;

pub use butterworth::{filtfilt, ButterworthFilter, FilterBand};
pub use error::{EcgError, Result};
pub use median::{medfilt, median};
pub use preprocess::{clamp_below_nyquist, PreprocessConfig, SignalPreprocessor};
pub use signal::{samples_for_ms, Signal};
pub use spectrum::{welch, PowerSpectrum, SpectrumAnalyzer};
pub use stats::Moments;
