//! ECG Analysis Pipeline - demo entry point
//!
//! Analyzes a synthetic recording and prints the analysis as JSON.
//! Settings come from the file named by the first argument, if any, and
//! `ECG__*` environment variables.

use ecg_pipeline::{init_logging, EcgPipeline, PipelineConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use signal_core::synthetic;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(path.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== ECG Analysis Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let mut rng = StdRng::seed_from_u64(config.augmentation.seed);
    let recording = synthetic::sample_ecg(500, 10.0, &mut rng)?;
    let pipeline = EcgPipeline::new(config);
    let analysis = pipeline.analyze(&recording)?;

    info!(
        "{} beats, heart rate {:?} bpm, quality {} ({:.1}), {} features",
        analysis.beats.len(),
        analysis.heart_rate_bpm(),
        analysis.quality.category,
        analysis.quality.overall_score,
        analysis.features.len()
    );
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
