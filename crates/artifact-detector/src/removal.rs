//! Artifact suppression driven by a detection report

use crate::config::RemovalConfig;
use crate::report::ArtifactReport;
use signal_core::{median, samples_for_ms, ButterworthFilter, FilterBand, Result, Signal};
use tracing::debug;

/// Suppress the artifacts listed in `report`
///
/// Motion samples are replaced in order by the median of the surrounding
/// window (earlier replacements feed later medians), interior pop samples by
/// the mean of their neighbours, and excessive wander is highpassed away.
pub fn remove_artifacts(
    signal: &Signal,
    report: &ArtifactReport,
    config: &RemovalConfig,
) -> Result<Signal> {
    let mut cleaned = signal.finite_samples();
    let n = cleaned.len();

    let half = samples_for_ms(signal.sampling_rate_hz(), config.motion_window_ms) / 2;
    for &idx in &report.motion.indices {
        if idx >= n {
            continue;
        }
        let start = idx.saturating_sub(half);
        let end = (idx + half).min(n);
        if end > start {
            cleaned[idx] = median(&cleaned[start..end]);
        }
    }

    for &idx in &report.electrode_pops.indices {
        if idx > 0 && idx + 1 < n {
            cleaned[idx] = (cleaned[idx - 1] + cleaned[idx + 1]) / 2.0;
        }
    }

    if report.baseline_wander.excessive {
        let filter = ButterworthFilter::design(
            config.wander_highpass_order,
            FilterBand::Highpass(config.wander_highpass_hz),
            signal.fs(),
        )?;
        cleaned = filter.filtfilt(&cleaned)?;
    }

    debug!(
        "Removed artifacts: {} motion samples, {} pops, wander filtered: {}",
        report.motion.indices.len(),
        report.electrode_pops.indices.len(),
        report.baseline_wander.excessive
    );
    signal.with_samples(cleaned)
}
