//! Beat-shape regularity and complexity features

use crate::entropy::multiscale_entropy;
use crate::histogram::Histogram;
use beat_detector::TemplateSet;
use signal_core::{median, stats};

const FRACTAL_MIN_LEN: usize = 100;
const FRACTAL_MAX_EXPONENT: u32 = 7;
const LOCAL_WINDOW: usize = 20;
const LOCAL_MIN_LEN: usize = 50;
const RECURRENCE_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformFeatures {
    /// Correlation of the canonical beat's halves, one mirrored
    pub symmetry: f64,
    /// Normalized Lempel-Ziv complexity of the median-binarized signal
    pub complexity: f64,
    /// Mean pairwise template correlation
    pub regularity: f64,
    pub fractal_dimension: f64,
    /// Mean standard deviation over short windows
    pub local_lyapunov: f64,
    /// Recurrence period density entropy
    pub recurrence_entropy: f64,
    /// Sample entropy of the coarse-grained signal, scale 1 first
    pub multiscale_entropy: Vec<f64>,
}

impl WaveformFeatures {
    /// Symmetry and regularity need usable templates and are zero otherwise
    pub fn compute(
        values: &[f64],
        templates: &TemplateSet,
        templates_usable: bool,
        max_scale: usize,
    ) -> Self {
        Self {
            symmetry: if templates_usable {
                symmetry(&templates.canonical)
            } else {
                0.0
            },
            complexity: lempel_ziv_complexity(values),
            regularity: if templates_usable {
                regularity(&templates.templates)
            } else {
                0.0
            },
            fractal_dimension: box_counting_dimension(values),
            local_lyapunov: local_variability(values),
            recurrence_entropy: recurrence_period_entropy(values),
            multiscale_entropy: multiscale_entropy(values, max_scale),
        }
    }

    /// Zeroed features for a recording without usable beats
    pub fn degenerate(max_scale: usize) -> Self {
        Self {
            multiscale_entropy: vec![0.0; max_scale],
            ..Default::default()
        }
    }

    pub fn entries(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = [
            ("waveform_symmetry", self.symmetry),
            ("waveform_complexity", self.complexity),
            ("waveform_regularity", self.regularity),
            ("waveform_fractal_dim", self.fractal_dimension),
            ("waveform_lyapunov", self.local_lyapunov),
            ("waveform_recurrence", self.recurrence_entropy),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
        entries.extend(
            self.multiscale_entropy
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("waveform_mse_scale{}", i + 1), *v)),
        );
        entries
    }
}

/// Left half of the beat against the reversed right half
pub fn symmetry(beat: &[f64]) -> f64 {
    let centre = beat.len() / 2;
    let (left, right) = beat.split_at(centre);
    let len = left.len().min(right.len());
    if len < 2 {
        return 0.0;
    }
    let left = &left[left.len() - len..];
    let mirrored: Vec<f64> = right.iter().rev().take(len).copied().collect();
    stats::pearson(left, &mirrored)
}

/// Kaspar-Schuster Lempel-Ziv complexity, normalized by log2(n) / n
pub fn lempel_ziv_complexity(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let threshold = median(values);
    let seq: Vec<bool> = values.iter().map(|v| *v > threshold).collect();
    if seq.iter().all(|b| *b == seq[0]) {
        return 0.0;
    }

    let (mut c, mut l, mut i, mut k, mut k_max) = (1usize, 1usize, 0usize, 1usize, 1usize);
    loop {
        if seq[i + k - 1] == seq[l + k - 1] {
            k += 1;
            if l + k > n {
                c += 1;
                break;
            }
        } else {
            k_max = k_max.max(k);
            i += 1;
            if i == l {
                c += 1;
                l += k_max;
                if l + 1 > n {
                    break;
                }
                i = 0;
                k = 1;
                k_max = 1;
            } else {
                k = 1;
            }
        }
    }
    c as f64 * (n as f64).log2() / n as f64
}

/// Mean pairwise correlation between beat templates
pub fn regularity(templates: &[Vec<f64>]) -> f64 {
    if templates.len() < 2 {
        return 0.0;
    }
    let mut correlations = Vec::new();
    for (i, a) in templates.iter().enumerate() {
        for b in &templates[i + 1..] {
            correlations.push(stats::pearson(a, b));
        }
    }
    stats::mean(&correlations)
}

/// Box-counting dimension over box sizes 2..=128 samples
///
/// Returns 1.0 for short or flat inputs.
pub fn box_counting_dimension(values: &[f64]) -> f64 {
    let n = values.len();
    if n < FRACTAL_MIN_LEN {
        return 1.0;
    }
    let lo = stats::min(values);
    let span = stats::max(values) - lo + 1e-10;
    let normalized: Vec<f64> = values.iter().map(|v| (v - lo) / span).collect();

    let mut log_sizes = Vec::new();
    let mut log_counts = Vec::new();
    for exponent in 1..=FRACTAL_MAX_EXPONENT {
        let size = 1usize << exponent;
        if size >= n / 2 {
            break;
        }
        let boxes = n / size;
        let count: f64 = normalized
            .chunks_exact(size)
            .take(boxes)
            .map(|chunk| {
                let extent = stats::max(chunk) - stats::min(chunk);
                (extent * boxes as f64 / size as f64).ceil()
            })
            .sum();
        if count > 0.0 {
            log_sizes.push(size as f64);
            log_counts.push(count);
        }
    }
    if log_sizes.len() < 2 {
        return 1.0;
    }
    let log_sizes: Vec<f64> = log_sizes.iter().map(|s| s.log2()).collect();
    let log_counts: Vec<f64> = log_counts.iter().map(|c| c.log2()).collect();
    -stats::linear_fit(&log_sizes, &log_counts).0
}

/// Mean standard deviation over consecutive 20-sample windows
pub fn local_variability(values: &[f64]) -> f64 {
    let n = values.len();
    if n < LOCAL_MIN_LEN {
        return 0.0;
    }
    let window = LOCAL_WINDOW.min(n / 4);
    let stds: Vec<f64> = (0..n - window)
        .step_by(window)
        .map(|start| stats::std_dev(&values[start..start + window]))
        .collect();
    stats::mean(&stds)
}

/// Entropy of first-return times within 0.1 std
pub fn recurrence_period_entropy(values: &[f64]) -> f64 {
    let threshold = RECURRENCE_TOLERANCE * stats::std_dev(values);
    let returns: Vec<f64> = values
        .iter()
        .enumerate()
        .filter_map(|(i, a)| {
            values[i + 1..]
                .iter()
                .position(|b| (a - b).abs() < threshold)
                .map(|offset| (offset + 1) as f64)
        })
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    Histogram::auto(&returns)
        .density
        .iter()
        .filter(|d| **d > 0.0)
        .map(|d| -d * d.ln())
        .sum()
}
