//! Nonlinear dynamics estimators
//!
//! The Lyapunov, correlation-dimension and recurrence measures are cheap
//! proxies over a scalar series, not embedding-optimized estimators.

use crate::entropy::default_sample_entropy;
use rand::seq::index;
use rand::Rng;
use signal_core::stats;

const DFA_SCALES: usize = 20;
const DFA_MIN_SCALE: f64 = 4.0;
const HURST_MIN_WINDOW: usize = 10;
const LLE_MIN_LEN: usize = 100;
const LLE_MIN_POINTS: usize = 10;
const LLE_DELAY: usize = 10;
const LLE_DIMENSION: usize = 3;
const LLE_EPSILON: f64 = 1e-10;
const CORR_DIM_MIN_LEN: usize = 50;
const CORR_DIM_SAMPLES: usize = 100;
const CORR_DIM_RADII: usize = 20;
const RQA_TOLERANCE: f64 = 0.2;

/// Recurrence quantification measures
///
/// Only the recurrence rate is estimated. The line-based measures keep their
/// slots in the feature vector and are always 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RqaMeasures {
    pub recurrence_rate: f64,
    pub determinism: f64,
    pub laminarity: f64,
    pub trapping_time: f64,
    pub entropy: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NonlinearFeatures {
    pub sample_entropy: f64,
    pub approximate_entropy: f64,
    pub dfa_alpha1: f64,
    pub dfa_alpha2: f64,
    pub hurst: f64,
    pub lyapunov: f64,
    pub correlation_dimension: f64,
    pub rqa: RqaMeasures,
}

impl NonlinearFeatures {
    pub fn compute<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> Self {
        let sample_entropy = default_sample_entropy(values);
        let (dfa_alpha1, dfa_alpha2) = dfa(values);
        Self {
            sample_entropy,
            // Approximate entropy shares the sample-entropy estimator
            approximate_entropy: sample_entropy,
            dfa_alpha1,
            dfa_alpha2,
            hurst: hurst_exponent(values),
            lyapunov: largest_lyapunov(values),
            correlation_dimension: correlation_dimension(values, rng),
            rqa: rqa(values),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("nonlinear_sampen", self.sample_entropy),
            ("nonlinear_apen", self.approximate_entropy),
            ("nonlinear_dfa_alpha1", self.dfa_alpha1),
            ("nonlinear_dfa_alpha2", self.dfa_alpha2),
            ("nonlinear_hurst", self.hurst),
            ("nonlinear_lle", self.lyapunov),
            ("nonlinear_corr_dim", self.correlation_dimension),
            ("nonlinear_rqa_recurrence_rate", self.rqa.recurrence_rate),
            ("nonlinear_rqa_determinism", self.rqa.determinism),
            ("nonlinear_rqa_laminarity", self.rqa.laminarity),
            ("nonlinear_rqa_trapping_time", self.rqa.trapping_time),
            ("nonlinear_rqa_entropy", self.rqa.entropy),
        ]
    }
}

/// Detrended fluctuation analysis, returning short- and long-range exponents
///
/// Fluctuations are computed on 20 log-spaced scales from 4 to n/4 and the
/// log-log fit is split at the midpoint.
pub fn dfa(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    let max_scale = n / 4;
    if (max_scale as f64) <= DFA_MIN_SCALE {
        return (0.0, 0.0);
    }

    let centre = stats::mean(values);
    let profile: Vec<f64> = values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v - centre;
            Some(*acc)
        })
        .collect();

    let scales: Vec<usize> = stats::logspace(
        DFA_MIN_SCALE.log10(),
        (max_scale as f64).log10(),
        DFA_SCALES,
    )
    .into_iter()
    .map(|s| s as usize)
    .filter(|&s| s < max_scale)
    .collect();

    let mut log_scales = Vec::with_capacity(scales.len());
    let mut log_fluct = Vec::with_capacity(scales.len());
    for &scale in &scales {
        let segments = n / scale;
        let x: Vec<f64> = (0..scale).map(|i| i as f64).collect();
        let f2: f64 = profile
            .chunks_exact(scale)
            .take(segments)
            .map(|segment| {
                let (slope, intercept) = stats::linear_fit(&x, segment);
                segment
                    .iter()
                    .zip(x.iter())
                    .map(|(y, xi)| (y - (slope * xi + intercept)).powi(2))
                    .sum::<f64>()
                    / scale as f64
            })
            .sum();
        let fluctuation = (f2 / segments as f64).sqrt();
        if fluctuation <= 0.0 {
            return (0.0, 0.0);
        }
        log_scales.push((scale as f64).log10());
        log_fluct.push(fluctuation.log10());
    }
    if log_scales.len() < 2 {
        return (0.0, 0.0);
    }

    let split = log_scales.len() / 2;
    let alpha1 = stats::linear_fit(&log_scales[..split], &log_fluct[..split]).0;
    let alpha2 = stats::linear_fit(&log_scales[split..], &log_fluct[split..]).0;
    (alpha1, alpha2)
}

/// Rescaled-range Hurst exponent over windows growing by 1.5x from 10
///
/// Returns 0.5 when fewer than two window sizes yield a valid R/S.
pub fn hurst_exponent(values: &[f64]) -> f64 {
    let n = values.len();
    let mut log_sizes = Vec::new();
    let mut log_rs = Vec::new();

    let mut size = HURST_MIN_WINDOW;
    while size < n {
        let segments = n / size;
        if segments < 2 {
            break;
        }
        let ratios: Vec<f64> = values
            .chunks_exact(size)
            .filter_map(|segment| {
                let centre = stats::mean(segment);
                let (mut cum, mut lo, mut hi) = (0.0, f64::INFINITY, f64::NEG_INFINITY);
                for v in segment {
                    cum += v - centre;
                    lo = lo.min(cum);
                    hi = hi.max(cum);
                }
                let sd = stats::std_dev(segment);
                (sd > 0.0).then(|| (hi - lo) / sd)
            })
            .collect();
        let mean_rs = stats::mean(&ratios);
        if !ratios.is_empty() && mean_rs > 0.0 {
            log_sizes.push((size as f64).log10());
            log_rs.push(mean_rs.log10());
        }
        size = (size as f64 * 1.5) as usize;
    }

    if log_sizes.len() < 2 {
        return 0.5;
    }
    stats::linear_fit(&log_sizes, &log_rs).0
}

/// Mean log distance between successive points of the delay embedding
///
/// Points are `(x[i], x[i + 10])` for `i < n - 20`; the third coordinate of
/// the nominal dimension-3 embedding is never formed.
pub fn largest_lyapunov(values: &[f64]) -> f64 {
    let n = values.len();
    if n < LLE_MIN_LEN {
        return 0.0;
    }
    let components = LLE_DIMENSION - 1;
    let points = n - components * LLE_DELAY;
    if points < LLE_MIN_POINTS {
        return 0.0;
    }
    let log_sum: f64 = (0..points - 1)
        .map(|i| {
            let dist = (0..components)
                .map(|d| {
                    let k = d * LLE_DELAY;
                    (values[i + 1 + k] - values[i + k]).powi(2)
                })
                .sum::<f64>()
                .sqrt();
            (dist + LLE_EPSILON).ln()
        })
        .sum();
    log_sum / (points - 1) as f64
}

/// Log-log slope of pair counts within radius over 100 sampled points
pub fn correlation_dimension<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> f64 {
    let n = values.len();
    if n < CORR_DIM_MIN_LEN {
        return 0.0;
    }
    let picks: Vec<f64> = index::sample(rng, n, CORR_DIM_SAMPLES.min(n))
        .into_iter()
        .map(|i| values[i])
        .collect();

    let mut distances = Vec::with_capacity(picks.len() * picks.len() / 2);
    for (i, a) in picks.iter().enumerate() {
        for b in &picks[i + 1..] {
            distances.push((a - b).abs());
        }
    }
    distances.sort_by(f64::total_cmp);

    let mut log_r = Vec::new();
    let mut log_c = Vec::new();
    for radius in stats::logspace(-3.0, 0.0, CORR_DIM_RADII) {
        let count = distances.partition_point(|d| *d < radius);
        if count > 0 {
            log_r.push(radius.log10());
            log_c.push((count as f64).log10());
        }
    }
    if log_r.len() < 2 {
        return 0.0;
    }
    stats::linear_fit(&log_r, &log_c).0
}

/// Recurrence rate over the whole series with tolerance 0.2 std
///
/// Counts pairs `(i, j)`, the line of identity included, whose distance is
/// strictly below the tolerance. The matrix is never materialized.
pub fn rqa(values: &[f64]) -> RqaMeasures {
    let n = values.len();
    if n < 2 {
        return RqaMeasures::default();
    }
    let threshold = RQA_TOLERANCE * stats::std_dev(values);

    // Symmetric: count above the diagonal and mirror
    let off_diagonal: usize = (0..n)
        .map(|i| {
            values[i + 1..]
                .iter()
                .filter(|v| (values[i] - *v).abs() < threshold)
                .count()
        })
        .sum();
    let diagonal = if threshold > 0.0 { n } else { 0 };

    RqaMeasures {
        recurrence_rate: (2 * off_diagonal + diagonal) as f64 / (n * n) as f64,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn white_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.random::<f64>() - 0.5).collect()
    }

    #[test]
    fn test_dfa_white_noise_near_half() {
        let (alpha1, alpha2) = dfa(&white_noise(4000, 1));
        assert!((alpha1 - 0.5).abs() < 0.2, "alpha1 = {}", alpha1);
        assert!((alpha2 - 0.5).abs() < 0.25, "alpha2 = {}", alpha2);
    }

    #[test]
    fn test_dfa_random_walk_steeper() {
        let walk: Vec<f64> = white_noise(4000, 2)
            .into_iter()
            .scan(0.0, |acc, v| {
                *acc += v;
                Some(*acc)
            })
            .collect();
        let (alpha1, _) = dfa(&walk);
        assert!(alpha1 > 1.2);
    }

    #[test]
    fn test_hurst_defaults() {
        assert_eq!(hurst_exponent(&[1.0; 15]), 0.5);
        let h = hurst_exponent(&white_noise(2000, 3));
        assert!(h > 0.3 && h < 0.8, "hurst = {}", h);
    }

    #[test]
    fn test_lyapunov_short_signal() {
        assert_eq!(largest_lyapunov(&[1.0; 50]), 0.0);
        // Constant series: every distance is zero
        assert_relative_eq!(largest_lyapunov(&[1.0; 200]), LLE_EPSILON.ln());
    }

    #[test]
    fn test_correlation_dimension_deterministic_for_seed() {
        let values = white_noise(1000, 4);
        let a = correlation_dimension(&values, &mut StdRng::seed_from_u64(9));
        let b = correlation_dimension(&values, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
        assert!(a > 0.0);
    }

    #[test]
    fn test_lyapunov_uses_two_coordinates() {
        // Alternating 0/1: each coordinate steps by 1 between neighbours
        let values: Vec<f64> = (0..120).map(|i| (i % 2) as f64).collect();
        assert_relative_eq!(
            largest_lyapunov(&values),
            (2f64.sqrt() + LLE_EPSILON).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rqa_periodic_rate_only() {
        let values: Vec<f64> = (0..400).map(|i| (i as f64 * 0.2).sin()).collect();
        let measures = rqa(&values);
        assert!(measures.recurrence_rate > 0.0 && measures.recurrence_rate < 1.0);
        assert_eq!(measures.determinism, 0.0);
        assert_eq!(measures.laminarity, 0.0);
        assert_eq!(measures.trapping_time, 0.0);
        assert_eq!(measures.entropy, 0.0);
    }

    #[test]
    fn test_rqa_rate_counts_identity_line() {
        // std 0.5, tolerance 0.1: only equal values recur
        let measures = rqa(&[0.0, 0.0, 1.0, 1.0]);
        assert_relative_eq!(measures.recurrence_rate, 0.5);
    }

    #[test]
    fn test_rqa_uses_whole_series() {
        // Tail differs from the leading 2000 samples, so truncation would show
        let mut values: Vec<f64> = (0..2000).map(|i| (i % 2) as f64).collect();
        values.extend((0..1000).map(|i| 0.5 + (i % 7) as f64 * 0.01));
        let full = rqa(&values).recurrence_rate;
        let head = rqa(&values[..2000]).recurrence_rate;
        assert!((full - head).abs() > 1e-3, "full {} head {}", full, head);

        let features = NonlinearFeatures::compute(&values, &mut StdRng::seed_from_u64(1));
        assert_eq!(features.rqa.recurrence_rate, full);
    }

    #[test]
    fn test_rqa_constant_series() {
        let measures = rqa(&[0.5; 100]);
        assert_eq!(measures, RqaMeasures::default());
    }
}
