//! Template-matching entropy estimators

use signal_core::stats;

/// Sample entropy with Chebyshev tolerance `r`, self-matches excluded
///
/// Returns 0.0 when either the `m` or the `m + 1` match count is zero.
pub fn sample_entropy(values: &[f64], m: usize, r: f64) -> f64 {
    let n = values.len();
    if m == 0 || n <= m + 1 {
        return 0.0;
    }
    let patterns_m = n - m + 1;
    let patterns_m1 = n - m;

    let mut matches_m = 0u64;
    let mut matches_m1 = 0u64;
    for i in 0..patterns_m {
        for j in (i + 1)..patterns_m {
            let within = (0..m).all(|k| (values[i + k] - values[j + k]).abs() <= r);
            if !within {
                continue;
            }
            matches_m += 1;
            if j < patterns_m1 && (values[i + m] - values[j + m]).abs() <= r {
                matches_m1 += 1;
            }
        }
    }
    if matches_m == 0 || matches_m1 == 0 {
        return 0.0;
    }

    // Ordered pairs normalized by the number of possible pairs at each length
    let phi_m = 2.0 * matches_m as f64 / (patterns_m as f64 * (patterns_m - 1) as f64);
    let phi_m1 = 2.0 * matches_m1 as f64 / (patterns_m1 as f64 * (patterns_m1 - 1) as f64);
    -(phi_m1 / phi_m).ln()
}

/// Sample entropy at the conventional `m = 2`, `r = 0.2 * std`
pub fn default_sample_entropy(values: &[f64]) -> f64 {
    sample_entropy(values, 2, 0.2 * stats::std_dev(values))
}

/// Non-overlapping window means of length `scale`
pub fn coarse_grain(values: &[f64], scale: usize) -> Vec<f64> {
    if scale == 0 {
        return Vec::new();
    }
    values
        .chunks_exact(scale)
        .map(|chunk| chunk.iter().sum::<f64>() / scale as f64)
        .collect()
}

/// Sample entropy of the coarse-grained series for scales `1..=max_scale`
///
/// Scales leaving fewer than 10 points report 0.0.
pub fn multiscale_entropy(values: &[f64], max_scale: usize) -> Vec<f64> {
    (1..=max_scale)
        .map(|scale| {
            let coarse = coarse_grain(values, scale);
            if coarse.len() < 10 {
                0.0
            } else {
                default_sample_entropy(&coarse)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_regular_lower_than_random() {
        let periodic: Vec<f64> = (0..600).map(|i| (i as f64 * 0.3).sin()).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let random: Vec<f64> = (0..600).map(|_| rng.random::<f64>()).collect();
        assert!(default_sample_entropy(&periodic) < default_sample_entropy(&random));
    }

    #[test]
    fn test_constant_series_is_zero() {
        assert_eq!(default_sample_entropy(&[1.0; 50]), 0.0);
    }

    #[test]
    fn test_short_series() {
        assert_eq!(sample_entropy(&[1.0, 2.0, 3.0], 2, 0.1), 0.0);
    }

    #[test]
    fn test_coarse_grain_drops_remainder() {
        assert_eq!(coarse_grain(&[1.0, 3.0, 5.0, 7.0, 9.0], 2), vec![2.0, 6.0]);
    }

    #[test]
    fn test_multiscale_short_scales_zero() {
        let values: Vec<f64> = (0..40).map(|i| (i as f64).sin()).collect();
        let mse = multiscale_entropy(&values, 5);
        assert_eq!(mse.len(), 5);
        // 40 / 5 = 8 points
        assert_eq!(mse[4], 0.0);
    }
}
