//! Running median filter
//!
//! Matches the classic `medfilt` behaviour: odd kernel, centred window,
//! zero padding beyond both ends.

/// Median-filter `input` with an odd `kernel` (even kernels are widened by one)
pub fn medfilt(input: &[f64], kernel: usize) -> Vec<f64> {
    let n = input.len();
    if n == 0 {
        return Vec::new();
    }
    let kernel = if kernel % 2 == 0 { kernel + 1 } else { kernel };
    if kernel == 1 {
        return input.to_vec();
    }
    let half = kernel / 2;
    let at = |i: isize| -> f64 {
        if i < 0 || i as usize >= n {
            0.0
        } else {
            input[i as usize]
        }
    };

    // Sorted copy of the current window, updated by one removal and one
    // insertion per step
    let mut window: Vec<f64> = (-(half as isize)..=half as isize).map(at).collect();
    window.sort_by(|a, b| a.total_cmp(b));

    let mut output = Vec::with_capacity(n);
    for i in 0..n {
        output.push(window[half]);
        if i + 1 == n {
            break;
        }
        let leaving = at(i as isize - half as isize);
        let entering = at(i as isize + half as isize + 1);
        if let Ok(pos) = window.binary_search_by(|probe| probe.total_cmp(&leaving)) {
            window.remove(pos);
        }
        let pos = window.partition_point(|probe| probe.total_cmp(&entering).is_lt());
        window.insert(pos, entering);
    }
    output
}

/// Median of a slice (mean of the middle pair for even lengths)
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn naive_medfilt(input: &[f64], kernel: usize) -> Vec<f64> {
        let half = kernel as isize / 2;
        (0..input.len() as isize)
            .map(|i| {
                let mut window: Vec<f64> = (i - half..=i + half)
                    .map(|j| {
                        if j < 0 || j as usize >= input.len() {
                            0.0
                        } else {
                            input[j as usize]
                        }
                    })
                    .collect();
                window.sort_by(|a, b| a.partial_cmp(b).unwrap());
                window[kernel / 2]
            })
            .collect()
    }

    #[test]
    fn test_medfilt_removes_spike() {
        let input = [10.0, 11.0, 10.0, 100.0, 10.0, 11.0, 10.0];
        let output = medfilt(&input, 3);
        assert!(output[3] < 20.0);
        assert!((output[3] - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_medfilt_zero_padded_edges() {
        let output = medfilt(&[5.0, 5.0, 5.0], 3);
        // First window is [0, 5, 5]
        assert_eq!(output, vec![5.0, 5.0, 5.0]);
        let output = medfilt(&[5.0, 5.0, 5.0], 5);
        assert_eq!(output, vec![0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_even_kernel_widened() {
        assert_eq!(medfilt(&[1.0, 2.0, 3.0, 4.0], 2), medfilt(&[1.0, 2.0, 3.0, 4.0], 3));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    proptest! {
        #[test]
        fn prop_matches_naive(
            input in proptest::collection::vec(-100.0f64..100.0, 1..120),
            half in 0usize..8,
        ) {
            let kernel = 2 * half + 1;
            prop_assert_eq!(medfilt(&input, kernel), naive_medfilt(&input, kernel));
        }
    }
}
