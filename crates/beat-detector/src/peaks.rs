//! Local-maximum search with height and spacing constraints

/// Indices of strict local maxima; flat tops resolve to their midpoint
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }
    let mut i = 1;
    while i < n - 1 {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Local maxima at or above `min_height`, at least `min_distance` samples
/// apart. A candidate closer than `min_distance` to the last accepted peak
/// is dropped, so the earliest peak of a cluster wins.
pub fn find_peaks(values: &[f64], min_height: Option<f64>, min_distance: usize) -> Vec<usize> {
    let mut accepted: Vec<usize> = Vec::new();
    for idx in local_maxima(values) {
        if let Some(height) = min_height {
            if values[idx] < height {
                continue;
            }
        }
        match accepted.last() {
            Some(&last) if idx - last < min_distance => {}
            _ => accepted.push(idx),
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_simple_maxima() {
        let values = [0.0, 1.0, 0.0, 2.0, 0.0];
        assert_eq!(local_maxima(&values), vec![1, 3]);
    }

    #[test]
    fn test_plateau_midpoint() {
        let values = [0.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(local_maxima(&values), vec![2]);
        // Plateau running into the end is not a peak
        let values = [0.0, 1.0, 1.0];
        assert!(local_maxima(&values).is_empty());
    }

    #[test]
    fn test_height_filter() {
        let values = [0.0, 0.2, 0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&values, Some(0.5), 1), vec![3]);
    }

    #[test]
    fn test_distance_keeps_earliest() {
        let values = [0.0, 1.0, 0.0, 3.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        assert_eq!(find_peaks(&values, None, 3), vec![1, 7]);
    }

    #[test]
    fn test_flat_signal_has_no_peaks() {
        assert!(find_peaks(&[0.0; 100], Some(0.0), 10).is_empty());
    }

    proptest! {
        #[test]
        fn prop_peaks_respect_spacing(
            values in proptest::collection::vec(-10.0f64..10.0, 0..300),
            distance in 1usize..40,
        ) {
            let peaks = find_peaks(&values, None, distance);
            for pair in peaks.windows(2) {
                prop_assert!(pair[1] - pair[0] >= distance);
            }
        }
    }
}
