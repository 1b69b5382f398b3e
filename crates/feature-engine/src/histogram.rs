//! Density histogram with automatic bin selection

use signal_core::stats;

/// Equal-width histogram normalized to unit area
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    /// Bin edges, one more than `density`
    pub edges: Vec<f64>,
    pub density: Vec<f64>,
}

impl Histogram {
    /// Bin `values` using the smaller of the Sturges and Freedman-Diaconis
    /// widths (Sturges alone when the IQR is zero)
    pub fn auto(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let (mut first, mut last) = (stats::min(values), stats::max(values));
        if first == last {
            first -= 0.5;
            last += 0.5;
        }
        let span = last - first;
        let bins = auto_bin_count(values, span);

        let mut counts = vec![0usize; bins];
        for &v in values {
            let pos = ((v - first) / span * bins as f64).floor();
            let idx = (pos.max(0.0) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let width = span / bins as f64;
        let total = values.len() as f64;
        Self {
            edges: (0..=bins).map(|i| first + width * i as f64).collect(),
            density: counts.iter().map(|&c| c as f64 / (total * width)).collect(),
        }
    }

    pub fn bins(&self) -> usize {
        self.density.len()
    }

    /// Index of the tallest bin, first one on ties
    pub fn mode_bin(&self) -> Option<usize> {
        stats::argmax(&self.density)
    }
}

fn auto_bin_count(values: &[f64], span: f64) -> usize {
    let n = values.len() as f64;
    let data_span = stats::max(values) - stats::min(values);
    if data_span <= 0.0 {
        return 1;
    }
    let sturges = data_span / (n.log2() + 1.0);
    let iqr = stats::percentile(values, 75.0) - stats::percentile(values, 25.0);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
    let width = if fd > 0.0 { sturges.min(fd) } else { sturges };
    ((span / width).ceil() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_area() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 101) as f64).collect();
        let hist = Histogram::auto(&values);
        let width = hist.edges[1] - hist.edges[0];
        let area: f64 = hist.density.iter().map(|d| d * width).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-9);
        assert_eq!(hist.edges.len(), hist.bins() + 1);
    }

    #[test]
    fn test_constant_values_single_bin() {
        let hist = Histogram::auto(&[800.0; 12]);
        assert_eq!(hist.bins(), 1);
        assert_relative_eq!(hist.edges[0], 799.5);
        assert_relative_eq!(hist.density[0], 1.0);
    }

    #[test]
    fn test_maximum_lands_in_last_bin() {
        let hist = Histogram::auto(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let counts: f64 = hist.density.iter().sum::<f64>() * (hist.edges[1] - hist.edges[0]);
        assert_relative_eq!(counts, 1.0, epsilon = 1e-12);
        assert!(hist.density[hist.bins() - 1] > 0.0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(Histogram::auto(&[]).bins(), 0);
    }
}
