//! Natural cubic spline interpolation

/// Cubic spline with zero curvature at both ends
///
/// Each segment is `y_i + b_i dx + c_i dx^2 + d_i dx^3`. Outside the knot
/// range the spline continues linearly with its end slope.
#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl NaturalCubicSpline {
    /// Fit through `(x, y)`; `x` must be strictly increasing
    ///
    /// Returns `None` for fewer than two knots, mismatched lengths or
    /// non-increasing abscissae.
    pub fn new(x: &[f64], y: &[f64]) -> Option<Self> {
        let m = x.len();
        if m < 2 || y.len() != m || x.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }
        let k = m - 1;
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        let mut alpha = vec![0.0; k];
        for i in 1..k {
            alpha[i] = 3.0 / h[i] * (y[i + 1] - y[i]) - 3.0 / h[i - 1] * (y[i] - y[i - 1]);
        }

        // Thomas algorithm on the tridiagonal system for c
        let mut l = vec![1.0; m];
        let mut mu = vec![0.0; m];
        let mut z = vec![0.0; m];
        for i in 1..k {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        let mut c = vec![0.0; m];
        let mut b = vec![0.0; k];
        let mut d = vec![0.0; k];
        for j in (0..k).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }

        Some(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            b,
            c,
            d,
        })
    }

    /// Interpolate uniformly spaced samples at abscissae `0, 1, ..`
    pub fn through_samples(samples: &[f64]) -> Option<Self> {
        let x: Vec<f64> = (0..samples.len()).map(|i| i as f64).collect();
        Self::new(&x, samples)
    }

    pub fn evaluate(&self, at: f64) -> f64 {
        let m = self.x.len();
        let k = m - 1;
        if at <= self.x[0] {
            return self.y[0] + self.b[0] * (at - self.x[0]);
        }
        if at >= self.x[k] {
            let h = self.x[k] - self.x[k - 1];
            let slope = self.b[k - 1] + 2.0 * self.c[k - 1] * h + 3.0 * self.d[k - 1] * h * h;
            return self.y[k] + slope * (at - self.x[k]);
        }
        let seg = self.x.partition_point(|x| *x <= at).saturating_sub(1).min(k - 1);
        let dx = at - self.x[seg];
        self.y[seg] + dx * (self.b[seg] + dx * (self.c[seg] + dx * self.d[seg]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_knots() {
        let x = [0.0, 0.2, 0.5, 0.9, 1.0];
        let y = [1.0, -0.5, 0.3, 2.0, 0.0];
        let spline = NaturalCubicSpline::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_relative_eq!(spline.evaluate(*xi), *yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_data_stays_linear() {
        let x = [0.0, 1.0, 3.0, 4.0];
        let y = [1.0, 3.0, 7.0, 9.0];
        let spline = NaturalCubicSpline::new(&x, &y).unwrap();
        assert_relative_eq!(spline.evaluate(2.0), 5.0, epsilon = 1e-12);
        // Linear continuation beyond the ends
        assert_relative_eq!(spline.evaluate(-1.0), -1.0, epsilon = 1e-12);
        assert_relative_eq!(spline.evaluate(5.0), 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert!(NaturalCubicSpline::new(&[0.0], &[1.0]).is_none());
        assert!(NaturalCubicSpline::new(&[0.0, 0.0], &[1.0, 2.0]).is_none());
        assert!(NaturalCubicSpline::new(&[0.0, 1.0], &[1.0]).is_none());
    }

    #[test]
    fn test_through_samples_two_points() {
        let spline = NaturalCubicSpline::through_samples(&[0.0, 2.0]).unwrap();
        assert_relative_eq!(spline.evaluate(0.25), 0.5, epsilon = 1e-12);
    }
}
