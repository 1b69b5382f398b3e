//! Butterworth IIR filters in second-order-section form
//!
//! Filters are designed from the analog prototype, mapped to the digital
//! domain with a pre-warped bilinear transform and stored as a cascade of
//! biquads. `filtfilt` runs the cascade forward and backward for zero phase,
//! padding both ends by odd reflection and starting every section from its
//! step-response steady state.

use crate::error::{EcgError, Result};
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Pass band of a filter, cutoffs in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterBand {
    Lowpass(f64),
    Highpass(f64),
    Bandpass(f64, f64),
}

/// One second-order section, `a[0]` normalized to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Biquad {
    fn response_at(&self, z: Complex64) -> Complex64 {
        let zi = z.inv();
        let zi2 = zi * zi;
        let num = zi * self.b[1] + zi2 * self.b[2] + self.b[0];
        let den = zi * self.a[1] + zi2 * self.a[2] + self.a[0];
        num / den
    }

    /// Transposed direct-form II state reached by a unit step input
    fn step_state(&self) -> [f64; 2] {
        let b_sum: f64 = self.b.iter().sum();
        let a_sum: f64 = self.a.iter().sum();
        let gain = b_sum / a_sum;
        let s2 = self.b[2] - self.a[2] * gain;
        let s1 = self.b[1] - self.a[1] * gain + s2;
        [s1, s2]
    }

    fn is_first_order(&self) -> bool {
        self.b[2] == 0.0 && self.a[2] == 0.0
    }
}

/// Digital Butterworth filter
#[derive(Debug, Clone)]
pub struct ButterworthFilter {
    sections: Vec<Biquad>,
    band: FilterBand,
    order: usize,
}

impl ButterworthFilter {
    /// Design an `order`-th order Butterworth filter for sampling rate `fs`
    pub fn design(order: usize, band: FilterBand, fs: f64) -> Result<Self> {
        if order == 0 {
            return Err(EcgError::InvalidParameter(
                "filter order must be at least 1".into(),
            ));
        }
        if !(fs > 0.0) {
            return Err(EcgError::InvalidParameter(format!(
                "sampling rate {fs} Hz must be positive"
            )));
        }
        let nyquist = fs / 2.0;
        let check = |f: f64| -> Result<()> {
            if f > 0.0 && f < nyquist {
                Ok(())
            } else {
                Err(EcgError::InvalidParameter(format!(
                    "cutoff {f} Hz must lie in (0, {nyquist}) Hz"
                )))
            }
        };
        match band {
            FilterBand::Lowpass(fc) | FilterBand::Highpass(fc) => check(fc)?,
            FilterBand::Bandpass(lo, hi) => {
                check(lo)?;
                check(hi)?;
                if lo >= hi {
                    return Err(EcgError::InvalidParameter(format!(
                        "band edges {lo}..{hi} Hz are not increasing"
                    )));
                }
            }
        }

        let fs2 = 2.0 * fs;
        let warp = |f: f64| fs2 * (PI * f / fs).tan();
        let prototype: Vec<Complex64> = (0..order)
            .map(|k| {
                let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
                Complex64::new(theta.cos(), theta.sin())
            })
            .collect();

        let analog_poles: Vec<Complex64> = match band {
            FilterBand::Lowpass(fc) => {
                let wc = warp(fc);
                prototype.iter().map(|&p| p * wc).collect()
            }
            FilterBand::Highpass(fc) => {
                let wc = warp(fc);
                prototype
                    .iter()
                    .map(|&p| Complex64::new(wc, 0.0) / p)
                    .collect()
            }
            FilterBand::Bandpass(lo, hi) => {
                let (w1, w2) = (warp(lo), warp(hi));
                let w0_sq = w1 * w2;
                let bw = w2 - w1;
                prototype
                    .iter()
                    .flat_map(|&p| {
                        let half = p * (bw / 2.0);
                        let d = (half * half - w0_sq).sqrt();
                        [half + d, half - d]
                    })
                    .collect()
            }
        };

        let digital_poles: Vec<Complex64> = analog_poles
            .iter()
            .map(|&s| (s + fs2) / (Complex64::new(fs2, 0.0) - s))
            .collect();

        let mut sections = group_poles(&digital_poles, band);

        // Unit gain at DC, Nyquist or the geometric band centre
        let probe = match band {
            FilterBand::Lowpass(_) => Complex64::new(1.0, 0.0),
            FilterBand::Highpass(_) => Complex64::new(-1.0, 0.0),
            FilterBand::Bandpass(lo, hi) => {
                let w0 = (warp(lo) * warp(hi)).sqrt();
                let omega = 2.0 * (w0 / fs2).atan();
                Complex64::from_polar(1.0, omega)
            }
        };
        let response = sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response_at(probe));
        let gain = response.norm();
        if !(gain.is_finite() && gain > 0.0) {
            return Err(EcgError::InvalidParameter(format!(
                "degenerate filter design for {band:?} at {fs} Hz"
            )));
        }
        if let Some(first) = sections.first_mut() {
            for coeff in first.b.iter_mut() {
                *coeff /= gain;
            }
        }

        Ok(Self {
            sections,
            band,
            order,
        })
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    pub fn band(&self) -> FilterBand {
        self.band
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of samples reflected onto each end by `filtfilt`
    pub fn pad_len(&self) -> usize {
        let trailing_zero = self.sections.iter().filter(|s| s.is_first_order()).count();
        3 * (2 * self.sections.len() + 1 - trailing_zero)
    }

    /// Single causal pass starting from rest
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let mut state = vec![[0.0; 2]; self.sections.len()];
        self.run(input.iter().copied(), &mut state)
    }

    /// Zero-phase forward-backward filtering
    pub fn filtfilt(&self, input: &[f64]) -> Result<Vec<f64>> {
        let pad = self.pad_len();
        let n = input.len();
        if n <= pad {
            return Err(EcgError::InsufficientData {
                required: pad,
                actual: n,
            });
        }

        let first = input[0];
        let last = input[n - 1];
        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - input[i]));
        extended.extend_from_slice(input);
        extended.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i]));

        let steady = self.steady_state();

        let x0 = extended[0];
        let mut state: Vec<[f64; 2]> = steady.iter().map(|s| [s[0] * x0, s[1] * x0]).collect();
        let forward = self.run(extended.iter().copied(), &mut state);

        let y0 = forward[forward.len() - 1];
        let mut state: Vec<[f64; 2]> = steady.iter().map(|s| [s[0] * y0, s[1] * y0]).collect();
        let mut backward = self.run(forward.iter().rev().copied(), &mut state);
        backward.reverse();

        Ok(backward[pad..pad + n].to_vec())
    }

    /// Per-section initial state for a unit step, scaled by the gain of the
    /// preceding sections
    fn steady_state(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|section| {
                let [s1, s2] = section.step_state();
                let state = [s1 * scale, s2 * scale];
                scale *= section.b.iter().sum::<f64>() / section.a.iter().sum::<f64>();
                state
            })
            .collect()
    }

    fn run(&self, input: impl Iterator<Item = f64>, state: &mut [[f64; 2]]) -> Vec<f64> {
        input
            .map(|x| {
                let mut value = x;
                for (section, z) in self.sections.iter().zip(state.iter_mut()) {
                    let y = section.b[0] * value + z[0];
                    z[0] = section.b[1] * value - section.a[1] * y + z[1];
                    z[1] = section.b[2] * value - section.a[2] * y;
                    value = y;
                }
                value
            })
            .collect()
    }
}

fn group_poles(poles: &[Complex64], band: FilterBand) -> Vec<Biquad> {
    let is_real = |p: &Complex64| p.im.abs() <= 1e-10 * (1.0 + p.re.abs());

    let mut sections = Vec::new();
    let second_order_b = match band {
        FilterBand::Lowpass(_) => [1.0, 2.0, 1.0],
        FilterBand::Highpass(_) => [1.0, -2.0, 1.0],
        FilterBand::Bandpass(..) => [1.0, 0.0, -1.0],
    };

    for p in poles.iter().filter(|p| !is_real(p) && p.im > 0.0) {
        sections.push(Biquad {
            b: second_order_b,
            a: [1.0, -2.0 * p.re, p.norm_sqr()],
        });
    }

    let mut real: Vec<f64> = poles.iter().filter(|p| is_real(p)).map(|p| p.re).collect();
    real.sort_by(|a, b| a.total_cmp(b));
    for pair in real.chunks(2) {
        match *pair {
            [p1, p2] => sections.push(Biquad {
                b: second_order_b,
                a: [1.0, -(p1 + p2), p1 * p2],
            }),
            [p] => {
                let b = match band {
                    FilterBand::Highpass(_) => [1.0, -1.0, 0.0],
                    _ => [1.0, 1.0, 0.0],
                };
                sections.push(Biquad {
                    b,
                    a: [1.0, -p, 0.0],
                });
            }
            _ => {}
        }
    }
    sections
}

/// Convenience: design and run a zero-phase filter in one call
pub fn filtfilt(order: usize, band: FilterBand, fs: f64, input: &[f64]) -> Result<Vec<f64>> {
    ButterworthFilter::design(order, band, fs)?.filtfilt(input)
}
