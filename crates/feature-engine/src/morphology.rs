//! Wave fiducials and shape measures of the canonical beat

use beat_detector::TemplateSet;
use signal_core::stats;

/// Search window for the P wave before Q (seconds)
const P_SEARCH_SECS: f64 = 0.3;
/// Search window for the T wave after S (seconds)
const T_SEARCH_SECS: f64 = 0.4;
/// Half-width of the QRS fallback window around R (seconds)
const QRS_FALLBACK_SECS: f64 = 0.1;

pub const DEFAULT_QRS_DURATION_MS: f64 = 100.0;
pub const DEFAULT_QT_INTERVAL_MS: f64 = 400.0;

/// Fiducial positions inside the canonical beat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fiducials {
    pub p: Option<usize>,
    pub q: Option<usize>,
    pub r: usize,
    pub s: Option<usize>,
    pub t: Option<usize>,
}

impl Fiducials {
    /// Locate Q/S as the minima either side of R, then P/T as the maxima in
    /// fixed windows beyond them
    pub fn locate(beat: &[f64], r: usize, fs: f64) -> Self {
        let r = r.min(beat.len().saturating_sub(1));
        let q = stats::argmin(&beat[..r]);
        let s = stats::argmin(&beat[r..]).map(|i| r + i);

        let (p_start, p_end) = match q {
            Some(q) => (q.saturating_sub((P_SEARCH_SECS * fs) as usize), q),
            None => (0, r / 2),
        };
        let p = stats::argmax(&beat[p_start..p_end]).map(|i| p_start + i);

        let t_start = s
            .unwrap_or(r + (QRS_FALLBACK_SECS * fs) as usize)
            .min(beat.len());
        let t_end = (t_start + (T_SEARCH_SECS * fs) as usize).min(beat.len());
        let t = stats::argmax(&beat[t_start..t_end]).map(|i| t_start + i);

        Self { p, q, r, s, t }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphologyFeatures {
    pub r_amplitude: f64,
    pub q_amplitude: f64,
    pub s_amplitude: f64,
    pub p_amplitude: f64,
    pub t_amplitude: f64,
    /// Trapezoid integral of |beat| over the QRS complex (sample units)
    pub qrs_area: f64,
    /// Least-squares slope from S to T (per second)
    pub st_slope: f64,
    pub qrs_duration_ms: f64,
    pub qt_interval_ms: f64,
    /// Mean per-sample standard deviation across templates
    pub beat_variability: f64,
    /// Correlation of all templates against the repeated canonical beat
    pub template_correlation: f64,
}

impl Default for MorphologyFeatures {
    /// Values reported when there are too few beats to build a template
    fn default() -> Self {
        Self {
            r_amplitude: 0.0,
            q_amplitude: 0.0,
            s_amplitude: 0.0,
            p_amplitude: 0.0,
            t_amplitude: 0.0,
            qrs_area: 0.0,
            st_slope: 0.0,
            qrs_duration_ms: DEFAULT_QRS_DURATION_MS,
            qt_interval_ms: DEFAULT_QT_INTERVAL_MS,
            beat_variability: 0.0,
            template_correlation: 1.0,
        }
    }
}

impl MorphologyFeatures {
    pub fn compute(templates: &TemplateSet, fs: f64) -> Self {
        let beat = &templates.canonical;
        if beat.is_empty() {
            return Self::default();
        }
        let fid = Fiducials::locate(beat, templates.r_offset, fs);
        let r = fid.r;
        let at = |idx: Option<usize>| idx.map(|i| beat[i]).unwrap_or(0.0);

        let fallback = (QRS_FALLBACK_SECS * fs) as usize;
        let qrs_start = fid.q.unwrap_or(r.saturating_sub(fallback));
        let qrs_end = fid.s.unwrap_or(r + fallback).min(beat.len());
        let qrs_abs: Vec<f64> = beat[qrs_start.min(qrs_end)..qrs_end]
            .iter()
            .map(|v| v.abs())
            .collect();

        let st_slope = match (fid.s, fid.t) {
            (Some(s), Some(t)) if t > s + 1 => {
                let segment = &beat[s..t];
                let times: Vec<f64> = (0..segment.len()).map(|i| i as f64 / fs).collect();
                stats::linear_fit(&times, segment).0
            }
            _ => 0.0,
        };

        let to_ms = |samples: usize| samples as f64 / fs * 1000.0;
        let qrs_duration_ms = match (fid.q, fid.s) {
            (Some(q), Some(s)) => to_ms(s - q),
            _ => DEFAULT_QRS_DURATION_MS,
        };
        let qt_interval_ms = match (fid.q, fid.t) {
            (Some(q), Some(t)) => to_ms(t - q),
            _ => DEFAULT_QT_INTERVAL_MS,
        };

        let (beat_variability, template_correlation) = if templates.len() > 1 {
            (
                stats::mean(&templates.variability),
                stats::pearson(&templates.flattened(), &templates.canonical_tiled()),
            )
        } else {
            (0.0, 1.0)
        };

        Self {
            r_amplitude: beat[r],
            q_amplitude: at(fid.q),
            s_amplitude: at(fid.s),
            p_amplitude: at(fid.p),
            t_amplitude: at(fid.t),
            qrs_area: stats::trapezoid(&qrs_abs),
            st_slope,
            qrs_duration_ms,
            qt_interval_ms,
            beat_variability,
            template_correlation,
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("morph_r_amplitude", self.r_amplitude),
            ("morph_q_amplitude", self.q_amplitude),
            ("morph_s_amplitude", self.s_amplitude),
            ("morph_p_amplitude", self.p_amplitude),
            ("morph_t_amplitude", self.t_amplitude),
            ("morph_qrs_area", self.qrs_area),
            ("morph_st_slope", self.st_slope),
            ("morph_qrs_duration", self.qrs_duration_ms),
            ("morph_qt_interval", self.qt_interval_ms),
            ("morph_beat_variability", self.beat_variability),
            ("morph_template_correlation", self.template_correlation),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beat_detector::{BeatDetector, BeatTemplateExtractor};
    use signal_core::synthetic;

    #[test]
    fn test_pulse_train_fiducials() {
        let signal = synthetic::pulse_train(500, 10.0, 60.0).unwrap();
        let beats = BeatDetector::default().detect(&signal);
        let templates = BeatTemplateExtractor::default().extract(&signal, &beats);
        assert!(templates.is_sufficient());

        let features = MorphologyFeatures::compute(&templates, 500.0);
        assert!(features.r_amplitude > features.t_amplitude);
        assert!(features.t_amplitude > 0.0);
        assert!(features.qrs_area > 0.0);
        assert!(features.qt_interval_ms > features.qrs_duration_ms);
        assert!(features.template_correlation > 0.99);
    }

    #[test]
    fn test_empty_templates_use_defaults() {
        let features = MorphologyFeatures::compute(&TemplateSet::default(), 500.0);
        assert_eq!(features, MorphologyFeatures::default());
        assert_eq!(features.qt_interval_ms, 400.0);
    }

    #[test]
    fn test_locate_simple_beat() {
        // P bump, Q dip, R spike, S dip, T bump
        let mut beat = vec![0.0; 400];
        beat[100] = 0.2;
        beat[140] = -0.3;
        beat[150] = 1.0;
        beat[160] = -0.4;
        beat[250] = 0.3;
        let fid = Fiducials::locate(&beat, 150, 500.0);
        assert_eq!(fid.q, Some(140));
        assert_eq!(fid.s, Some(160));
        assert_eq!(fid.p, Some(100));
        assert_eq!(fid.t, Some(250));
    }
}
