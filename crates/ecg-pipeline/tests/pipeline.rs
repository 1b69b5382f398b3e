//! Behavior of the public pipeline surface on synthetic recordings

use ecg_pipeline::{
    assess_quality, augment, detect_artifacts, detect_beats, extract_features,
    extract_templates, preprocess, remove_artifacts, validate_augmentation, ArtifactKind,
    EcgPipeline, FeatureGroup, QualityCategory, Signal,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use signal_core::synthetic;
use std::f64::consts::PI;

fn two_tone() -> Signal {
    let mut rng = StdRng::seed_from_u64(7);
    synthetic::two_tone(500, 10.0, 0.0, &mut rng).unwrap()
}

#[test]
fn test_regular_rhythm_beats() {
    let signal = synthetic::pulse_train(500, 10.0, 60.0).unwrap();
    let beats = detect_beats(&signal);
    assert!((9..=11).contains(&beats.len()), "got {} beats", beats.len());
    let mean_rr = beats.mean_rr_ms().unwrap();
    assert!((mean_rr - 1000.0).abs() < 50.0, "mean RR {}", mean_rr);
}

#[test]
fn test_templates_follow_beats() {
    let signal = synthetic::pulse_train(500, 10.0, 60.0).unwrap();
    let beats = detect_beats(&signal);
    let templates = extract_templates(&signal, &beats);
    assert!(templates.is_sufficient());
    assert!(templates.len() <= beats.len());
    // -300..+500 ms at 500 Hz
    assert!(templates.templates.iter().all(|t| t.len() == 400));
    assert_eq!(templates.r_offset, 150);
}

#[test]
fn test_empty_augmentation_is_identity() {
    let signal = two_tone();
    assert_eq!(augment(&signal, &[], 0.9).unwrap(), signal);
}

#[test]
fn test_self_validation_is_perfect() {
    let signal = synthetic::pulse_train(500, 10.0, 60.0).unwrap();
    let report = validate_augmentation(&signal, &signal).unwrap();
    assert!((report.correlation - 1.0).abs() < 1e-12);
    assert_eq!(report.validity_score, 1.0);
    assert!(report.is_valid);
}

#[test]
fn test_unknown_augmentation_is_error() {
    let err = augment(&two_tone(), &["time_shift", "blur"], 0.5).unwrap_err();
    assert!(err.to_string().contains("blur"));
}

#[test]
fn test_quality_non_increasing_with_noise() {
    let base = two_tone();
    let mut rng = StdRng::seed_from_u64(42);
    let noise = synthetic::gaussian_noise(base.len(), 1.0, &mut rng);

    let mut previous = f64::INFINITY;
    for level in [0.0, 0.05, 0.2, 1.0, 5.0] {
        let noisy: Vec<f64> = base
            .samples()
            .iter()
            .zip(noise.iter())
            .map(|(s, n)| s + level * n)
            .collect();
        let report = assess_quality(&base.with_samples(noisy).unwrap()).unwrap();
        assert!(
            report.overall_score <= previous,
            "score rose to {} at noise {}",
            report.overall_score,
            level
        );
        previous = report.overall_score;
    }
}

#[test]
fn test_all_zero_signal_degrades_to_defaults() {
    let signal = Signal::new(vec![0.0; 5000], 500).unwrap();
    let cleaned = preprocess(&signal).unwrap();
    let beats = detect_beats(&cleaned);
    assert!(beats.is_empty());

    let features = extract_features(&cleaned, &beats);
    assert!(features.degenerate.morphology);
    assert!(features.degenerate.intervals);
    assert!(features.degenerate.waveform);
    assert!(features.values().iter().all(|v| v.is_finite()));
    assert!(features.group(FeatureGroup::Interval).count() > 0);

    let quality = assess_quality(&cleaned).unwrap();
    assert!(quality.overall_score.is_finite());
    let artifacts = detect_artifacts(&cleaned).unwrap();
    assert_eq!(artifacts.summary.primary_artifact, None);
}

#[test]
fn test_feature_extraction_is_reproducible() {
    let signal = preprocess(&two_tone()).unwrap();
    let beats = detect_beats(&signal);
    let first = extract_features(&signal, &beats);
    let second = extract_features(&signal, &beats);
    assert_eq!(first, second);
    assert_eq!(first.csv_row(), second.csv_row());
}

#[test]
fn test_motion_burst_detected() {
    let fs = 500.0;
    let mut samples = vec![0.0; 5000];
    for (i, v) in samples.iter_mut().enumerate().take(1500).skip(1000) {
        *v = (2.0 * PI * 4.0 * (i - 1000) as f64 / fs).sin();
    }
    let report = detect_artifacts(&Signal::new(samples, 500).unwrap()).unwrap();

    assert_eq!(report.summary.primary_artifact, Some(ArtifactKind::Motion));
    let motion = report.segments_of(ArtifactKind::Motion);
    assert!(!motion.is_empty());
    assert!(motion.iter().all(|s| s.start >= 950 && s.end <= 1550));
}

#[test]
fn test_electrode_spike_detected_and_repaired() {
    let mut samples = vec![0.0; 5000];
    samples[2500] = 2.0;
    samples[2501] = 2.0;
    let signal = Signal::new(samples, 500).unwrap();
    let report = detect_artifacts(&signal).unwrap();

    assert_eq!(
        report.summary.primary_artifact,
        Some(ArtifactKind::ElectrodePop)
    );
    let pops = report.segments_of(ArtifactKind::ElectrodePop);
    assert!(pops.iter().any(|s| s.contains(2500)));

    let repaired = remove_artifacts(&signal, &report).unwrap();
    assert_eq!(repaired.len(), signal.len());
    assert!(repaired.samples().iter().all(|v| v.is_finite()));
    assert_ne!(repaired, signal);
}

#[test]
fn test_end_to_end_two_tone() {
    let analysis = EcgPipeline::default().analyze(&two_tone()).unwrap();

    assert!(analysis.beats.len() >= 5, "got {} beats", analysis.beats.len());
    assert!(
        matches!(
            analysis.quality.category,
            QualityCategory::Good | QualityCategory::Excellent
        ),
        "quality {} ({})",
        analysis.quality.category,
        analysis.quality.overall_score
    );
    assert!(analysis.features.len() >= 80);
    assert!(analysis.features.values().iter().all(|v| v.is_finite()));

    let json = serde_json::to_string(&analysis).unwrap();
    assert!(json.contains("\"beats\""));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_beats_respect_refractory(
        samples in proptest::collection::vec(-5.0f64..5.0, 3..2000),
    ) {
        let beats = detect_beats(&Signal::new(samples, 500).unwrap());
        for pair in beats.indices().windows(2) {
            prop_assert!(pair[1] - pair[0] >= 150);
        }
    }

    #[test]
    fn prop_empty_augmentation_identity(
        samples in proptest::collection::vec(-5.0f64..5.0, 1..500),
        intensity in 0.0f64..1.0,
    ) {
        let signal = Signal::new(samples, 250).unwrap();
        prop_assert_eq!(augment(&signal, &[], intensity).unwrap(), signal);
    }
}
