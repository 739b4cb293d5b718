mod common;

use common::standing_frame;
use ptgrade_core::{
    begin_frame_collection, begin_mode_collection, perform_calibration, CalibrationMode,
    DevicePlacement, Exercise, QualityTier,
};

#[test]
fn steady_clear_frames_give_excellent_profile() {
    let frames: Vec<_> = (0..60)
        .map(|i| standing_frame(i as f64 / 30.0, 0.5, 1.0, 0.98))
        .collect();
    let profile = perform_calibration(Exercise::Pushup, &frames).expect("profile");

    assert_eq!(profile.quality(), QualityTier::Excellent);
    assert!(profile.confidence_level() >= 0.9, "conf={}", profile.confidence_level());
    assert_eq!(profile.frame_count(), 60);
    assert!(matches!(profile.device().placement, DevicePlacement::Tripod { .. }));
    // skulderbredde 0.2, torso 0.2 i testfiguren
    assert!((profile.body().torso_length - 0.2).abs() < 1e-9);
    assert!((profile.body().arm_span - 0.26).abs() < 1e-9);
    assert!(profile.visibility().critical_joints >= 0.4);
}

#[test]
fn blurry_frames_score_lower() {
    let frames: Vec<_> = (0..60)
        .map(|i| standing_frame(i as f64 / 30.0, 0.5, 1.0, 0.5))
        .collect();
    let profile = perform_calibration(Exercise::Pushup, &frames).expect("profile");
    // konfidens 0.5 < 0.7: ingen ledd regnes som synlige
    assert!((profile.calibration_score() - 50.0).abs() < 1e-6);
    assert_eq!(profile.quality(), QualityTier::Invalid);
    assert!(!profile.quality().is_usable());
}

#[test]
fn empty_buffer_gives_no_profile() {
    assert!(perform_calibration(Exercise::Situp, &[]).is_none());
}

#[test]
fn collector_reports_progress_and_refuses_early_finish() {
    let mut seen = Vec::new();
    let mut collector = begin_frame_collection(4, |p| seen.push(p));
    for i in 0..3 {
        assert!(!collector.push(standing_frame(i as f64, 0.5, 1.0, 0.9)));
    }
    assert!((collector.progress() - 0.75).abs() < 1e-9);
    assert!(collector.finish(Exercise::Pushup).is_none());
    assert_eq!(seen, vec![0.25, 0.5, 0.75]);
}

#[test]
fn mode_collector_gates_low_confidence() {
    let mut collector = begin_mode_collection(CalibrationMode::Quick, Exercise::Pullup, |_| {});
    assert!(!collector.push(standing_frame(0.0, 0.5, 1.0, 0.3)));
    assert!(collector.frames().is_empty());

    for i in 0..CalibrationMode::Quick.required_frames() {
        collector.push(standing_frame(i as f64, 0.5, 1.0, 0.95));
    }
    assert!(collector.is_complete());
    // overskytende frames ignoreres
    assert!(collector.push(standing_frame(99.0, 0.5, 1.0, 0.95)));
    assert_eq!(collector.frames().len(), 60);

    let profile = collector.finish(Exercise::Pullup).expect("profile");
    assert_eq!(profile.exercise(), Exercise::Pullup);
    assert_eq!(CalibrationMode::after(profile.quality()), CalibrationMode::Quick);
}

#[test]
fn poorer_result_asks_for_longer_pass() {
    assert_eq!(CalibrationMode::after(QualityTier::Acceptable), CalibrationMode::Standard);
    assert_eq!(CalibrationMode::after(QualityTier::Invalid), CalibrationMode::Full);
    assert!(CalibrationMode::Full.required_frames() > CalibrationMode::Quick.required_frames());
}
