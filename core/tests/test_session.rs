mod common;

use common::pushup_frame;
use ptgrade_core::{
    default_profile, metrics, Exercise, GradeError, GradingConfig, GradingEvent, QualityTier,
    SessionAggregator, WorkoutSession,
};

#[test]
fn empty_session_still_summarizes() {
    let session = WorkoutSession::new(
        Exercise::Situp,
        default_profile(Exercise::Situp),
        &GradingConfig::default(),
    )
    .unwrap();
    let summary = session.finish();

    assert_eq!(summary.rep_count, 0);
    assert_eq!(summary.final_score, None);
    assert_eq!(summary.average_form_quality, 0.0);
    assert_eq!(summary.duration_seconds, 0.0);
    assert_eq!(summary.calibration_quality, QualityTier::Acceptable);
    assert!(summary.events.is_empty());
}

#[test]
fn run_has_no_rep_machine() {
    let err = WorkoutSession::new(
        Exercise::Run,
        default_profile(Exercise::Run),
        &GradingConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GradeError::UnsupportedExercise(Exercise::Run)));
}

#[test]
fn session_records_events_and_scores() {
    let mut session = WorkoutSession::new(
        Exercise::Pushup,
        default_profile(Exercise::Pushup),
        &GradingConfig::default(),
    )
    .unwrap();

    for (i, deg) in [170.0, 150.0, 95.0, 172.0].iter().enumerate() {
        session.process(&pushup_frame(i as f64, *deg, false));
    }
    assert_eq!(session.aggregator().rep_count(), 1);
    assert_eq!(session.aggregator().last_feedback(), Some("Good rep! (1)"));

    let summary = session.finish();
    assert_eq!(summary.rep_count, 1);
    assert_eq!(summary.phase_history, vec!["up", "down"]);
    // NoChange-frames lagres ikke
    assert_eq!(summary.events.len(), 3);
    assert!((summary.duration_seconds - 3.0).abs() < 1e-9);
    // 1/10·85 + 0.9·15
    let score = summary.final_score.unwrap();
    assert!((score - 22.0).abs() < 1e-9, "score={}", score);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["events"][2]["event"]["type"], "rep_completed");

    let text = metrics::gather_text();
    assert!(text.contains("ptgrade_frames_total"));
}

#[test]
fn aggregator_is_a_plain_reducer() {
    let mut agg = SessionAggregator::new(Exercise::Pullup);
    agg.record(1.0, &GradingEvent::PhaseChanged("down".into()));
    agg.record(2.0, &GradingEvent::RepCompleted { form_quality: 0.8 });
    agg.record(3.0, &GradingEvent::IncorrectForm("Avoid kipping - control the movement".into()));
    agg.record(4.0, &GradingEvent::NoChange);

    assert_eq!(agg.rep_count(), 1);
    assert!((agg.average_form_quality() - 0.8).abs() < 1e-9);
    assert_eq!(agg.last_feedback(), Some("Avoid kipping - control the movement"));
    assert!((agg.duration_seconds() - 3.0).abs() < 1e-9);
}
