use ptgrade_core::run::{haversine_m, TWO_MILES_METERS};
use ptgrade_core::{GpsFix, RunConfig, RunTracker};

fn fix(lat: f64, t: f64) -> GpsFix {
    GpsFix {
        latitude: lat,
        longitude: 10.75,
        timestamp: t,
    }
}

#[test]
fn haversine_one_hundredth_degree_north() {
    let d = haversine_m(&fix(59.9, 0.0), &fix(59.91, 0.0));
    assert!((d - 1111.95).abs() < 1.0, "d={}", d);
}

#[test]
fn steady_run_completes_at_target() {
    let mut tracker = RunTracker::default();
    tracker.start(0.0);

    // ~22 m per 5 s ≈ 4.4 m/s
    let step = 0.0002;
    let mut i = 0;
    while tracker.is_running() && i < 1000 {
        let fb = tracker.update(fix(59.9 + step * i as f64, 5.0 * i as f64));
        assert!(fb.is_none(), "unexpected feedback {:?}", fb);
        i += 1;
    }

    assert!(tracker.is_complete());
    let summary = tracker.summary();
    assert!(summary.distance_m >= TWO_MILES_METERS);
    assert!(summary.completed);
    let score = summary.score.unwrap();
    assert!(score > 95.0 && score <= 100.0, "score={}", score);
    assert_eq!(summary.pace_label.len(), 5);
}

#[test]
fn slow_pace_is_flagged_after_warmup() {
    let mut tracker = RunTracker::default();
    tracker.start(0.0);
    // ~5.6 m per 5 s ≈ 1.1 m/s
    let feedback: Vec<_> = (0..8)
        .map(|i| tracker.update(fix(59.9 + 0.00005 * i as f64, 5.0 * i as f64)))
        .collect();

    assert!(feedback[..5].iter().all(Option::is_none));
    let fb = feedback[5].as_ref().expect("pace warning");
    assert_eq!(fb.message, "Pick up the pace - running too slow");
    assert!(!fb.critical);
}

#[test]
fn gps_jump_and_stale_fix_are_ignored() {
    let mut tracker = RunTracker::default();
    tracker.start(0.0);
    tracker.update(fix(59.9, 0.0));
    tracker.update(fix(59.91, 5.0)); // ~1.1 km på 5 s
    assert_eq!(tracker.distance_m(), 0.0);

    tracker.update(fix(59.9101, 5.0)); // Δt = 0
    assert_eq!(tracker.distance_m(), 0.0);

    tracker.update(fix(59.9102, 10.0));
    assert!(tracker.distance_m() > 10.0 && tracker.distance_m() < 12.0);
}

#[test]
fn time_limit_is_critical() {
    let mut tracker = RunTracker::new(RunConfig {
        max_duration_s: 60.0,
        ..RunConfig::default()
    });
    tracker.start(0.0);
    let mut last = None;
    for i in 0..8 {
        last = tracker.update(fix(59.9 + 0.0001 * i as f64, 20.0 * i as f64));
    }
    let fb = last.expect("feedback");
    assert_eq!(fb.message, "Time limit exceeded");
    assert!(fb.critical);
}

#[test]
fn fixes_before_start_are_dropped() {
    let mut tracker = RunTracker::default();
    assert!(tracker.update(fix(59.9, 0.0)).is_none());
    tracker.stop(10.0);
    let summary = tracker.summary();
    assert!(!summary.completed);
    assert_eq!(summary.score, None);
    assert_eq!(summary.pace_label, "00:00");
}
