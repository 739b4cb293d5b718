//! Prometheus-tellere for grading-motoren.
//!
//! Registreringen skjer lat ved første bruk. Feiler den, logges det og
//! tellerne blir no-ops; grading skal aldri stoppe på grunn av metrikk.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::calibration::QualityTier;
use crate::grading::{Exercise, GradingEvent};

struct Metrics {
    registry: Registry,
    frames: IntCounterVec,
    reps: IntCounterVec,
    form_faults: IntCounterVec,
    invalid_pose: IntCounterVec,
    calibrations: IntCounterVec,
}

fn counter(registry: &Registry, name: &str, help: &str, label: &str) -> prometheus::Result<IntCounterVec> {
    let c = IntCounterVec::new(Opts::new(name, help), &[label])?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

fn build() -> prometheus::Result<Metrics> {
    let registry = Registry::new();
    Ok(Metrics {
        frames: counter(&registry, "ptgrade_frames_total", "Pose frames graded", "exercise")?,
        reps: counter(&registry, "ptgrade_reps_total", "Repetitions counted", "exercise")?,
        form_faults: counter(
            &registry,
            "ptgrade_form_faults_total",
            "Repetitions rejected for form",
            "exercise",
        )?,
        invalid_pose: counter(
            &registry,
            "ptgrade_invalid_pose_total",
            "Frames with required joints missing",
            "exercise",
        )?,
        calibrations: counter(
            &registry,
            "ptgrade_calibrations_total",
            "Completed calibrations by quality tier",
            "quality",
        )?,
        registry,
    })
}

static METRICS: Lazy<Option<Metrics>> = Lazy::new(|| match build() {
    Ok(m) => Some(m),
    Err(e) => {
        log::warn!("metrikk deaktivert: {}", e);
        None
    }
});

pub fn observe_event(exercise: Exercise, event: &GradingEvent) {
    let Some(m) = &*METRICS else { return };
    let label = [exercise.as_str()];
    m.frames.with_label_values(&label).inc();
    match event {
        GradingEvent::RepCompleted { .. } => m.reps.with_label_values(&label).inc(),
        GradingEvent::IncorrectForm(_) => m.form_faults.with_label_values(&label).inc(),
        GradingEvent::InvalidPose(_) => m.invalid_pose.with_label_values(&label).inc(),
        GradingEvent::PhaseChanged(_) | GradingEvent::NoChange => {}
    }
}

pub fn observe_calibration(quality: QualityTier) {
    if let Some(m) = &*METRICS {
        m.calibrations.with_label_values(&[quality.as_str()]).inc();
    }
}

/// Prometheus tekstformat. Tom streng hvis metrikk er deaktivert.
pub fn gather_text() -> String {
    let Some(m) = &*METRICS else {
        return String::new();
    };
    let mut buf = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&m.registry.gather(), &mut buf) {
        log::warn!("kunne ikke serialisere metrikk: {}", e);
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}
