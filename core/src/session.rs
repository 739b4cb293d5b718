use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationProfile, QualityTier};
use crate::config::GradingConfig;
use crate::error::GradeError;
use crate::grading::{Exercise, ExerciseGrader, Grader, GradingEvent};
use crate::pose::PoseFrame;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub timestamp: f64,
    pub event: GradingEvent,
}

/// Uforanderlig oppsummering som gis videre til lagring/visning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub exercise: Exercise,
    pub rep_count: u32,
    pub average_form_quality: f64,
    pub duration_seconds: f64,
    pub final_score: Option<f64>,
    pub calibration_confidence: f64,
    pub calibration_quality: QualityTier,
    pub phase_history: Vec<String>,
    pub events: Vec<TimedEvent>,
    pub finished_at: DateTime<Utc>,
}

/// Ren reducer over hendelsesstrømmen. Ingen egen validering.
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    exercise: Exercise,
    rep_count: u32,
    quality_sum: f64,
    last_feedback: Option<String>,
    phase_history: Vec<String>,
    events: Vec<TimedEvent>,
    first_ts: Option<f64>,
    last_ts: Option<f64>,
}

impl SessionAggregator {
    pub fn new(exercise: Exercise) -> Self {
        Self {
            exercise,
            rep_count: 0,
            quality_sum: 0.0,
            last_feedback: None,
            phase_history: Vec::new(),
            events: Vec::new(),
            first_ts: None,
            last_ts: None,
        }
    }

    pub fn record(&mut self, timestamp: f64, event: &GradingEvent) {
        if self.first_ts.is_none() {
            self.first_ts = Some(timestamp);
        }
        self.last_ts = Some(timestamp);

        match event {
            GradingEvent::NoChange => return, // ikke verdt å lagre
            GradingEvent::RepCompleted { form_quality } => {
                self.rep_count += 1;
                self.quality_sum += form_quality;
                self.last_feedback = Some(format!("Good rep! ({})", self.rep_count));
            }
            GradingEvent::PhaseChanged(label) => self.phase_history.push(label.clone()),
            GradingEvent::InvalidPose(msg) | GradingEvent::IncorrectForm(msg) => {
                self.last_feedback = Some(msg.clone())
            }
        }
        self.events.push(TimedEvent {
            timestamp,
            event: event.clone(),
        });
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn average_form_quality(&self) -> f64 {
        if self.rep_count == 0 {
            0.0
        } else {
            self.quality_sum / self.rep_count as f64
        }
    }

    pub fn last_feedback(&self) -> Option<&str> {
        self.last_feedback.as_deref()
    }

    pub fn duration_seconds(&self) -> f64 {
        match (self.first_ts, self.last_ts) {
            (Some(a), Some(b)) => (b - a).max(0.0),
            _ => 0.0,
        }
    }

    /// Lages alltid, også uten reps. Kalleren bestemmer om den skal lagres.
    pub fn finish(self, final_score: Option<f64>, calibration: &CalibrationProfile) -> SessionSummary {
        let duration_seconds = self.duration_seconds();
        let average_form_quality = self.average_form_quality();
        SessionSummary {
            exercise: self.exercise,
            rep_count: self.rep_count,
            average_form_quality,
            duration_seconds,
            final_score,
            calibration_confidence: calibration.confidence_level(),
            calibration_quality: calibration.quality(),
            phase_history: self.phase_history,
            events: self.events,
            finished_at: Utc::now(),
        }
    }
}

/// Én aktiv økt: én grader + én aggregator, matet serielt frame for frame.
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    grader: Grader,
    aggregator: SessionAggregator,
    profile: CalibrationProfile,
}

impl WorkoutSession {
    pub fn new(
        exercise: Exercise,
        profile: CalibrationProfile,
        config: &GradingConfig,
    ) -> Result<Self, GradeError> {
        let grader = Grader::new(exercise, &profile, config)?;
        Ok(Self {
            grader,
            aggregator: SessionAggregator::new(exercise),
            profile,
        })
    }

    pub fn process(&mut self, frame: &PoseFrame) -> GradingEvent {
        let event = self.grader.grade_pose(frame);
        self.aggregator.record(frame.timestamp, &event);
        event
    }

    pub fn reset_state(&mut self) {
        self.grader.reset_state();
    }

    pub fn grader(&self) -> &Grader {
        &self.grader
    }

    pub fn aggregator(&self) -> &SessionAggregator {
        &self.aggregator
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    pub fn finish(mut self) -> SessionSummary {
        self.grader.finish();
        let score = self.grader.calculate_final_score();
        log::info!(
            "økt ferdig: {} reps={} score={:?}",
            self.grader.exercise(),
            self.grader.rep_count(),
            score
        );
        self.aggregator.finish(score, &self.profile)
    }
}
