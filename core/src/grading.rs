use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationProfile;
use crate::config::{GradingConfig, ScoringConfig};
use crate::error::GradeError;
use crate::metrics;
use crate::pose::PoseFrame;
use crate::pullup::PullupGrader;
use crate::pushup::PushupGrader;
use crate::situp::SitupGrader;

/// Tekst for `InvalidPose` når påkrevde ledd ikke er synlige.
pub const NOT_VISIBLE: &str = "full body not visible";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    Pushup,
    Situp,
    Pullup,
    Run,
}

impl Exercise {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::Pushup => "pushup",
            Exercise::Situp => "situp",
            Exercise::Pullup => "pullup",
            Exercise::Run => "run",
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "pushup" | "pushups" => Ok(Exercise::Pushup),
            "situp" | "situps" => Ok(Exercise::Situp),
            "pullup" | "pullups" => Ok(Exercise::Pullup),
            "run" | "running" => Ok(Exercise::Run),
            _ => Err(GradeError::UnknownExercise(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepPhase {
    #[default]
    WaitingForStart,
    Up,
    Down,
    Finished,
}

impl RepPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RepPhase::WaitingForStart => "waiting",
            RepPhase::Up => "up",
            RepPhase::Down => "down",
            RepPhase::Finished => "finished",
        }
    }
}

/// Resultat av ett frame. Verditype; motoren beholder den ikke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GradingEvent {
    RepCompleted { form_quality: f64 },
    PhaseChanged(String),
    InvalidPose(String),
    IncorrectForm(String),
    NoChange,
}

impl GradingEvent {
    pub(crate) fn phase(phase: RepPhase) -> Self {
        GradingEvent::PhaseChanged(phase.label().to_string())
    }

    pub fn is_rep(&self) -> bool {
        matches!(self, GradingEvent::RepCompleted { .. })
    }
}

/// Muterbar tilstand for én aktiv økt. Eies og muteres kun av rep-maskinen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseSessionState {
    pub rep_count: u32,
    pub phase: RepPhase,
    pub quality_sum: f64,
    pub quality_count: u32,
    pub last_feedback: String,
    /// satt av formvalidatoren siden forrige talte rep
    pub fault: bool,
}

impl ExerciseSessionState {
    pub fn form_quality_average(&self) -> f64 {
        if self.quality_count == 0 {
            0.0
        } else {
            self.quality_sum / self.quality_count as f64
        }
    }

    pub(crate) fn enter(&mut self, phase: RepPhase) -> GradingEvent {
        log::debug!("fase {} -> {}", self.phase.label(), phase.label());
        self.phase = phase;
        GradingEvent::phase(phase)
    }

    pub(crate) fn count_rep(&mut self, form_quality: f64) -> GradingEvent {
        let q = form_quality.clamp(0.0, 1.0);
        self.rep_count += 1;
        self.quality_sum += q;
        self.quality_count += 1;
        self.fault = false;
        self.last_feedback = format!("Good rep! ({})", self.rep_count);
        GradingEvent::RepCompleted { form_quality: q }
    }

    pub(crate) fn reject_rep(&mut self, feedback: &str) -> GradingEvent {
        self.fault = false;
        self.last_feedback = feedback.to_string();
        GradingEvent::IncorrectForm(feedback.to_string())
    }

    pub(crate) fn invalid_pose(&mut self) -> GradingEvent {
        self.clear_in_flight();
        self.last_feedback = NOT_VISIBLE.to_string();
        GradingEvent::InvalidPose(NOT_VISIBLE.to_string())
    }

    /// Nullstill fase og pågående rep. Antall reps og snitt beholdes.
    pub(crate) fn clear_in_flight(&mut self) {
        if self.phase != RepPhase::Finished {
            self.phase = RepPhase::WaitingForStart;
        }
        self.fault = false;
    }
}

/// Sluttscore: None uten talte reps. Ellers reps-andel mot mål + formsnitt, maks 100.
pub fn final_score(rep_count: u32, form_quality_average: f64, scoring: &ScoringConfig) -> Option<f64> {
    if rep_count == 0 {
        return None;
    }
    let target = scoring.target_reps.max(1) as f64;
    let rep_part = (rep_count as f64 / target).min(1.0) * scoring.rep_weight;
    let form_part = form_quality_average.clamp(0.0, 1.0) * scoring.form_weight;
    Some((rep_part + form_part).min(100.0))
}

/// Felles kapabilitet for alle øvelsesvarianter.
pub trait ExerciseGrader {
    fn exercise(&self) -> Exercise;

    fn grade_pose(&mut self, frame: &PoseFrame) -> GradingEvent;

    /// Pause/stopp/bytte: tøm fase, feilflagg og referanser.
    fn reset_state(&mut self);

    fn state(&self) -> &ExerciseSessionState;

    fn scoring(&self) -> &ScoringConfig;

    /// Ekstern trigger; ingen pose-drevet overgang går hit.
    fn finish(&mut self);

    fn rep_count(&self) -> u32 {
        self.state().rep_count
    }

    fn current_phase_description(&self) -> &'static str {
        self.state().phase.label()
    }

    fn form_quality_average(&self) -> f64 {
        self.state().form_quality_average()
    }

    fn last_feedback(&self) -> &str {
        &self.state().last_feedback
    }

    fn calculate_final_score(&self) -> Option<f64> {
        final_score(self.rep_count(), self.form_quality_average(), self.scoring())
    }
}

/// Varianten velges én gang per økt, aldri inne i frame-løkken.
#[derive(Debug, Clone)]
pub enum Grader {
    Pushup(PushupGrader),
    Situp(SitupGrader),
    Pullup(PullupGrader),
}

impl Grader {
    pub fn new(
        exercise: Exercise,
        profile: &CalibrationProfile,
        config: &GradingConfig,
    ) -> Result<Self, GradeError> {
        debug_assert_eq!(
            profile.exercise(),
            exercise,
            "calibration profile used with the wrong grader"
        );
        if profile.exercise() != exercise {
            log::error!(
                "kalibreringsprofil for {} brukt med {}-grader",
                profile.exercise(),
                exercise
            );
        }
        if !profile.quality().is_usable() {
            log::warn!(
                "kalibrering {:?} (confidence {:.2}) brukes likevel for {}",
                profile.quality(),
                profile.confidence_level(),
                exercise
            );
        }
        let scoring = config.scoring.clone();
        match exercise {
            Exercise::Pushup => Ok(Grader::Pushup(PushupGrader::new(profile, &config.pushup, scoring))),
            Exercise::Situp => Ok(Grader::Situp(SitupGrader::new(profile, &config.situp, scoring))),
            Exercise::Pullup => Ok(Grader::Pullup(PullupGrader::new(profile, &config.pullup, scoring))),
            Exercise::Run => Err(GradeError::UnsupportedExercise(exercise)),
        }
    }

    fn inner(&self) -> &dyn ExerciseGrader {
        match self {
            Grader::Pushup(g) => g,
            Grader::Situp(g) => g,
            Grader::Pullup(g) => g,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ExerciseGrader {
        match self {
            Grader::Pushup(g) => g,
            Grader::Situp(g) => g,
            Grader::Pullup(g) => g,
        }
    }
}

impl ExerciseGrader for Grader {
    fn exercise(&self) -> Exercise {
        self.inner().exercise()
    }

    fn grade_pose(&mut self, frame: &PoseFrame) -> GradingEvent {
        let event = self.inner_mut().grade_pose(frame);
        metrics::observe_event(self.exercise(), &event);
        event
    }

    fn reset_state(&mut self) {
        self.inner_mut().reset_state()
    }

    fn state(&self) -> &ExerciseSessionState {
        self.inner().state()
    }

    fn scoring(&self) -> &ScoringConfig {
        self.inner().scoring()
    }

    fn finish(&mut self) {
        self.inner_mut().finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_score_none_without_reps() {
        assert_eq!(final_score(0, 1.0, &ScoringConfig::default()), None);
    }

    #[test]
    fn final_score_caps_at_100() {
        let s = final_score(25, 1.0, &ScoringConfig::default()).unwrap();
        assert!((s - 100.0).abs() < 1e-9);
        let half = final_score(5, 0.0, &ScoringConfig::default()).unwrap();
        assert!((half - 42.5).abs() < 1e-9);
    }

    #[test]
    fn exercise_parses_loosely() {
        assert_eq!("Push-Ups".parse::<Exercise>().unwrap(), Exercise::Pushup);
        assert_eq!("sit_up".parse::<Exercise>().unwrap(), Exercise::Situp);
        assert!("plank".parse::<Exercise>().is_err());
    }
}
