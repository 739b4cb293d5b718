use crate::calibration::CalibrationProfile;
use crate::config::{PushupThresholds, ScoringConfig};
use crate::form::{body_line_angle, PushupFormValidator};
use crate::grading::{Exercise, ExerciseGrader, ExerciseSessionState, GradingEvent, RepPhase};
use crate::pose::{Joint, PoseFrame};

const REQUIRED: [Joint; 10] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
];

const LEFT_ARM: [Joint; 3] = [Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist];
const RIGHT_ARM: [Joint; 3] = [Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist];

/// Laveste kvalitet for en rep som bare så vidt nådde bunnen (innenfor toleransen).
const SHALLOW_REP_QUALITY: f64 = 0.8;

/// Armhevinger: venter → opp (strake armer, rett kropp) → ned (bøyd) → opp teller.
#[derive(Debug, Clone)]
pub struct PushupGrader {
    elbow_extended: f64,
    elbow_bent: f64,
    elbow_tolerance: f64,
    visibility: f64,
    validator: PushupFormValidator,
    scoring: ScoringConfig,
    state: ExerciseSessionState,
    // dypeste albuevinkel i pågående rep
    min_elbow: f64,
}

impl PushupGrader {
    pub fn new(profile: &CalibrationProfile, cfg: &PushupThresholds, scoring: ScoringConfig) -> Self {
        let adj = profile.adjustments();
        Self {
            elbow_extended: cfg.elbow_extended + adj.pushup_elbow_extended,
            elbow_bent: cfg.elbow_bent + adj.pushup_elbow_bent,
            elbow_tolerance: cfg.elbow_tolerance.max(0.0),
            visibility: profile.visibility().critical_joints,
            validator: PushupFormValidator::new(cfg.body_straight + adj.pushup_body_straight),
            scoring,
            state: ExerciseSessionState::default(),
            min_elbow: 180.0,
        }
    }

    pub fn elbow_angle(frame: &PoseFrame) -> f64 {
        frame.mean_angle(LEFT_ARM, RIGHT_ARM)
    }

    fn bottom_threshold(&self) -> f64 {
        self.elbow_bent + self.elbow_tolerance
    }

    /// 1.0 ved nominell bunn, lineært ned mot 0.8 ved toleransegrensen.
    fn rep_quality(&self) -> f64 {
        if self.min_elbow <= self.elbow_bent || self.elbow_tolerance <= 0.0 {
            return 1.0;
        }
        let over = ((self.min_elbow - self.elbow_bent) / self.elbow_tolerance).min(1.0);
        1.0 - over * (1.0 - SHALLOW_REP_QUALITY)
    }
}

impl ExerciseGrader for PushupGrader {
    fn exercise(&self) -> Exercise {
        Exercise::Pushup
    }

    fn grade_pose(&mut self, frame: &PoseFrame) -> GradingEvent {
        if self.state.phase == RepPhase::Finished {
            return GradingEvent::NoChange;
        }
        if !frame.all_visible(&REQUIRED, self.visibility) {
            self.min_elbow = 180.0;
            return self.state.invalid_pose();
        }

        let elbow = Self::elbow_angle(frame);

        // Kroppsfeil under en åpen syklus ugyldiggjør repen og starter på nytt.
        if self.state.phase != RepPhase::WaitingForStart {
            if let Some(fault) = self.validator.check(frame) {
                log::debug!("armhevning: {:?} (kropp {:.0}°)", fault, body_line_angle(frame));
                self.state.clear_in_flight();
                self.min_elbow = 180.0;
                self.state.last_feedback = fault.feedback().to_string();
                return GradingEvent::IncorrectForm(fault.feedback().to_string());
            }
        }

        match self.state.phase {
            RepPhase::WaitingForStart => {
                if elbow >= self.elbow_extended && self.validator.check(frame).is_none() {
                    self.state.last_feedback = "Lower your body".to_string();
                    return self.state.enter(RepPhase::Up);
                }
                GradingEvent::NoChange
            }
            RepPhase::Up => {
                if elbow <= self.bottom_threshold() {
                    self.min_elbow = elbow;
                    self.state.last_feedback = "Push up".to_string();
                    return self.state.enter(RepPhase::Down);
                }
                GradingEvent::NoChange
            }
            RepPhase::Down => {
                self.min_elbow = self.min_elbow.min(elbow);
                if elbow >= self.elbow_extended {
                    // kroppsfeil har allerede avbrutt syklusen over, så alt som når hit telles
                    self.state.phase = RepPhase::Up;
                    let q = self.rep_quality();
                    log::info!("armhevning #{} (kvalitet {:.2})", self.state.rep_count + 1, q);
                    self.min_elbow = 180.0;
                    return self.state.count_rep(q);
                }
                GradingEvent::NoChange
            }
            RepPhase::Finished => GradingEvent::NoChange,
        }
    }

    fn reset_state(&mut self) {
        self.state.clear_in_flight();
        self.min_elbow = 180.0;
    }

    fn state(&self) -> &ExerciseSessionState {
        &self.state
    }

    fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    fn finish(&mut self) {
        self.reset_state();
        self.state.phase = RepPhase::Finished;
    }
}
