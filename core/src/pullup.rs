use crate::calibration::CalibrationProfile;
use crate::config::{PullupThresholds, ScoringConfig};
use crate::form::{FormFault, PullupFormValidator};
use crate::grading::{Exercise, ExerciseGrader, ExerciseSessionState, GradingEvent, RepPhase};
use crate::pose::{Joint, PoseFrame};

const REQUIRED: [Joint; 11] = [
    Joint::Nose,
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

const SHALLOW_REP_QUALITY: f64 = 0.8;

/// Pull-ups: venter → ned (dødheng) → opp (haka over stanga) → ned teller.
/// Kipping og bøyd kropp flagger repen, men stopper ikke maskinen.
#[derive(Debug, Clone)]
pub struct PullupGrader {
    elbow_extended: f64,
    elbow_flexed: f64,
    chin_margin: f64,
    visibility: f64,
    validator: PullupFormValidator,
    scoring: ScoringConfig,
    state: ExerciseSessionState,
    first_fault: Option<FormFault>,
    min_elbow: f64,
}

impl PullupGrader {
    pub fn new(profile: &CalibrationProfile, cfg: &PullupThresholds, scoring: ScoringConfig) -> Self {
        let adj = profile.adjustments();
        Self {
            elbow_extended: cfg.elbow_extended + adj.pullup_elbow_extended,
            elbow_flexed: cfg.elbow_flexed,
            chin_margin: cfg.chin_margin,
            visibility: profile.visibility().critical_joints,
            validator: PullupFormValidator::new(cfg.body_straight + adj.pullup_body_straight, cfg.kip_ratio),
            scoring,
            state: ExerciseSessionState::default(),
            first_fault: None,
            min_elbow: 180.0,
        }
    }

    pub fn elbow_angle(frame: &PoseFrame) -> f64 {
        frame.mean_angle(LEFT_ARM, RIGHT_ARM)
    }

    /// Nese over snitt-håndledd minus margin (y vokser nedover i bildet).
    pub fn chin_over_bar(&self, frame: &PoseFrame) -> bool {
        match (
            frame.point(Joint::Nose),
            frame.mean_y(Joint::LeftWrist, Joint::RightWrist),
        ) {
            (Some(nose), Some(wrist_y)) => nose.y < wrist_y - self.chin_margin,
            _ => false,
        }
    }

    fn open_rep(&mut self, frame: &PoseFrame) {
        self.validator.begin_rep(frame);
        self.state.fault = false;
        self.first_fault = None;
        self.min_elbow = 180.0;
    }

    fn flag(&mut self, frame: &PoseFrame) {
        if let Some(fault) = self.validator.check(frame) {
            if !self.state.fault {
                log::debug!(
                    "pull-up: {:?} (kip {:.2})",
                    fault,
                    self.validator.kip_displacement(frame).unwrap_or(0.0)
                );
                self.first_fault = Some(fault);
                self.state.last_feedback = fault.feedback().to_string();
            }
            self.state.fault = true;
        }
    }
}

impl ExerciseGrader for PullupGrader {
    fn exercise(&self) -> Exercise {
        Exercise::Pullup
    }

    fn grade_pose(&mut self, frame: &PoseFrame) -> GradingEvent {
        if self.state.phase == RepPhase::Finished {
            return GradingEvent::NoChange;
        }
        if !frame.all_visible(&REQUIRED, self.visibility) {
            self.validator.reset();
            self.first_fault = None;
            self.min_elbow = 180.0;
            return self.state.invalid_pose();
        }

        let elbow = Self::elbow_angle(frame);

        match self.state.phase {
            RepPhase::WaitingForStart => {
                if elbow >= self.elbow_extended {
                    self.open_rep(frame);
                    self.state.last_feedback = "Pull up".to_string();
                    return self.state.enter(RepPhase::Down);
                }
                GradingEvent::NoChange
            }
            RepPhase::Down => {
                self.flag(frame);
                self.min_elbow = self.min_elbow.min(elbow);
                if self.chin_over_bar(frame) {
                    self.state.last_feedback = "Lower to a full hang".to_string();
                    return self.state.enter(RepPhase::Up);
                }
                GradingEvent::NoChange
            }
            RepPhase::Up => {
                self.flag(frame);
                self.min_elbow = self.min_elbow.min(elbow);
                if elbow >= self.elbow_extended {
                    let event = if self.state.fault {
                        let msg = self
                            .first_fault
                            .map(|f| f.feedback())
                            .unwrap_or("Invalid Rep");
                        self.state.reject_rep(msg)
                    } else {
                        let q = if self.min_elbow <= self.elbow_flexed {
                            1.0
                        } else {
                            SHALLOW_REP_QUALITY
                        };
                        log::info!("pull-up #{} (kvalitet {:.2})", self.state.rep_count + 1, q);
                        self.state.count_rep(q)
                    };
                    // tilbake i dødheng: ny referanse for neste rep
                    self.state.phase = RepPhase::Down;
                    self.open_rep(frame);
                    return event;
                }
                GradingEvent::NoChange
            }
            RepPhase::Finished => GradingEvent::NoChange,
        }
    }

    fn reset_state(&mut self) {
        self.state.clear_in_flight();
        self.validator.reset();
        self.first_fault = None;
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
