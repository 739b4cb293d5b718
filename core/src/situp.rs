use crate::calibration::CalibrationProfile;
use crate::config::{ScoringConfig, SitupThresholds};
use crate::form::{FormFault, SitupFormValidator};
use crate::grading::{Exercise, ExerciseGrader, ExerciseSessionState, GradingEvent, RepPhase};
use crate::pose::{Joint, PoseFrame};

const REQUIRED: [Joint; 12] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftEar,
    Joint::RightEar,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

const LEFT_HIP: [Joint; 3] = [Joint::LeftShoulder, Joint::LeftHip, Joint::LeftKnee];
const RIGHT_HIP: [Joint; 3] = [Joint::RightShoulder, Joint::RightHip, Joint::RightKnee];

/// Hvor mye dypere enn opp-terskelen som gir full kvalitet.
const FULL_DEPTH_MARGIN: f64 = 10.0;
const PARTIAL_DEPTH_QUALITY: f64 = 0.85;

/// Sit-ups: venter → ned (liggende) → opp teller, gated av formvalidatoren.
#[derive(Debug, Clone)]
pub struct SitupGrader {
    hip_down: f64,
    hip_up: f64,
    visibility: f64,
    validator: SitupFormValidator,
    scoring: ScoringConfig,
    state: ExerciseSessionState,
    first_fault: Option<FormFault>,
}

impl SitupGrader {
    pub fn new(profile: &CalibrationProfile, cfg: &SitupThresholds, scoring: ScoringConfig) -> Self {
        let adj = profile.adjustments();
        Self {
            hip_down: cfg.hip_down + adj.situp_hip_down,
            hip_up: cfg.hip_up + adj.situp_hip_up,
            visibility: profile.visibility().critical_joints,
            validator: SitupFormValidator::new(cfg.hands_ratio, cfg.foot_lift_ratio),
            scoring,
            state: ExerciseSessionState::default(),
            first_fault: None,
        }
    }

    pub fn hip_angle(frame: &PoseFrame) -> f64 {
        frame.mean_angle(LEFT_HIP, RIGHT_HIP)
    }

    /// Ny ankelreferanse ved inngang til ned-fasen. Feilflagget beholdes:
    /// bare en talt eller avvist rep nullstiller det.
    fn open_rep(&mut self, frame: &PoseFrame) {
        self.validator.begin_rep(frame);
    }

    fn flag(&mut self, frame: &PoseFrame, hip: f64) {
        if let Some(fault) = self.validator.check(frame) {
            if !self.state.fault {
                log::debug!("sit-up: {:?} (hofte {:.0}°)", fault, hip);
                self.first_fault = Some(fault);
                self.state.last_feedback = fault.feedback().to_string();
            }
            self.state.fault = true;
        }
    }
}

impl ExerciseGrader for SitupGrader {
    fn exercise(&self) -> Exercise {
        Exercise::Situp
    }

    fn grade_pose(&mut self, frame: &PoseFrame) -> GradingEvent {
        if self.state.phase == RepPhase::Finished {
            return GradingEvent::NoChange;
        }
        if !frame.all_visible(&REQUIRED, self.visibility) {
            self.validator.reset();
            self.first_fault = None;
            return self.state.invalid_pose();
        }

        let hip = Self::hip_angle(frame);

        match self.state.phase {
            RepPhase::WaitingForStart => {
                if hip >= self.hip_down {
                    self.open_rep(frame);
                    self.state.last_feedback = "Sit up".to_string();
                    return self.state.enter(RepPhase::Down);
                }
                GradingEvent::NoChange
            }
            RepPhase::Down => {
                self.flag(frame, hip);
                if hip <= self.hip_up {
                    self.state.phase = RepPhase::Up;
                    if self.state.fault {
                        let msg = self
                            .first_fault
                            .take()
                            .map(|f| f.feedback())
                            .unwrap_or("Invalid Rep");
                        return self.state.reject_rep(msg);
                    }
                    let q = if hip <= self.hip_up - FULL_DEPTH_MARGIN {
                        1.0
                    } else {
                        PARTIAL_DEPTH_QUALITY
                    };
                    log::info!("sit-up #{} (kvalitet {:.2})", self.state.rep_count + 1, q);
                    return self.state.count_rep(q);
                }
                GradingEvent::NoChange
            }
            RepPhase::Up => {
                // hender og føtter gjelder også på vei ned
                self.flag(frame, hip);
                if hip >= self.hip_down {
                    self.open_rep(frame);
                    self.state.last_feedback = "Sit up".to_string();
                    return self.state.enter(RepPhase::Down);
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
