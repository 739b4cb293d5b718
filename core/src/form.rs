use serde::{Deserialize, Serialize};

use crate::pose::{Joint, PoseFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFault {
    BodyNotStraight,
    HandsAwayFromHead,
    FeetLifted,
    Kipping,
}

impl FormFault {
    pub fn feedback(&self) -> &'static str {
        match self {
            FormFault::BodyNotStraight => "Keep body straight!",
            FormFault::HandsAwayFromHead => "Keep hands behind your head",
            FormFault::FeetLifted => "Keep feet on the ground",
            FormFault::Kipping => "Avoid kipping - control the movement",
        }
    }
}

const LEFT_BODY: [Joint; 3] = [Joint::LeftShoulder, Joint::LeftHip, Joint::LeftKnee];
const RIGHT_BODY: [Joint; 3] = [Joint::RightShoulder, Joint::RightHip, Joint::RightKnee];

/// Snitt av skulder–hofte–kne på begge sider.
pub fn body_line_angle(frame: &PoseFrame) -> f64 {
    frame.mean_angle(LEFT_BODY, RIGHT_BODY)
}

/// Armhevinger: rett kropp hele tiden.
#[derive(Debug, Clone)]
pub struct PushupFormValidator {
    body_straight: f64,
}

impl PushupFormValidator {
    pub fn new(body_straight: f64) -> Self {
        Self { body_straight }
    }

    pub fn check(&self, frame: &PoseFrame) -> Option<FormFault> {
        (body_line_angle(frame) < self.body_straight).then_some(FormFault::BodyNotStraight)
    }
}

/// Sit-ups: hender ved hodet og føtter i bakken.
/// Ankelreferansen settes ved inngang til ned-fasen og tømmes ved reset.
#[derive(Debug, Clone)]
pub struct SitupFormValidator {
    hands_ratio: f64,
    foot_lift_ratio: f64,
    reference_ankle_y: Option<f64>,
}

impl SitupFormValidator {
    pub fn new(hands_ratio: f64, foot_lift_ratio: f64) -> Self {
        Self {
            hands_ratio,
            foot_lift_ratio,
            reference_ankle_y: None,
        }
    }

    pub fn begin_rep(&mut self, frame: &PoseFrame) {
        self.reference_ankle_y = frame.mean_y(Joint::LeftAnkle, Joint::RightAnkle);
    }

    pub fn reference_ankle_y(&self) -> Option<f64> {
        self.reference_ankle_y
    }

    pub fn reset(&mut self) {
        self.reference_ankle_y = None;
    }

    pub fn check(&self, frame: &PoseFrame) -> Option<FormFault> {
        if let Some(shoulder_width) = frame.distance(Joint::LeftShoulder, Joint::RightShoulder) {
            let left = frame.distance(Joint::LeftWrist, Joint::LeftEar);
            let right = frame.distance(Joint::RightWrist, Joint::RightEar);
            let worst = left.into_iter().chain(right).fold(0.0_f64, f64::max);
            if worst > self.hands_ratio * shoulder_width {
                return Some(FormFault::HandsAwayFromHead);
            }
        }

        if let (Some(reference), Some(ankle_y)) = (
            self.reference_ankle_y,
            frame.mean_y(Joint::LeftAnkle, Joint::RightAnkle),
        ) {
            let thigh = match (
                frame.distance(Joint::LeftHip, Joint::LeftKnee),
                frame.distance(Joint::RightHip, Joint::RightKnee),
            ) {
                (Some(l), Some(r)) => (l + r) / 2.0,
                (Some(d), None) | (None, Some(d)) => d,
                (None, None) => return None,
            };
            if (ankle_y - reference).abs() > self.foot_lift_ratio * thigh {
                return Some(FormFault::FeetLifted);
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HangReference {
    hip_offset: f64, // hofteY − skulderY ved dødheng
    torso: f64,
}

/// Pull-ups: rett kropp og ingen kipping. Feil flagges uten å nullstille maskinen.
#[derive(Debug, Clone)]
pub struct PullupFormValidator {
    body_straight: f64,
    kip_ratio: f64,
    reference: Option<HangReference>,
}

impl PullupFormValidator {
    pub fn new(body_straight: f64, kip_ratio: f64) -> Self {
        Self {
            body_straight,
            kip_ratio,
            reference: None,
        }
    }

    /// Lagre hofte/skulder-referansen ved dødheng.
    pub fn begin_rep(&mut self, frame: &PoseFrame) {
        self.reference = match (
            frame.mean_y(Joint::LeftShoulder, Joint::RightShoulder),
            frame.mean_y(Joint::LeftHip, Joint::RightHip),
        ) {
            (Some(sh), Some(hip)) if (hip - sh).abs() > f64::EPSILON => Some(HangReference {
                hip_offset: hip - sh,
                torso: (hip - sh).abs(),
            }),
            _ => None,
        };
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn reset(&mut self) {
        self.reference = None;
    }

    /// Hofteforskyvning relativt til skulder, som andel av torso ved dødheng.
    pub fn kip_displacement(&self, frame: &PoseFrame) -> Option<f64> {
        let r = self.reference?;
        let sh = frame.mean_y(Joint::LeftShoulder, Joint::RightShoulder)?;
        let hip = frame.mean_y(Joint::LeftHip, Joint::RightHip)?;
        Some(((hip - sh) - r.hip_offset).abs() / r.torso)
    }

    pub fn check(&self, frame: &PoseFrame) -> Option<FormFault> {
        if body_line_angle(frame) < self.body_straight {
            return Some(FormFault::BodyNotStraight);
        }
        match self.kip_displacement(frame) {
            Some(d) if d > self.kip_ratio => Some(FormFault::Kipping),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_body(hip_y: f64) -> PoseFrame {
        PoseFrame::new(0.0)
            .with_joint(Joint::LeftShoulder, 0.4, 0.4, 0.9)
            .with_joint(Joint::RightShoulder, 0.6, 0.4, 0.9)
            .with_joint(Joint::LeftHip, 0.4, hip_y, 0.9)
            .with_joint(Joint::RightHip, 0.6, hip_y, 0.9)
            .with_joint(Joint::LeftKnee, 0.4, hip_y + 0.2, 0.9)
            .with_joint(Joint::RightKnee, 0.6, hip_y + 0.2, 0.9)
    }

    #[test]
    fn kipping_needs_reference() {
        let mut v = PullupFormValidator::new(165.0, 0.5);
        assert_eq!(v.check(&straight_body(0.5)), None);
        v.begin_rep(&straight_body(0.7));
        assert_eq!(v.check(&straight_body(0.7)), None);
        assert_eq!(v.check(&straight_body(0.45)), Some(FormFault::Kipping));
        v.reset();
        assert!(!v.has_reference());
        assert_eq!(v.check(&straight_body(0.5)), None);
    }

    #[test]
    fn bent_body_is_fault() {
        let v = PushupFormValidator::new(165.0);
        let bent = straight_body(0.6)
            .with_joint(Joint::LeftKnee, 0.6, 0.6, 0.9)
            .with_joint(Joint::RightKnee, 0.8, 0.6, 0.9);
        assert_eq!(v.check(&bent), Some(FormFault::BodyNotStraight));
        assert_eq!(v.check(&straight_body(0.6)), None);
    }
}
