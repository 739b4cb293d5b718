use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::config::GradingConfig;
use crate::grading::Exercise;
use crate::pose::{distance, Joint, Point2, PoseFrame};

/// Ledd må være over denne konfidensen for å telle som synlig i innrammingen.
const FRAMING_CONFIDENCE: f64 = 0.7;

/// Tilsynelatende avstand = SIZE_TO_DISTANCE / kroppsstørrelse (normaliserte enheter).
/// Kroppsstørrelse 0.2 tilsvarer avstand 1.5.
const SIZE_TO_DISTANCE: f64 = 0.3;

const OPTIMAL_DISTANCE_TOLERANCE: f64 = 0.1;
const OPTIMAL_CENTER_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramingStatus {
    Optimal,
    Acceptable,
    TooClose,
    TooFar,
    TooLeft,
    TooRight,
    TooHigh,
    TooLow,
    Unknown,
}

impl FramingStatus {
    pub fn instruction(&self) -> &'static str {
        match self {
            FramingStatus::Optimal => "Perfect positioning!",
            FramingStatus::Acceptable => "Good positioning - ready to start",
            FramingStatus::TooClose => "Step back from the device",
            FramingStatus::TooFar => "Move closer to the device",
            FramingStatus::TooLeft => "Move to the right",
            FramingStatus::TooRight => "Move to the left",
            FramingStatus::TooHigh => "Lower your position or raise the device",
            FramingStatus::TooLow => "Raise your position or lower the device",
            FramingStatus::Unknown => "Position yourself in front of the camera",
        }
    }

    pub fn is_acceptable(&self) -> bool {
        matches!(self, FramingStatus::Optimal | FramingStatus::Acceptable)
    }
}

/// Øvelsesspesifikke mål for innramming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetFraming {
    pub exercise: Exercise,
    pub body_parts: Vec<Joint>,
    pub optimal_distance: f64,
    pub distance_range: RangeInclusive<f64>,
    pub vertical_center: RangeInclusive<f64>,
    pub horizontal_center: RangeInclusive<f64>,
    pub min_body_coverage: f64,
}

impl TargetFraming {
    pub fn for_exercise(exercise: Exercise) -> Self {
        use Joint::*;
        match exercise {
            Exercise::Pushup => Self {
                exercise,
                body_parts: vec![
                    LeftShoulder, RightShoulder, LeftElbow, RightElbow, LeftWrist, RightWrist,
                    LeftHip, RightHip, LeftAnkle, RightAnkle,
                ],
                optimal_distance: 1.5,
                distance_range: 1.2..=2.0,
                vertical_center: 0.4..=0.6,
                horizontal_center: 0.2..=0.8,
                min_body_coverage: 0.7,
            },
            Exercise::Situp => Self {
                exercise,
                body_parts: vec![
                    LeftShoulder, RightShoulder, LeftElbow, RightElbow, LeftHip, RightHip,
                    LeftKnee, RightKnee, Nose,
                ],
                optimal_distance: 1.4,
                distance_range: 1.1..=1.9,
                vertical_center: 0.25..=0.75,
                horizontal_center: 0.2..=0.8,
                min_body_coverage: 0.65,
            },
            Exercise::Pullup => Self {
                exercise,
                body_parts: vec![
                    LeftShoulder, RightShoulder, LeftElbow, RightElbow, LeftWrist, RightWrist,
                    LeftHip, RightHip, LeftKnee, RightKnee, Nose,
                ],
                optimal_distance: 1.6,
                distance_range: 1.3..=2.2,
                vertical_center: 0.15..=0.85,
                horizontal_center: 0.2..=0.8,
                min_body_coverage: 0.75,
            },
            // løping bruker ikke pose-innramming
            Exercise::Run => Self {
                exercise,
                body_parts: Vec::new(),
                optimal_distance: 1.0,
                distance_range: 0.0..=f64::INFINITY,
                vertical_center: 0.0..=1.0,
                horizontal_center: 0.0..=1.0,
                min_body_coverage: 0.0,
            },
        }
    }
}

/// Snitt av synlige skuldre/hofter. None uten noen synlige.
fn body_center(frame: &PoseFrame) -> Option<Point2> {
    let pts: Vec<Point2> = [Joint::LeftShoulder, Joint::RightShoulder, Joint::LeftHip, Joint::RightHip]
        .iter()
        .filter_map(|j| frame.point(*j))
        .filter(|p| p.confidence > FRAMING_CONFIDENCE)
        .map(|p| p.location())
        .collect();
    if pts.is_empty() {
        return None;
    }
    let n = pts.len() as f64;
    Some(Point2::new(
        pts.iter().map(|p| p.x).sum::<f64>() / n,
        pts.iter().map(|p| p.y).sum::<f64>() / n,
    ))
}

/// (skulderbredde + hoftebredde + torso) / 3. Torso måles langs kroppen,
/// så en horisontal kropp (armhevinger sett fra siden) gir fortsatt en størrelse.
fn body_size(frame: &PoseFrame) -> Option<f64> {
    let shoulders = frame.distance(Joint::LeftShoulder, Joint::RightShoulder)?;
    let hips = frame.distance(Joint::LeftHip, Joint::RightHip)?;
    let torso = distance(
        frame.midpoint(Joint::LeftShoulder, Joint::RightShoulder)?,
        frame.midpoint(Joint::LeftHip, Joint::RightHip)?,
    );
    let size = (shoulders + hips + torso) / 3.0;
    (size > f64::EPSILON).then_some(size)
}

pub fn apparent_distance(frame: &PoseFrame) -> Option<f64> {
    body_size(frame).map(|s| SIZE_TO_DISTANCE / s)
}

fn coverage(frame: &PoseFrame, target: &TargetFraming) -> f64 {
    if target.body_parts.is_empty() {
        return 1.0;
    }
    let visible = target
        .body_parts
        .iter()
        .filter(|j| frame.confidence(**j) > FRAMING_CONFIDENCE)
        .count();
    visible as f64 / target.body_parts.len() as f64
}

/// Ren funksjon av gjeldende frame. Avstandsavvik har forrang foran sideveis/vertikale avvik.
pub fn evaluate_framing(frame: &PoseFrame, target: &TargetFraming) -> FramingStatus {
    let (Some(center), Some(dist)) = (body_center(frame), apparent_distance(frame)) else {
        return FramingStatus::Unknown;
    };

    if coverage(frame, target) < target.min_body_coverage {
        return framing_issue(center, dist, target);
    }

    if dist > *target.distance_range.end() {
        return FramingStatus::TooFar;
    }
    if dist < *target.distance_range.start() {
        return FramingStatus::TooClose;
    }
    if center.x < *target.horizontal_center.start() {
        return FramingStatus::TooLeft;
    }
    if center.x > *target.horizontal_center.end() {
        return FramingStatus::TooRight;
    }
    if center.y < *target.vertical_center.start() {
        return FramingStatus::TooHigh;
    }
    if center.y > *target.vertical_center.end() {
        return FramingStatus::TooLow;
    }

    let near_optimal = (dist - target.optimal_distance).abs() < OPTIMAL_DISTANCE_TOLERANCE;
    let centered = (center.x - 0.5).abs() < OPTIMAL_CENTER_TOLERANCE
        && (center.y - 0.5).abs() < OPTIMAL_CENTER_TOLERANCE;
    if near_optimal && centered {
        FramingStatus::Optimal
    } else {
        FramingStatus::Acceptable
    }
}

/// For lite av kroppen synlig: gjett årsaken med slakkere grenser.
fn framing_issue(center: Point2, dist: f64, target: &TargetFraming) -> FramingStatus {
    if dist > target.distance_range.end() * 1.2 {
        FramingStatus::TooFar
    } else if dist < target.distance_range.start() * 0.8 {
        FramingStatus::TooClose
    } else if center.x < 0.2 {
        FramingStatus::TooLeft
    } else if center.x > 0.8 {
        FramingStatus::TooRight
    } else if center.y < 0.2 {
        FramingStatus::TooHigh
    } else if center.y > 0.8 {
        FramingStatus::TooLow
    } else {
        FramingStatus::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositioningState {
    pub status: FramingStatus,
    pub hold_progress: f64,
    pub ready: bool,
}

/// Tilstandsmaskin over `evaluate_framing`: posisjonen må holdes akseptabel
/// i `hold_seconds` (målt i frame-tidsstempler) før innsamling kan starte.
#[derive(Debug, Clone)]
pub struct PositioningValidator {
    target: TargetFraming,
    hold_seconds: f64,
    hold_started: Option<f64>,
    ready: bool,
}

impl PositioningValidator {
    pub fn new(target: TargetFraming, hold_seconds: f64) -> Self {
        Self {
            target,
            hold_seconds: hold_seconds.max(0.0),
            hold_started: None,
            ready: false,
        }
    }

    /// Mål for øvelsen, holdetid fra konfig.
    pub fn for_exercise(exercise: Exercise, config: &GradingConfig) -> Self {
        Self::new(TargetFraming::for_exercise(exercise), config.positioning_hold_seconds)
    }

    pub fn target(&self) -> &TargetFraming {
        &self.target
    }

    pub fn update(&mut self, frame: &PoseFrame) -> PositioningState {
        let status = evaluate_framing(frame, &self.target);
        if !status.is_acceptable() {
            if self.hold_started.is_some() {
                log::debug!("innramming tapt: {:?}", status);
            }
            self.hold_started = None;
            self.ready = false;
            return PositioningState {
                status,
                hold_progress: 0.0,
                ready: false,
            };
        }

        let started = *self.hold_started.get_or_insert(frame.timestamp);
        let held = (frame.timestamp - started).max(0.0);
        let hold_progress = if self.hold_seconds <= 0.0 {
            1.0
        } else {
            (held / self.hold_seconds).min(1.0)
        };
        if hold_progress >= 1.0 && !self.ready {
            log::info!("posisjon holdt i {:.1}s, klar for innsamling", held);
        }
        self.ready = hold_progress >= 1.0;
        PositioningState {
            status,
            hold_progress,
            ready: self.ready,
        }
    }

    pub fn reset(&mut self) {
        self.hold_started = None;
        self.ready = false;
    }
}
