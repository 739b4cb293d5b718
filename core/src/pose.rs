use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{from_json_path, GradeError};

/// Vektorer kortere enn dette regnes som degenererte.
const DEGENERATE_EPS: f64 = 1e-9;

/// Nøytral vinkel når geometrien ikke lar seg beregne (manglende/ugyldige punkter).
pub const NEUTRAL_ANGLE_DEG: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    Neck,
    Root,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub const ALL: [Joint; 19] = [
        Joint::Nose,
        Joint::Neck,
        Joint::Root,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
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
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    /// 17-punkts layout (COCO / MoveNet). Neck og root finnes ikke der.
    pub fn from_keypoint_index(index: usize) -> Option<Joint> {
        match index {
            0 => Some(Joint::Nose),
            1 => Some(Joint::LeftEye),
            2 => Some(Joint::RightEye),
            3 => Some(Joint::LeftEar),
            4 => Some(Joint::RightEar),
            5 => Some(Joint::LeftShoulder),
            6 => Some(Joint::RightShoulder),
            7 => Some(Joint::LeftElbow),
            8 => Some(Joint::RightElbow),
            9 => Some(Joint::LeftWrist),
            10 => Some(Joint::RightWrist),
            11 => Some(Joint::LeftHip),
            12 => Some(Joint::RightHip),
            13 => Some(Joint::LeftKnee),
            14 => Some(Joint::RightKnee),
            15 => Some(Joint::LeftAnkle),
            16 => Some(Joint::RightAnkle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Ett detektert ledd: normaliserte koordinater [0,1] + konfidens [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointPoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl JointPoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    pub fn location(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Vinkel i b mellom b→a og b→c, i grader [0, 180].
/// atan2(|kryss|, prikk) er numerisk stabil nær 0° og 180°.
pub fn angle_deg(a: Point2, b: Point2, c: Point2) -> f64 {
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return NEUTRAL_ANGLE_DEG;
    }
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);
    if v1x.hypot(v1y) < DEGENERATE_EPS || v2x.hypot(v2y) < DEGENERATE_EPS {
        return NEUTRAL_ANGLE_DEG;
    }
    let cross = v1x * v2y - v1y * v2x;
    let dot = v1x * v2x + v1y * v2y;
    let deg = cross.abs().atan2(dot).to_degrees();
    if deg.is_finite() {
        deg.clamp(0.0, 180.0)
    } else {
        NEUTRAL_ANGLE_DEG
    }
}

pub fn distance(a: Point2, b: Point2) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

pub fn midpoint(a: Point2, b: Point2) -> Point2 {
    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Ett inferens-tick fra pose-estimatoren. Ledd som mangler i kartet
/// behandles som "ikke detektert" (konfidens 0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// sekunder, levert av kallende pipeline
    pub timestamp: f64,
    #[serde(default)]
    pub joints: HashMap<Joint, JointPoint>,
}

impl PoseFrame {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            joints: HashMap::new(),
        }
    }

    pub fn with_joint(mut self, joint: Joint, x: f64, y: f64, confidence: f64) -> Self {
        self.joints.insert(joint, JointPoint::new(x, y, confidence));
        self
    }

    /// Bygg fra 17 keypoints (x, y, konfidens) i COCO-rekkefølge. Ekstra punkter ignoreres.
    pub fn from_keypoints(timestamp: f64, keypoints: &[(f64, f64, f64)]) -> Self {
        let joints = keypoints
            .iter()
            .enumerate()
            .filter_map(|(i, &(x, y, c))| {
                Joint::from_keypoint_index(i).map(|j| (j, JointPoint::new(x, y, c)))
            })
            .collect();
        Self { timestamp, joints }
    }

    pub fn from_json(json_in: &str) -> Result<Self, GradeError> {
        from_json_path("PoseFrame", json_in)
    }

    pub fn point(&self, joint: Joint) -> Option<JointPoint> {
        self.joints.get(&joint).copied()
    }

    pub fn location(&self, joint: Joint) -> Option<Point2> {
        self.point(joint).map(|p| p.location())
    }

    pub fn confidence(&self, joint: Joint) -> f64 {
        self.point(joint).map(|p| p.confidence).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Vinkel i `b`. Gir nøytral 180° hvis et av leddene mangler.
    pub fn angle(&self, a: Joint, b: Joint, c: Joint) -> f64 {
        match (self.location(a), self.location(b), self.location(c)) {
            (Some(pa), Some(pb), Some(pc)) => angle_deg(pa, pb, pc),
            _ => NEUTRAL_ANGLE_DEG,
        }
    }

    pub fn distance(&self, a: Joint, b: Joint) -> Option<f64> {
        Some(distance(self.location(a)?, self.location(b)?))
    }

    pub fn midpoint(&self, a: Joint, b: Joint) -> Option<Point2> {
        Some(midpoint(self.location(a)?, self.location(b)?))
    }

    pub fn all_visible(&self, joints: &[Joint], threshold: f64) -> bool {
        joints.iter().all(|j| match self.point(*j) {
            Some(p) => p.confidence >= threshold,
            None => false,
        })
    }

    /// Snitt-konfidens over oppgitte ledd (manglende teller som 0).
    pub fn average_confidence(&self, joints: &[Joint]) -> f64 {
        if joints.is_empty() {
            return 0.0;
        }
        joints.iter().map(|j| self.confidence(*j)).sum::<f64>() / joints.len() as f64
    }

    /// Snitt av venstre/høyre vinkel, f.eks. albue.
    pub(crate) fn mean_angle(&self, left: [Joint; 3], right: [Joint; 3]) -> f64 {
        let l = self.angle(left[0], left[1], left[2]);
        let r = self.angle(right[0], right[1], right[2]);
        (l + r) / 2.0
    }

    pub(crate) fn mean_y(&self, a: Joint, b: Joint) -> Option<f64> {
        Some((self.point(a)?.y + self.point(b)?.y) / 2.0)
    }
}
