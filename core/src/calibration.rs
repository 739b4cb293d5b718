use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::framing::TargetFraming;
use crate::grading::Exercise;
use crate::metrics;
use crate::pose::{distance, Joint, PoseFrame};

/// Ledd teller som "sett" over denne konfidensen når kvalitet vurderes.
const VISIBLE_CONFIDENCE: f64 = 0.7;

// Plassering (kun pose-data, ingen bevegelsessensor)
const STABILITY_THRESHOLD: f64 = 0.8;
const TRIPOD_STABILITY_THRESHOLD: f64 = 0.95;
const HANDHELD_SCALE_VARIABILITY: f64 = 0.15;
const ELEVATED_HEIGHT_MIN: f64 = 0.5;

/// Typisk kroppshøyde (nese→ankel) i normaliserte bildeenheter.
const REFERENCE_BODY_HEIGHT: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Invalid,
}

impl QualityTier {
    /// score 0–100
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => QualityTier::Excellent,
            s if s >= 80.0 => QualityTier::Good,
            s if s >= 70.0 => QualityTier::Acceptable,
            s if s >= 60.0 => QualityTier::Poor,
            _ => QualityTier::Invalid,
        }
    }

    /// Poor/Invalid kan fortsatt brukes ("bruk likevel"), men med redusert tillit.
    pub fn is_usable(&self) -> bool {
        matches!(
            self,
            QualityTier::Excellent | QualityTier::Good | QualityTier::Acceptable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "excellent",
            QualityTier::Good => "good",
            QualityTier::Acceptable => "acceptable",
            QualityTier::Poor => "poor",
            QualityTier::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMode {
    Quick,
    Standard,
    Full,
}

impl CalibrationMode {
    pub fn required_frames(&self) -> usize {
        match self {
            CalibrationMode::Quick => 60,
            CalibrationMode::Standard => 90,
            CalibrationMode::Full => 150,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        match self {
            CalibrationMode::Quick => 0.6,
            CalibrationMode::Standard => 0.55,
            CalibrationMode::Full => 0.5,
        }
    }

    /// Neste pass etter en kalibrering med gitt kvalitet: dårligere resultat gir lengre innsamling.
    pub fn after(tier: QualityTier) -> Self {
        match tier {
            QualityTier::Excellent | QualityTier::Good => CalibrationMode::Quick,
            QualityTier::Acceptable => CalibrationMode::Standard,
            QualityTier::Poor | QualityTier::Invalid => CalibrationMode::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DevicePlacement {
    Ground { angle: f64 },
    Elevated { height: f64, angle: f64 },
    Tripod { height: f64, angle: f64 },
    Handheld,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceGeometry {
    pub placement: DevicePlacement,
    pub height: f64,   // meter (estimat)
    pub angle: f64,    // grader
    pub distance: f64, // meter (estimat)
    pub stability: f64, // 0–1
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyProportions {
    pub height: f64,
    pub arm_span: f64,
    pub torso_length: f64,
    pub leg_length: f64,
}

/// Additive vinkelforskyvninger (grader) som legges på terskler før sammenligning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleAdjustments {
    pub pushup_elbow_extended: f64,
    pub pushup_elbow_bent: f64,
    pub pushup_body_straight: f64,
    pub situp_hip_down: f64,
    pub situp_hip_up: f64,
    pub pullup_elbow_extended: f64,
    pub pullup_body_straight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityThresholds {
    pub minimum: f64,
    pub critical_joints: f64,
    pub support_joints: f64,
    pub face_joints: f64,
}

impl VisibilityThresholds {
    fn from_device(device: &DeviceGeometry) -> Self {
        let distance_adj = ((1.5 - device.distance) * 0.1).clamp(-0.1, 0.1);
        let adjusted = 0.5 + device.stability * 0.2 + distance_adj;
        Self {
            minimum: (adjusted - 0.1).max(0.3),
            critical_joints: adjusted.max(0.4),
            support_joints: (adjusted - 0.2).max(0.3),
            face_joints: (adjusted - 0.3).max(0.2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseNormalization {
    pub shoulder_width: f64,
    pub hip_width: f64,
    pub arm_length: f64,
    pub leg_length: f64,
    pub head_size: f64,
}

impl PoseNormalization {
    fn from_body(body: &BodyProportions) -> Self {
        Self {
            shoulder_width: body.arm_span * 0.2,
            hip_width: body.arm_span * 0.15,
            arm_length: body.arm_span * 0.5,
            leg_length: body.leg_length,
            head_size: body.height * 0.13,
        }
    }
}

/// Bruker/enhet-spesifikk profil. Uforanderlig etter konstruksjon:
/// en ny kalibrering gir en ny profil.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    exercise: Exercise,
    created_at: DateTime<Utc>,
    device: DeviceGeometry,
    body: BodyProportions,
    adjustments: AngleAdjustments,
    visibility: VisibilityThresholds,
    normalization: PoseNormalization,
    calibration_score: f64,
    confidence_level: f64,
    frame_count: usize,
    quality: QualityTier,
}

impl CalibrationProfile {
    pub fn exercise(&self) -> Exercise {
        self.exercise
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn device(&self) -> &DeviceGeometry {
        &self.device
    }

    pub fn body(&self) -> &BodyProportions {
        &self.body
    }

    pub fn adjustments(&self) -> &AngleAdjustments {
        &self.adjustments
    }

    pub fn visibility(&self) -> &VisibilityThresholds {
        &self.visibility
    }

    pub fn normalization(&self) -> &PoseNormalization {
        &self.normalization
    }

    pub fn calibration_score(&self) -> f64 {
        self.calibration_score
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn quality(&self) -> QualityTier {
        self.quality
    }
}

/// Innebygd reserveprofil når brukeren hopper over eller avviser kalibreringen.
pub fn default_profile(exercise: Exercise) -> CalibrationProfile {
    let device = DeviceGeometry {
        placement: DevicePlacement::Unknown,
        height: 1.0,
        angle: 0.0,
        distance: 1.5,
        stability: 0.5,
    };
    let body = BodyProportions {
        height: REFERENCE_BODY_HEIGHT,
        arm_span: 0.7,
        torso_length: 0.25,
        leg_length: 0.35,
    };
    CalibrationProfile {
        exercise,
        created_at: Utc::now(),
        device,
        body,
        adjustments: AngleAdjustments::default(),
        visibility: VisibilityThresholds::from_device(&device),
        normalization: PoseNormalization::from_body(&body),
        calibration_score: 75.0,
        confidence_level: 0.75,
        frame_count: 0,
        quality: QualityTier::Acceptable,
    }
}

pub fn evaluate_quality(profile: &CalibrationProfile) -> QualityTier {
    QualityTier::from_score(profile.calibration_score)
}

/// Bygg profil fra bufrede frames. None hvis bufferen er tom eller ingen mål kunne tas.
pub fn perform_calibration(exercise: Exercise, frames: &[PoseFrame]) -> Option<CalibrationProfile> {
    if frames.is_empty() {
        log::warn!("kalibrering uten frames ({})", exercise);
        return None;
    }

    let body = measure_body(frames)?;
    let consistency = pose_consistency(frames);
    let placement = detect_placement(frames, consistency);
    let device = device_geometry(placement, consistency);
    let adjustments = angle_adjustments(&device, &body);

    let target = TargetFraming::for_exercise(exercise);
    let calibration_score = score_frames(frames, &target.body_parts, device.stability);
    let quality = QualityTier::from_score(calibration_score);

    log::info!(
        "kalibrering {}: score={:.1} quality={} frames={} placement={:?}",
        exercise,
        calibration_score,
        quality.as_str(),
        frames.len(),
        device.placement
    );
    metrics::observe_calibration(quality);

    Some(CalibrationProfile {
        exercise,
        created_at: Utc::now(),
        device,
        body,
        adjustments,
        visibility: VisibilityThresholds::from_device(&device),
        normalization: PoseNormalization::from_body(&body),
        calibration_score,
        confidence_level: calibration_score / 100.0,
        frame_count: frames.len(),
        quality,
    })
}

/// Samler frames fra samme serielle callback som resten av motoren.
pub struct FrameCollector<F: FnMut(f64)> {
    required: usize,
    frames: Vec<PoseFrame>,
    on_progress: F,
    // (ledd, min snitt-konfidens) for å avvise uskarpe frames
    gate: Option<(Vec<Joint>, f64)>,
}

pub fn begin_frame_collection<F: FnMut(f64)>(required_frames: usize, on_progress: F) -> FrameCollector<F> {
    log::debug!("starter frame-innsamling ({} frames)", required_frames);
    FrameCollector {
        required: required_frames.max(1),
        frames: Vec::with_capacity(required_frames),
        on_progress,
        gate: None,
    }
}

/// Som `begin_frame_collection`, men antall frames og konfidensgulv kommer fra modus.
pub fn begin_mode_collection<F: FnMut(f64)>(
    mode: CalibrationMode,
    exercise: Exercise,
    on_progress: F,
) -> FrameCollector<F> {
    let mut collector = begin_frame_collection(mode.required_frames(), on_progress);
    let joints = TargetFraming::for_exercise(exercise).body_parts;
    if !joints.is_empty() {
        collector.gate = Some((joints, mode.min_confidence()));
    }
    collector
}

impl<F: FnMut(f64)> FrameCollector<F> {
    /// Returnerer true når bufferen er full. Overskytende frames ignoreres,
    /// det samme gjør frames under konfidensgulvet.
    pub fn push(&mut self, frame: PoseFrame) -> bool {
        if self.is_complete() {
            return true;
        }
        if let Some((joints, min)) = &self.gate {
            if frame.average_confidence(joints) < *min {
                return false;
            }
        }
        self.frames.push(frame);
        let progress = self.progress();
        (self.on_progress)(progress);
        self.is_complete()
    }

    pub fn progress(&self) -> f64 {
        (self.frames.len() as f64 / self.required as f64).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.frames.len() >= self.required
    }

    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    pub fn finish(self, exercise: Exercise) -> Option<CalibrationProfile> {
        if !self.is_complete() {
            log::warn!(
                "for få frames til kalibrering: {}/{}",
                self.frames.len(),
                self.required
            );
            return None;
        }
        perform_calibration(exercise, &self.frames)
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Målinger
// ──────────────────────────────────────────────────────────────────────────────

fn measure_body(frames: &[PoseFrame]) -> Option<BodyProportions> {
    let mut heights = Vec::new();
    let mut spans = Vec::new();
    let mut torsos = Vec::new();
    let mut legs = Vec::new();

    for f in frames {
        if let (Some(nose), Some(ankles)) = (
            f.location(Joint::Nose),
            f.midpoint(Joint::LeftAnkle, Joint::RightAnkle),
        ) {
            heights.push(distance(nose, ankles));
        }
        if let Some(d) = f.distance(Joint::LeftWrist, Joint::RightWrist) {
            spans.push(d);
        }
        if let (Some(sh), Some(hip)) = (
            f.midpoint(Joint::LeftShoulder, Joint::RightShoulder),
            f.midpoint(Joint::LeftHip, Joint::RightHip),
        ) {
            torsos.push(distance(sh, hip));
        }
        if let Some(d) = f.distance(Joint::LeftHip, Joint::LeftAnkle) {
            legs.push(d);
        }
    }

    if heights.is_empty() && spans.is_empty() && torsos.is_empty() && legs.is_empty() {
        return None;
    }

    Some(BodyProportions {
        height: filter_outliers_and_average(&heights),
        arm_span: filter_outliers_and_average(&spans),
        torso_length: filter_outliers_and_average(&torsos),
        leg_length: filter_outliers_and_average(&legs),
    })
}

/// Snitt etter IQR-filtrering (1.5 × IQR). Ingen filtrering for n ≤ 2.
pub fn filter_outliers_and_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    if values.len() <= 2 {
        return values.iter().sum::<f64>() / values.len() as f64;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by_key(|v| OrderedFloat(*v));
    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[3 * n / 4];
    let iqr = q3 - q1;
    let (lo, hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let kept: Vec<f64> = sorted.into_iter().filter(|v| *v >= lo && *v <= hi).collect();
    if kept.is_empty() {
        return values.iter().sum::<f64>() / values.len() as f64;
    }
    kept.iter().sum::<f64>() / kept.len() as f64
}

/// Variasjonskoeffisient for skulderbredde (skala-støy).
fn scale_variability(frames: &[PoseFrame]) -> f64 {
    let scales: Vec<f64> = frames
        .iter()
        .filter_map(|f| f.distance(Joint::LeftShoulder, Joint::RightShoulder))
        .collect();
    if scales.len() < 2 {
        return 0.0;
    }
    let mean = scales.iter().sum::<f64>() / scales.len() as f64;
    if mean <= f64::EPSILON {
        return 0.0;
    }
    let var = scales.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scales.len() as f64;
    var.sqrt() / mean
}

/// Gjennomsnittlig forflytning av skuldersenter mellom påfølgende frames.
fn position_drift(frames: &[PoseFrame]) -> f64 {
    let centers: Vec<_> = frames
        .iter()
        .filter_map(|f| f.midpoint(Joint::LeftShoulder, Joint::RightShoulder))
        .collect();
    if centers.len() < 2 {
        return 0.0;
    }
    let total: f64 = centers.windows(2).map(|w| distance(w[0], w[1])).sum();
    total / (centers.len() - 1) as f64
}

fn pose_consistency(frames: &[PoseFrame]) -> f64 {
    if frames.len() < 2 {
        return 1.0;
    }
    1.0 - (scale_variability(frames) + position_drift(frames)).min(1.0)
}

struct PoseMetrics {
    average_scale: f64,
    body_height: f64,
    head_y: f64,
}

fn pose_metrics(frames: &[PoseFrame]) -> PoseMetrics {
    let mut scale = 0.0;
    let mut body_height = 0.0;
    let mut head_y = 0.0;
    let mut n = 0usize;

    for f in frames {
        let (Some(ls), Some(rs), Some(lh)) = (
            f.location(Joint::LeftShoulder),
            f.location(Joint::RightShoulder),
            f.location(Joint::LeftHip),
        ) else {
            continue;
        };
        let shoulder_width = distance(ls, rs);
        let h = (ls.y - lh.y).abs();
        scale += (shoulder_width + h) / 2.0;
        body_height += h;
        head_y += f.point(Joint::Nose).map(|p| p.y).unwrap_or(0.2);
        n += 1;
    }

    if n == 0 {
        return PoseMetrics {
            average_scale: 0.5,
            body_height: 0.8,
            head_y: 0.2,
        };
    }
    let n = n as f64;
    PoseMetrics {
        average_scale: scale / n,
        body_height: body_height / n,
        head_y: head_y / n,
    }
}

fn estimate_device_height(m: &PoseMetrics) -> f64 {
    // lavt hode i bildet => høyere kamera; stor skala => nærmere/lavere kamera
    let factor = (1.0 - m.head_y) * 2.0 + (1.0 - m.average_scale);
    0.3 + factor * 2.2
}

fn estimate_device_angle(m: &PoseMetrics) -> f64 {
    let indicator = (0.5 - m.head_y) * 2.0 + (0.8 - m.body_height) * 0.5;
    indicator * 60.0
}

fn detect_placement(frames: &[PoseFrame], consistency: f64) -> DevicePlacement {
    if frames.is_empty() {
        return DevicePlacement::Unknown;
    }
    let m = pose_metrics(frames);
    let height = estimate_device_height(&m);
    let angle = estimate_device_angle(&m);

    if consistency > STABILITY_THRESHOLD {
        if consistency > TRIPOD_STABILITY_THRESHOLD {
            DevicePlacement::Tripod { height, angle }
        } else if height > ELEVATED_HEIGHT_MIN {
            DevicePlacement::Elevated { height, angle }
        } else {
            DevicePlacement::Ground { angle }
        }
    } else if scale_variability(frames) > HANDHELD_SCALE_VARIABILITY {
        DevicePlacement::Handheld
    } else if height > ELEVATED_HEIGHT_MIN {
        DevicePlacement::Elevated { height, angle }
    } else {
        DevicePlacement::Ground { angle }
    }
}

fn device_geometry(placement: DevicePlacement, stability: f64) -> DeviceGeometry {
    let (height, angle, distance, stability) = match placement {
        DevicePlacement::Ground { angle } => (0.1, angle, 1.2, stability),
        DevicePlacement::Elevated { height, angle } => (height, angle, 1.5, stability),
        DevicePlacement::Tripod { height, angle } => (height, angle, 1.8, (stability + 0.2).min(1.0)),
        DevicePlacement::Handheld => (1.0, 0.0, 1.0, (stability - 0.3).max(0.3)),
        DevicePlacement::Unknown => (1.0, 0.0, 1.5, stability),
    };
    DeviceGeometry {
        placement,
        height,
        angle,
        distance,
        stability,
    }
}

fn angle_adjustments(device: &DeviceGeometry, body: &BodyProportions) -> AngleAdjustments {
    let mut adj = AngleAdjustments::default();

    match device.placement {
        DevicePlacement::Ground { angle } => {
            if angle < 30.0 {
                adj.pushup_elbow_bent -= 5.0;
                adj.situp_hip_up += 5.0;
            } else if angle > 45.0 {
                adj.pushup_elbow_bent += 5.0;
                adj.situp_hip_up -= 5.0;
            }
        }
        DevicePlacement::Elevated { height, angle } => {
            if height > 1.5 {
                adj.pushup_elbow_bent += 5.0;
            }
            if angle > 60.0 {
                adj.pushup_elbow_bent += 5.0;
                adj.situp_hip_up -= 5.0;
            }
        }
        DevicePlacement::Tripod { angle, .. } => {
            if angle > 45.0 {
                adj.pushup_body_straight -= 5.0;
                adj.situp_hip_up -= 3.0;
            }
        }
        DevicePlacement::Handheld => {
            // ustabil enhet: mer toleranse
            adj.pushup_body_straight -= 10.0;
            adj.pullup_body_straight -= 5.0;
        }
        DevicePlacement::Unknown => {}
    }

    if body.height > 0.0 {
        let factor = body.height / REFERENCE_BODY_HEIGHT;
        if factor > 1.1 {
            adj.pushup_elbow_bent += 3.0;
            adj.situp_hip_up += 3.0;
        } else if factor < 0.9 {
            adj.pushup_elbow_bent -= 3.0;
            adj.situp_hip_up -= 3.0;
        }
    }
    adj
}

/// (konfidens·0.4 + stabilitet·0.3 + kompletthet·0.3)·100, klemt til 0–100.
fn score_frames(frames: &[PoseFrame], joints: &[Joint], stability: f64) -> f64 {
    if frames.is_empty() {
        return 0.0;
    }
    let (mut conf, mut complete) = (0.0, 0.0);
    for f in frames {
        if joints.is_empty() {
            conf += 1.0;
            complete += 1.0;
            continue;
        }
        conf += f.average_confidence(joints);
        let visible = joints
            .iter()
            .filter(|j| f.confidence(**j) > VISIBLE_CONFIDENCE)
            .count();
        complete += visible as f64 / joints.len() as f64;
    }
    let n = frames.len() as f64;
    let score = ((conf / n) * 0.4 + stability * 0.3 + (complete / n) * 0.3) * 100.0;
    score.clamp(0.0, 100.0)
}
