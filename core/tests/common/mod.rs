// Syntetiske pose-frames for integrasjonstestene.
#![allow(dead_code)]

use ptgrade_core::{Joint, PoseFrame};

pub const CONF: f64 = 0.9;

fn put(frame: PoseFrame, joint: Joint, x: f64, y: f64) -> PoseFrame {
    frame.with_joint(joint, x, y, CONF)
}

/// Armhevning sett fra siden. Albuevinkel `elbow_deg`; `body_bent` gir en
/// knekk i hofta (~143°).
pub fn pushup_frame(t: f64, elbow_deg: f64, body_bent: bool) -> PoseFrame {
    let theta = elbow_deg.to_radians();
    let knee_y = if body_bent { 0.65 } else { 0.5 };
    let mut f = PoseFrame::new(t);
    for (dx, sh, el, wr, hip, knee) in [
        (
            0.0,
            Joint::LeftShoulder,
            Joint::LeftElbow,
            Joint::LeftWrist,
            Joint::LeftHip,
            Joint::LeftKnee,
        ),
        (
            0.02,
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
            Joint::RightHip,
            Joint::RightKnee,
        ),
    ] {
        // albue rett under skulder, håndledd rotert theta fra overarmen
        f = put(f, sh, 0.3 + dx, 0.5);
        f = put(f, el, 0.3 + dx, 0.6);
        f = put(f, wr, 0.3 + dx + 0.1 * theta.sin(), 0.6 - 0.1 * theta.cos());
        f = put(f, hip, 0.55 + dx, 0.5);
        f = put(f, knee, 0.8 + dx, knee_y);
    }
    f
}

/// Sit-up med hoftevinkel `hip_deg`. `hands_off` flytter håndleddene bort fra ørene.
pub fn situp_frame(t: f64, hip_deg: f64, hands_off: bool) -> PoseFrame {
    let theta = hip_deg.to_radians();
    let (c, s) = (theta.cos(), -theta.sin());
    let wrist_dx = if hands_off { 0.1 } else { 0.01 };
    let mut f = PoseFrame::new(t);
    for (dx, sh, hip, knee, ear, wrist, ankle) in [
        (
            0.0,
            Joint::LeftShoulder,
            Joint::LeftHip,
            Joint::LeftKnee,
            Joint::LeftEar,
            Joint::LeftWrist,
            Joint::LeftAnkle,
        ),
        (
            0.1,
            Joint::RightShoulder,
            Joint::RightHip,
            Joint::RightKnee,
            Joint::RightEar,
            Joint::RightWrist,
            Joint::RightAnkle,
        ),
    ] {
        let (hx, hy) = (0.5 + dx, 0.6);
        f = put(f, hip, hx, hy);
        f = put(f, knee, hx + 0.15, hy);
        f = put(f, sh, hx + 0.2 * c, hy + 0.2 * s);
        f = put(f, ear, hx + 0.26 * c, hy + 0.26 * s);
        f = put(f, wrist, hx + 0.26 * c + wrist_dx, hy + 0.26 * s);
        f = put(f, ankle, hx + 0.3, 0.7);
    }
    f
}

/// Dødheng: strake armer, hofte `hip_offset` under skuldrene.
pub fn pullup_hang(t: f64, hip_offset: f64) -> PoseFrame {
    let mut f = put(PoseFrame::new(t), Joint::Nose, 0.5, 0.33);
    for (x, sh, el, wr, hip, knee) in [
        (
            0.4,
            Joint::LeftShoulder,
            Joint::LeftElbow,
            Joint::LeftWrist,
            Joint::LeftHip,
            Joint::LeftKnee,
        ),
        (
            0.6,
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
            Joint::RightHip,
            Joint::RightKnee,
        ),
    ] {
        f = put(f, wr, x, 0.2);
        f = put(f, el, x, 0.3);
        f = put(f, sh, x, 0.4);
        f = put(f, hip, x, 0.4 + hip_offset);
        f = put(f, knee, x, 0.6 + hip_offset);
    }
    f
}

/// Toppen: haka over stanga (y 0.2), albuer ~27°.
pub fn pullup_top(t: f64, hip_offset: f64) -> PoseFrame {
    let mut f = put(PoseFrame::new(t), Joint::Nose, 0.5, 0.12);
    for (x, out, sh, el, wr, hip, knee) in [
        (
            0.4,
            -0.1,
            Joint::LeftShoulder,
            Joint::LeftElbow,
            Joint::LeftWrist,
            Joint::LeftHip,
            Joint::LeftKnee,
        ),
        (
            0.6,
            0.1,
            Joint::RightShoulder,
            Joint::RightElbow,
            Joint::RightWrist,
            Joint::RightHip,
            Joint::RightKnee,
        ),
    ] {
        f = put(f, wr, x, 0.2);
        f = put(f, el, x + out, 0.25);
        f = put(f, sh, x, 0.25);
        f = put(f, hip, x, 0.25 + hip_offset);
        f = put(f, knee, x, 0.45 + hip_offset);
    }
    f
}

/// Stående, hele kroppen synlig og sentrert. Brukes til kalibrering og innramming.
/// `scale` 1.0 gir kroppsstørrelse 0.2 (avstand 1.5).
pub fn standing_frame(t: f64, cx: f64, scale: f64, conf: f64) -> PoseFrame {
    let s = scale;
    let cy = 0.5;
    let j = |f: PoseFrame, joint, x: f64, y: f64| f.with_joint(joint, cx + x * s, cy + y * s, conf);
    let mut f = PoseFrame::new(t);
    f = j(f, Joint::Nose, 0.0, -0.2);
    f = j(f, Joint::LeftEye, -0.02, -0.22);
    f = j(f, Joint::RightEye, 0.02, -0.22);
    f = j(f, Joint::LeftEar, -0.04, -0.21);
    f = j(f, Joint::RightEar, 0.04, -0.21);
    f = j(f, Joint::LeftShoulder, -0.1, -0.1);
    f = j(f, Joint::RightShoulder, 0.1, -0.1);
    f = j(f, Joint::LeftElbow, -0.12, 0.0);
    f = j(f, Joint::RightElbow, 0.12, 0.0);
    f = j(f, Joint::LeftWrist, -0.13, 0.08);
    f = j(f, Joint::RightWrist, 0.13, 0.08);
    f = j(f, Joint::LeftHip, -0.1, 0.1);
    f = j(f, Joint::RightHip, 0.1, 0.1);
    f = j(f, Joint::LeftKnee, -0.1, 0.25);
    f = j(f, Joint::RightKnee, 0.1, 0.25);
    f = j(f, Joint::LeftAnkle, -0.1, 0.4);
    f = j(f, Joint::RightAnkle, 0.1, 0.4);
    f
}
