use serde::{Deserialize, Serialize};

pub const METERS_PER_MILE: f64 = 1609.34;
pub const TWO_MILES_METERS: f64 = 3218.69;
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Segmenter lengre enn dette mellom to fix regnes som GPS-hopp.
const MAX_SEGMENT_M: f64 = 100.0;
/// Tidsbonus-anker for scoring: 12:00 normalisert tid gir 100.
const SCORE_ANCHOR_S: f64 = 720.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: f64, // sekunder
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub target_distance_m: f64,
    pub max_duration_s: f64,
    pub min_pace_mps: f64,
    pub max_pace_mps: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_distance_m: TWO_MILES_METERS,
            max_duration_s: 1800.0,
            min_pace_mps: 1.5,
            max_pace_mps: 7.0,
        }
    }
}

/// Storsirkelavstand i meter.
pub fn haversine_m(a: &GpsFix, b: &GpsFix) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

pub fn pace_seconds_per_mile(distance_m: f64, seconds: f64) -> Option<f64> {
    if distance_m <= 0.0 || seconds <= 0.0 || !distance_m.is_finite() || !seconds.is_finite() {
        return None;
    }
    Some(seconds / (distance_m / METERS_PER_MILE))
}

/// "mm:ss"
pub fn format_pace(seconds_per_mile: f64) -> String {
    if !seconds_per_mile.is_finite() || seconds_per_mile <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds_per_mile.round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// 0 hvis under 90 % av måldistansen; ellers lineært fra 100 ved 12:00 normalisert tid,
/// ett poeng per 10 s.
pub fn score_run(distance_m: f64, seconds: f64, target_m: f64) -> Option<f64> {
    if distance_m <= 0.0 || seconds <= 0.0 || target_m <= 0.0 {
        return None;
    }
    if distance_m < target_m * 0.9 {
        return Some(0.0);
    }
    let normalized = seconds * (target_m / distance_m);
    Some((100.0 - (normalized - SCORE_ANCHOR_S) / 10.0).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFeedback {
    pub message: String,
    pub critical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub distance_m: f64,
    pub duration_s: f64,
    pub pace_s_per_mile: Option<f64>,
    pub pace_label: String,
    pub score: Option<f64>,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    Completed,
}

/// Distanse/tempo-motor for løping. Tid kommer fra GPS-fix, ikke fra klokka.
#[derive(Debug, Clone)]
pub struct RunTracker {
    config: RunConfig,
    state: RunState,
    start_ts: f64,
    end_ts: f64,
    elapsed_s: f64,
    distance_m: f64,
    last_fix: Option<GpsFix>,
    fixes: usize,
    speeds: Vec<f64>,
}

impl RunTracker {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
            start_ts: 0.0,
            end_ts: 0.0,
            elapsed_s: 0.0,
            distance_m: 0.0,
            last_fix: None,
            fixes: 0,
            speeds: Vec::new(),
        }
    }

    pub fn start(&mut self, timestamp: f64) {
        if self.state == RunState::Idle {
            self.start_ts = timestamp;
            self.state = RunState::Running;
            log::info!("løp startet ved t={:.1}", timestamp);
        }
    }

    pub fn stop(&mut self, timestamp: f64) {
        if self.state == RunState::Running {
            self.end_ts = timestamp;
            self.elapsed_s = (self.end_ts - self.start_ts).max(0.0);
            self.state = RunState::Completed;
            log::info!(
                "løp ferdig: {:.0} m på {:.0} s",
                self.distance_m,
                self.elapsed_s
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_complete(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    /// Legg til et GPS-fix. Returnerer tempo-tilbakemelding når det er noe å si.
    pub fn update(&mut self, fix: GpsFix) -> Option<RunFeedback> {
        if self.state != RunState::Running {
            return None;
        }

        if let Some(prev) = self.last_fix {
            let d = haversine_m(&prev, &fix);
            let dt = fix.timestamp - prev.timestamp;
            if dt > 0.0 && d > 0.0 && d < MAX_SEGMENT_M {
                self.distance_m += d;
                self.speeds.push(d / dt);
            } else if d >= MAX_SEGMENT_M {
                log::warn!("GPS-hopp på {:.0} m forkastet", d);
            }
        }
        self.last_fix = Some(fix);
        self.fixes += 1;
        self.elapsed_s = (fix.timestamp - self.start_ts).max(0.0);

        if self.distance_m >= self.config.target_distance_m {
            self.stop(fix.timestamp);
            return None;
        }
        self.pace_feedback()
    }

    fn average_speed(&self) -> Option<f64> {
        if self.speeds.is_empty() {
            return None;
        }
        Some(self.speeds.iter().sum::<f64>() / self.speeds.len() as f64)
    }

    fn pace_feedback(&self) -> Option<RunFeedback> {
        if self.fixes <= 5 {
            return None;
        }
        if self.elapsed_s > self.config.max_duration_s {
            return Some(RunFeedback {
                message: "Time limit exceeded".to_string(),
                critical: true,
            });
        }
        let avg = self.average_speed()?;
        if avg < self.config.min_pace_mps {
            Some(RunFeedback {
                message: "Pick up the pace - running too slow".to_string(),
                critical: false,
            })
        } else if avg > self.config.max_pace_mps {
            Some(RunFeedback {
                message: "Maintain a sustainable pace".to_string(),
                critical: false,
            })
        } else {
            None
        }
    }

    pub fn summary(&self) -> RunSummary {
        let pace = pace_seconds_per_mile(self.distance_m, self.elapsed_s);
        RunSummary {
            distance_m: self.distance_m,
            duration_s: self.elapsed_s,
            pace_s_per_mile: pace,
            pace_label: pace.map(format_pace).unwrap_or_else(|| "00:00".to_string()),
            score: if self.is_complete() {
                score_run(self.distance_m, self.elapsed_s, self.config.target_distance_m)
            } else {
                None
            },
            completed: self.is_complete(),
        }
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}
