use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{from_json_path, GradeError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushupThresholds {
    pub elbow_extended: f64, // grader, armene strake (opp)
    pub elbow_bent: f64,     // grader, nominell bunn
    pub elbow_tolerance: f64,
    pub body_straight: f64, // skulder–hofte–kne
}

impl Default for PushupThresholds {
    fn default() -> Self {
        Self {
            elbow_extended: 160.0,
            elbow_bent: 90.0,
            elbow_tolerance: 10.0,
            body_straight: 165.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitupThresholds {
    pub hip_down: f64,
    pub hip_up: f64,
    pub hands_ratio: f64,     // × skulderbredde
    pub foot_lift_ratio: f64, // × hofte–kne-lengde
}

impl Default for SitupThresholds {
    fn default() -> Self {
        Self {
            hip_down: 160.0,
            hip_up: 80.0,
            hands_ratio: 0.6,
            foot_lift_ratio: 0.08,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PullupThresholds {
    pub elbow_extended: f64,
    pub elbow_flexed: f64,
    pub chin_margin: f64, // nese må være så mye over snitt-håndledd
    pub body_straight: f64,
    pub kip_ratio: f64, // × torso-lengde ved dødheng
}

impl Default for PullupThresholds {
    fn default() -> Self {
        Self {
            elbow_extended: 160.0,
            elbow_flexed: 90.0,
            chin_margin: 0.05,
            body_straight: 165.0,
            kip_ratio: 0.5,
        }
    }
}

/// Sluttscore: reps-delen + formdelen, maks 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub target_reps: u32,
    pub rep_weight: f64,
    pub form_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_reps: 10,
            rep_weight: 85.0,
            form_weight: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    pub pushup: PushupThresholds,
    pub situp: SitupThresholds,
    pub pullup: PullupThresholds,
    pub scoring: ScoringConfig,
    pub positioning_hold_seconds: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            pushup: PushupThresholds::default(),
            situp: SitupThresholds::default(),
            pullup: PullupThresholds::default(),
            scoring: ScoringConfig::default(),
            positioning_hold_seconds: 2.0,
        }
    }
}

impl GradingConfig {
    /// Les konfig fra JSON. Manglende felt får default; feil typer rapporteres med sti.
    pub fn from_json_str(json_in: &str) -> Result<Self, GradeError> {
        from_json_path("GradingConfig", json_in)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GradeError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
