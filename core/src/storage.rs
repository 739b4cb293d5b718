use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::calibration::{default_profile, CalibrationProfile};
use crate::grading::Exercise;
use crate::session::SessionSummary;

/// Leser kalibreringsprofil fra disk (JSON).
/// Finnes ikke filen, returneres innebygd default-profil for øvelsen.
pub fn load_profile(path: impl AsRef<Path>, exercise: Exercise) -> Result<CalibrationProfile> {
    let path = path.as_ref();
    if !path.exists() {
        log::warn!(
            "fant ikke profil på {}, bruker default ({})",
            path.display(),
            exercise
        );
        return Ok(default_profile(exercise));
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("kunne ikke lese profil {}", path.display()))?;
    let profile: CalibrationProfile = serde_json::from_str(&contents)
        .with_context(|| format!("ugyldig profil-JSON i {}", path.display()))?;

    if profile.exercise() != exercise {
        anyhow::bail!(
            "profil i {} gjelder {}, ikke {}",
            path.display(),
            profile.exercise(),
            exercise
        );
    }
    log::info!(
        "profil lastet fra {} ({}, quality={})",
        path.display(),
        profile.exercise(),
        profile.quality().as_str()
    );
    Ok(profile)
}

/// Lagrer profil som pretty-printet JSON.
pub fn save_profile(profile: &CalibrationProfile, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(profile).context("serialisering av profil")?;
    fs::write(path, json).with_context(|| format!("kunne ikke skrive {}", path.display()))?;
    log::info!(
        "profil lagret til {} ({}, score={:.1})",
        path.display(),
        profile.exercise(),
        profile.calibration_score()
    );
    Ok(())
}

pub fn save_summary(summary: &SessionSummary, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(summary).context("serialisering av øktsammendrag")?;
    fs::write(path, json).with_context(|| format!("kunne ikke skrive {}", path.display()))?;
    log::info!(
        "økt lagret til {} ({} reps={})",
        path.display(),
        summary.exercise,
        summary.rep_count
    );
    Ok(())
}
