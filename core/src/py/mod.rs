use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::calibration::{default_profile, perform_calibration, CalibrationProfile};
use crate::config::GradingConfig;
use crate::error::{from_json_path, GradeError};
use crate::framing::{evaluate_framing, TargetFraming};
use crate::grading::{Exercise, ExerciseGrader};
use crate::pose::PoseFrame;
use crate::session::WorkoutSession as CoreSession;

fn to_py_err(e: GradeError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_exercise(name: &str) -> PyResult<Exercise> {
    name.parse::<Exercise>().map_err(to_py_err)
}

// ──────────────────────────────────────────────────────────────────────────────
// Økt: én instans per treningsøkt, matet frame for frame fra Python
// ──────────────────────────────────────────────────────────────────────────────

#[pyclass(unsendable, name = "WorkoutSession")]
pub struct PyWorkoutSession {
    // None etter finish_json
    inner: Option<CoreSession>,
}

impl PyWorkoutSession {
    fn session(&self) -> PyResult<&CoreSession> {
        self.inner
            .as_ref()
            .ok_or_else(|| PyValueError::new_err("session already finished"))
    }

    fn session_mut(&mut self) -> PyResult<&mut CoreSession> {
        self.inner
            .as_mut()
            .ok_or_else(|| PyValueError::new_err("session already finished"))
    }
}

#[pymethods]
impl PyWorkoutSession {
    #[new]
    #[pyo3(signature = (exercise, profile_json=None, config_json=None))]
    fn new(exercise: &str, profile_json: Option<&str>, config_json: Option<&str>) -> PyResult<Self> {
        let exercise = parse_exercise(exercise)?;
        let profile = match profile_json {
            Some(s) => from_json_path::<CalibrationProfile>("CalibrationProfile", s).map_err(to_py_err)?,
            None => default_profile(exercise),
        };
        let config = match config_json {
            Some(s) => GradingConfig::from_json_str(s).map_err(to_py_err)?,
            None => GradingConfig::default(),
        };
        let inner = CoreSession::new(exercise, profile, &config).map_err(to_py_err)?;
        Ok(Self { inner: Some(inner) })
    }

    /// Returnerer hendelsen som JSON: {"type": ..., "value": ...}
    fn process_frame_json(&mut self, frame_json: &str) -> PyResult<String> {
        let frame = PoseFrame::from_json(frame_json).map_err(to_py_err)?;
        let event = self.session_mut()?.process(&frame);
        serde_json::to_string(&event).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn reset_state(&mut self) -> PyResult<()> {
        self.session_mut()?.reset_state();
        Ok(())
    }

    fn rep_count(&self) -> PyResult<u32> {
        Ok(self.session()?.grader().rep_count())
    }

    fn phase(&self) -> PyResult<&'static str> {
        Ok(self.session()?.grader().current_phase_description())
    }

    fn form_quality_average(&self) -> PyResult<f64> {
        Ok(self.session()?.grader().form_quality_average())
    }

    fn last_feedback(&self) -> PyResult<String> {
        Ok(self.session()?.grader().last_feedback().to_string())
    }

    fn finish_json(&mut self) -> PyResult<String> {
        let session = self
            .inner
            .take()
            .ok_or_else(|| PyValueError::new_err("session already finished"))?;
        let summary = session.finish();
        serde_json::to_string(&summary).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Frittstående funksjoner
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
fn evaluate_framing_json(exercise: &str, frame_json: &str) -> PyResult<String> {
    let exercise = parse_exercise(exercise)?;
    let frame = PoseFrame::from_json(frame_json).map_err(to_py_err)?;
    let status = evaluate_framing(&frame, &TargetFraming::for_exercise(exercise));
    serde_json::to_string(&serde_json::json!({
        "status": status,
        "acceptable": status.is_acceptable(),
        "instruction": status.instruction(),
    }))
    .map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyfunction]
fn calibrate_json(exercise: &str, frames_json: &str) -> PyResult<String> {
    let exercise = parse_exercise(exercise)?;
    let frames: Vec<PoseFrame> = from_json_path("Vec<PoseFrame>", frames_json).map_err(to_py_err)?;
    let profile = perform_calibration(exercise, &frames)
        .ok_or_else(|| PyValueError::new_err("calibration produced no profile"))?;
    serde_json::to_string(&profile).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyfunction]
fn metrics_text() -> String {
    crate::metrics::gather_text()
}

#[pymodule]
fn ptgrade_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyWorkoutSession>()?;
    m.add_function(wrap_pyfunction!(evaluate_framing_json, m)?)?;
    m.add_function(wrap_pyfunction!(calibrate_json, m)?)?;
    m.add_function(wrap_pyfunction!(metrics_text, m)?)?;
    Ok(())
}
