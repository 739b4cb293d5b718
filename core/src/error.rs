use thiserror::Error;

use crate::grading::Exercise;

/// Feil som kan oppstå rundt motoren (konfig, IO, valg av øvelse).
/// Forventede forhold under gradering (skjulte ledd, dårlig form) er aldri feil,
/// de rapporteres som `GradingEvent`.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("exercise `{0}` has no rep state machine")]
    UnsupportedExercise(Exercise),

    #[error("unknown exercise `{0}`")]
    UnknownExercise(String),

    #[error("parse error ({what}) at {path}: {message}")]
    Parse {
        what: &'static str,
        path: String,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GradeError {
    pub(crate) fn parse<E: std::fmt::Display>(
        what: &'static str,
        err: serde_path_to_error::Error<E>,
    ) -> Self {
        GradeError::Parse {
            what,
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}

/// Dekod JSON via serde_path_to_error slik at feilen peker på stien i dokumentet.
pub(crate) fn from_json_path<T: serde::de::DeserializeOwned>(
    what: &'static str,
    json_in: &str,
) -> Result<T, GradeError> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    serde_path_to_error::deserialize(&mut de).map_err(|e| GradeError::parse(what, e))
}
