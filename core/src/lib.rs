// Kjernen er ren Rust; Python-bindingen bygges kun med `--features python`.

pub mod calibration;
pub mod config;
pub mod error;
pub mod form;
pub mod framing;
pub mod grading;
pub mod metrics;
pub mod pose;
pub mod pullup;
pub mod pushup;
pub mod run;
pub mod session;
pub mod situp;
pub mod storage;

#[cfg(feature = "python")]
mod py;

pub use calibration::{
    begin_frame_collection, begin_mode_collection, default_profile, evaluate_quality,
    filter_outliers_and_average, perform_calibration, CalibrationMode, CalibrationProfile,
    DevicePlacement, FrameCollector, QualityTier,
};
pub use config::GradingConfig;
pub use error::GradeError;
pub use form::FormFault;
pub use framing::{evaluate_framing, FramingStatus, PositioningValidator, TargetFraming};
pub use grading::{
    final_score, Exercise, ExerciseGrader, ExerciseSessionState, Grader, GradingEvent, RepPhase,
};
pub use pose::{angle_deg, Joint, JointPoint, Point2, PoseFrame};
pub use pullup::PullupGrader;
pub use pushup::PushupGrader;
pub use run::{GpsFix, RunConfig, RunFeedback, RunSummary, RunTracker};
pub use session::{SessionAggregator, SessionSummary, WorkoutSession};
pub use situp::SitupGrader;
pub use storage::{load_profile, save_profile, save_summary};
