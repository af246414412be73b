//! Cycle inference and period prediction.
//!
//! Pure computations over a [`CycleProfile`] and a user's [`PeriodRecord`]s:
//! day of cycle, cycle phase, mood estimate, next-period projection and
//! retrospective statistics. [`CycleTracker`] is an in-memory caller that
//! owns one user's history and applies the profile-only fallback.

pub mod cycle;
pub mod error;
pub mod models;
pub mod mood;
pub mod prediction;
pub mod predictor;
pub mod settings;
pub mod tracker;

pub use cycle::{cycle_phase, cycle_stats, day_of_cycle, ovulation_day};
pub use error::{PredictionError, ProfileError};
pub use models::{
    CyclePhase, CycleProfile, CycleStats, FlowLevel, Mood, PeriodRecord, PeriodRegularity,
    PredictionResult,
};
pub use mood::predict_mood;
pub use prediction::{get_prediction, PredictionEngine};
pub use predictor::{
    days_until_next_period, predict_next_period_date, try_days_until_next_period, FixedJitter,
    JitterSource, NoJitter, RandomJitter,
};
pub use settings::{EngineSettings, SettingsError};
pub use tracker::{CycleTracker, PredictionOutcome, TrackerError};
