use serde::{Deserialize, Serialize};

use crate::models::Mood;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("default confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f32),
    #[error("retrain threshold must be at least 1")]
    ZeroRetrainThreshold,
    #[error("history window must be between 1 and 3660 days, got {0}")]
    HistoryWindowOutOfRange(i64),
}

/// Upper bound on the default prediction history window, roughly ten years.
pub const MAX_HISTORY_WINDOW_DAYS: i64 = 3660;

/// Policy constants for the engine and tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Records logged without a refresh before the tracker reports it is stale.
    pub retrain_threshold: u32,
    /// Static placeholder attached to every prediction.
    pub default_confidence: f32,
    /// Mood shown when only the profile is available.
    pub fallback_mood: Mood,
    pub history_window_days: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            retrain_threshold: 10,
            default_confidence: 0.85,
            fallback_mood: Mood::Medium,
            history_window_days: 30,
        }
    }
}

impl EngineSettings {
    /// Parse settings from JSON. Missing keys fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(SettingsError::ConfidenceOutOfRange(self.default_confidence));
        }
        if self.retrain_threshold == 0 {
            return Err(SettingsError::ZeroRetrainThreshold);
        }
        if !(1..=MAX_HISTORY_WINDOW_DAYS).contains(&self.history_window_days) {
            return Err(SettingsError::HistoryWindowOutOfRange(
                self.history_window_days,
            ));
        }
        Ok(())
    }
}
