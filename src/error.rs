#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// No usable anchor date; callers may degrade to a profile-only view.
    #[error("no period data: {reason}")]
    NoPeriodData { reason: String },
    #[error("prediction failed: {0}")]
    PredictionFailed(String),
}

impl PredictionError {
    pub(crate) fn no_period_data(reason: impl Into<String>) -> Self {
        Self::NoPeriodData {
            reason: reason.into(),
        }
    }

    pub fn is_no_period_data(&self) -> bool {
        matches!(self, Self::NoPeriodData { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("cycle length must be positive")]
    ZeroCycleLength,
    #[error("luteal length {luteal} must be shorter than cycle length {cycle}")]
    LutealNotShorterThanCycle { luteal: u32, cycle: u32 },
}
