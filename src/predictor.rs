use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PredictionError;
use crate::models::{CycleProfile, PeriodRecord, PeriodRegularity};

/// Irregular cycles are shifted by up to this many days either way.
pub const MAX_JITTER_DAYS: i64 = 3;

/// Source of the day offset applied to irregular-cycle predictions.
pub trait JitterSource {
    /// Return an offset in `[-max_days, max_days]`.
    fn jitter_days(&mut self, max_days: i64) -> i64;
}

/// Uniform jitter drawn from a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomJitter<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomJitter<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible jitter for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn jitter_days(&mut self, max_days: i64) -> i64 {
        let max_days = max_days.abs();
        self.rng.gen_range(-max_days..=max_days)
    }
}

/// Always returns the same offset, clamped to the requested bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedJitter(pub i64);

impl JitterSource for FixedJitter {
    fn jitter_days(&mut self, max_days: i64) -> i64 {
        let max_days = max_days.abs();
        self.0.clamp(-max_days, max_days)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn jitter_days(&mut self, _max_days: i64) -> i64 {
        0
    }
}

/// Project the next period start from the latest recorded start, or from the
/// profile's last known start when the history is empty.
pub fn predict_next_period_date(
    profile: &CycleProfile,
    periods: &[PeriodRecord],
    jitter: &mut dyn JitterSource,
) -> Result<NaiveDate, PredictionError> {
    let anchor = periods
        .iter()
        .map(|p| p.start_date)
        .max()
        .or(profile.last_known_period_start)
        .ok_or_else(|| {
            PredictionError::no_period_data("no period records and no last known start")
        })?;

    let offset = match profile.regularity {
        PeriodRegularity::Regular => 0,
        PeriodRegularity::Irregular => jitter
            .jitter_days(MAX_JITTER_DAYS)
            .clamp(-MAX_JITTER_DAYS, MAX_JITTER_DAYS),
    };

    anchor
        .checked_add_signed(Duration::days(i64::from(profile.cycle_length) + offset))
        .ok_or_else(|| {
            PredictionError::PredictionFailed(format!(
                "next period date out of range: {anchor} + {} days",
                profile.cycle_length
            ))
        })
}

/// Days from `today` until the predicted next period, soft-failing to `None`
/// only when there is nothing to anchor on. An overdue period reports 0.
pub fn try_days_until_next_period(
    profile: &CycleProfile,
    periods: &[PeriodRecord],
    today: NaiveDate,
    jitter: &mut dyn JitterSource,
) -> Result<Option<i64>, PredictionError> {
    match predict_next_period_date(profile, periods, jitter) {
        Ok(next) => Ok(Some((next - today).num_days().max(0))),
        Err(err) if err.is_no_period_data() => {
            tracing::debug!(error = %err, "next period undeterminable");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Days from `today` until the predicted next period. `None` when there is
/// nothing to anchor on, or the projection falls outside the calendar.
pub fn days_until_next_period(
    profile: &CycleProfile,
    periods: &[PeriodRecord],
    today: NaiveDate,
    jitter: &mut dyn JitterSource,
) -> Option<i64> {
    try_days_until_next_period(profile, periods, today, jitter).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "next period projection failed");
        None
    })
}
