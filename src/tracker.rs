use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::cycle;
use crate::error::{PredictionError, ProfileError};
use crate::models::*;
use crate::prediction::PredictionEngine;
use crate::predictor::{self, JitterSource, RandomJitter};
use crate::settings::{EngineSettings, SettingsError};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("a period already starts on {0}")]
    DuplicatePeriod(NaiveDate),
    #[error("invalid range: {end} is before {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
    #[error("tracker state lock poisoned")]
    LockPoisoned,
}

/// One user's profile and period history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerData {
    pub profile: CycleProfile,
    pub periods: Vec<PeriodRecord>,
}

#[derive(Debug, Default)]
struct Snapshot {
    stats: Option<CycleStats>,
    refreshed_on: Option<NaiveDate>,
    pending_since_refresh: u32,
}

/// Prediction for a date, degraded to the profile alone when no period
/// anchors the cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Full(PredictionResult),
    ProfileOnly(ProfilePrediction),
}

/// Phase is unknown in this view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfilePrediction {
    pub predicted_mood: Mood,
    pub days_until_next_period: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatedPrediction {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub prediction: PredictionResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionHistory {
    pub entries: Vec<DatedPrediction>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmedPeriod {
    pub id: Uuid,
    pub stats: CycleStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleInfo {
    pub current_day_of_cycle: i64,
    pub current_cycle_phase: CyclePhase,
    pub days_until_next_period: Option<i64>,
    pub cycle_statistics: CycleStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerStatus {
    pub refreshed_on: Option<NaiveDate>,
    /// Statistics as of the last refresh.
    pub refreshed_statistics: Option<CycleStats>,
    pub total_periods: usize,
    pub pending_since_refresh: u32,
    pub needs_refresh: bool,
    pub retrain_threshold: u32,
    /// Statistics over the current history, refreshed or not.
    pub cycle_statistics: CycleStats,
}

type BoxedJitter = Box<dyn JitterSource + Send>;

/// In-memory caller of the prediction engine for a single user.
pub struct CycleTracker {
    engine: PredictionEngine,
    data: Mutex<TrackerData>,
    snapshot: Mutex<Snapshot>,
    jitter: Mutex<BoxedJitter>,
}

impl CycleTracker {
    pub fn new(profile: CycleProfile, settings: EngineSettings) -> Result<Self, TrackerError> {
        Self::with_jitter(profile, settings, RandomJitter::from_entropy())
    }

    pub fn with_jitter(
        profile: CycleProfile,
        settings: EngineSettings,
        jitter: impl JitterSource + Send + 'static,
    ) -> Result<Self, TrackerError> {
        profile.validate()?;
        Ok(Self {
            engine: PredictionEngine::new(settings)?,
            data: Mutex::new(TrackerData {
                profile,
                periods: Vec::new(),
            }),
            snapshot: Mutex::new(Snapshot::default()),
            jitter: Mutex::new(Box::new(jitter)),
        })
    }

    fn data(&self) -> Result<MutexGuard<'_, TrackerData>, TrackerError> {
        self.data.lock().map_err(|_| TrackerError::LockPoisoned)
    }

    fn snapshot(&self) -> Result<MutexGuard<'_, Snapshot>, TrackerError> {
        self.snapshot.lock().map_err(|_| TrackerError::LockPoisoned)
    }

    fn jitter(&self) -> Result<MutexGuard<'_, BoxedJitter>, TrackerError> {
        self.jitter.lock().map_err(|_| TrackerError::LockPoisoned)
    }

    fn settings(&self) -> &EngineSettings {
        self.engine.settings()
    }

    pub fn profile(&self) -> Result<CycleProfile, TrackerError> {
        Ok(self.data()?.profile.clone())
    }

    pub fn update_profile(&self, profile: CycleProfile) -> Result<(), TrackerError> {
        profile.validate()?;
        self.data()?.profile = profile;
        Ok(())
    }

    pub fn periods(&self) -> Result<Vec<PeriodRecord>, TrackerError> {
        Ok(self.data()?.periods.clone())
    }

    /// Log a period without refreshing statistics.
    pub fn add_period(&self, record: PeriodRecord) -> Result<Uuid, TrackerError> {
        let id = record.id;
        insert_period(&mut *self.data()?, record)?;
        self.snapshot()?.pending_since_refresh += 1;
        Ok(id)
    }

    /// Record a period starting on `date` and refresh the statistics snapshot.
    pub fn confirm_period(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ConfirmedPeriod, TrackerError> {
        let record = PeriodRecord {
            flow_intensity: Some(FlowLevel::Medium),
            ..PeriodRecord::starting(date)
        };
        let id = record.id;
        insert_period(&mut *self.data()?, record)?;

        let stats = self.refresh(today)?;
        tracing::info!(%date, total_periods = stats.total_periods, "period confirmed");
        Ok(ConfirmedPeriod { id, stats })
    }

    /// Recompute the statistics snapshot and clear the pending counter.
    pub fn refresh(&self, today: NaiveDate) -> Result<CycleStats, TrackerError> {
        let stats = {
            let data = self.data()?;
            cycle::cycle_stats(&data.periods, data.profile.cycle_length, today)
        };

        let mut snapshot = self.snapshot()?;
        snapshot.stats = Some(stats.clone());
        snapshot.refreshed_on = Some(today);
        snapshot.pending_since_refresh = 0;
        tracing::debug!(%today, avg_cycle_length = stats.avg_cycle_length, "statistics refreshed");
        Ok(stats)
    }

    /// Prediction for `target`, falling back to the profile alone when there
    /// is no period on or before it.
    pub fn current_prediction(
        &self,
        target: NaiveDate,
        today: NaiveDate,
    ) -> Result<PredictionOutcome, TrackerError> {
        let data = self.data()?;
        let mut jitter = self.jitter()?;

        match self
            .engine
            .predict(&data.profile, &data.periods, target, today, &mut **jitter)
        {
            Ok(result) => Ok(PredictionOutcome::Full(result)),
            Err(err) if err.is_no_period_data() => {
                tracing::warn!(%target, error = %err, "degrading to profile-only prediction");
                let days_until_next_period = predictor::try_days_until_next_period(
                    &data.profile,
                    &data.periods,
                    today,
                    &mut **jitter,
                )?;
                Ok(PredictionOutcome::ProfileOnly(ProfilePrediction {
                    predicted_mood: self.settings().fallback_mood,
                    days_until_next_period,
                }))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// One prediction per day in `start..=end`, skipping days that fail.
    /// Defaults to the configured window ending today.
    pub fn prediction_history(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<PredictionHistory, TrackerError> {
        let end = end.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => today
                .checked_sub_signed(Duration::days(self.settings().history_window_days))
                .ok_or(TrackerError::InvalidRange {
                    start: NaiveDate::MIN,
                    end,
                })?,
        };
        if end < start {
            return Err(TrackerError::InvalidRange { start, end });
        }

        let data = self.data()?;
        let mut jitter = self.jitter()?;

        let entries: Vec<DatedPrediction> = start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter_map(|date| {
                match self
                    .engine
                    .predict(&data.profile, &data.periods, date, today, &mut **jitter)
                {
                    Ok(prediction) => Some(DatedPrediction { date, prediction }),
                    Err(err) => {
                        tracing::debug!(%date, error = %err, "skipping date in history");
                        None
                    }
                }
            })
            .collect();

        Ok(PredictionHistory {
            total: entries.len(),
            entries,
        })
    }

    pub fn cycle_info(&self, today: NaiveDate) -> Result<CycleInfo, TrackerError> {
        let data = self.data()?;
        let profile = &data.profile;

        let current_day_of_cycle = cycle::day_of_cycle(&data.periods, today)?;
        let current_cycle_phase =
            cycle::cycle_phase(current_day_of_cycle, profile.cycle_length, profile.luteal_length);
        let days_until_next_period = predictor::try_days_until_next_period(
            profile,
            &data.periods,
            today,
            &mut **self.jitter()?,
        )?;

        Ok(CycleInfo {
            current_day_of_cycle,
            current_cycle_phase,
            days_until_next_period,
            cycle_statistics: cycle::cycle_stats(&data.periods, profile.cycle_length, today),
        })
    }

    pub fn status(&self, today: NaiveDate) -> Result<TrackerStatus, TrackerError> {
        let (total_periods, cycle_statistics) = {
            let data = self.data()?;
            (
                data.periods.len(),
                cycle::cycle_stats(&data.periods, data.profile.cycle_length, today),
            )
        };
        let snapshot = self.snapshot()?;
        let retrain_threshold = self.settings().retrain_threshold;

        Ok(TrackerStatus {
            refreshed_on: snapshot.refreshed_on,
            refreshed_statistics: snapshot.stats.clone(),
            total_periods,
            pending_since_refresh: snapshot.pending_since_refresh,
            needs_refresh: snapshot.pending_since_refresh >= retrain_threshold,
            retrain_threshold,
            cycle_statistics,
        })
    }

    pub fn export_json(&self) -> Result<String, TrackerError> {
        let data = self.data()?;
        Ok(serde_json::to_string_pretty(&*data)?)
    }
}

/// Keep periods ordered by start date and unique per start date.
fn insert_period(data: &mut TrackerData, record: PeriodRecord) -> Result<(), TrackerError> {
    if let Some(end) = record.end_date.filter(|end| *end < record.start_date) {
        return Err(TrackerError::InvalidRange {
            start: record.start_date,
            end,
        });
    }

    match data
        .periods
        .binary_search_by_key(&record.start_date, |p| p.start_date)
    {
        Ok(_) => Err(TrackerError::DuplicatePeriod(record.start_date)),
        Err(pos) => {
            data.periods.insert(pos, record);
            Ok(())
        }
    }
}
